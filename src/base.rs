// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Identifier types for the string fields of a transaction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Department that booked a transaction.
///
/// Compared by exact string equality; no case folding or trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Department(pub String);

impl Department {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Department {
    fn from(value: &str) -> Self {
        Department(value.to_owned())
    }
}

impl From<String> for Department {
    fn from(value: String) -> Self {
        Department(value)
    }
}

/// Party receiving the funds of a transaction.
///
/// Compared by exact string equality; no case folding or trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Beneficiary(pub String);

impl Beneficiary {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Beneficiary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Beneficiary {
    fn from(value: &str) -> Self {
        Beneficiary(value.to_owned())
    }
}

impl From<String> for Beneficiary {
    fn from(value: String) -> Self {
        Beneficiary(value)
    }
}

/// Which of the two ledgers a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

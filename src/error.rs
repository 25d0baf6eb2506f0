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

//! Error types for ledger parsing and reconciliation.

use crate::base::Side;
use thiserror::Error;

/// Reconciliation errors.
///
/// Every variant describes bad input. Reconciliation itself cannot fail once
/// both ledgers are parsed, so any error aborts the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Date is not a calendar date in `YYYY-MM-DD` form
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Amount is not a decimal number
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),

    /// Row does not have exactly the four transaction fields
    #[error("expected {expected} fields, found {found}")]
    WrongArity { expected: usize, found: usize },

    /// A row of one of the ledgers could not be parsed
    #[error("{side} ledger, row {row}: {source}")]
    Row {
        side: Side,
        row: usize,
        #[source]
        source: Box<ReconcileError>,
    },
}

impl ReconcileError {
    /// Attaches the ledger side and row position to a field error.
    pub fn at_row(self, side: Side, row: usize) -> Self {
        ReconcileError::Row {
            side,
            row,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            ReconcileError::InvalidDate("2024-13-01".into()).to_string(),
            "invalid date '2024-13-01' (expected YYYY-MM-DD)"
        );
        assert_eq!(
            ReconcileError::InvalidAmount("ten".into()).to_string(),
            "invalid amount 'ten'"
        );
        assert_eq!(
            ReconcileError::WrongArity {
                expected: 4,
                found: 3
            }
            .to_string(),
            "expected 4 fields, found 3"
        );
    }

    #[test]
    fn row_error_names_side_and_position() {
        let error = ReconcileError::InvalidDate("01/02/2024".into()).at_row(Side::Right, 7);
        assert_eq!(
            error.to_string(),
            "right ledger, row 7: invalid date '01/02/2024' (expected YYYY-MM-DD)"
        );
    }

    #[test]
    fn row_error_exposes_source() {
        use std::error::Error as _;

        let error = ReconcileError::InvalidAmount("x".into()).at_row(Side::Left, 0);
        let source = error.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("invalid amount 'x'"));
    }

    #[test]
    fn errors_are_cloneable() {
        let error = ReconcileError::InvalidDate("nope".into());
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}

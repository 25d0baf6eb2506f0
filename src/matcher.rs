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

//! Matching predicate and linear candidate search.
//!
//! Two transactions from opposite ledgers denote the same real-world event
//! when department, amount and beneficiary agree exactly and their dates
//! are at most [`DEFAULT_DATE_WINDOW_DAYS`] apart, in either direction.
//!
//! # Tie-break
//!
//! When several candidates match, the one with the smallest date wins. Among
//! candidates sharing that date, the earliest in ledger order wins. The
//! result therefore never depends on whether the opposite ledger was sorted.

use crate::base::{Beneficiary, Department};
use crate::transaction::Transaction;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Inclusive tolerance, in calendar days, between matching dates.
pub const DEFAULT_DATE_WINDOW_DAYS: u32 = 1;

pub fn is_same_department(a: &Department, b: &Department) -> bool {
    a == b
}

/// Exact numeric equality, no epsilon.
pub fn is_same_amount(a: &Decimal, b: &Decimal) -> bool {
    a == b
}

pub fn is_same_beneficiary(a: &Beneficiary, b: &Beneficiary) -> bool {
    a == b
}

/// True when `a` and `b` are at most `window_days` calendar days apart.
pub fn is_within_window(a: NaiveDate, b: NaiveDate, window_days: u32) -> bool {
    a.signed_duration_since(b).num_days().abs() <= i64::from(window_days)
}

/// Returns true if `a` and `b` denote the same event.
pub fn matches(a: &Transaction, b: &Transaction) -> bool {
    matches_within(a, b, DEFAULT_DATE_WINDOW_DAYS)
}

/// [`matches`] with a configurable date window.
pub fn matches_within(a: &Transaction, b: &Transaction, window_days: u32) -> bool {
    is_same_department(&a.department, &b.department)
        && is_same_amount(&a.amount, &b.amount)
        && is_same_beneficiary(&a.beneficiary, &b.beneficiary)
        && is_within_window(a.date, b.date, window_days)
}

/// Finds the canonical match for `transaction` among `candidates`.
///
/// Returns `None` if no candidate matches.
pub fn find_match<'a>(
    transaction: &Transaction,
    candidates: &'a [Transaction],
) -> Option<&'a Transaction> {
    find_match_index(transaction, candidates, DEFAULT_DATE_WINDOW_DAYS).map(|i| &candidates[i])
}

/// Position of the canonical match for `transaction` in `candidates`.
///
/// Scans the whole slice; see the module docs for the tie-break rule.
pub fn find_match_index(
    transaction: &Transaction,
    candidates: &[Transaction],
    window_days: u32,
) -> Option<usize> {
    let mut best: Option<(usize, NaiveDate)> = None;

    for (position, candidate) in candidates.iter().enumerate() {
        if !matches_within(transaction, candidate, window_days) {
            continue;
        }
        // Strict comparison keeps the earliest position among equal dates.
        match best {
            Some((_, date)) if date <= candidate.date => {}
            _ => best = Some((position, candidate.date)),
        }
    }

    best.map(|(position, _)| position)
}

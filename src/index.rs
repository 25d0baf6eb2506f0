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

//! Hash index over a ledger for constant-time candidate lookup.
//!
//! Candidates are bucketed by the fields that must match exactly
//! (department, amount, beneficiary). Each bucket keeps its `(date,
//! position)` pairs sorted, so the earliest date inside the window is found
//! with a binary search. Lookups return exactly what
//! [`find_match_index`](crate::matcher::find_match_index) returns for the
//! same ledger.

use crate::transaction::Transaction;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Fields compared by exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MatchKey<'a> {
    department: &'a str,
    /// Normalized so that `100.0` and `100.00` share a bucket.
    amount: Decimal,
    beneficiary: &'a str,
}

impl<'a> MatchKey<'a> {
    fn of(transaction: &'a Transaction) -> Self {
        Self {
            department: transaction.department.as_str(),
            amount: transaction.amount.normalize(),
            beneficiary: transaction.beneficiary.as_str(),
        }
    }
}

/// Read-only index over one ledger.
///
/// Borrows the ledger it was built from and is `Sync`, so one index can
/// serve lookups from many threads.
#[derive(Debug)]
pub struct CandidateIndex<'a> {
    /// Candidate dates and ledger positions per key, ascending.
    buckets: HashMap<MatchKey<'a>, Vec<(NaiveDate, usize)>>,
    len: usize,
}

impl<'a> CandidateIndex<'a> {
    /// Indexes every transaction of `candidates` by its match key.
    pub fn build(candidates: &'a [Transaction]) -> Self {
        let mut buckets: HashMap<MatchKey<'a>, Vec<(NaiveDate, usize)>> = HashMap::new();

        for (position, candidate) in candidates.iter().enumerate() {
            buckets
                .entry(MatchKey::of(candidate))
                .or_default()
                .push((candidate.date, position));
        }

        // Positions are unique, so (date, position) is a total order.
        for entries in buckets.values_mut() {
            entries.sort_unstable();
        }

        Self {
            buckets,
            len: candidates.len(),
        }
    }

    /// Number of indexed transactions.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position of the canonical match for `transaction`, if any.
    pub fn find(&self, transaction: &Transaction, window_days: u32) -> Option<usize> {
        let entries = self.buckets.get(&MatchKey::of(transaction))?;
        let window = i64::from(window_days);

        // First entry not earlier than `transaction.date - window`.
        let first = entries.partition_point(|(date, _)| {
            transaction.date.signed_duration_since(*date).num_days() > window
        });
        let &(date, position) = entries.get(first)?;

        (date.signed_duration_since(transaction.date).num_days() <= window).then_some(position)
    }
}

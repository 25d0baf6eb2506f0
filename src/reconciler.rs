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

//! Two-way ledger reconciliation.
//!
//! The [`Reconciler`] tags every transaction of each ledger with whether a
//! counterpart exists in the other ledger. The two directions are
//! independent searches, not a bipartite assignment:
//!
//! - A match found for a left record does not consume the right record.
//! - Several left records may match the same right record.
//! - Each right record is tagged by its own search against the left ledger.
//!
//! # Strategies
//!
//! | Strategy | Inner search | Cost |
//! |----------|--------------|------|
//! | [`MatchStrategy::Scan`] | Linear scan of the opposite ledger | O(\|A\|·\|B\|) |
//! | [`MatchStrategy::Indexed`] | [`CandidateIndex`] lookup | O(\|A\| + \|B\|) average |
//!
//! Both strategies, with or without parallelism, produce identical output.
//!
//! # Parallelism
//!
//! Each record's search is independent, so the outer loop can be sharded on
//! the rayon pool. Output order always follows input order.

use crate::base::Side;
use crate::error::ReconcileError;
use crate::index::CandidateIndex;
use crate::matcher::{DEFAULT_DATE_WINDOW_DAYS, find_match_index};
use crate::transaction::{AnnotatedTransaction, Transaction};
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, trace};

/// How candidates in the opposite ledger are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchStrategy {
    /// Scan the opposite ledger for every record.
    Scan,
    /// Build a hash index over the opposite ledger once per direction.
    #[default]
    Indexed,
}

/// Reconciliation settings and entry point.
///
/// # Example
///
/// ```
/// use ledger_reconcile_rs::{MatchStrategy, Reconciler, TransactionStatus};
///
/// let left = [["2024-01-01", "Sales", "100.0", "Alice"]];
/// let right = [
///     ["2024-01-02", "Sales", "100.0", "Alice"],
///     ["2024-03-01", "Sales", "100.0", "Alice"],
/// ];
///
/// let reconciler = Reconciler::new().with_strategy(MatchStrategy::Scan);
/// let (left, right) = reconciler.reconcile_rows(&left, &right).unwrap();
///
/// assert_eq!(left[0].status, TransactionStatus::Found);
/// assert_eq!(right[0].status, TransactionStatus::Found);
/// assert_eq!(right[1].status, TransactionStatus::Missing);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
    date_window_days: u32,
    strategy: MatchStrategy,
    parallel: bool,
}

impl Reconciler {
    /// One-day window, indexed search, sequential.
    pub fn new() -> Self {
        Reconciler {
            date_window_days: DEFAULT_DATE_WINDOW_DAYS,
            strategy: MatchStrategy::default(),
            parallel: false,
        }
    }

    /// Sets the inclusive date tolerance in calendar days.
    pub fn with_date_window(mut self, days: u32) -> Self {
        self.date_window_days = days;
        self
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shards the per-record searches across the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn date_window_days(&self) -> u32 {
        self.date_window_days
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Annotates both ledgers.
    ///
    /// Outputs have the same length and order as their inputs.
    pub fn reconcile(
        &self,
        left: &[Transaction],
        right: &[Transaction],
    ) -> (Vec<AnnotatedTransaction>, Vec<AnnotatedTransaction>) {
        debug!(
            left = left.len(),
            right = right.len(),
            window_days = self.date_window_days,
            strategy = ?self.strategy,
            parallel = self.parallel,
            "reconciling ledgers"
        );

        let annotated_left = self.annotate(Side::Left, left, right);
        let annotated_right = self.annotate(Side::Right, right, left);

        debug!(
            left = %Summary::of(&annotated_left),
            right = %Summary::of(&annotated_right),
            "reconciliation complete"
        );

        (annotated_left, annotated_right)
    }

    /// Parses both ledgers from split rows, then reconciles them.
    ///
    /// Every row is parsed before any matching starts, so a bad row yields
    /// an error and no partial result.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Row`] for the first row that fails
    /// [`Transaction::from_row`], left ledger first.
    pub fn reconcile_rows<R, S>(
        &self,
        left: &[R],
        right: &[R],
    ) -> Result<(Vec<AnnotatedTransaction>, Vec<AnnotatedTransaction>), ReconcileError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let left = parse_ledger(Side::Left, left)?;
        let right = parse_ledger(Side::Right, right)?;
        Ok(self.reconcile(&left, &right))
    }

    fn annotate(
        &self,
        side: Side,
        ledger: &[Transaction],
        opposite: &[Transaction],
    ) -> Vec<AnnotatedTransaction> {
        let window = self.date_window_days;
        match self.strategy {
            MatchStrategy::Scan => {
                self.tag(side, ledger, |tx| find_match_index(tx, opposite, window))
            }
            MatchStrategy::Indexed => {
                let index = CandidateIndex::build(opposite);
                self.tag(side, ledger, |tx| index.find(tx, window))
            }
        }
    }

    fn tag<F>(&self, side: Side, ledger: &[Transaction], search: F) -> Vec<AnnotatedTransaction>
    where
        F: Fn(&Transaction) -> Option<usize> + Sync,
    {
        let annotate = |(row, transaction): (usize, &Transaction)| {
            let counterpart = search(transaction);
            if counterpart.is_none() {
                trace!(
                    %side,
                    row,
                    date = %transaction.date,
                    department = %transaction.department,
                    amount = %transaction.amount,
                    beneficiary = %transaction.beneficiary,
                    "no counterpart"
                );
            }
            AnnotatedTransaction::new(transaction.clone(), counterpart)
        };

        if self.parallel {
            ledger.par_iter().enumerate().map(annotate).collect()
        } else {
            ledger.iter().enumerate().map(annotate).collect()
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconciles two ledgers with the default [`Reconciler`].
pub fn reconcile(
    left: &[Transaction],
    right: &[Transaction],
) -> (Vec<AnnotatedTransaction>, Vec<AnnotatedTransaction>) {
    Reconciler::new().reconcile(left, right)
}

/// Parses every row of one ledger, failing on the first bad row.
///
/// # Errors
///
/// Returns [`ReconcileError::Row`] wrapping the field error, tagged with
/// `side` and the 0-based row position.
pub fn parse_ledger<R, S>(side: Side, rows: &[R]) -> Result<Vec<Transaction>, ReconcileError>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    rows.iter()
        .enumerate()
        .map(|(row, fields)| {
            let fields: &[S] = fields.as_ref();
            Transaction::from_row(fields).map_err(|e| e.at_row(side, row))
        })
        .collect()
}

/// Found/missing counts of one annotated ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
}

impl Summary {
    pub fn of(ledger: &[AnnotatedTransaction]) -> Self {
        let found = ledger.iter().filter(|tx| tx.is_found()).count();
        Summary {
            total: ledger.len(),
            found,
            missing: ledger.len() - found,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} found, {} missing",
            self.total, self.found, self.missing
        )
    }
}

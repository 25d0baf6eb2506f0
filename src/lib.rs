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

//! # Ledger Reconcile
//!
//! This library reconciles two independent ledgers of financial transactions,
//! such as an internal system export and a bank statement. Every record of
//! each ledger is tagged `FOUND` when a corresponding record exists in the
//! other ledger and `MISSING` otherwise.
//!
//! ## Core Components
//!
//! - [`Transaction`]: Four-field ledger entry (date, department, amount, beneficiary)
//! - [`matches`] / [`find_match`]: Matching predicate and tie-breaking candidate search
//! - [`CandidateIndex`]: Hash index over a ledger for fast candidate lookup
//! - [`Reconciler`]: Two-way reconciliation of a pair of ledgers
//! - [`ReconcileError`]: Error types for malformed input
//!
//! ## Matching Rules
//!
//! Two records match when department, amount and beneficiary are equal and
//! their dates are at most one calendar day apart. If several records match,
//! the earliest-dated one is chosen.
//!
//! ## Example
//!
//! ```
//! use ledger_reconcile_rs::{reconcile, Transaction, TransactionStatus};
//!
//! let left = vec![Transaction::parse("2024-01-01", "HR", "50.0", "Bob").unwrap()];
//! let right: Vec<Transaction> = Vec::new();
//!
//! let (left, right) = reconcile(&left, &right);
//! assert_eq!(left[0].status, TransactionStatus::Missing);
//! assert!(right.is_empty());
//! ```

mod base;
pub mod error;
mod index;
pub mod matcher;
mod reconciler;
mod transaction;

pub use base::{Beneficiary, Department, Side};
pub use error::ReconcileError;
pub use index::CandidateIndex;
pub use matcher::{find_match, find_match_index, matches, matches_within};
pub use reconciler::{MatchStrategy, Reconciler, Summary, parse_ledger, reconcile};
pub use transaction::{
    AnnotatedTransaction, DATE_FORMAT, Transaction, TransactionStatus, parse_amount, parse_date,
};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Installs a global `tracing` subscriber writing to stderr.
///
/// Honors `RUST_LOG`; defaults to `info` for this crate. Safe to call more
/// than once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("ledger_reconcile_rs=info,ledger_reconcile=info"));

        // A subscriber may already be installed by the host application.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
    }
}

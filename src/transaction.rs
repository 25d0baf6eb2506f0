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

//! Transaction records and their reconciliation status.
//!
//! A [`Transaction`] is the four-field record both ledgers share. After
//! reconciliation each record is wrapped in an [`AnnotatedTransaction`]
//! carrying a [`TransactionStatus`]:
//! - [`Found`]: a matching record exists in the opposite ledger
//! - [`Missing`]: no record in the opposite ledger matches
//!
//! [`Found`]: TransactionStatus::Found
//! [`Missing`]: TransactionStatus::Missing

use crate::base::{Beneficiary, Department};
use crate::error::ReconcileError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical form of transaction dates.
///
/// Only the zero-padded `YYYY-MM-DD` rendering is accepted; chrono alone
/// would also take `2024-1-5` or `+2024-01-01`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of fields in a transaction row.
pub const TRANSACTION_FIELDS: usize = 4;

/// A single ledger entry.
///
/// Records carry no identity beyond their fields: two transactions with
/// identical fields are indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub department: Department,
    pub amount: Decimal,
    pub beneficiary: Beneficiary,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        department: impl Into<Department>,
        amount: Decimal,
        beneficiary: impl Into<Beneficiary>,
    ) -> Self {
        Self {
            date,
            department: department.into(),
            amount,
            beneficiary: beneficiary.into(),
        }
    }

    /// Builds a transaction from its lexical fields.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::InvalidDate`] - `date` is not a `YYYY-MM-DD` calendar date.
    /// - [`ReconcileError::InvalidAmount`] - `amount` is not a decimal number.
    pub fn parse(
        date: &str,
        department: &str,
        amount: &str,
        beneficiary: &str,
    ) -> Result<Self, ReconcileError> {
        Ok(Self::new(
            parse_date(date)?,
            department,
            parse_amount(amount)?,
            beneficiary,
        ))
    }

    /// Builds a transaction from one row of already-split fields.
    ///
    /// Expected order: `date, department, amount, beneficiary`. Surrounding
    /// whitespace is trimmed from every field.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::WrongArity`] unless the row has exactly four
    /// fields, otherwise the errors of [`Transaction::parse`].
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, ReconcileError> {
        let [date, department, amount, beneficiary] = row else {
            return Err(ReconcileError::WrongArity {
                expected: TRANSACTION_FIELDS,
                found: row.len(),
            });
        };

        Self::parse(
            date.as_ref().trim(),
            department.as_ref().trim(),
            amount.as_ref().trim(),
            beneficiary.as_ref().trim(),
        )
    }

    /// Renders the four fields in their canonical lexical form.
    pub fn to_row(&self) -> [String; TRANSACTION_FIELDS] {
        [
            self.date.format(DATE_FORMAT).to_string(),
            self.department.to_string(),
            self.amount.to_string(),
            self.beneficiary.to_string(),
        ]
    }
}

/// Parses a canonical `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ReconcileError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
        .ok_or_else(|| ReconcileError::InvalidDate(value.to_owned()))
}

/// Parses a signed decimal amount such as `-12.50`.
///
/// Amounts that `Decimal` cannot hold without rounding are rejected, so two
/// distinct inputs never compare equal.
pub fn parse_amount(value: &str) -> Result<Decimal, ReconcileError> {
    Decimal::from_str_exact(value).map_err(|_| ReconcileError::InvalidAmount(value.to_owned()))
}

/// Whether a counterpart was found in the opposite ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Found,
    Missing,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Found => "FOUND",
            TransactionStatus::Missing => "MISSING",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction tagged with its reconciliation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedTransaction {
    pub transaction: Transaction,
    pub status: TransactionStatus,
    /// Position of the selected match in the opposite ledger.
    pub counterpart: Option<usize>,
}

impl AnnotatedTransaction {
    /// Tags `transaction` from the result of its candidate search.
    pub fn new(transaction: Transaction, counterpart: Option<usize>) -> Self {
        let status = match counterpart {
            Some(_) => TransactionStatus::Found,
            None => TransactionStatus::Missing,
        };
        Self {
            transaction,
            status,
            counterpart,
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == TransactionStatus::Found
    }

    /// Renders the four transaction fields followed by the status.
    pub fn to_row(&self) -> [String; TRANSACTION_FIELDS + 1] {
        let [date, department, amount, beneficiary] = self.transaction.to_row();
        [
            date,
            department,
            amount,
            beneficiary,
            self.status.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_valid_fields() {
        let tx = Transaction::parse("2024-01-31", "Sales", "-100.50", "Alice").unwrap();
        assert_eq!(tx.date, date(2024, 1, 31));
        assert_eq!(tx.department, Department::from("Sales"));
        assert_eq!(tx.amount, dec!(-100.50));
        assert_eq!(tx.beneficiary, Beneficiary::from("Alice"));
    }

    #[test]
    fn parse_rejects_malformed_dates() {
        for bad in ["2024-02-30", "01/02/2024", "2024-01-01T00:00", "", "yesterday"] {
            assert_eq!(
                parse_date(bad),
                Err(ReconcileError::InvalidDate(bad.to_owned())),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_non_numeric_amount() {
        let err = Transaction::parse("2024-01-01", "HR", "fifty", "Bob").unwrap_err();
        assert_eq!(err, ReconcileError::InvalidAmount("fifty".into()));
    }

    #[test]
    fn parse_rejects_non_canonical_dates() {
        for bad in ["2024-1-5", "2024-01-5", "+2024-01-01", "02024-01-01"] {
            assert_eq!(
                parse_date(bad),
                Err(ReconcileError::InvalidDate(bad.to_owned())),
                "accepted {bad:?}"
            );
        }
        assert_eq!(parse_date("2024-01-05"), Ok(date(2024, 1, 5)));
    }

    #[test]
    fn parse_rejects_amounts_that_would_round() {
        let a = "0.12345678901234567890123456789";
        let b = "0.1234567890123456789012345678901";
        let c = "0.1234567890123456789012345678902";
        for bad in [a, b, c] {
            assert_eq!(
                parse_amount(bad),
                Err(ReconcileError::InvalidAmount(bad.to_owned()))
            );
        }
        assert_eq!(
            parse_amount("0.1234567890123456789012345678"),
            Ok(dec!(0.1234567890123456789012345678))
        );
    }

    #[test]
    fn distinct_long_amounts_do_not_match() {
        let left = [["2024-01-01", "HR", "0.1234567890123456789012345678901", "Bob"]];
        let right = [["2024-01-01", "HR", "0.1234567890123456789012345678902", "Bob"]];
        let err = crate::Reconciler::new()
            .reconcile_rows(&left, &right)
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Row { row: 0, ref source, .. }
                if matches!(**source, ReconcileError::InvalidAmount(_))
        ));
    }

    #[test]
    fn from_row_trims_fields() {
        let tx = Transaction::from_row(&[" 2024-01-01 ", " HR", "50.0 ", " Bob "]).unwrap();
        assert_eq!(tx, Transaction::new(date(2024, 1, 1), "HR", dec!(50.0), "Bob"));
    }

    #[test]
    fn from_row_checks_arity() {
        let err = Transaction::from_row(&["2024-01-01", "HR", "50.0"]).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::WrongArity {
                expected: 4,
                found: 3
            }
        );

        let row = vec!["2024-01-01".to_string(); 5];
        assert!(matches!(
            Transaction::from_row(&row),
            Err(ReconcileError::WrongArity { found: 5, .. })
        ));
    }

    #[test]
    fn amounts_compare_by_value() {
        let a = Transaction::parse("2024-01-01", "HR", "50", "Bob").unwrap();
        let b = Transaction::parse("2024-01-01", "HR", "50.00", "Bob").unwrap();
        assert_eq!(a.amount, b.amount);
    }

    #[test]
    fn annotated_row_appends_status() {
        let tx = Transaction::new(date(2024, 3, 1), "Sales", dec!(100.0), "Alice");
        let found = AnnotatedTransaction::new(tx.clone(), Some(0));
        let missing = AnnotatedTransaction::new(tx, None);

        assert!(found.is_found());
        assert_eq!(
            found.to_row(),
            ["2024-03-01", "Sales", "100.0", "Alice", "FOUND"].map(String::from)
        );
        assert_eq!(missing.status, TransactionStatus::Missing);
        assert_eq!(missing.to_row()[4], "MISSING");
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Found).unwrap(),
            "\"FOUND\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Missing).unwrap(),
            "\"MISSING\""
        );
    }
}

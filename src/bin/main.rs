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

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use ledger_reconcile_rs::matcher::DEFAULT_DATE_WINDOW_DAYS;
use ledger_reconcile_rs::{
    AnnotatedTransaction, MatchStrategy, ReconcileError, Reconciler, Side, Summary, Transaction,
};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing::info;

/// Ledger Reconcile - Match transactions across two ledger CSV files
///
/// Reads two ledgers and writes each back with a trailing status column:
/// FOUND when the other ledger holds a matching transaction, MISSING otherwise.
#[derive(Parser, Debug)]
#[command(name = "ledger-reconcile")]
#[command(about = "Reconciles two transaction ledgers", long_about = None)]
struct Args {
    /// Path to the first ledger CSV
    ///
    /// Expected format: date,department,amount,beneficiary
    /// Example: cargo run -- internal.csv bank.csv > reconciled.csv
    #[arg(value_name = "LEFT")]
    left: PathBuf,

    /// Path to the second ledger CSV
    #[arg(value_name = "RIGHT")]
    right: PathBuf,

    /// Treat the first row of each file as a header
    #[arg(long)]
    headers: bool,

    /// Maximum distance in days between matching dates
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_DATE_WINDOW_DAYS)]
    date_window: u32,

    /// Candidate search strategy
    #[arg(long, value_enum, default_value_t = Strategy::Indexed)]
    strategy: Strategy,

    /// Search candidates on all cores
    #[arg(long)]
    parallel: bool,

    /// Write the annotated first ledger here instead of stdout
    #[arg(long, value_name = "FILE")]
    left_output: Option<PathBuf>,

    /// Write the annotated second ledger here instead of stdout
    #[arg(long, value_name = "FILE")]
    right_output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    Scan,
    Indexed,
}

impl From<Strategy> for MatchStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Scan => MatchStrategy::Scan,
            Strategy::Indexed => MatchStrategy::Indexed,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot open '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot create '{}': {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    /// `line` is the 1-based line in the file, header included.
    #[error("{side} ledger, line {line}: {source}")]
    Record {
        side: Side,
        line: u64,
        source: ReconcileError,
    },
}

fn main() {
    let args = Args::parse();
    ledger_reconcile_rs::init_tracing();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let left = load_ledger(&args.left, Side::Left, args.headers)?;
    let right = load_ledger(&args.right, Side::Right, args.headers)?;

    let reconciler = Reconciler::new()
        .with_date_window(args.date_window)
        .with_strategy(args.strategy.into())
        .with_parallel(args.parallel);
    let (annotated_left, annotated_right) =
        reconciler.reconcile(&left.transactions, &right.transactions);

    info!(
        left = %Summary::of(&annotated_left),
        right = %Summary::of(&annotated_right),
        "reconciled {} against {}",
        args.left.display(),
        args.right.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.left_output {
        Some(path) => write_ledger(create(path)?, left.headers.as_ref(), &annotated_left)?,
        None => write_ledger(&mut out, left.headers.as_ref(), &annotated_left)?,
    }

    // Blank line between the two ledgers when both go to stdout.
    if args.left_output.is_none() && args.right_output.is_none() {
        writeln!(out)?;
    }

    match &args.right_output {
        Some(path) => write_ledger(create(path)?, right.headers.as_ref(), &annotated_right)?,
        None => write_ledger(&mut out, right.headers.as_ref(), &annotated_right)?,
    }

    Ok(())
}

fn load_ledger(path: &Path, side: Side, has_headers: bool) -> Result<Ledger, CliError> {
    let file = File::open(path).map_err(|source| CliError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_ledger(BufReader::new(file), side, has_headers)
}

fn create(path: &Path) -> Result<File, CliError> {
    File::create(path).map_err(|source| CliError::Create {
        path: path.to_path_buf(),
        source,
    })
}

/// A parsed ledger file.
#[derive(Debug)]
struct Ledger {
    headers: Option<StringRecord>,
    transactions: Vec<Transaction>,
}

/// Reads one ledger from CSV.
///
/// # CSV Format
///
/// Columns: `date, department, amount, beneficiary`
/// - `date`: Calendar date as `YYYY-MM-DD`
/// - `department`: Department identifier
/// - `amount`: Signed decimal amount
/// - `beneficiary`: Beneficiary identifier
///
/// # Example
///
/// ```csv
/// 2024-01-01,Sales,100.0,Alice
/// 2024-01-03,HR,-25.5,Bob
/// ```
///
/// # Errors
///
/// Returns the first malformed row as [`CliError::Record`], located by its
/// line in the file; no rows are skipped.
fn read_ledger<R: Read>(reader: R, side: Side, has_headers: bool) -> Result<Ledger, CliError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true) // Arity is checked per row with a precise error
        .has_headers(has_headers)
        .from_reader(reader);

    let headers = if has_headers {
        Some(rdr.headers()?.clone())
    } else {
        None
    };

    let mut transactions = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let fields: Vec<&str> = record.iter().collect();
        let transaction = Transaction::from_row(&fields).map_err(|source| CliError::Record {
            side,
            line: record
                .position()
                .map_or(row as u64 + 1 + u64::from(has_headers), |p| p.line()),
            source,
        })?;
        transactions.push(transaction);
    }

    Ok(Ledger {
        headers,
        transactions,
    })
}

/// Writes an annotated ledger as CSV.
///
/// Each row is the original four fields followed by `FOUND` or `MISSING`.
/// When `headers` is given it is written first, extended with a `status`
/// column.
fn write_ledger<W: Write>(
    writer: W,
    headers: Option<&StringRecord>,
    ledger: &[AnnotatedTransaction],
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    if let Some(headers) = headers {
        wtr.write_record(headers.iter().chain(["status"]))?;
    }

    for transaction in ledger {
        wtr.write_record(transaction.to_row())?;
    }

    wtr.flush()?;
    Ok(())
}

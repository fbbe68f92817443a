pub mod categories;
pub mod clear;
pub mod currency;
pub mod export;
pub mod import;
pub mod init;
pub mod report;
pub mod status;
pub mod transactions;

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::db::SqliteStorage;
use crate::error::{PocketError, Result};
use crate::models::{parse_date, TxnType};
use crate::query::{Month, TypeFilter};
use crate::settings::db_path;
use crate::store::TransactionStore;

/// Opens the store over the configured database; fails if `init` has not been run.
pub(crate) fn open_store() -> Result<TransactionStore<SqliteStorage>> {
    let storage = SqliteStorage::open_existing(&db_path())?;
    TransactionStore::open(storage)
}

pub(crate) fn parse_date_arg(raw: &str) -> Result<DateTime<Utc>> {
    parse_date(raw).ok_or_else(|| PocketError::InvalidDate(raw.to_string()))
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks `prompt` on stdout and reads one line from stdin.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

#[derive(Parser)]
#[command(
    name = "pocketbook",
    version,
    about = "Personal income and expense ledger."
)]
pub struct Cli {
    /// Logging verbosity: off, error, warn, info, debug, trace. RUST_LOG overrides it.
    #[arg(
        long,
        global = true,
        env = "POCKETBOOK_LOG_LEVEL",
        default_value_t = LevelFilter::WARN
    )]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for pocketbook data (default: ~/Documents/pocketbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record a transaction.
    Add {
        /// Amount, greater than zero
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// expense or income
        #[arg(long = "type", default_value = "expense")]
        txn_type: TxnType,
        /// Category (default: Other)
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339 (default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// List transactions, newest first, with totals.
    List {
        /// Case-insensitive match against category and note
        #[arg(long)]
        search: Option<String>,
        /// all, expense or income
        #[arg(long = "type", default_value = "all")]
        txn_type: TypeFilter,
    },
    /// Change fields of a transaction.
    Edit {
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,
        #[arg(long = "type")]
        txn_type: Option<TxnType>,
        #[arg(long)]
        category: Option<String>,
        /// New note; an empty string removes it
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction.
    Delete { id: String },
    /// Delete ALL transactions and reset categories to the defaults.
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Show or set the display currency.
    Currency {
        /// One of USD, EUR, GBP, JPY, CAD, AUD
        code: Option<String>,
    },
    /// Monthly reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Import transactions from a CSV file. Rows are always added, never merged.
    Import {
        /// CSV with any of the columns id,type,amount,category,note,date
        file: String,
    },
    /// Export transactions to CSV.
    Export {
        /// Output path (default: <data-dir>/exports/transactions_all.csv)
        #[arg(long)]
        output: Option<String>,
        /// Export only rows matching --search/--type
        #[arg(long)]
        filtered: bool,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type", default_value = "all")]
        txn_type: TypeFilter,
    },
    /// Show data location and counts.
    Status,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List known categories.
    List,
    /// Add a category.
    Add { name: String },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Per-category totals for a month, largest net first.
    Categories {
        /// YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<Month>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type", default_value = "all")]
        txn_type: TypeFilter,
    },
    /// Income and expense for every day of a month.
    Daily {
        /// YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<Month>,
    },
}

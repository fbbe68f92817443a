mod cli;
mod codec;
mod db;
mod error;
mod exporter;
mod fmt;
mod importer;
mod models;
mod query;
mod settings;
mod store;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{CategoriesCommands, Cli, Commands, ReportCommands};

fn main() {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Add {
            amount,
            txn_type,
            category,
            note,
            date,
        } => cli::transactions::add(amount, txn_type, category.as_deref(), note, date.as_deref()),
        Commands::List { search, txn_type } => cli::transactions::list(search.as_deref(), txn_type),
        Commands::Edit {
            id,
            amount,
            txn_type,
            category,
            note,
            date,
        } => cli::transactions::edit(&id, amount, txn_type, category, note, date.as_deref()),
        Commands::Delete { id } => cli::transactions::delete(&id),
        Commands::Clear { yes } => cli::clear::run(yes),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { name } => cli::categories::add(&name),
        },
        Commands::Currency { code } => cli::currency::run(code.as_deref()),
        Commands::Report { command } => match command {
            ReportCommands::Categories {
                month,
                search,
                txn_type,
            } => cli::report::categories(month, search.as_deref(), txn_type),
            ReportCommands::Daily { month } => cli::report::daily(month),
        },
        Commands::Import { file } => cli::import::run(&file),
        Commands::Export {
            output,
            filtered,
            search,
            txn_type,
        } => cli::export::run(output, filtered, search.as_deref(), txn_type),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG`, when set, replaces the `--log-level` filter.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

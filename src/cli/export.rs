use std::path::PathBuf;

use crate::cli::open_store;
use crate::error::Result;
use crate::exporter::{default_path, to_csv, write_csv};
use crate::query::{filtered, Filter, TypeFilter};
use crate::settings::get_data_dir;

pub fn run(
    output: Option<String>,
    filtered_only: bool,
    search: Option<&str>,
    txn_type: TypeFilter,
) -> Result<()> {
    let store = open_store()?;
    let filter = Filter::new(search.unwrap_or_default(), txn_type);

    let (csv, count) = if filtered_only {
        let rows = filtered(store.transactions(), &filter);
        (to_csv(rows.iter().copied())?, rows.len())
    } else {
        (to_csv(store.transactions())?, store.len())
    };

    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&get_data_dir(), filtered_only));
    write_csv(&csv, &output_path)?;
    println!("Exported {count} transactions to {}", output_path.display());
    Ok(())
}

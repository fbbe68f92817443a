use std::path::PathBuf;

use crate::cli::open_store;
use crate::error::Result;
use crate::importer::import_file;

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let mut store = open_store()?;

    let result = import_file(&mut store, &file_path)?;

    println!("Imported: {} rows \u{2022} Skipped: {}", result.added, result.skipped);
    Ok(())
}

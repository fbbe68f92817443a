use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::error::{PocketError, Result};

pub fn list() -> Result<()> {
    let store = open_store()?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Transactions"]);
    for name in store.categories() {
        let count = store
            .transactions()
            .iter()
            .filter(|t| &t.category == name)
            .count();
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PocketError::Other("Category name cannot be empty".into()));
    }
    let mut store = open_store()?;
    if store.add_category(name)? {
        println!("Added category: {name}");
    } else {
        println!("Category already exists: {name}");
    }
    Ok(())
}

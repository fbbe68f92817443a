use crate::cli::{confirm, open_store};
use crate::error::Result;

pub fn run(yes: bool) -> Result<()> {
    let mut store = open_store()?;
    let confirmed = yes || confirm("Delete ALL transactions and reset categories? [y/N]")?;
    if store.clear_all(confirmed)? {
        println!("Cleared all transactions and reset categories.");
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

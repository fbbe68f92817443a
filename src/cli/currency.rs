use crate::cli::open_store;
use crate::error::{PocketError, Result};
use crate::fmt::{money, CURRENCIES};

pub fn run(code: Option<&str>) -> Result<()> {
    let mut store = open_store()?;
    let Some(code) = code else {
        println!("Currency: {}", store.currency());
        for c in CURRENCIES {
            let marker = if *c == store.currency() { "*" } else { " " };
            println!(" {marker} {c}  {}", money(1234.5, c));
        }
        return Ok(());
    };

    let code = code.trim().to_uppercase();
    if !CURRENCIES.contains(&code.as_str()) {
        return Err(PocketError::Other(format!(
            "Unsupported currency '{code}' (expected one of {})",
            CURRENCIES.join(", ")
        )));
    }
    store.set_currency(&code)?;
    println!("Currency set to {code}");
    Ok(())
}

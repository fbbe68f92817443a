use chrono::{Local, Utc};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_store, parse_date_arg};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{NewTransaction, Transaction, TransactionPatch, TxnType};
use crate::query::{filtered, totals, Filter, TypeFilter};

fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn colored_type(txn_type: TxnType) -> colored::ColoredString {
    match txn_type {
        TxnType::Income => txn_type.as_str().green(),
        TxnType::Expense => txn_type.as_str().red(),
    }
}

pub fn add(
    amount: f64,
    txn_type: TxnType,
    category: Option<&str>,
    note: Option<String>,
    date: Option<&str>,
) -> Result<()> {
    let mut store = open_store()?;
    let date = match date {
        Some(raw) => parse_date_arg(raw)?,
        None => Utc::now(),
    };
    let txn = store.create(NewTransaction {
        txn_type,
        amount,
        category: category.unwrap_or_default().to_string(),
        note: clean_note(note),
        date,
    })?;
    println!(
        "Added {} {} in {} ({})",
        txn.txn_type,
        money(txn.amount, store.currency()),
        txn.category,
        txn.id
    );
    Ok(())
}

pub fn list(search: Option<&str>, txn_type: TypeFilter) -> Result<()> {
    let store = open_store()?;
    if store.is_empty() {
        println!("No transactions yet. Record one with `pocketbook add`.");
        return Ok(());
    }
    let filter = Filter::new(search.unwrap_or_default(), txn_type);
    let rows = filtered(store.transactions(), &filter);
    let currency = store.currency();

    if rows.is_empty() {
        println!("No matching transactions.");
        return Ok(());
    }

    let sums = totals(rows.iter().copied());
    let net = money(sums.net(), currency);
    let net = if sums.net() >= 0.0 {
        net.green().bold()
    } else {
        net.red().bold()
    };
    println!(
        "Income: {}  Expense: {}  Net: {net}",
        money(sums.income, currency).green(),
        money(sums.expense, currency).red(),
    );

    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Category", "Amount", "Note", "ID"]);
    for txn in &rows {
        table.add_row(row_cells(txn, currency));
    }
    let title = if filter.is_empty() {
        "Transactions"
    } else {
        "Matching transactions"
    };
    println!("{title} ({})\n{table}", rows.len());
    Ok(())
}

fn row_cells(txn: &Transaction, currency: &str) -> Vec<Cell> {
    vec![
        Cell::new(txn.date.with_timezone(&Local).format("%Y-%m-%d")),
        Cell::new(colored_type(txn.txn_type)),
        Cell::new(&txn.category),
        Cell::new(money(txn.amount, currency)),
        Cell::new(txn.note.as_deref().unwrap_or("")),
        Cell::new(&txn.id),
    ]
}

pub fn edit(
    id: &str,
    amount: Option<f64>,
    txn_type: Option<TxnType>,
    category: Option<String>,
    note: Option<String>,
    date: Option<&str>,
) -> Result<()> {
    let patch = TransactionPatch {
        txn_type,
        amount,
        category,
        note: note.map(|n| clean_note(Some(n))),
        date: date.map(parse_date_arg).transpose()?,
    };

    let mut store = open_store()?;
    if !store.update(id, &patch)? {
        println!("No transaction with id {id}");
        return Ok(());
    }
    if patch.is_empty() {
        println!("Nothing to change for {id}");
    } else if let Some(txn) = store.get(id) {
        println!(
            "Updated {id}: {} {} in {}",
            txn.txn_type,
            money(txn.amount, store.currency()),
            txn.category
        );
    }
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut store = open_store()?;
    if store.remove(id)? {
        println!("Deleted {id}");
    } else {
        println!("No transaction with id {id}");
    }
    Ok(())
}

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::money;
use crate::query::{
    breakdown_totals, category_breakdown, daily_buckets, DayBucket, Filter, Month, TypeFilter,
};

const BAR_WIDTH: usize = 30;

pub fn categories(month: Option<Month>, search: Option<&str>, txn_type: TypeFilter) -> Result<()> {
    let store = open_store()?;
    let month = month.unwrap_or_else(Month::current);
    let filter = Filter::new(search.unwrap_or_default(), txn_type);
    let rows = category_breakdown(store.transactions(), &filter, month);
    let currency = store.currency();

    if rows.is_empty() {
        println!(
            "No transactions between {} and {}.",
            month.first_day(),
            month.last_day()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Expense", "Income", "Net"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(money(row.expense, currency)),
            Cell::new(money(row.income, currency)),
            Cell::new(money(row.net, currency)),
        ]);
    }

    let sums = breakdown_totals(&rows);
    let net_label = if sums.net() >= 0.0 {
        "NET".green().bold()
    } else {
        "NET".red().bold()
    };
    table.add_row(vec![Cell::new(""), Cell::new(""), Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new(net_label),
        Cell::new(money(sums.expense, currency)),
        Cell::new(money(sums.income, currency)),
        Cell::new(money(sums.net(), currency)),
    ]);

    println!("Categories for {month}\n{table}");
    Ok(())
}

/// `#` count for `value` scaled against the largest bucket.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
    "#".repeat(len.min(BAR_WIDTH))
}

fn max_amount(buckets: &[DayBucket]) -> f64 {
    buckets
        .iter()
        .map(|b| b.expense.max(b.income))
        .fold(0.0, f64::max)
}

pub fn daily(month: Option<Month>) -> Result<()> {
    let store = open_store()?;
    let month = month.unwrap_or_else(Month::current);
    let buckets = daily_buckets(store.transactions(), month);
    let currency = store.currency();
    let max = max_amount(&buckets);

    let mut table = Table::new();
    table.set_header(vec!["Day", "Expense", "Income", ""]);
    for b in &buckets {
        let mut bars = Vec::new();
        let expense_bar = bar(b.expense, max);
        if !expense_bar.is_empty() {
            bars.push(expense_bar.red().to_string());
        }
        let income_bar = bar(b.income, max);
        if !income_bar.is_empty() {
            bars.push(income_bar.green().to_string());
        }
        table.add_row(vec![
            Cell::new(b.date.format("%d")),
            Cell::new(money(b.expense, currency)),
            Cell::new(money(b.income, currency)),
            Cell::new(bars.join("\n")),
        ]);
    }
    println!("Daily totals for {month}\n{table}");
    Ok(())
}

//! Read-only views over a snapshot: filtering, totals, per-category and per-day
//! aggregation for a calendar month. Nothing here touches storage.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, TimeZone, Utc};

use crate::error::PocketError;
use crate::models::{Transaction, TxnType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Expense,
    Income,
}

impl TypeFilter {
    pub fn accepts(&self, txn_type: TxnType) -> bool {
        match self {
            Self::All => true,
            Self::Expense => txn_type == TxnType::Expense,
            Self::Income => txn_type == TxnType::Income,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(PocketError::Other(format!(
                "Unknown type filter '{other}' (expected all, expense or income)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub query: String,
    pub type_filter: TypeFilter,
}

impl Filter {
    pub fn new(query: impl Into<String>, type_filter: TypeFilter) -> Self {
        Self {
            query: query.into(),
            type_filter,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.type_filter == TypeFilter::All
    }
}

/// A calendar month, `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    first: NaiveDate,
    last: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, PocketError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self::containing)
            .ok_or_else(|| PocketError::InvalidMonth(format!("{year:04}-{month:02}")))
    }

    pub fn containing(date: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { first, last }
    }

    /// The month of today's local date.
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Every day of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.first.year(), self.first.month())
    }
}

impl FromStr for Month {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PocketError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

pub fn matches(txn: &Transaction, filter: &Filter) -> bool {
    if !filter.type_filter.accepts(txn.txn_type) {
        return false;
    }
    let q = filter.query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    let hay = format!("{} {}", txn.category, txn.note.as_deref().unwrap_or("")).to_lowercase();
    hay.contains(&q)
}

/// Matching transactions in snapshot order.
pub fn filtered<'a>(txns: &'a [Transaction], filter: &Filter) -> Vec<&'a Transaction> {
    txns.iter().filter(|t| matches(t, filter)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }

    fn add(&mut self, txn: &Transaction) {
        match txn.txn_type {
            TxnType::Income => self.income += txn.amount,
            TxnType::Expense => self.expense += txn.amount,
        }
    }
}

pub fn totals<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    let mut totals = Totals::default();
    for txn in txns {
        totals.add(txn);
    }
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub expense: f64,
    pub income: f64,
    pub net: f64,
}

/// Sum of the breakdown rows, for a footer line.
pub fn breakdown_totals(rows: &[CategoryTotal]) -> Totals {
    rows.iter().fold(Totals::default(), |acc, r| Totals {
        income: acc.income + r.income,
        expense: acc.expense + r.expense,
    })
}

fn local_date<Tz: TimeZone>(date: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    date.with_timezone(tz).date_naive()
}

pub fn category_breakdown(
    txns: &[Transaction],
    filter: &Filter,
    month: Month,
) -> Vec<CategoryTotal> {
    category_breakdown_in(txns, filter, month, &Local)
}

/// Per-category totals for `month` (by calendar date in `tz`), biggest absolute net
/// first; equal nets are ordered by category name.
pub fn category_breakdown_in<Tz: TimeZone>(
    txns: &[Transaction],
    filter: &Filter,
    month: Month,
    tz: &Tz,
) -> Vec<CategoryTotal> {
    let mut by_category: BTreeMap<&str, Totals> = BTreeMap::new();
    for txn in txns {
        if !month.contains(local_date(&txn.date, tz)) || !matches(txn, filter) {
            continue;
        }
        by_category.entry(txn.category.as_str()).or_default().add(txn);
    }

    let mut rows: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, t)| CategoryTotal {
            category: category.to_string(),
            expense: t.expense,
            income: t.income,
            net: t.net(),
        })
        .collect();
    // Stable sort: ties keep the BTreeMap's name order.
    rows.sort_by(|a, b| b.net.abs().total_cmp(&a.net.abs()));
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub expense: f64,
    pub income: f64,
}

pub fn daily_buckets(txns: &[Transaction], month: Month) -> Vec<DayBucket> {
    daily_buckets_in(txns, month, &Local)
}

/// One bucket per day of `month`; search and type filters do not apply here.
pub fn daily_buckets_in<Tz: TimeZone>(
    txns: &[Transaction],
    month: Month,
    tz: &Tz,
) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = month
        .days()
        .map(|date| DayBucket {
            date,
            expense: 0.0,
            income: 0.0,
        })
        .collect();
    for txn in txns {
        let date = local_date(&txn.date, tz);
        if !month.contains(date) {
            continue;
        }
        let ix = (date.day() - 1) as usize;
        let bucket = &mut buckets[ix];
        match txn.txn_type {
            TxnType::Income => bucket.income += txn.amount,
            TxnType::Expense => bucket.expense += txn.amount,
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn txn(
        txn_type: TxnType,
        amount: f64,
        category: &str,
        note: Option<&str>,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: format!("{category}-{amount}-{date}"),
            txn_type,
            amount,
            category: category.to_string(),
            note: note.map(str::to_string),
            date: DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc),
        }
    }

    fn may() -> Month {
        "2024-05".parse().unwrap()
    }

    #[test]
    fn test_month_parsing() {
        let m = may();
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(m.last_day(), NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(m.to_string(), "2024-05");
        assert!("2024-13".parse::<Month>().is_err());
        assert!("May 2024".parse::<Month>().is_err());
        assert!("2024".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_days_handles_leap_february() {
        let feb: Month = "2024-02".parse().unwrap();
        assert_eq!(feb.days().count(), 29);
        let feb: Month = "2023-02".parse().unwrap();
        assert_eq!(feb.days().count(), 28);
        let dec: Month = "2023-12".parse().unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_matches_type_and_text() {
        let t = txn(TxnType::Expense, 5.0, "Dining", Some("Pizza Friday"), "2024-05-03T12:00:00Z");
        assert!(matches(&t, &Filter::default()));
        assert!(matches(&t, &Filter::new("pizza", TypeFilter::All)));
        assert!(matches(&t, &Filter::new("  DINING ", TypeFilter::Expense)));
        assert!(matches(&t, &Filter::new("dining pizza", TypeFilter::All)));
        assert!(!matches(&t, &Filter::new("pizza", TypeFilter::Income)));
        assert!(!matches(&t, &Filter::new("rent", TypeFilter::All)));
    }

    #[test]
    fn test_matches_without_note() {
        let t = txn(TxnType::Income, 5.0, "Salary", None, "2024-05-03T12:00:00Z");
        assert!(matches(&t, &Filter::new("sal", TypeFilter::Income)));
    }

    #[test]
    fn test_filtered_keeps_snapshot_order() {
        let txns = vec![
            txn(TxnType::Expense, 1.0, "Rent", None, "2024-05-03T12:00:00Z"),
            txn(TxnType::Income, 2.0, "Salary", None, "2024-05-02T12:00:00Z"),
            txn(TxnType::Expense, 3.0, "Rent", None, "2024-05-01T12:00:00Z"),
        ];
        let out = filtered(&txns, &Filter::new("", TypeFilter::Expense));
        let amounts: Vec<f64> = out.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1.0, 3.0]);
    }

    #[test]
    fn test_totals() {
        let txns = vec![
            txn(TxnType::Income, 100.0, "Salary", None, "2024-05-03T12:00:00Z"),
            txn(TxnType::Expense, 30.0, "Dining", None, "2024-05-03T12:00:00Z"),
            txn(TxnType::Expense, 20.0, "Rent", None, "2024-05-03T12:00:00Z"),
        ];
        let t = totals(&txns);
        assert_eq!(t.income, 100.0);
        assert_eq!(t.expense, 50.0);
        assert_eq!(t.net(), 50.0);
    }

    #[test]
    fn test_category_breakdown_orders_by_absolute_net() {
        let txns = vec![
            txn(TxnType::Expense, 50.0, "Groceries", None, "2024-05-03T12:00:00Z"),
            txn(TxnType::Income, 10.0, "Groceries", None, "2024-05-04T12:00:00Z"),
            txn(TxnType::Expense, 900.0, "Rent", None, "2024-05-01T12:00:00Z"),
        ];
        let rows = category_breakdown_in(&txns, &Filter::default(), may(), &Utc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Rent");
        assert_eq!(rows[0].net, -900.0);
        assert_eq!(rows[1].category, "Groceries");
        assert_eq!(rows[1].net, -40.0);
        assert_eq!(rows[1].expense, 50.0);
        assert_eq!(rows[1].income, 10.0);

        let footer = breakdown_totals(&rows);
        assert_eq!(footer.expense, 950.0);
        assert_eq!(footer.income, 10.0);
        assert_eq!(footer.net(), -940.0);
    }

    #[test]
    fn test_category_breakdown_ties_break_by_name() {
        let txns = vec![
            txn(TxnType::Expense, 10.0, "Zoo", None, "2024-05-03T12:00:00Z"),
            txn(TxnType::Income, 10.0, "Art", None, "2024-05-03T12:00:00Z"),
            txn(TxnType::Expense, 10.0, "Mid", None, "2024-05-03T12:00:00Z"),
        ];
        let rows = category_breakdown_in(&txns, &Filter::default(), may(), &Utc);
        let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Art", "Mid", "Zoo"]);
    }

    #[test]
    fn test_category_breakdown_respects_month_and_filter() {
        let txns = vec![
            txn(TxnType::Expense, 10.0, "Dining", Some("sushi"), "2024-05-03T12:00:00Z"),
            txn(TxnType::Expense, 99.0, "Dining", Some("sushi"), "2024-04-30T12:00:00Z"),
            txn(TxnType::Expense, 20.0, "Transport", Some("bus"), "2024-05-04T12:00:00Z"),
        ];
        let rows = category_breakdown_in(&txns, &Filter::new("sushi", TypeFilter::All), may(), &Utc);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expense, 10.0);
    }

    #[test]
    fn test_category_breakdown_uses_local_calendar_date() {
        // 23:30 UTC on Apr 30 is already May 1 at UTC+2.
        let txns = vec![txn(TxnType::Expense, 5.0, "Dining", None, "2024-04-30T23:30:00Z")];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(category_breakdown_in(&txns, &Filter::default(), may(), &plus_two).len(), 1);
        assert!(category_breakdown_in(&txns, &Filter::default(), may(), &Utc).is_empty());
    }

    #[test]
    fn test_daily_buckets_cover_month_and_ignore_filters() {
        let txns = vec![
            txn(TxnType::Expense, 5.0, "Dining", None, "2024-05-01T08:00:00Z"),
            txn(TxnType::Expense, 7.0, "Dining", None, "2024-05-01T20:00:00Z"),
            txn(TxnType::Income, 100.0, "Salary", None, "2024-05-31T12:00:00Z"),
            txn(TxnType::Expense, 50.0, "Rent", None, "2024-06-01T12:00:00Z"),
        ];
        let buckets = daily_buckets_in(&txns, may(), &Utc);
        assert_eq!(buckets.len(), 31);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(buckets[0].expense, 12.0);
        assert_eq!(buckets[30].income, 100.0);
        let total_expense: f64 = buckets.iter().map(|b| b.expense).sum();
        assert_eq!(total_expense, 12.0);
    }

    #[test]
    fn test_daily_buckets_empty_snapshot_is_all_zero() {
        let buckets = daily_buckets_in(&[], "2023-02".parse().unwrap(), &Utc);
        assert_eq!(buckets.len(), 28);
        assert!(buckets.iter().all(|b| b.expense == 0.0 && b.income == 0.0));
    }
}

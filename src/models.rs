use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PocketError;

/// Category substituted when an imported or entered category is blank.
pub const FALLBACK_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Expense,
    Income,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Lenient reading used for imported rows: anything but exactly `income` is an expense.
    pub fn from_loose(raw: &str) -> Self {
        if raw == "income" {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnType {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(PocketError::Other(format!(
                "Unknown transaction type '{other}' (expected expense or income)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
}

/// Field values for a transaction that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub txn_type: TxnType,
    pub amount: f64,
    pub category: String,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    pub(crate) fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            txn_type: self.txn_type,
            amount: self.amount,
            category: self.category,
            note: self.note,
            date: self.date,
        }
    }
}

/// Partial update; `None` leaves a field alone. `note: Some(None)` clears the note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub txn_type: Option<TxnType>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub note: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.txn_type.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.note.is_none()
            && self.date.is_none()
    }

    pub(crate) fn apply(&self, txn: &mut Transaction) {
        if let Some(t) = self.txn_type {
            txn.txn_type = t;
        }
        if let Some(a) = self.amount {
            txn.amount = a;
        }
        if let Some(c) = &self.category {
            txn.category = c.clone();
        }
        if let Some(n) = &self.note {
            txn.note = n.clone();
        }
        if let Some(d) = self.date {
            txn.date = d;
        }
    }
}

/// An untrusted candidate record, typically one decoded CSV row. Every field is raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportItem {
    pub id: Option<String>,
    pub txn_type: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub date: Option<String>,
}

/// An import item that survived normalization; `id` is the id it asked for, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub id: Option<String>,
    pub draft: NewTransaction,
}

impl ImportItem {
    /// Coerces every field to a safe value. Returns `None` when the item must be skipped
    /// (its amount is not a positive number).
    pub fn normalize(self, now: DateTime<Utc>) -> Option<ImportCandidate> {
        let amount = parse_amount(self.amount.as_deref().unwrap_or(""));
        if amount <= 0.0 {
            return None;
        }
        let txn_type = TxnType::from_loose(self.txn_type.as_deref().unwrap_or(""));
        let category = normalize_category(self.category.as_deref().unwrap_or(""));
        let note = self.note.filter(|n| !n.is_empty());
        let date = self
            .date
            .as_deref()
            .filter(|d| !d.is_empty())
            .and_then(parse_date)
            .unwrap_or(now);
        let id = self.id.filter(|id| !id.is_empty());
        Some(ImportCandidate {
            id,
            draft: NewTransaction {
                txn_type,
                amount,
                category,
                note,
                date,
            },
        })
    }
}

/// Numeric reading of an amount; anything unparseable or non-finite is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a date using the host's local zone for forms that carry no offset.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_date_in(raw, &chrono::Local)
}

/// Accepts RFC 3339, `YYYY-MM-DD` (midnight in `tz`), and `YYYY-MM-DD[T ]HH:MM[:SS]` (in `tz`).
/// Instants outside years 0..=9999 UTC are rejected: their RFC 3339 text would not parse back.
pub fn parse_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else {
        let naive = if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            d.and_hms_opt(0, 0, 0)?
        } else {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())?
        };
        tz.from_local_datetime(&naive).earliest()?.with_timezone(&Utc)
    };
    (0..=9999).contains(&parsed.year()).then_some(parsed)
}

/// Canonical timestamp text: RFC 3339, millisecond precision, `Z` suffix.
pub fn to_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::to_iso(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::codec::{self, Row};
use crate::error::Result;
use crate::models::{to_iso, Transaction};

pub const COLUMNS: [&str; 6] = ["id", "type", "amount", "category", "note", "date"];

pub fn transaction_row(txn: &Transaction) -> Row {
    let mut row = Row::new();
    row.insert(COLUMNS[0], txn.id.as_str());
    row.insert(COLUMNS[1], txn.txn_type.as_str());
    row.insert(COLUMNS[2], txn.amount.to_string());
    row.insert(COLUMNS[3], txn.category.as_str());
    row.insert(COLUMNS[4], txn.note.as_deref().unwrap_or(""));
    row.insert(COLUMNS[5], to_iso(&txn.date));
    row
}

/// Serializes transactions in the given order; an empty slice gives an empty string.
pub fn to_csv<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Result<String> {
    let rows: Vec<Row> = txns.into_iter().map(transaction_row).collect();
    codec::encode(&rows)
}

/// `<data_dir>/exports/transactions_all.csv` or `transactions_filtered.csv`.
pub fn default_path(data_dir: &Path, filtered: bool) -> PathBuf {
    let name = if filtered {
        "transactions_filtered.csv"
    } else {
        "transactions_all.csv"
    };
    data_dir.join("exports").join(name)
}

/// Writes `csv` to `output_path`, creating parent directories as needed.
pub fn write_csv(csv: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, csv)?;
    info!(
        "Exported {} bytes to {} at {}",
        csv.len(),
        output_path.display(),
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxnType;
    use chrono::{TimeZone, Utc};

    fn txn(id: &str, amount: f64, note: Option<&str>) -> Transaction {
        Transaction {
            id: id.to_string(),
            txn_type: TxnType::Expense,
            amount,
            category: "Dining".to_string(),
            note: note.map(str::to_string),
            date: Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_to_csv_layout() {
        let csv = to_csv(&[txn("t1", 12.5, None), txn("t2", 10.0, Some("lunch"))]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "\"id\",\"type\",\"amount\",\"category\",\"note\",\"date\"");
        assert_eq!(
            lines[1],
            "\"t1\",\"expense\",\"12.5\",\"Dining\",\"\",\"2024-05-03T10:00:00.000Z\""
        );
        assert_eq!(
            lines[2],
            "\"t2\",\"expense\",\"10\",\"Dining\",\"lunch\",\"2024-05-03T10:00:00.000Z\""
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_to_csv_empty() {
        assert_eq!(to_csv(&[] as &[Transaction]).unwrap(), "");
    }

    #[test]
    fn test_note_newlines_collapsed() {
        let csv = to_csv(&[txn("t1", 1.0, Some("two\nlines"))]).unwrap();
        assert!(csv.contains("\"two lines\""));
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn test_default_path() {
        let dir = Path::new("/data");
        assert_eq!(
            default_path(dir, false),
            PathBuf::from("/data/exports/transactions_all.csv")
        );
        assert_eq!(
            default_path(dir, true),
            PathBuf::from("/data/exports/transactions_filtered.csv")
        );
    }

    #[test]
    fn test_write_csv_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out.csv");
        write_csv("\"id\"\n\"1\"", &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "\"id\"\n\"1\"");
    }
}

use std::path::Path;

use tracing::info;

use crate::codec::{self, Row};
use crate::db::Storage;
use crate::error::Result;
use crate::models::ImportItem;
use crate::store::{ImportResult, TransactionStore};

/// Maps decoded rows onto untrusted import items. Missing columns become `None`;
/// columns other than `id,type,amount,category,note,date` are ignored.
pub fn rows_to_items(rows: Vec<Row>) -> Vec<ImportItem> {
    rows.into_iter()
        .map(|row| {
            let field = |key: &str| row.get(key).map(str::to_string);
            ImportItem {
                id: field("id"),
                txn_type: field("type"),
                amount: field("amount"),
                category: field("category"),
                note: field("note"),
                date: field("date"),
            }
        })
        .collect()
}

pub fn import_text<S: Storage>(store: &mut TransactionStore<S>, text: &str) -> Result<ImportResult> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let items = rows_to_items(codec::decode(text));
    store.bulk_import(items)
}

pub fn import_file<S: Storage>(store: &mut TransactionStore<S>, file_path: &Path) -> Result<ImportResult> {
    info!("Reading {}", file_path.display());
    let bytes = std::fs::read(file_path)?;
    import_text(store, &String::from_utf8_lossy(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStorage;
    use crate::exporter;
    use crate::models::TxnType;
    use crate::store::tests::{draft, SeqIds};

    fn open(mem: &MemoryStorage) -> TransactionStore<&MemoryStorage> {
        TransactionStore::open(mem).unwrap().with_id_generator(SeqIds(100))
    }

    #[test]
    fn test_import_text_counts() {
        let mem = MemoryStorage::default();
        let mut store = open(&mem);
        let csv = "id,type,amount,category,note,date\n\
                   ,expense,12.5,Groceries,weekly shop,2024-05-03T10:00:00.000Z\n\
                   \n\
                   ,income,0,Salary,,2024-05-01\n\
                   a1,income,2500,Salary,May,2024-05-01T09:00:00Z\n";
        let result = import_text(&mut store, csv).unwrap();
        assert_eq!(result, ImportResult { added: 2, skipped: 1 });

        let first = &store.transactions()[0];
        assert_eq!(first.txn_type, TxnType::Expense);
        assert_eq!(first.amount, 12.5);
        assert_eq!(first.note.as_deref(), Some("weekly shop"));
        assert_eq!(store.transactions()[1].id, "a1");
    }

    #[test]
    fn test_import_missing_columns_use_defaults() {
        let mem = MemoryStorage::default();
        let mut store = open(&mem);
        let result = import_text(&mut store, "amount,memo\n7,ignored\n").unwrap();
        assert_eq!(result.added, 1);
        let txn = &store.transactions()[0];
        assert_eq!(txn.category, "Other");
        assert_eq!(txn.txn_type, TxnType::Expense);
        assert_eq!(txn.note, None);
    }

    #[test]
    fn test_import_strips_byte_order_mark() {
        let mem = MemoryStorage::default();
        let mut store = open(&mem);
        import_text(&mut store, "\u{feff}id,amount\nx9,4\n").unwrap();
        assert_eq!(store.transactions()[0].id, "x9");
    }

    #[test]
    fn test_export_then_import_reproduces_records() {
        let source_mem = MemoryStorage::default();
        let mut source = open(&source_mem);
        let mut with_note = draft(TxnType::Income, 1200.0, "Salary");
        with_note.note = Some("bonus, \"Q2\"".to_string());
        source.create(with_note).unwrap();
        source.create(draft(TxnType::Expense, 45.25, "Dining")).unwrap();
        let csv = exporter::to_csv(source.transactions()).unwrap();

        let target_mem = MemoryStorage::default();
        let mut target = open(&target_mem);
        let result = import_text(&mut target, &csv).unwrap();

        assert_eq!(result, ImportResult { added: 2, skipped: 0 });
        assert_eq!(target.transactions(), source.transactions());
    }

    #[test]
    fn test_reimport_is_additive() {
        let mem = MemoryStorage::default();
        let mut store = open(&mem);
        store.create(draft(TxnType::Expense, 10.0, "Rent")).unwrap();
        let csv = exporter::to_csv(store.transactions()).unwrap();

        import_text(&mut store, &csv).unwrap();
        assert_eq!(store.len(), 2);
        assert_ne!(store.transactions()[0].id, store.transactions()[1].id);
    }

    #[test]
    fn test_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "type,amount,category\r\nincome,50,Gifts\r\n").unwrap();
        let mem = MemoryStorage::default();
        let mut store = open(&mem);
        let result = import_file(&mut store, &path).unwrap();
        assert_eq!(result.added, 1);
        assert!(store.categories().iter().any(|c| c == "Gifts"));
    }

    #[test]
    fn test_import_file_with_latin1_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.csv");
        let bytes: &[u8] = b"type,amount,category,note\nexpense,4.2,Dining,caf\xe9\nincome,10,Salary,\n";
        std::fs::write(&path, bytes).unwrap();
        let mem = MemoryStorage::default();
        let mut store = open(&mem);
        let result = import_file(&mut store, &path).unwrap();
        assert_eq!(result, ImportResult { added: 2, skipped: 0 });
        let dining = store.transactions().iter().find(|t| t.category == "Dining").unwrap();
        assert_eq!(dining.note.as_deref(), Some("caf\u{fffd}"));
    }
}

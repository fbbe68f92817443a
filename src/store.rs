//! The transaction store: owns the in-memory snapshot (transactions, categories,
//! currency label) and writes every change straight through to [`Storage`].

use std::collections::HashSet;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::Storage;
use crate::error::{PocketError, Result};
use crate::models::{normalize_category, ImportItem, NewTransaction, Transaction, TransactionPatch};

pub const TXNS_KEY: &str = "pb_txns_v1";
pub const CATEGORIES_KEY: &str = "pb_categories_v1";
pub const CURRENCY_KEY: &str = "pb_currency_v1";

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Groceries",
    "Rent",
    "Utilities",
    "Transport",
    "Dining",
    "Salary",
    "Other",
];
pub const DEFAULT_CURRENCY: &str = "USD";

/// Source of fresh transaction ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportResult {
    pub added: usize,
    pub skipped: usize,
}

pub struct TransactionStore<S: Storage> {
    storage: S,
    ids: Box<dyn IdGenerator>,
    txns: Vec<Transaction>,
    categories: Vec<String>,
    currency: String,
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn load_json<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Result<Option<T>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Stored value under {key} is unreadable, using defaults: {e}");
            Ok(None)
        }
    }
}

/// Like [`load_json`], but an unreadable value is an error instead of a fallback.
fn load_json_strict<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Result<Option<T>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| PocketError::CorruptData {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(PocketError::InvalidAmount(amount))
    }
}

impl<S: Storage> TransactionStore<S> {
    /// Seeds the snapshot from `storage`; absent keys fall back to the defaults.
    /// Unreadable transactions fail the open so the next write cannot replace them.
    pub fn open(storage: S) -> Result<Self> {
        let txns: Vec<Transaction> = load_json_strict(&storage, TXNS_KEY)?.unwrap_or_default();
        let categories: Vec<String> =
            load_json(&storage, CATEGORIES_KEY)?.unwrap_or_else(default_categories);
        let currency = storage
            .get(CURRENCY_KEY)?
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        Ok(Self {
            storage,
            ids: Box::new(UuidGenerator),
            txns,
            categories,
            currency,
        })
    }

    #[cfg(test)]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.txns
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.txns.iter().find(|t| t.id == id)
    }

    pub fn create(&mut self, draft: NewTransaction) -> Result<Transaction> {
        check_amount(draft.amount)?;
        let category = normalize_category(&draft.category);
        let categories_changed = self.register_category(&category);

        let taken: HashSet<String> = self.txns.iter().map(|t| t.id.clone()).collect();
        let id = self.fresh_id(&taken);
        let txn = NewTransaction { category, ..draft }.into_transaction(id);
        self.txns.insert(0, txn.clone());

        self.persist_transactions()?;
        if categories_changed {
            self.persist_categories()?;
        }
        Ok(txn)
    }

    /// Additive import: never overwrites, one transactions write for the whole batch.
    pub fn bulk_import(
        &mut self,
        items: impl IntoIterator<Item = ImportItem>,
    ) -> Result<ImportResult> {
        let now = Utc::now();
        let mut taken: HashSet<String> = self.txns.iter().map(|t| t.id.clone()).collect();
        let mut batch = Vec::new();
        let mut skipped = 0;
        let mut categories_changed = false;

        for item in items {
            let Some(candidate) = item.normalize(now) else {
                skipped += 1;
                continue;
            };
            let id = match candidate.id {
                Some(id) if !taken.contains(&id) => id,
                Some(id) => {
                    debug!("Import id {id} already in use, minting a new one");
                    self.fresh_id(&taken)
                }
                None => self.fresh_id(&taken),
            };
            taken.insert(id.clone());
            categories_changed |= self.register_category(&candidate.draft.category);
            batch.push(candidate.draft.into_transaction(id));
        }

        let result = ImportResult {
            added: batch.len(),
            skipped,
        };
        if !batch.is_empty() {
            batch.append(&mut self.txns);
            self.txns = batch;
            self.persist_transactions()?;
        }
        if categories_changed {
            self.persist_categories()?;
        }
        info!("Imported {} transactions, skipped {}", result.added, result.skipped);
        Ok(result)
    }

    /// Returns `false` (and changes nothing) when no transaction has `id`.
    pub fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<bool> {
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
        }
        let Some(pos) = self.txns.iter().position(|t| t.id == id) else {
            return Ok(false);
        };

        let mut patch = patch.clone();
        let mut categories_changed = false;
        if let Some(category) = patch.category.as_mut() {
            *category = normalize_category(category);
            categories_changed = self.register_category(category);
        }

        let before = self.txns[pos].clone();
        patch.apply(&mut self.txns[pos]);
        if self.txns[pos] != before {
            self.persist_transactions()?;
        }
        if categories_changed {
            self.persist_categories()?;
        }
        Ok(true)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.txns.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        self.txns.remove(pos);
        self.persist_transactions()?;
        Ok(true)
    }

    /// Empties transactions and resets categories, only when `confirmed`. The currency
    /// label is kept.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }
        self.txns.clear();
        self.categories = default_categories();
        self.storage.remove(TXNS_KEY)?;
        self.persist_categories()?;
        info!("Cleared all transactions and reset categories");
        Ok(true)
    }

    /// A blank code resets the label to the default.
    pub fn set_currency(&mut self, code: &str) -> Result<()> {
        let code = code.trim();
        self.currency = if code.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            code.to_string()
        };
        debug!("Persisting currency {}", self.currency);
        self.storage.set(CURRENCY_KEY, &self.currency)
    }

    /// Trims `name`; blank or already-known names are ignored.
    pub fn add_category(&mut self, name: &str) -> Result<bool> {
        if !self.register_category(name) {
            return Ok(false);
        }
        self.persist_categories()?;
        Ok(true)
    }

    fn register_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.categories.iter().any(|c| c == name) {
            return false;
        }
        self.categories.push(name.to_string());
        true
    }

    fn fresh_id(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.ids.next_id();
            if !taken.contains(&id) {
                return id;
            }
        }
    }

    fn persist_transactions(&self) -> Result<()> {
        debug!("Persisting {} transactions", self.txns.len());
        self.write_json(TXNS_KEY, &self.txns)
    }

    fn persist_categories(&self) -> Result<()> {
        debug!("Persisting {} categories", self.categories.len());
        self.write_json(CATEGORIES_KEY, &self.categories)
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.storage.set(key, &json)
    }
}

//! In-memory ledger store for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory store. Clones share the same data.
///
/// Entries keep their append order, which is the book order reconciliation
/// relies on.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    entries: Arc<RwLock<Vec<JournalEntry>>>,
    available: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            entries: Arc::new(RwLock::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a store pre-loaded with a chart of accounts
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.accounts.write() {
            map.extend(accounts.into_iter().map(|a| (a.id.clone(), a)));
        }
        store
    }

    /// Simulate an outage; every call fails with `Unavailable` while false
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored entries, whatever their status
    pub fn entry_count(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        self.accounts.write().map_err(poisoned)?.clear();
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn ensure_available(&self) -> LedgerResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::Unavailable("memory store offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Storage("lock poisoned".to_string())
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.ensure_available()?;
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts.values().cloned().collect())
    }

    async fn get_posted_entries(&self, period: Period) -> LedgerResult<Vec<JournalEntry>> {
        self.ensure_available()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .iter()
            .filter(|entry| entry.is_posted() && period.contains(entry.date))
            .cloned()
            .collect())
    }

    async fn insert_account(&self, account: &Account) -> LedgerResult<()> {
        self.ensure_available()?;
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts.contains_key(&account.id) {
            return Err(LedgerError::DuplicateAccount(account.id.clone()));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn append_entry(&self, entry: &JournalEntry) -> LedgerResult<()> {
        self.ensure_available()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Err(LedgerError::DuplicateEntry(entry.id.clone()));
        }
        entries.push(entry.clone());
        Ok(())
    }

    async fn get_entry(&self, entry_id: &str) -> LedgerResult<Option<JournalEntry>> {
        self.ensure_available()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.iter().find(|e| e.id == entry_id).cloned())
    }

    async fn mark_void(&self, entry_id: &str) -> LedgerResult<()> {
        self.ensure_available()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;
        entry.status = EntryStatus::Void;
        entry.updated_at = chrono::Utc::now().naive_utc();
        Ok(())
    }
}

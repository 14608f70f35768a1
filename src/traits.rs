//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::ledger::account::AccountCatalog;
use crate::ledger::validator::ValidationReport;
use crate::types::*;

/// Storage abstraction for the ledger
///
/// The engine does not assume strong consistency: an offline-first cache is a
/// valid backend as long as each call returns a self-consistent snapshot.
/// Implementations report transient outages as [`LedgerError::Unavailable`];
/// the engine never retries on its own.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Every account in the chart
    async fn get_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// Posted entries dated inside `period`
    async fn get_posted_entries(&self, period: Period) -> LedgerResult<Vec<JournalEntry>>;

    /// Add an account. Must fail with [`LedgerError::DuplicateAccount`] if an
    /// account with the same id already exists; the check and the write are
    /// one step.
    async fn insert_account(&self, account: &Account) -> LedgerResult<()>;

    /// Append a posted entry. Must fail with [`LedgerError::DuplicateEntry`]
    /// if an entry with the same id already exists.
    async fn append_entry(&self, entry: &JournalEntry) -> LedgerResult<()>;

    /// Get an entry by ID regardless of its status
    async fn get_entry(&self, entry_id: &str) -> LedgerResult<Option<JournalEntry>>;

    /// Flag a posted entry as void without touching its lines
    async fn mark_void(&self, entry_id: &str) -> LedgerResult<()>;
}

/// Trait for plugging custom journal entry rules into the ledger
pub trait JournalValidator: Send + Sync {
    /// Evaluate every rule and report all failures together
    fn validate_entry(&self, entry: &JournalEntry, catalog: &AccountCatalog) -> ValidationReport;
}

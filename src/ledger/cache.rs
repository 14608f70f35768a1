//! Memoized `(account, period) -> balance` lookups.
//!
//! Posting an entry must call [`BalanceCache::invalidate_for_entry`] before the
//! post is reported as complete; it drops exactly the keys whose account the
//! entry touches and whose window contains the entry's date.
//!
//! Readers capture [`BalanceCache::generation`] before reading from the store
//! and hand it back to [`BalanceCache::insert_if_unchanged`]. A value computed
//! from a snapshot that raced with a post is returned to its caller but never
//! cached.

use bigdecimal::BigDecimal;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{JournalEntry, Period};

/// Default number of `(account, period)` keys kept before the cache is flushed
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Thread-safe balance cache
#[derive(Debug)]
pub struct BalanceCache {
    balances: DashMap<(String, Period), BigDecimal>,
    generation: AtomicU64,
    capacity: usize,
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl BalanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` keys; zero disables caching
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            balances: DashMap::new(),
            generation: AtomicU64::new(0),
            capacity,
        }
    }

    /// Cached balance, if present
    pub fn get(&self, account_id: &str, period: Period) -> Option<BigDecimal> {
        self.balances
            .get(&(account_id.to_string(), period))
            .map(|hit| hit.value().clone())
    }

    /// Counter bumped by every invalidation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Remember `balance` unless an invalidation happened since `generation`
    /// was read. Returns whether the value was stored.
    pub fn insert_if_unchanged(
        &self,
        account_id: &str,
        period: Period,
        balance: BigDecimal,
        generation: u64,
    ) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.balances.len() >= self.capacity {
            self.balances.clear();
            tracing::debug!(capacity = self.capacity, "balance cache full, flushed");
        }

        // The shard stays locked until the insert, so an invalidation that
        // bumps the generation after this check still removes the key.
        let slot = self.balances.entry((account_id.to_string(), period));
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        slot.insert(balance);
        true
    }

    /// Return the cached balance or compute and remember it
    pub fn get_or_compute<F>(&self, account_id: &str, period: Period, compute: F) -> BigDecimal
    where
        F: FnOnce() -> BigDecimal,
    {
        if let Some(hit) = self.get(account_id, period) {
            return hit;
        }
        let generation = self.generation();
        let balance = compute();
        self.insert_if_unchanged(account_id, period, balance.clone(), generation);
        balance
    }

    /// Drop every cached balance the entry could have changed
    pub fn invalidate_for_entry(&self, entry: &JournalEntry) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let touched: HashSet<&str> = entry.lines.iter().map(|l| l.account_id.as_str()).collect();
        let before = self.balances.len();
        self.balances.retain(|(account_id, period), _| {
            !(touched.contains(account_id.as_str()) && period.contains(entry.date))
        });
        tracing::debug!(
            entry_id = %entry.id,
            dropped = before.saturating_sub(self.balances.len()),
            "balance cache invalidated"
        );
    }

    /// Drop everything
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.balances.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

//! Main ledger orchestrator that coordinates the store, validation and reporting
//!
//! Posting is the only mutation. Every read rebuilds its figures from a
//! snapshot of `(accounts, posted entries)`, so reports need no lock and can
//! run concurrently with each other and with postings.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::ratios::{RatioAnalysis, RatioAnalyzer};
use crate::config::EngineConfig;
use crate::ledger::account::AccountCatalog;
use crate::ledger::balance::{AccountSelector, BalanceCalculator};
use crate::ledger::cache::BalanceCache;
use crate::ledger::journal::patterns;
use crate::ledger::validator::{double_entry_errors, EntryValidator};
use crate::reconciliation::{BankStatementLine, ReconciliationEngine, ReconciliationResult};
use crate::reports::{BalanceSheet, CashFlowStatement, IncomeStatement, StatementGenerator, TrialBalance};
use crate::tax::{TaxBracket, TaxCalculator, TaxComputation};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_account;

/// Accounts and posted entries read together for one computation
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub catalog: AccountCatalog,
    /// Posted entries dated on or before the window's end
    pub entries: Vec<JournalEntry>,
}

impl LedgerSnapshot {
    pub fn statements(&self) -> StatementGenerator<'_> {
        StatementGenerator::new(&self.catalog, &self.entries)
    }
}

/// Ledger-wide consistency checks for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub period: Period,
    pub trial_balance_balanced: bool,
    pub balance_sheet_balanced: bool,
    pub cash_flow_reconciles: bool,
    pub issues: Vec<String>,
}

impl LedgerIntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Main ledger system that orchestrates all accounting operations
pub struct Ledger<S: LedgerStore> {
    store: S,
    validator: Box<dyn JournalValidator>,
    cache: BalanceCache,
    config: EngineConfig,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a new ledger with the default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create a new ledger whose validator follows `config`
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        let validator = Box::new(EntryValidator::new(&config));
        Self::with_validator(store, config, validator)
    }

    /// Create a new ledger with custom entry rules.
    ///
    /// `validator` adds to the double-entry checks; it cannot waive them.
    pub fn with_validator(store: S, config: EngineConfig, validator: Box<dyn JournalValidator>) -> Self {
        Self {
            store,
            validator,
            cache: BalanceCache::with_capacity(config.balance_cache_capacity),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }

    // Accounts

    /// Current chart of accounts
    pub async fn catalog(&self) -> LedgerResult<AccountCatalog> {
        let accounts = observe(self.store.get_accounts().await, "get_accounts")?;
        AccountCatalog::new(accounts)
    }

    /// Add an account to the chart. The store rejects an id that already
    /// exists, so concurrent registrations of one id cannot both succeed.
    pub async fn register_account(&self, account: Account) -> LedgerResult<Account> {
        validate_account(&account)?;
        let problems = self.config.metadata.check(&account.metadata);
        if !problems.is_empty() {
            return Err(LedgerError::Validation(problems.join("; ")));
        }

        let mut accounts = observe(self.store.get_accounts().await, "get_accounts")?;
        if accounts.iter().any(|a| a.id == account.id) {
            return Err(LedgerError::DuplicateAccount(account.id));
        }
        accounts.push(account.clone());
        // Rejects missing parents and cycles before anything is written.
        AccountCatalog::new(accounts)?;

        observe(self.store.insert_account(&account).await, "insert_account")?;
        tracing::info!(account_id = %account.id, code = %account.code, "account registered");
        Ok(account)
    }

    // Journal entries

    /// Validate and post a draft entry
    pub async fn post_entry(&self, mut entry: JournalEntry) -> LedgerResult<JournalEntry> {
        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::ImmutableEntry(entry.id));
        }

        let catalog = self.catalog().await?;
        let mut report = self.validator.validate_entry(&entry, &catalog);
        for error in double_entry_errors(&entry, &catalog, &self.config.tolerance) {
            if !report.errors.contains(&error) {
                report.errors.push(error);
            }
        }
        if !report.is_valid() {
            return Err(LedgerError::Rejected(report));
        }

        entry.status = EntryStatus::Posted;
        entry.updated_at = chrono::Utc::now().naive_utc();
        observe(self.store.append_entry(&entry).await, "append_entry")?;
        self.cache.invalidate_for_entry(&entry);

        tracing::info!(
            entry_id = %entry.id,
            date = %entry.date,
            lines = entry.lines.len(),
            amount = %entry.total_debits(),
            "journal entry posted"
        );
        Ok(entry)
    }

    /// Mark a posted entry void. It stops contributing to every computation.
    pub async fn void_entry(&self, entry_id: &str) -> LedgerResult<JournalEntry> {
        let entry = self.posted_entry(entry_id).await?;
        observe(self.store.mark_void(entry_id).await, "mark_void")?;
        self.cache.invalidate_for_entry(&entry);

        tracing::info!(entry_id, "journal entry voided");
        Ok(JournalEntry {
            status: EntryStatus::Void,
            ..entry
        })
    }

    /// Post an entry that offsets a posted one on `date`
    pub async fn reverse_entry(&self, entry_id: &str, date: NaiveDate) -> LedgerResult<JournalEntry> {
        let original = self.posted_entry(entry_id).await?;
        let reversal_id = uuid::Uuid::new_v4().to_string();
        let reversal = patterns::reversing_entry(&original, &reversal_id, date);
        self.post_entry(reversal).await
    }

    /// Get an entry by ID
    pub async fn get_entry(&self, entry_id: &str) -> LedgerResult<Option<JournalEntry>> {
        observe(self.store.get_entry(entry_id).await, "get_entry")
    }

    async fn posted_entry(&self, entry_id: &str) -> LedgerResult<JournalEntry> {
        let entry = self
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;
        if !entry.is_posted() {
            return Err(LedgerError::ImmutableEntry(entry.id));
        }
        Ok(entry)
    }

    // Balances and reporting

    /// Accounts plus every posted entry up to the window's end
    pub async fn snapshot(&self, period: &Period) -> LedgerResult<LedgerSnapshot> {
        let catalog = self.catalog().await?;
        let entries = observe(
            self.store
                .get_posted_entries(Period::through(period.end))
                .await,
            "get_posted_entries",
        )?;
        Ok(LedgerSnapshot { catalog, entries })
    }

    /// Signed movement of one account over `period`, memoized until a post
    /// touching the account inside the window
    pub async fn account_balance(&self, account_id: &str, period: &Period) -> LedgerResult<BigDecimal> {
        if let Some(hit) = self.cache.get(account_id, *period) {
            return Ok(hit);
        }

        // Read before the snapshot: a post landing in between bumps it.
        let generation = self.cache.generation();
        let snapshot = self.snapshot(period).await?;
        snapshot.catalog.get_required(account_id)?;
        let balance = BalanceCalculator::new(&snapshot.catalog).compute_balance(
            &AccountSelector::account(account_id),
            &snapshot.entries,
            period,
        );
        if !self
            .cache
            .insert_if_unchanged(account_id, *period, balance.clone(), generation)
        {
            tracing::debug!(account_id, "balance raced with a post, not cached");
        }
        Ok(balance)
    }

    /// Opening, movement and closing figures for one account
    pub async fn account_activity(&self, account_id: &str, period: &Period) -> LedgerResult<AccountBalance> {
        let snapshot = self.snapshot(period).await?;
        BalanceCalculator::new(&snapshot.catalog).account_balance(account_id, &snapshot.entries, period)
    }

    pub async fn trial_balance(&self, period: &Period) -> LedgerResult<TrialBalance> {
        let snapshot = self.snapshot(period).await?;
        Ok(snapshot
            .statements()
            .trial_balance(period, &self.config.tolerance))
    }

    pub async fn balance_sheet(&self, period: &Period) -> LedgerResult<BalanceSheet> {
        let snapshot = self.snapshot(period).await?;
        Ok(snapshot
            .statements()
            .balance_sheet(period, &self.config.tolerance))
    }

    pub async fn income_statement(&self, period: &Period) -> LedgerResult<IncomeStatement> {
        let snapshot = self.snapshot(period).await?;
        Ok(snapshot.statements().income_statement(period))
    }

    pub async fn cash_flow(&self, period: &Period) -> LedgerResult<CashFlowStatement> {
        let snapshot = self.snapshot(period).await?;
        Ok(snapshot.statements().cash_flow(period))
    }

    /// Ratios over `period`, classified with the configured thresholds
    pub async fn ratio_report(&self, period: &Period) -> LedgerResult<RatioAnalysis> {
        let snapshot = self.snapshot(period).await?;
        let statements = snapshot.statements();
        let balance_sheet = statements.balance_sheet(period, &self.config.tolerance);
        let income = statements.income_statement(period);
        Ok(RatioAnalyzer::analyze(
            &balance_sheet,
            &income,
            &self.config.ratio_thresholds,
        ))
    }

    /// Reconcile one account against a bank statement.
    ///
    /// Matching itself never fails: mismatches come back as differences. The
    /// only errors are an account missing from the chart
    /// ([`LedgerError::AccountNotFound`]) and store failures.
    pub async fn reconcile(
        &self,
        account_id: &str,
        period: &Period,
        bank_lines: &[BankStatementLine],
    ) -> LedgerResult<ReconciliationResult> {
        let catalog = self.catalog().await?;
        catalog.get_required(account_id)?;
        let entries = observe(
            self.store.get_posted_entries(*period).await,
            "get_posted_entries",
        )?;
        let engine = ReconciliationEngine::with_tolerance(self.config.tolerance.clone());
        Ok(engine.reconcile(account_id, period, &entries, bank_lines))
    }

    /// Taxable income and bracketed liability over `period`
    pub async fn calculate_taxes(
        &self,
        period: &Period,
        brackets: &[TaxBracket],
    ) -> LedgerResult<TaxComputation> {
        let catalog = self.catalog().await?;
        let entries = observe(
            self.store.get_posted_entries(*period).await,
            "get_posted_entries",
        )?;
        TaxCalculator::new(&catalog)
            .calculate_taxes(&entries, period, brackets)
            .map_err(|e| LedgerError::Validation(e.to_string()))
    }

    /// Check the trial balance, the accounting equation and cash flow together
    pub async fn validate_integrity(&self, period: &Period) -> LedgerResult<LedgerIntegrityReport> {
        let snapshot = self.snapshot(period).await?;
        let statements = snapshot.statements();
        let tolerance = &self.config.tolerance;

        let trial_balance = statements.trial_balance(period, tolerance);
        let balance_sheet = statements.balance_sheet(period, tolerance);
        let cash_flow = statements.cash_flow(period);
        let cash_flow_reconciles = cash_flow.reconciles(tolerance);

        let mut issues = Vec::new();
        if !trial_balance.is_balanced {
            issues.push(format!(
                "trial balance out by {}: debits {} credits {}",
                &trial_balance.total_debits - &trial_balance.total_credits,
                trial_balance.total_debits,
                trial_balance.total_credits
            ));
        }
        if !balance_sheet.is_balanced {
            issues.push(format!(
                "assets {} do not equal liabilities and equity {}",
                balance_sheet.total_assets,
                balance_sheet.liabilities_and_equity()
            ));
        }
        if !cash_flow_reconciles {
            issues.push(format!(
                "beginning cash {} plus net change {} does not reach ending cash {}",
                cash_flow.beginning_cash, cash_flow.net_change_in_cash, cash_flow.ending_cash
            ));
        }
        for entry in snapshot.entries.iter().filter(|e| !e.is_balanced()) {
            issues.push(format!("posted entry {} is not balanced", entry.id));
        }

        if !issues.is_empty() {
            tracing::warn!(issues = issues.len(), "ledger integrity check failed");
        }

        Ok(LedgerIntegrityReport {
            period: *period,
            trial_balance_balanced: trial_balance.is_balanced,
            balance_sheet_balanced: balance_sheet.is_balanced,
            cash_flow_reconciles,
            issues,
        })
    }
}

/// Log store outages before handing them back; the caller owns the retry
fn observe<T>(result: LedgerResult<T>, operation: &str) -> LedgerResult<T> {
    if let Err(err @ LedgerError::Unavailable(_)) = &result {
        tracing::warn!(operation, error = %err, "ledger store unavailable");
    }
    result
}

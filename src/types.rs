//! Core types and data structures for the ledger engine

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::validator::ValidationReport;

/// Currency stamped on lines when the builder is not told otherwise
pub const DEFAULT_CURRENCY: &str = "USD";

/// Tolerance used for every "equal within a cent" comparison (0.01)
pub fn default_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}

/// Returns true when `a` and `b` differ by no more than `tolerance`
pub fn within_tolerance(a: &BigDecimal, b: &BigDecimal, tolerance: &BigDecimal) -> bool {
    (a - b).abs() <= *tolerance
}

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Inventory, Equipment, etc.)
    Asset,
    /// Liabilities - what the business owes (Loans, Accounts Payable, etc.)
    Liability,
    /// Equity - owner's interest in the business (Capital, Retained Earnings, etc.)
    Equity,
    /// Revenue - money earned by the business (fuel sales, store sales, etc.)
    Revenue,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    ///
    /// Delegates to the rule table in [`crate::ledger::rules`].
    pub fn normal_balance(&self) -> EntryType {
        crate::ledger::rules::rule_for(*self).normal_side
    }
}

/// Sides of a double-entry line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit - increases Assets and Expenses, decreases Liabilities, Equity, and Revenue
    Debit,
    /// Credit - increases Liabilities, Equity, and Revenue, decreases Assets and Expenses
    Credit,
}

impl EntryType {
    /// The other side of the ledger
    pub fn opposite(&self) -> EntryType {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }
}

/// Sub-classification of an account, fixed when the account is created.
///
/// Statements bucket accounts by category; nothing is matched on codes or names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    // Assets
    Cash,
    AccountsReceivable,
    Inventory,
    OtherCurrentAsset,
    FixedAsset,
    AccumulatedDepreciation,
    OtherAsset,
    // Liabilities
    AccountsPayable,
    CurrentLiability,
    LongTermLiability,
    // Equity
    Capital,
    RetainedEarnings,
    Drawings,
    // Revenue
    OperatingRevenue,
    OtherIncome,
    // Expenses
    CostOfGoodsSold,
    OperatingExpense,
    Depreciation,
    OtherExpense,
}

impl AccountCategory {
    /// The account type every account in this category must have
    pub fn account_type(&self) -> AccountType {
        use AccountCategory::*;
        match self {
            Cash | AccountsReceivable | Inventory | OtherCurrentAsset | FixedAsset
            | AccumulatedDepreciation | OtherAsset => AccountType::Asset,
            AccountsPayable | CurrentLiability | LongTermLiability => AccountType::Liability,
            Capital | RetainedEarnings | Drawings => AccountType::Equity,
            OperatingRevenue | OtherIncome => AccountType::Revenue,
            CostOfGoodsSold | OperatingExpense | Depreciation | OtherExpense => {
                AccountType::Expense
            }
        }
    }

    /// Whether the category counts toward current assets
    pub fn is_current_asset(&self) -> bool {
        matches!(
            self,
            AccountCategory::Cash
                | AccountCategory::AccountsReceivable
                | AccountCategory::Inventory
                | AccountCategory::OtherCurrentAsset
        )
    }

    /// Whether the category counts toward current liabilities
    pub fn is_current_liability(&self) -> bool {
        matches!(
            self,
            AccountCategory::AccountsPayable | AccountCategory::CurrentLiability
        )
    }
}

/// Core account structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: String,
    /// Chart-of-accounts code (e.g. "1000")
    pub code: String,
    /// Human-readable account name
    pub name: String,
    /// Type of account (Asset, Liability, etc.)
    pub account_type: AccountType,
    /// Sub-classification used by the statements
    pub category: AccountCategory,
    /// Optional parent account for hierarchical chart of accounts
    pub parent_id: Option<String>,
    /// Inactive accounts cannot receive new lines
    pub is_active: bool,
    /// Additional metadata, checked against the configured schema
    pub metadata: HashMap<String, String>,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the account was last updated
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new active account. The account type is taken from the category.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        category: AccountCategory,
        parent_id: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            account_type: category.account_type(),
            category,
            parent_id,
            is_active: true,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the account inactive
    pub fn deactivate(mut self) -> Self {
        self.is_active = false;
        self.updated_at = chrono::Utc::now().naive_utc();
        self
    }

    /// Signed contribution of a debit/credit pair to this account's balance
    pub fn balance_change(&self, debit: &BigDecimal, credit: &BigDecimal) -> BigDecimal {
        crate::ledger::rules::signed_amount(self.account_type, debit, credit)
    }
}

/// Lifecycle state of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Being prepared; not part of the ledger
    Draft,
    /// Accepted into the ledger; immutable
    Posted,
    /// Marked void; excluded from every computation
    Void,
}

/// One debit or credit line of a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Unique identifier for the line
    pub id: String,
    /// Owning journal entry
    pub journal_entry_id: String,
    /// Account being affected
    pub account_id: String,
    /// Debit amount (zero on credit lines)
    pub debit: BigDecimal,
    /// Credit amount (zero on debit lines)
    pub credit: BigDecimal,
    /// ISO currency code
    pub currency: String,
    /// Optional description for this specific line
    pub description: Option<String>,
}

impl LedgerLine {
    /// Create a debit line
    pub fn debit(
        id: impl Into<String>,
        journal_entry_id: impl Into<String>,
        account_id: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            id: id.into(),
            journal_entry_id: journal_entry_id.into(),
            account_id: account_id.into(),
            debit: amount,
            credit: BigDecimal::from(0),
            currency: DEFAULT_CURRENCY.to_string(),
            description: None,
        }
    }

    /// Create a credit line
    pub fn credit(
        id: impl Into<String>,
        journal_entry_id: impl Into<String>,
        account_id: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            id: id.into(),
            journal_entry_id: journal_entry_id.into(),
            account_id: account_id.into(),
            debit: BigDecimal::from(0),
            credit: amount,
            currency: DEFAULT_CURRENCY.to_string(),
            description: None,
        }
    }

    /// Signed amount from the debit side's point of view (debit - credit)
    pub fn net_debit(&self) -> BigDecimal {
        &self.debit - &self.credit
    }
}

/// Complete journal entry with multiple lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier for the entry
    pub id: String,
    /// Date when the entry takes effect
    pub date: NaiveDate,
    /// Reference number (invoice number, pump shift, cheque number, etc.)
    pub reference: Option<String>,
    /// Description of the entry
    pub description: String,
    /// Lines that make up this entry
    pub lines: Vec<LedgerLine>,
    /// Lifecycle state
    pub status: EntryStatus,
    /// User who prepared the entry
    pub created_by: String,
    /// Additional metadata, checked against the configured schema
    pub metadata: HashMap<String, String>,
    /// When the entry was created
    pub created_at: NaiveDateTime,
    /// When the entry was last updated
    pub updated_at: NaiveDateTime,
}

impl JournalEntry {
    /// Create a new draft entry without lines
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        reference: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: id.into(),
            date,
            reference,
            description: description.into(),
            lines: Vec::new(),
            status: EntryStatus::Draft,
            created_by: String::new(),
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a line to the entry
    pub fn add_line(&mut self, line: LedgerLine) {
        self.lines.push(line);
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Calculate total debits
    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    /// Calculate total credits
    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// Check if debits equal credits within the standard tolerance
    pub fn is_balanced(&self) -> bool {
        within_tolerance(
            &self.total_debits(),
            &self.total_credits(),
            &default_tolerance(),
        )
    }

    /// Whether this entry contributes to balances
    pub fn is_posted(&self) -> bool {
        self.status == EntryStatus::Posted
    }

    /// Whether any line touches the given account
    pub fn touches(&self, account_id: &str) -> bool {
        self.lines.iter().any(|l| l.account_id == account_id)
    }
}

/// Inclusive date window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Create a period, rejecting windows that end before they start
    pub fn new(start: NaiveDate, end: NaiveDate) -> LedgerResult<Self> {
        if end < start {
            return Err(LedgerError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Everything up to and including `date` (point-in-time window)
    pub fn through(date: NaiveDate) -> Self {
        Self {
            start: NaiveDate::MIN,
            end: date,
        }
    }

    /// Whether `date` falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the window is open-ended on the left
    pub fn is_cumulative(&self) -> bool {
        self.start == NaiveDate::MIN
    }

    /// The point-in-time window ending the day before `start`, if any
    pub fn before_start(&self) -> Option<Period> {
        self.start.pred_opt().map(Period::through)
    }
}

/// Per-account balance over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub period: Period,
    /// Balance carried in from before the period
    pub opening: BigDecimal,
    /// Sum of debit lines inside the period
    pub total_debits: BigDecimal,
    /// Sum of credit lines inside the period
    pub total_credits: BigDecimal,
    /// Opening plus the signed movement of the period
    pub closing: BigDecimal,
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The backing store could not be reached; the caller may retry
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),
    #[error("Journal entry already exists: {0}")]
    DuplicateEntry(String),
    #[error("Journal entry {0} is not a draft and cannot be posted")]
    ImmutableEntry(String),
    #[error("Journal entry rejected: {0}")]
    Rejected(ValidationReport),
    #[error("Invalid period: {start} is after {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),
    #[error("Chart of accounts error: {0}")]
    Catalog(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl LedgerError {
    /// Whether the failure is transient and the call may be repeated
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_category_fixes_account_type() {
        let account = Account::new("1500", "1500", "Pumps", AccountCategory::FixedAsset, None);
        assert_eq!(account.account_type, AccountType::Asset);
        assert_eq!(
            AccountCategory::OtherIncome.account_type(),
            AccountType::Revenue
        );
        assert_eq!(AccountCategory::Drawings.account_type(), AccountType::Equity);
    }

    #[test]
    fn test_period_bounds() {
        assert!(Period::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());

        let january = Period::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(january.contains(date(2024, 1, 1)));
        assert!(january.contains(date(2024, 1, 31)));
        assert!(!january.contains(date(2024, 2, 1)));

        let before = january.before_start().unwrap();
        assert!(before.is_cumulative());
        assert_eq!(before.end, date(2023, 12, 31));
    }

    #[test]
    fn test_entry_totals_use_tolerance() {
        let mut entry = JournalEntry::new("je1", date(2024, 1, 1), "Rounding", None);
        entry.add_line(LedgerLine::debit("l1", "je1", "cash", "100.004".parse().unwrap()));
        entry.add_line(LedgerLine::credit("l2", "je1", "sales", BigDecimal::from(100)));
        assert!(entry.is_balanced());

        entry.add_line(LedgerLine::credit("l3", "je1", "sales", "0.02".parse().unwrap()));
        assert!(!entry.is_balanced());
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(LedgerError::Unavailable("offline".into()).is_retryable());
        assert!(!LedgerError::Storage("corrupt".into()).is_retryable());
    }
}

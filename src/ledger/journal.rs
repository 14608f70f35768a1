//! Journal entry construction helpers

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Builder for multi-line journal entries. Always produces a draft; use the
/// validator (or `Ledger::post_entry`) to admit it to the ledger.
#[derive(Debug)]
pub struct JournalEntryBuilder {
    entry: JournalEntry,
    currency: String,
}

impl JournalEntryBuilder {
    /// Create a new journal entry builder
    pub fn new(id: impl Into<String>, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            entry: JournalEntry::new(id, date, description, None),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Set the reference for the entry
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.entry.reference = Some(reference.into());
        self
    }

    /// Record who prepared the entry
    pub fn created_by(mut self, user: impl Into<String>) -> Self {
        self.entry.created_by = user.into();
        self
    }

    /// Currency stamped on lines added after this call
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Add metadata to the entry
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entry.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a debit line
    pub fn debit(
        self,
        account_id: impl Into<String>,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        self.push_line(EntryType::Debit, account_id.into(), amount, description)
    }

    /// Add a credit line
    pub fn credit(
        self,
        account_id: impl Into<String>,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        self.push_line(EntryType::Credit, account_id.into(), amount, description)
    }

    fn push_line(
        mut self,
        side: EntryType,
        account_id: String,
        amount: BigDecimal,
        description: Option<String>,
    ) -> Self {
        let line_id = format!("{}-{}", self.entry.id, self.entry.lines.len() + 1);
        let mut line = match side {
            EntryType::Debit => LedgerLine::debit(line_id, self.entry.id.clone(), account_id, amount),
            EntryType::Credit => {
                LedgerLine::credit(line_id, self.entry.id.clone(), account_id, amount)
            }
        };
        line.currency = self.currency.clone();
        line.description = description;
        self.entry.add_line(line);
        self
    }

    /// Build the draft entry
    pub fn build(self) -> JournalEntry {
        self.entry
    }
}

/// Common journal entry patterns
pub mod patterns {
    use super::*;

    /// Sale for cash or on account (debit cash/receivables, credit revenue)
    pub fn sale(
        id: &str,
        date: NaiveDate,
        description: &str,
        cash_or_receivables_account_id: &str,
        revenue_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, description)
            .debit(cash_or_receivables_account_id, amount.clone(), None)
            .credit(revenue_account_id, amount, None)
            .build()
    }

    /// Expense paid from cash or accrued to payables
    pub fn expense_payment(
        id: &str,
        date: NaiveDate,
        description: &str,
        expense_account_id: &str,
        cash_or_payables_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, description)
            .debit(expense_account_id, amount.clone(), None)
            .credit(cash_or_payables_account_id, amount, None)
            .build()
    }

    /// Asset purchase (debit asset, credit cash/payables)
    pub fn asset_purchase(
        id: &str,
        date: NaiveDate,
        description: &str,
        asset_account_id: &str,
        cash_or_payables_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, description)
            .debit(asset_account_id, amount.clone(), None)
            .credit(cash_or_payables_account_id, amount, None)
            .build()
    }

    /// Loan proceeds received into cash
    pub fn loan_received(
        id: &str,
        date: NaiveDate,
        description: &str,
        cash_account_id: &str,
        loan_payable_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, description)
            .debit(
                cash_account_id,
                amount.clone(),
                Some("Cash received from loan".to_string()),
            )
            .credit(
                loan_payable_account_id,
                amount,
                Some("Loan payable".to_string()),
            )
            .build()
    }

    /// Owner puts cash into the business
    pub fn owner_investment(
        id: &str,
        date: NaiveDate,
        description: &str,
        cash_account_id: &str,
        equity_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, description)
            .debit(
                cash_account_id,
                amount.clone(),
                Some("Cash invested by owner".to_string()),
            )
            .credit(
                equity_account_id,
                amount,
                Some("Owner's equity contribution".to_string()),
            )
            .build()
    }

    /// Owner takes cash out of the business
    pub fn owner_drawing(
        id: &str,
        date: NaiveDate,
        description: &str,
        drawings_account_id: &str,
        cash_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, description)
            .debit(drawings_account_id, amount.clone(), None)
            .credit(cash_account_id, amount, None)
            .build()
    }

    /// Periodic depreciation charge
    pub fn depreciation(
        id: &str,
        date: NaiveDate,
        depreciation_expense_account_id: &str,
        accumulated_depreciation_account_id: &str,
        amount: BigDecimal,
    ) -> JournalEntry {
        JournalEntryBuilder::new(id, date, "Depreciation")
            .debit(depreciation_expense_account_id, amount.clone(), None)
            .credit(accumulated_depreciation_account_id, amount, None)
            .build()
    }

    /// Offsetting entry that cancels `original` on `date`.
    ///
    /// Debits become credits and vice versa; descriptions are prefixed with
    /// "Reversal: ".
    pub fn reversing_entry(original: &JournalEntry, id: &str, date: NaiveDate) -> JournalEntry {
        let mut builder = JournalEntryBuilder::new(
            id,
            date,
            format!("Reversal: {}", original.description),
        )
        .reference(original.id.clone())
        .created_by(original.created_by.clone());

        for line in &original.lines {
            let description = line
                .description
                .as_ref()
                .map(|d| format!("Reversal: {}", d));
            builder = builder.currency(line.currency.clone());
            builder = if line.debit > line.credit {
                builder.credit(line.account_id.clone(), line.net_debit(), description)
            } else {
                builder.debit(line.account_id.clone(), -line.net_debit(), description)
            };
        }

        builder.build()
    }
}

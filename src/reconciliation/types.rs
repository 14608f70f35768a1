//! Reconciliation value objects

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Period;

/// One line of an external bank statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatementLine {
    pub id: String,
    pub date: NaiveDate,
    /// Positive for deposits, negative for withdrawals
    pub amount: BigDecimal,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl BankStatementLine {
    pub fn new(id: impl Into<String>, date: NaiveDate, amount: BigDecimal) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            description: None,
            reference: None,
        }
    }
}

/// A posted ledger line on the account being reconciled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookTransaction {
    pub entry_id: String,
    pub line_id: String,
    pub date: NaiveDate,
    pub reference: Option<String>,
    /// Debit minus credit
    pub amount: BigDecimal,
}

/// Why an item did not match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceKind {
    /// In the books but not on the bank statement
    Missing,
    /// On the bank statement but not in the books
    Extra,
}

/// An unmatched item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationDifference {
    #[serde(rename = "type")]
    pub kind: DifferenceKind,
    /// Book line id for `Missing`, bank line id for `Extra`
    pub source_id: String,
    pub date: NaiveDate,
    pub amount: BigDecimal,
    pub reference: Option<String>,
}

/// A book line paired with a bank line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub book_line_id: String,
    pub bank_line_id: String,
    pub amount: BigDecimal,
}

/// Totals for a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Sum of book transaction amounts in the period (a flow, not a running balance)
    pub book_balance: BigDecimal,
    /// Sum of bank statement amounts
    pub bank_balance: BigDecimal,
    /// `book_balance - bank_balance`
    pub difference: BigDecimal,
    pub matched_count: usize,
    pub missing_count: usize,
    pub extra_count: usize,
}

/// Result of reconciling one account for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub account_id: String,
    pub period: Period,
    pub is_reconciled: bool,
    pub matches: Vec<MatchedPair>,
    pub differences: Vec<ReconciliationDifference>,
    pub summary: ReconciliationSummary,
}

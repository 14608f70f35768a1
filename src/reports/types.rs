//! Financial statement value objects

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{within_tolerance, AccountCategory, AccountType, Period};

/// One account's contribution to a statement section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub account_id: String,
    pub code: String,
    pub name: String,
    pub category: AccountCategory,
    /// Signed balance under the account's normal side
    pub amount: BigDecimal,
}

/// A titled group of statement lines with its total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSection {
    pub title: String,
    pub lines: Vec<StatementLine>,
    pub total: BigDecimal,
}

impl StatementSection {
    /// Build a section, deriving the total from its lines
    pub fn new(title: impl Into<String>, lines: Vec<StatementLine>) -> Self {
        let total = lines.iter().map(|l| &l.amount).sum();
        Self {
            title: title.into(),
            lines,
            total,
        }
    }

    /// Total of the lines in one category
    pub fn category_total(&self, category: AccountCategory) -> BigDecimal {
        self.lines
            .iter()
            .filter(|l| l.category == category)
            .map(|l| &l.amount)
            .sum()
    }
}

/// Balance sheet over a window (use `Period::through` for a point-in-time sheet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub period: Period,
    pub current_assets: StatementSection,
    pub fixed_assets: StatementSection,
    pub other_assets: StatementSection,
    pub total_assets: BigDecimal,
    pub current_liabilities: StatementSection,
    pub long_term_liabilities: StatementSection,
    pub total_liabilities: BigDecimal,
    pub equity: StatementSection,
    /// Revenue less expenses over the same window, not yet closed to equity
    pub current_earnings: BigDecimal,
    pub total_equity: BigDecimal,
    pub is_balanced: bool,
}

impl BalanceSheet {
    pub fn liabilities_and_equity(&self) -> BigDecimal {
        &self.total_liabilities + &self.total_equity
    }

    /// Total of one asset or liability category across the sheet
    pub fn category_total(&self, category: AccountCategory) -> BigDecimal {
        [
            &self.current_assets,
            &self.fixed_assets,
            &self.other_assets,
            &self.current_liabilities,
            &self.long_term_liabilities,
            &self.equity,
        ]
        .iter()
        .map(|section| section.category_total(category))
        .sum()
    }
}

/// Multi-step income statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period: Period,
    pub revenue: StatementSection,
    pub cost_of_goods_sold: StatementSection,
    pub gross_profit: BigDecimal,
    pub operating_expenses: StatementSection,
    pub operating_income: BigDecimal,
    pub other_income: StatementSection,
    pub other_expenses: StatementSection,
    pub net_income: BigDecimal,
}

impl IncomeStatement {
    /// Operating revenue for the period
    pub fn total_revenue(&self) -> &BigDecimal {
        &self.revenue.total
    }

    /// Every expense section combined
    pub fn total_expenses(&self) -> BigDecimal {
        &self.cost_of_goods_sold.total + &self.operating_expenses.total + &self.other_expenses.total
    }
}

/// A labelled cash flow amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowItem {
    pub description: String,
    pub amount: BigDecimal,
}

/// Indirect-method cash flow statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub period: Period,
    pub net_income: BigDecimal,
    /// Non-cash and working-capital adjustments to net income
    pub operating_adjustments: Vec<CashFlowItem>,
    pub investing_activities: Vec<CashFlowItem>,
    pub financing_activities: Vec<CashFlowItem>,
    pub net_operating_cash_flow: BigDecimal,
    pub net_investing_cash_flow: BigDecimal,
    pub net_financing_cash_flow: BigDecimal,
    pub net_change_in_cash: BigDecimal,
    /// Cash balance at the close of the day before the period starts
    pub beginning_cash: BigDecimal,
    /// Cash balance at the close of the period's last day
    pub ending_cash: BigDecimal,
}

impl CashFlowStatement {
    /// Whether beginning cash plus the net change lands on ending cash
    pub fn reconciles(&self, tolerance: &BigDecimal) -> bool {
        within_tolerance(
            &(&self.beginning_cash + &self.net_change_in_cash),
            &self.ending_cash,
            tolerance,
        )
    }
}

/// Trial balance row; exactly one column is populated for a non-zero balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: String,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub debit_balance: Option<BigDecimal>,
    pub credit_balance: Option<BigDecimal>,
}

impl TrialBalanceRow {
    /// Get the balance amount regardless of debit/credit
    pub fn balance_amount(&self) -> BigDecimal {
        self.debit_balance
            .clone()
            .or_else(|| self.credit_balance.clone())
            .unwrap_or_else(|| BigDecimal::from(0))
    }
}

/// Trial balance over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub period: Period,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
    pub is_balanced: bool,
}

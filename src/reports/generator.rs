//! Statement generation.
//!
//! Each generator re-derives every figure from leaf account balances on every
//! call. The generator only borrows its snapshot, so one instance can serve
//! any number of threads at once.

use bigdecimal::BigDecimal;

use super::types::*;
use crate::ledger::account::AccountCatalog;
use crate::ledger::balance::{AccountSelector, BalanceCalculator};
use crate::types::*;

use crate::types::AccountCategory::*;

const CURRENT_ASSETS: &[AccountCategory] = &[Cash, AccountsReceivable, Inventory, OtherCurrentAsset];
const FIXED_ASSETS: &[AccountCategory] = &[FixedAsset, AccumulatedDepreciation];
const CURRENT_LIABILITIES: &[AccountCategory] = &[AccountsPayable, CurrentLiability];
const EQUITY: &[AccountCategory] = &[Capital, RetainedEarnings, Drawings];
const OPERATING_EXPENSES: &[AccountCategory] = &[OperatingExpense, Depreciation];

/// Builds statements from a `(catalog, entries)` snapshot
#[derive(Debug, Clone, Copy)]
pub struct StatementGenerator<'a> {
    catalog: &'a AccountCatalog,
    entries: &'a [JournalEntry],
    calculator: BalanceCalculator<'a>,
}

impl<'a> StatementGenerator<'a> {
    pub fn new(catalog: &'a AccountCatalog, entries: &'a [JournalEntry]) -> Self {
        Self {
            catalog,
            entries,
            calculator: BalanceCalculator::new(catalog),
        }
    }

    fn section(&self, title: &str, categories: &[AccountCategory], period: &Period) -> StatementSection {
        let selector = AccountSelector::Categories(categories.to_vec());
        let lines = self
            .calculator
            .balances_by_account(&selector, self.entries, period)
            .into_iter()
            .map(|(account, amount)| StatementLine {
                account_id: account.id.clone(),
                code: account.code.clone(),
                name: account.name.clone(),
                category: account.category,
                amount,
            })
            .collect();
        StatementSection::new(title, lines)
    }

    fn flow(&self, categories: &[AccountCategory], period: &Period) -> BigDecimal {
        self.calculator.compute_balance(
            &AccountSelector::Categories(categories.to_vec()),
            self.entries,
            period,
        )
    }

    fn cash_at(&self, period: Option<Period>) -> BigDecimal {
        match period {
            Some(window) => self.flow(&[Cash], &window),
            None => BigDecimal::from(0),
        }
    }

    /// Balance sheet; equity includes the window's revenue less expenses
    pub fn balance_sheet(&self, period: &Period, tolerance: &BigDecimal) -> BalanceSheet {
        let current_assets = self.section("Current Assets", CURRENT_ASSETS, period);
        let fixed_assets = self.section("Fixed Assets", FIXED_ASSETS, period);
        let other_assets = self.section("Other Assets", &[OtherAsset], period);
        let total_assets = &current_assets.total + &fixed_assets.total + &other_assets.total;

        let current_liabilities = self.section("Current Liabilities", CURRENT_LIABILITIES, period);
        let long_term_liabilities =
            self.section("Long-term Liabilities", &[LongTermLiability], period);
        let total_liabilities = &current_liabilities.total + &long_term_liabilities.total;

        let equity = self.section("Equity", EQUITY, period);
        let revenue = self.calculator.compute_balance(
            &AccountSelector::Type(AccountType::Revenue),
            self.entries,
            period,
        );
        let expenses = self.calculator.compute_balance(
            &AccountSelector::Type(AccountType::Expense),
            self.entries,
            period,
        );
        let current_earnings = revenue - expenses;
        let total_equity = &equity.total + &current_earnings;

        let is_balanced = within_tolerance(
            &total_assets,
            &(&total_liabilities + &total_equity),
            tolerance,
        );

        BalanceSheet {
            period: *period,
            current_assets,
            fixed_assets,
            other_assets,
            total_assets,
            current_liabilities,
            long_term_liabilities,
            total_liabilities,
            equity,
            current_earnings,
            total_equity,
            is_balanced,
        }
    }

    /// Multi-step income statement
    pub fn income_statement(&self, period: &Period) -> IncomeStatement {
        let revenue = self.section("Revenue", &[OperatingRevenue], period);
        let cost_of_goods_sold = self.section("Cost of Goods Sold", &[CostOfGoodsSold], period);
        let gross_profit = &revenue.total - &cost_of_goods_sold.total;

        let operating_expenses = self.section("Operating Expenses", OPERATING_EXPENSES, period);
        let operating_income = &gross_profit - &operating_expenses.total;

        let other_income = self.section("Other Income", &[OtherIncome], period);
        let other_expenses = self.section("Other Expenses", &[OtherExpense], period);
        let net_income = &operating_income + &other_income.total - &other_expenses.total;

        IncomeStatement {
            period: *period,
            revenue,
            cost_of_goods_sold,
            gross_profit,
            operating_expenses,
            operating_income,
            other_income,
            other_expenses,
            net_income,
        }
    }

    /// Indirect-method cash flow statement
    pub fn cash_flow(&self, period: &Period) -> CashFlowStatement {
        let net_income = self.income_statement(period).net_income;

        // Asset flows are debit-normal, so growth in an asset consumes cash.
        let operating_adjustments = vec![
            item("Depreciation", -self.flow(&[AccumulatedDepreciation], period)),
            item("Change in accounts receivable", -self.flow(&[AccountsReceivable], period)),
            item("Change in inventory", -self.flow(&[Inventory], period)),
            item("Change in other current assets", -self.flow(&[OtherCurrentAsset], period)),
            item("Change in accounts payable", self.flow(&[AccountsPayable], period)),
            item("Change in other current liabilities", self.flow(&[CurrentLiability], period)),
        ];
        let investing_activities = vec![
            item("Purchase and sale of fixed assets", -self.flow(&[FixedAsset], period)),
            item("Other long-term assets", -self.flow(&[OtherAsset], period)),
        ];
        let financing_activities = vec![
            item("Borrowings and repayments", self.flow(&[LongTermLiability], period)),
            item("Owner contributions", self.flow(&[Capital], period)),
            item("Drawings and dividends", self.flow(&[Drawings], period)),
            item("Retained earnings adjustments", self.flow(&[RetainedEarnings], period)),
        ];

        let net_operating_cash_flow =
            &net_income + operating_adjustments.iter().map(|i| &i.amount).sum::<BigDecimal>();
        let net_investing_cash_flow: BigDecimal =
            investing_activities.iter().map(|i| &i.amount).sum();
        let net_financing_cash_flow: BigDecimal =
            financing_activities.iter().map(|i| &i.amount).sum();
        let net_change_in_cash =
            &net_operating_cash_flow + &net_investing_cash_flow + &net_financing_cash_flow;

        CashFlowStatement {
            period: *period,
            net_income,
            operating_adjustments,
            investing_activities,
            financing_activities,
            net_operating_cash_flow,
            net_investing_cash_flow,
            net_financing_cash_flow,
            net_change_in_cash,
            beginning_cash: self.cash_at(period.before_start()),
            ending_cash: self.cash_at(Some(Period::through(period.end))),
        }
    }

    /// Trial balance with each account in its debit or credit column
    pub fn trial_balance(&self, period: &Period, tolerance: &BigDecimal) -> TrialBalance {
        let zero = BigDecimal::from(0);
        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);

        let all = AccountSelector::custom(|_| true);
        let rows = self
            .calculator
            .balances_by_account(&all, self.entries, period)
            .into_iter()
            .map(|(account, balance)| {
                let on_normal_side = balance >= zero;
                let amount = balance.abs();
                let side = match (account.account_type.normal_balance(), on_normal_side) {
                    (side, true) => side,
                    (side, false) => side.opposite(),
                };
                let (debit_balance, credit_balance) = match side {
                    EntryType::Debit => {
                        total_debits += &amount;
                        (Some(amount), None)
                    }
                    EntryType::Credit => {
                        total_credits += &amount;
                        (None, Some(amount))
                    }
                };
                TrialBalanceRow {
                    account_id: account.id.clone(),
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type: account.account_type,
                    debit_balance,
                    credit_balance,
                }
            })
            .collect();

        let is_balanced = within_tolerance(&total_debits, &total_credits, tolerance);

        TrialBalance {
            period: *period,
            rows,
            total_debits,
            total_credits,
            is_balanced,
        }
    }

    /// The chart of accounts this generator reads
    pub fn catalog(&self) -> &'a AccountCatalog {
        self.catalog
    }
}

fn item(description: &str, amount: BigDecimal) -> CashFlowItem {
    CashFlowItem {
        description: description.to_string(),
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::utils::standard_chart;
    use crate::ledger::journal::{patterns, JournalEntryBuilder};
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn posted(mut entry: JournalEntry) -> JournalEntry {
        entry.status = EntryStatus::Posted;
        entry
    }

    fn ledger() -> Vec<JournalEntry> {
        vec![
            posted(patterns::owner_investment("je1", date(1, 2), "Capital", "bank", "owners_equity", BigDecimal::from(100000))),
            posted(patterns::loan_received("je2", date(1, 3), "Bank loan", "bank", "loans_payable", BigDecimal::from(40000))),
            posted(patterns::asset_purchase("je3", date(1, 5), "New pump", "equipment", "bank", BigDecimal::from(30000))),
            posted(patterns::asset_purchase("je4", date(1, 6), "Fuel on credit", "fuel_inventory", "accounts_payable", BigDecimal::from(20000))),
            posted(
                JournalEntryBuilder::new("je5", date(1, 20), "Fuel sales")
                    .debit("cash", BigDecimal::from(18000), None)
                    .debit("accounts_receivable", BigDecimal::from(7000), None)
                    .credit("fuel_sales", BigDecimal::from(25000), None)
                    .build(),
            ),
            posted(patterns::expense_payment("je6", date(1, 20), "Fuel cost", "cost_of_fuel", "fuel_inventory", BigDecimal::from(15000))),
            posted(patterns::expense_payment("je7", date(1, 25), "Wages", "wages_expense", "cash", BigDecimal::from(4000))),
            posted(patterns::depreciation("je8", date(1, 31), "depreciation_expense", "accumulated_depreciation", BigDecimal::from(500))),
            posted(patterns::expense_payment("je9", date(1, 31), "Loan interest", "interest_expense", "bank", BigDecimal::from(300))),
            posted(patterns::owner_drawing("je10", date(1, 31), "Owner drawing", "owners_drawings", "cash", BigDecimal::from(1000))),
            posted(patterns::sale("je11", date(2, 2), "February sale", "cash", "store_sales", BigDecimal::from(999))),
        ]
    }

    fn january() -> Period {
        Period::new(date(1, 1), date(1, 31)).unwrap()
    }

    #[test]
    fn test_income_statement_steps() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = ledger();
        let statement = StatementGenerator::new(&catalog, &entries).income_statement(&january());

        assert_eq!(statement.revenue.total, BigDecimal::from(25000));
        assert_eq!(statement.gross_profit, BigDecimal::from(10000));
        assert_eq!(statement.operating_expenses.total, BigDecimal::from(4500));
        assert_eq!(statement.operating_income, BigDecimal::from(5500));
        assert_eq!(statement.other_expenses.total, BigDecimal::from(300));
        assert_eq!(statement.net_income, BigDecimal::from(5200));
        assert_eq!(statement.total_expenses(), BigDecimal::from(19800));
    }

    #[test]
    fn test_balance_sheet_satisfies_accounting_equation() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = ledger();
        let sheet = StatementGenerator::new(&catalog, &entries)
            .balance_sheet(&Period::through(date(1, 31)), &default_tolerance());

        // cash 13000, bank 109700, AR 7000, fuel 5000
        assert_eq!(sheet.current_assets.total, BigDecimal::from(134700));
        assert_eq!(sheet.fixed_assets.total, BigDecimal::from(29500));
        assert_eq!(sheet.total_liabilities, BigDecimal::from(60000));
        assert_eq!(sheet.current_earnings, BigDecimal::from(5200));
        assert_eq!(sheet.total_equity, BigDecimal::from(104200));
        assert_eq!(sheet.total_assets, sheet.liabilities_and_equity());
        assert!(sheet.is_balanced);
        assert_eq!(sheet.category_total(Inventory), BigDecimal::from(5000));
    }

    #[test]
    fn test_cash_flow_reconciles_with_cash_balances() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = ledger();
        let generator = StatementGenerator::new(&catalog, &entries);
        let flow = generator.cash_flow(&january());

        assert_eq!(flow.net_income, BigDecimal::from(5200));
        // 5200 + 500 - 7000 - 5000 + 20000
        assert_eq!(flow.net_operating_cash_flow, BigDecimal::from(13700));
        assert_eq!(flow.net_investing_cash_flow, BigDecimal::from(-30000));
        assert_eq!(flow.net_financing_cash_flow, BigDecimal::from(139000));
        assert_eq!(flow.beginning_cash, BigDecimal::from(0));
        assert_eq!(flow.ending_cash, BigDecimal::from(122700));
        assert_eq!(flow.net_change_in_cash, BigDecimal::from(122700));
        assert!(flow.reconciles(&default_tolerance()));

        let february = Period::new(date(2, 1), date(2, 29)).unwrap();
        let flow = generator.cash_flow(&february);
        assert_eq!(flow.beginning_cash, BigDecimal::from(122700));
        assert_eq!(flow.ending_cash, BigDecimal::from(123699));
        assert!(flow.reconciles(&default_tolerance()));
    }

    #[test]
    fn test_trial_balance_columns() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = ledger();
        let trial = StatementGenerator::new(&catalog, &entries)
            .trial_balance(&january(), &default_tolerance());

        assert!(trial.is_balanced);
        assert_eq!(trial.total_debits, trial.total_credits);

        let accumulated = trial
            .rows
            .iter()
            .find(|r| r.account_id == "accumulated_depreciation")
            .unwrap();
        assert_eq!(accumulated.credit_balance, Some(BigDecimal::from(500)));
        assert_eq!(accumulated.debit_balance, None);

        let drawings = trial.rows.iter().find(|r| r.account_id == "owners_drawings").unwrap();
        assert_eq!(drawings.debit_balance, Some(BigDecimal::from(1000)));
    }

    #[test]
    fn test_repeated_generation_is_identical() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = ledger();
        let generator = StatementGenerator::new(&catalog, &entries);
        assert_eq!(generator.income_statement(&january()), generator.income_statement(&january()));
    }
}

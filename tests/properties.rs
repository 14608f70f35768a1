//! Property tests over randomly generated balanced ledgers

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate};
use ledger_engine::ledger::account::utils::standard_chart;
use ledger_engine::{
    default_tolerance, AccountCatalog, AccountSelector, BalanceCalculator, BankStatementLine,
    EntryStatus, JournalEntry, JournalEntryBuilder, Period, ReconciliationEngine,
    StatementGenerator,
};
use proptest::prelude::*;

// Pairs of (debit account, credit account) a fuel station actually posts.
const TEMPLATES: &[(&str, &str)] = &[
    ("cash", "owners_equity"),
    ("bank", "loans_payable"),
    ("cash", "fuel_sales"),
    ("accounts_receivable", "store_sales"),
    ("bank", "accounts_receivable"),
    ("fuel_inventory", "accounts_payable"),
    ("cost_of_fuel", "fuel_inventory"),
    ("wages_expense", "cash"),
    ("utilities_expense", "bank"),
    ("equipment", "bank"),
    ("depreciation_expense", "accumulated_depreciation"),
    ("accounts_payable", "bank"),
    ("owners_drawings", "cash"),
    ("interest_expense", "bank"),
    ("bank", "interest_income"),
];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Amount in cents, between 0.01 and 100000.00
fn amount() -> impl Strategy<Value = BigDecimal> {
    (1i64..10_000_000).prop_map(|cents| BigDecimal::new(cents.into(), 2))
}

fn entry_params() -> impl Strategy<Value = (usize, i64, BigDecimal)> {
    (0..TEMPLATES.len(), 0i64..120, amount())
}

fn build_entries(params: &[(usize, i64, BigDecimal)]) -> Vec<JournalEntry> {
    params
        .iter()
        .enumerate()
        .map(|(i, (template, offset, amount))| {
            let (debit, credit) = TEMPLATES[*template];
            let mut entry = JournalEntryBuilder::new(
                format!("je{}", i),
                base_date() + Duration::days(*offset),
                "generated",
            )
            .debit(debit, amount.clone(), None)
            .credit(credit, amount.clone(), None)
            .build();
            entry.status = EntryStatus::Posted;
            entry
        })
        .collect()
}

fn window(start: i64, len: i64) -> Period {
    let start = base_date() + Duration::days(start);
    Period::new(start, start + Duration::days(len)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Assets equal liabilities plus equity for any balanced ledger
    #[test]
    fn prop_accounting_equation(
        params in prop::collection::vec(entry_params(), 0..40),
        end in 0i64..130,
    ) {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = build_entries(&params);
        let generator = StatementGenerator::new(&catalog, &entries);

        let sheet = generator.balance_sheet(
            &Period::through(base_date() + Duration::days(end)),
            &default_tolerance(),
        );
        prop_assert_eq!(sheet.total_assets.clone(), sheet.liabilities_and_equity());
        prop_assert!(sheet.is_balanced);
    }

    /// Debit and credit columns of the trial balance agree
    #[test]
    fn prop_trial_balance_balances(
        params in prop::collection::vec(entry_params(), 0..40),
        start in 0i64..60,
        len in 0i64..60,
    ) {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = build_entries(&params);
        let trial = StatementGenerator::new(&catalog, &entries)
            .trial_balance(&window(start, len), &default_tolerance());

        prop_assert_eq!(trial.total_debits, trial.total_credits);
        prop_assert!(trial.is_balanced);
    }

    /// Beginning cash plus the net change lands on ending cash
    #[test]
    fn prop_cash_flow_reconciles(
        params in prop::collection::vec(entry_params(), 0..40),
        start in 0i64..60,
        len in 0i64..60,
    ) {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = build_entries(&params);
        let cash_flow = StatementGenerator::new(&catalog, &entries).cash_flow(&window(start, len));

        prop_assert_eq!(
            &cash_flow.beginning_cash + &cash_flow.net_change_in_cash,
            cash_flow.ending_cash
        );
    }

    /// A period balance ignores entries dated outside the period
    #[test]
    fn prop_window_isolation(
        params in prop::collection::vec(entry_params(), 1..30),
        outside in prop::collection::vec(entry_params(), 1..10),
    ) {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let calculator = BalanceCalculator::new(&catalog);
        let period = window(0, 119);

        let inside = build_entries(&params);
        let mut everything = inside.clone();
        for (i, (template, offset, amount)) in outside.iter().enumerate() {
            let (debit, credit) = TEMPLATES[*template];
            let mut entry = JournalEntryBuilder::new(
                format!("late{}", i),
                base_date() + Duration::days(200 + offset),
                "outside",
            )
            .debit(debit, amount.clone(), None)
            .credit(credit, amount.clone(), None)
            .build();
            entry.status = EntryStatus::Posted;
            everything.push(entry);
        }

        for account in catalog.iter() {
            let selector = AccountSelector::account(&account.id);
            prop_assert_eq!(
                calculator.compute_balance(&selector, &inside, &period),
                calculator.compute_balance(&selector, &everything, &period)
            );
        }
    }

    /// A bank statement copied from the books reconciles completely
    #[test]
    fn prop_reconciliation_round_trip(
        params in prop::collection::vec(entry_params(), 0..40),
    ) {
        let entries = build_entries(&params);
        let period = window(0, 119);
        let book = ReconciliationEngine::book_transactions("bank", &period, &entries);
        let statement: Vec<BankStatementLine> = book
            .iter()
            .enumerate()
            .map(|(i, txn)| BankStatementLine::new(format!("b{}", i), txn.date, txn.amount.clone()))
            .collect();

        let result = ReconciliationEngine::new().reconcile("bank", &period, &entries, &statement);
        prop_assert!(result.is_reconciled);
        prop_assert!(result.differences.is_empty());
        prop_assert_eq!(result.summary.matched_count, book.len());
    }

    /// Voiding an entry is the same as never having posted it
    #[test]
    fn prop_void_entries_excluded(
        params in prop::collection::vec(entry_params(), 1..30),
        victim in any::<prop::sample::Index>(),
    ) {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let period = window(0, 119);
        let mut entries = build_entries(&params);
        let victim = victim.index(entries.len());

        entries[victim].status = EntryStatus::Void;
        let mut without = entries.clone();
        without.remove(victim);

        let with_void = StatementGenerator::new(&catalog, &entries).trial_balance(&period, &default_tolerance());
        let removed = StatementGenerator::new(&catalog, &without).trial_balance(&period, &default_tolerance());
        prop_assert_eq!(with_void, removed);
    }
}

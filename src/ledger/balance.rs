//! Account balance calculations.
//!
//! Balances are always recomputed from the posted entries of a window; nothing
//! here keeps running totals. Sign handling comes from [`crate::ledger::rules`].

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;

use crate::ledger::account::AccountCatalog;
use crate::types::*;

/// Which accounts a balance query covers
#[derive(Clone)]
pub enum AccountSelector {
    /// A single account by id
    Account(String),
    /// An account and every account below it in the hierarchy
    Subtree(String),
    /// Every account of a type
    Type(AccountType),
    /// Every account in a category
    Category(AccountCategory),
    /// Every account in any of the categories
    Categories(Vec<AccountCategory>),
    /// The account with this exact code
    Code(String),
    /// Arbitrary predicate over the account
    Custom(Arc<dyn Fn(&Account) -> bool + Send + Sync>),
}

impl AccountSelector {
    pub fn account(account_id: impl Into<String>) -> Self {
        AccountSelector::Account(account_id.into())
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Account) -> bool + Send + Sync + 'static,
    {
        AccountSelector::Custom(Arc::new(predicate))
    }

    /// Whether `account` is covered by this selector
    pub fn matches(&self, account: &Account, catalog: &AccountCatalog) -> bool {
        match self {
            AccountSelector::Account(id) => &account.id == id,
            AccountSelector::Subtree(root) => catalog.is_within(&account.id, root),
            AccountSelector::Type(account_type) => account.account_type == *account_type,
            AccountSelector::Category(category) => account.category == *category,
            AccountSelector::Categories(categories) => categories.contains(&account.category),
            AccountSelector::Code(code) => &account.code == code,
            AccountSelector::Custom(predicate) => predicate(account),
        }
    }
}

impl fmt::Debug for AccountSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSelector::Account(id) => f.debug_tuple("Account").field(id).finish(),
            AccountSelector::Subtree(id) => f.debug_tuple("Subtree").field(id).finish(),
            AccountSelector::Type(t) => f.debug_tuple("Type").field(t).finish(),
            AccountSelector::Category(c) => f.debug_tuple("Category").field(c).finish(),
            AccountSelector::Categories(c) => f.debug_tuple("Categories").field(c).finish(),
            AccountSelector::Code(code) => f.debug_tuple("Code").field(code).finish(),
            AccountSelector::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Computes signed balances over a borrowed chart of accounts
#[derive(Debug, Clone, Copy)]
pub struct BalanceCalculator<'a> {
    catalog: &'a AccountCatalog,
}

impl<'a> BalanceCalculator<'a> {
    pub fn new(catalog: &'a AccountCatalog) -> Self {
        Self { catalog }
    }

    /// Sum of the signed movements of every matching account over `period`.
    ///
    /// Only posted entries dated inside the window count. Lines whose account
    /// is missing from the catalog are ignored.
    pub fn compute_balance(
        &self,
        selector: &AccountSelector,
        entries: &[JournalEntry],
        period: &Period,
    ) -> BigDecimal {
        let mut balance = BigDecimal::from(0);
        for line in posted_lines(entries, period) {
            if let Some(account) = self.catalog.get(&line.account_id) {
                if selector.matches(account, self.catalog) {
                    balance += account.balance_change(&line.debit, &line.credit);
                }
            }
        }
        balance
    }

    /// Point-in-time balance: everything up to and including `date`
    pub fn balance_as_of(
        &self,
        selector: &AccountSelector,
        entries: &[JournalEntry],
        date: NaiveDate,
    ) -> BigDecimal {
        self.compute_balance(selector, entries, &Period::through(date))
    }

    /// Opening, movement and closing figures for one account
    pub fn account_balance(
        &self,
        account_id: &str,
        entries: &[JournalEntry],
        period: &Period,
    ) -> LedgerResult<AccountBalance> {
        let account = self.catalog.get_required(account_id)?;
        let selector = AccountSelector::account(account_id);

        let opening = match period.before_start() {
            Some(before) => self.compute_balance(&selector, entries, &before),
            None => BigDecimal::from(0),
        };

        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);
        for line in posted_lines(entries, period).filter(|l| l.account_id == account_id) {
            total_debits += &line.debit;
            total_credits += &line.credit;
        }

        let closing = &opening + account.balance_change(&total_debits, &total_credits);

        Ok(AccountBalance {
            account_id: account_id.to_string(),
            period: *period,
            opening,
            total_debits,
            total_credits,
            closing,
        })
    }

    /// Signed balance of every account matching `selector`, in code order
    pub fn balances_by_account(
        &self,
        selector: &AccountSelector,
        entries: &[JournalEntry],
        period: &Period,
    ) -> Vec<(&'a Account, BigDecimal)> {
        let catalog = self.catalog;
        catalog
            .iter()
            .filter(|account| selector.matches(account, catalog))
            .map(|account| {
                let balance =
                    self.compute_balance(&AccountSelector::account(&account.id), entries, period);
                (account, balance)
            })
            .collect()
    }
}

/// Lines of posted entries dated inside `period`
pub fn posted_lines<'e>(
    entries: &'e [JournalEntry],
    period: &'e Period,
) -> impl Iterator<Item = &'e LedgerLine> + 'e {
    entries
        .iter()
        .filter(move |entry| entry.is_posted() && period.contains(entry.date))
        .flat_map(|entry| entry.lines.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::utils::standard_chart;
    use crate::ledger::journal::patterns;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn posted(mut entry: JournalEntry) -> JournalEntry {
        entry.status = EntryStatus::Posted;
        entry
    }

    fn entries() -> Vec<JournalEntry> {
        vec![
            posted(patterns::owner_investment("je1", date(1, 2), "Capital", "bank", "owners_equity", BigDecimal::from(50000))),
            posted(patterns::sale("je2", date(1, 15), "Fuel", "cash", "fuel_sales", BigDecimal::from(8000))),
            posted(patterns::asset_purchase("je3", date(2, 1), "Fuel delivery", "fuel_inventory", "bank", BigDecimal::from(6000))),
            posted(patterns::sale("je4", date(2, 20), "Store", "cash", "store_sales", BigDecimal::from(1500))),
            patterns::sale("draft", date(2, 21), "Unposted", "cash", "fuel_sales", BigDecimal::from(999)),
        ]
    }

    #[test]
    fn test_sign_follows_normal_side() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let calc = BalanceCalculator::new(&catalog);
        let year = Period::new(date(1, 1), date(12, 31)).unwrap();

        assert_eq!(
            calc.compute_balance(&AccountSelector::account("bank"), &entries(), &year),
            BigDecimal::from(44000)
        );
        assert_eq!(
            calc.compute_balance(&AccountSelector::Type(AccountType::Revenue), &entries(), &year),
            BigDecimal::from(9500)
        );
        assert_eq!(
            calc.compute_balance(&AccountSelector::account("owners_equity"), &entries(), &year),
            BigDecimal::from(50000)
        );
    }

    #[test]
    fn test_window_excludes_outside_and_unposted_entries() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let calc = BalanceCalculator::new(&catalog);
        let february = Period::new(date(2, 1), date(2, 29)).unwrap();

        assert_eq!(
            calc.compute_balance(&AccountSelector::Category(AccountCategory::Cash), &entries(), &february),
            BigDecimal::from(-4500)
        );
        assert_eq!(
            calc.balance_as_of(&AccountSelector::account("cash"), &entries(), date(1, 31)),
            BigDecimal::from(8000)
        );
    }

    #[test]
    fn test_selectors() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let calc = BalanceCalculator::new(&catalog);
        let year = Period::new(date(1, 1), date(12, 31)).unwrap();

        assert_eq!(
            calc.compute_balance(&AccountSelector::Subtree("inventory".into()), &entries(), &year),
            BigDecimal::from(6000)
        );
        assert_eq!(
            calc.compute_balance(&AccountSelector::Code("4100".into()), &entries(), &year),
            BigDecimal::from(1500)
        );
        let store_only = AccountSelector::custom(|a| a.name.starts_with("Store"));
        assert_eq!(
            calc.compute_balance(&store_only, &entries(), &year),
            BigDecimal::from(1500)
        );
    }

    #[test]
    fn test_account_balance_opening_and_closing() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let calc = BalanceCalculator::new(&catalog);
        let february = Period::new(date(2, 1), date(2, 29)).unwrap();

        let bank = calc.account_balance("bank", &entries(), &february).unwrap();
        assert_eq!(bank.opening, BigDecimal::from(50000));
        assert_eq!(bank.total_debits, BigDecimal::from(0));
        assert_eq!(bank.total_credits, BigDecimal::from(6000));
        assert_eq!(bank.closing, BigDecimal::from(44000));

        assert!(matches!(
            calc.account_balance("missing", &entries(), &february),
            Err(LedgerError::AccountNotFound(_))
        ));
    }
}

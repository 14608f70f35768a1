//! Chart of accounts: an immutable, validated catalog built from the store

use std::collections::HashMap;

use crate::types::*;
use crate::utils::validation::validate_account;

/// Read-only view of the chart of accounts.
///
/// Accounts are kept ordered by code so every report iterates them in the
/// same order.
#[derive(Debug, Clone, Default)]
pub struct AccountCatalog {
    accounts: Vec<Account>,
    index: HashMap<String, usize>,
}

impl AccountCatalog {
    /// Build a catalog, rejecting duplicate ids, dangling parents and cycles
    pub fn new(mut accounts: Vec<Account>) -> LedgerResult<Self> {
        accounts.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.id.cmp(&b.id)));

        let mut index = HashMap::with_capacity(accounts.len());
        for (position, account) in accounts.iter().enumerate() {
            validate_account(account).map_err(|e| LedgerError::Catalog(e.to_string()))?;
            if index.insert(account.id.clone(), position).is_some() {
                return Err(LedgerError::Catalog(format!(
                    "Account with ID '{}' appears more than once",
                    account.id
                )));
            }
        }

        let catalog = Self { accounts, index };
        for account in &catalog.accounts {
            if let Some(ref parent_id) = account.parent_id {
                if !catalog.contains(parent_id) {
                    return Err(LedgerError::Catalog(format!(
                        "Parent account '{}' of '{}' does not exist",
                        parent_id, account.id
                    )));
                }
            }
            catalog.check_acyclic(account)?;
        }

        Ok(catalog)
    }

    fn check_acyclic(&self, account: &Account) -> LedgerResult<()> {
        let mut steps = 0;
        let mut current = account.parent_id.as_deref();
        while let Some(id) = current {
            steps += 1;
            if id == account.id || steps > self.accounts.len() {
                return Err(LedgerError::Catalog(format!(
                    "Account hierarchy contains a cycle through '{}'",
                    account.id
                )));
            }
            current = self.get(id).and_then(|a| a.parent_id.as_deref());
        }
        Ok(())
    }

    /// Get an account by ID
    pub fn get(&self, account_id: &str) -> Option<&Account> {
        self.index.get(account_id).map(|&i| &self.accounts[i])
    }

    /// Get an account by ID, returning an error if not found
    pub fn get_required(&self, account_id: &str) -> LedgerResult<&Account> {
        self.get(account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.index.contains_key(account_id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Accounts in code order
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Accounts of one type, in code order
    pub fn of_type(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.accounts
            .iter()
            .filter(move |a| a.account_type == account_type)
    }

    /// Direct children of a parent account
    pub fn children(&self, parent_id: &str) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|account| account.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// Path from the root down to the account (for hierarchical display)
    pub fn path(&self, account_id: &str) -> LedgerResult<Vec<&Account>> {
        let mut path = Vec::new();
        let mut current = Some(account_id);

        while let Some(id) = current {
            let account = self.get_required(id)?;
            current = account.parent_id.as_deref();
            path.insert(0, account);
        }

        Ok(path)
    }

    /// Whether `account_id` is `ancestor_id` or sits somewhere below it
    pub fn is_within(&self, account_id: &str, ancestor_id: &str) -> bool {
        let mut current = Some(account_id);
        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            current = self.get(id).and_then(|a| a.parent_id.as_deref());
        }
        false
    }
}

/// Utility functions for working with accounts
pub mod utils {
    use super::*;

    /// Standard chart of accounts for a small fuel station with a convenience store
    pub fn standard_chart() -> Vec<Account> {
        use AccountCategory::*;

        let rows: [(&str, &str, &str, AccountCategory, Option<&str>); 24] = [
            ("cash", "1000", "Cash on Hand", Cash, None),
            ("bank", "1010", "Bank Account", Cash, None),
            ("accounts_receivable", "1200", "Fleet Card Receivables", AccountsReceivable, None),
            ("inventory", "1300", "Inventory", Inventory, None),
            ("fuel_inventory", "1310", "Fuel Inventory", Inventory, Some("inventory")),
            ("store_inventory", "1320", "Store Inventory", Inventory, Some("inventory")),
            ("prepaid_expenses", "1400", "Prepaid Expenses", OtherCurrentAsset, None),
            ("equipment", "1500", "Pumps and Equipment", FixedAsset, None),
            ("accumulated_depreciation", "1510", "Accumulated Depreciation", AccumulatedDepreciation, None),
            ("accounts_payable", "2000", "Accounts Payable", AccountsPayable, None),
            ("taxes_payable", "2100", "Taxes Payable", CurrentLiability, None),
            ("loans_payable", "2500", "Loans Payable", LongTermLiability, None),
            ("owners_equity", "3000", "Owner's Capital", Capital, None),
            ("retained_earnings", "3200", "Retained Earnings", RetainedEarnings, None),
            ("owners_drawings", "3300", "Owner's Drawings", Drawings, None),
            ("fuel_sales", "4000", "Fuel Sales", OperatingRevenue, None),
            ("store_sales", "4100", "Store Sales", OperatingRevenue, None),
            ("interest_income", "4900", "Interest Income", OtherIncome, None),
            ("cost_of_fuel", "5000", "Cost of Fuel Sold", CostOfGoodsSold, None),
            ("cost_of_merchandise", "5100", "Cost of Merchandise Sold", CostOfGoodsSold, None),
            ("wages_expense", "6000", "Wages", OperatingExpense, None),
            ("utilities_expense", "6100", "Utilities", OperatingExpense, None),
            ("depreciation_expense", "6500", "Depreciation", Depreciation, None),
            ("interest_expense", "7000", "Interest Expense", OtherExpense, None),
        ];

        rows.into_iter()
            .map(|(id, code, name, category, parent)| {
                Account::new(id, code, name, category, parent.map(str::to_string))
            })
            .collect()
    }
}

//! Account-type rule table.
//!
//! Every sign convention and direction restriction in the crate is read from
//! [`rule_for`]. The validator and the balance calculator both consult it, so
//! there is exactly one place that knows an asset is debit-normal.

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::types::{Account, AccountType, EntryType};

/// How an account type behaves in double-entry arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountTypeRule {
    /// Side on which increases are recorded
    pub normal_side: EntryType,
    /// Side that reduces the account and needs explicit permission, if any
    pub restricted_side: Option<EntryType>,
}

/// Look up the rule for an account type
pub const fn rule_for(account_type: AccountType) -> AccountTypeRule {
    match account_type {
        AccountType::Asset => AccountTypeRule {
            normal_side: EntryType::Debit,
            restricted_side: Some(EntryType::Credit),
        },
        AccountType::Liability => AccountTypeRule {
            normal_side: EntryType::Credit,
            restricted_side: Some(EntryType::Debit),
        },
        AccountType::Expense => AccountTypeRule {
            normal_side: EntryType::Debit,
            restricted_side: None,
        },
        AccountType::Equity | AccountType::Revenue => AccountTypeRule {
            normal_side: EntryType::Credit,
            restricted_side: None,
        },
    }
}

/// Signed balance movement for a debit/credit pair on an account of `account_type`
pub fn signed_amount(account_type: AccountType, debit: &BigDecimal, credit: &BigDecimal) -> BigDecimal {
    match rule_for(account_type).normal_side {
        EntryType::Debit => debit - credit,
        EntryType::Credit => credit - debit,
    }
}

/// Accounts that may be reduced on their restricted side.
///
/// Built from configuration; the lookup is by account id only.
#[derive(Debug, Clone, Default)]
pub struct ReductionPolicy {
    enforce: bool,
    allowed: HashSet<String>,
}

impl ReductionPolicy {
    /// Enforce restrictions, allowing reductions only on the listed accounts
    pub fn strict<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enforce: true,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Allow every reduction
    pub fn permissive() -> Self {
        Self {
            enforce: false,
            allowed: HashSet::new(),
        }
    }

    /// Whether a line on `side` against `account` is permitted
    pub fn reduction_allowed(&self, account: &Account, side: EntryType) -> bool {
        if !self.enforce {
            return true;
        }
        match rule_for(account.account_type).restricted_side {
            Some(restricted) if restricted == side => self.allowed.contains(&account.id),
            _ => true,
        }
    }
}

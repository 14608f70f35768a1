//! Taxable income and progressive bracket liability.
//!
//! Taxable income is the sum of credits posted to revenue accounts less the
//! sum of debits posted to expense accounts in the window. Each bracket's
//! threshold is the width of income it taxes; an unbounded bracket takes
//! whatever remains.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::account::AccountCatalog;
use crate::ledger::balance::posted_lines;
use crate::types::{AccountType, JournalEntry, Period};

/// One progressive bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Width of income taxed at `rate`; `None` is unbounded
    pub threshold: Option<BigDecimal>,
    /// Fraction between 0 and 1 (0.2 for 20%)
    pub rate: BigDecimal,
}

impl TaxBracket {
    pub fn new(threshold: BigDecimal, rate: BigDecimal) -> Self {
        Self {
            threshold: Some(threshold),
            rate,
        }
    }

    pub fn unbounded(rate: BigDecimal) -> Self {
        Self {
            threshold: None,
            rate,
        }
    }

    /// Validate that the bracket is well formed
    pub fn validate(&self) -> Result<(), TaxError> {
        if self.rate < BigDecimal::from(0) || self.rate > BigDecimal::from(1) {
            return Err(TaxError::InvalidBracket(format!(
                "rate must be between 0 and 1, got {}",
                self.rate
            )));
        }
        if let Some(threshold) = &self.threshold {
            if *threshold <= BigDecimal::from(0) {
                return Err(TaxError::InvalidBracket(format!(
                    "threshold must be positive, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

/// One account's contribution to taxable income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxableIncomeLine {
    pub account_id: String,
    pub name: String,
    pub account_type: AccountType,
    /// Credits for revenue accounts, debits for expense accounts
    pub amount: BigDecimal,
}

/// Tax charged within one bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTax {
    pub threshold: Option<BigDecimal>,
    pub rate: BigDecimal,
    pub taxed_amount: BigDecimal,
    pub tax: BigDecimal,
}

/// Detailed tax computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub period: Period,
    pub taxable_income: BigDecimal,
    pub tax_liability: BigDecimal,
    /// Per-account income and deductions, in code order
    pub breakdown: Vec<TaxableIncomeLine>,
    /// Only brackets that taxed something
    pub brackets: Vec<BracketTax>,
}

impl TaxComputation {
    /// Liability over taxable income, when there is any income
    pub fn effective_rate(&self) -> Option<BigDecimal> {
        if self.taxable_income <= BigDecimal::from(0) {
            None
        } else {
            Some((&self.tax_liability / &self.taxable_income).round(4))
        }
    }
}

/// Computes income tax over posted entries
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    catalog: &'a AccountCatalog,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(catalog: &'a AccountCatalog) -> Self {
        Self { catalog }
    }

    /// Taxable income for the window with its per-account breakdown
    pub fn taxable_income(
        &self,
        entries: &[JournalEntry],
        period: &Period,
    ) -> (BigDecimal, Vec<TaxableIncomeLine>) {
        let mut by_account: BTreeMap<&str, BigDecimal> = BTreeMap::new();
        for line in posted_lines(entries, period) {
            let Some(account) = self.catalog.get(&line.account_id) else {
                continue;
            };
            let amount = match account.account_type {
                AccountType::Revenue => &line.credit,
                AccountType::Expense => &line.debit,
                _ => continue,
            };
            *by_account
                .entry(account.id.as_str())
                .or_insert_with(|| BigDecimal::from(0)) += amount;
        }

        let mut income = BigDecimal::from(0);
        let mut breakdown = Vec::new();
        for account in self.catalog.iter() {
            let Some(amount) = by_account.remove(account.id.as_str()) else {
                continue;
            };
            match account.account_type {
                AccountType::Revenue => income += &amount,
                _ => income -= &amount,
            }
            breakdown.push(TaxableIncomeLine {
                account_id: account.id.clone(),
                name: account.name.clone(),
                account_type: account.account_type,
                amount,
            });
        }
        (income, breakdown)
    }

    /// Taxable income and progressive liability for the window
    pub fn calculate_taxes(
        &self,
        entries: &[JournalEntry],
        period: &Period,
        brackets: &[TaxBracket],
    ) -> Result<TaxComputation, TaxError> {
        let (taxable_income, breakdown) = self.taxable_income(entries, period);
        let (tax_liability, applied) = apply_brackets(&taxable_income, brackets)?;

        tracing::debug!(
            taxable_income = %taxable_income,
            tax_liability = %tax_liability,
            brackets = applied.len(),
            "tax computed"
        );

        Ok(TaxComputation {
            period: *period,
            taxable_income,
            tax_liability,
            breakdown,
            brackets: applied,
        })
    }
}

/// Apply progressive brackets to an income figure
pub fn apply_brackets(
    income: &BigDecimal,
    brackets: &[TaxBracket],
) -> Result<(BigDecimal, Vec<BracketTax>), TaxError> {
    for bracket in brackets {
        bracket.validate()?;
    }
    if brackets.iter().filter(|b| b.threshold.is_none()).count() > 1 {
        return Err(TaxError::InvalidBracket(
            "at most one bracket may be unbounded".to_string(),
        ));
    }

    let mut sorted: Vec<&TaxBracket> = brackets.iter().collect();
    sorted.sort_by(|a, b| match (&a.threshold, &b.threshold) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let zero = BigDecimal::from(0);
    let mut remaining = income.clone();
    let mut liability = BigDecimal::from(0);
    let mut applied = Vec::new();

    for bracket in sorted {
        if remaining <= zero {
            break;
        }
        let taxed = match &bracket.threshold {
            Some(threshold) if *threshold < remaining => threshold.clone(),
            _ => remaining.clone(),
        };
        let tax = &taxed * &bracket.rate;
        liability += &tax;
        remaining -= &taxed;
        applied.push(BracketTax {
            threshold: bracket.threshold.clone(),
            rate: bracket.rate.clone(),
            taxed_amount: taxed,
            tax,
        });
    }

    Ok((liability, applied))
}

/// Tax-related errors
#[derive(Debug, thiserror::Error)]
pub enum TaxError {
    #[error("Invalid tax bracket: {0}")]
    InvalidBracket(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::utils::standard_chart;
    use crate::ledger::journal::{patterns, JournalEntryBuilder};
    use crate::types::EntryStatus;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn posted(mut entry: JournalEntry) -> JournalEntry {
        entry.status = EntryStatus::Posted;
        entry
    }

    fn standard_brackets() -> Vec<TaxBracket> {
        vec![
            TaxBracket::unbounded("0.2".parse().unwrap()),
            TaxBracket::new(BigDecimal::from(10000), "0.1".parse().unwrap()),
        ]
    }

    #[test]
    fn test_progressive_brackets() {
        let (liability, applied) =
            apply_brackets(&BigDecimal::from(15000), &standard_brackets()).unwrap();

        assert_eq!(liability, BigDecimal::from(2000));
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].taxed_amount, BigDecimal::from(10000));
        assert_eq!(applied[0].tax, BigDecimal::from(1000));
        assert_eq!(applied[1].taxed_amount, BigDecimal::from(5000));
        assert_eq!(applied[1].tax, BigDecimal::from(1000));
    }

    #[test]
    fn test_income_within_first_bracket() {
        let (liability, applied) =
            apply_brackets(&BigDecimal::from(4000), &standard_brackets()).unwrap();
        assert_eq!(liability, BigDecimal::from(400));
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn test_loss_owes_nothing() {
        let (liability, applied) =
            apply_brackets(&BigDecimal::from(-500), &standard_brackets()).unwrap();
        assert_eq!(liability, BigDecimal::from(0));
        assert!(applied.is_empty());
    }

    #[test]
    fn test_bounded_brackets_exhausted() {
        let brackets = vec![TaxBracket::new(BigDecimal::from(1000), "0.1".parse().unwrap())];
        let (liability, _) = apply_brackets(&BigDecimal::from(5000), &brackets).unwrap();
        assert_eq!(liability, BigDecimal::from(100));
    }

    #[test]
    fn test_invalid_brackets() {
        let bad_rate = vec![TaxBracket::unbounded("1.5".parse().unwrap())];
        assert!(matches!(
            apply_brackets(&BigDecimal::from(1), &bad_rate),
            Err(TaxError::InvalidBracket(_))
        ));

        let bad_threshold = vec![TaxBracket::new(BigDecimal::from(0), "0.1".parse().unwrap())];
        assert!(apply_brackets(&BigDecimal::from(1), &bad_threshold).is_err());

        let two_unbounded = vec![
            TaxBracket::unbounded("0.1".parse().unwrap()),
            TaxBracket::unbounded("0.2".parse().unwrap()),
        ];
        assert!(apply_brackets(&BigDecimal::from(1), &two_unbounded).is_err());
    }

    #[test]
    fn test_calculate_taxes_from_entries() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let entries = vec![
            posted(patterns::sale("je1", date(3, 1), "Fuel", "cash", "fuel_sales", BigDecimal::from(18000))),
            posted(patterns::sale("je2", date(3, 2), "Store", "cash", "store_sales", BigDecimal::from(2000))),
            posted(patterns::expense_payment("je3", date(3, 3), "Wages", "wages_expense", "cash", BigDecimal::from(5000))),
            // Outside the window
            posted(patterns::sale("je4", date(4, 1), "Fuel", "cash", "fuel_sales", BigDecimal::from(999))),
        ];
        let period = Period::new(date(3, 1), date(3, 31)).unwrap();

        let result = TaxCalculator::new(&catalog)
            .calculate_taxes(&entries, &period, &standard_brackets())
            .unwrap();

        assert_eq!(result.taxable_income, BigDecimal::from(15000));
        assert_eq!(result.tax_liability, BigDecimal::from(2000));
        let ids: Vec<&str> = result.breakdown.iter().map(|l| l.account_id.as_str()).collect();
        assert_eq!(ids, vec!["fuel_sales", "store_sales", "wages_expense"]);
        assert_eq!(result.effective_rate(), Some("0.1333".parse().unwrap()));
    }

    #[test]
    fn test_revenue_debits_are_not_netted() {
        let catalog = AccountCatalog::new(standard_chart()).unwrap();
        let refund = JournalEntryBuilder::new("je2", date(3, 5), "Refund")
            .debit("fuel_sales", BigDecimal::from(100), None)
            .credit("cash", BigDecimal::from(100), None)
            .build();
        let entries = vec![
            posted(patterns::sale("je1", date(3, 1), "Fuel", "cash", "fuel_sales", BigDecimal::from(1000))),
            posted(refund),
        ];
        let period = Period::through(date(3, 31));

        let (income, _) = TaxCalculator::new(&catalog).taxable_income(&entries, &period);
        assert_eq!(income, BigDecimal::from(1000));
    }
}

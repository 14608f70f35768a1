//! Greedy bank reconciliation.
//!
//! Book transactions are visited in their original order and each takes the
//! first unmatched bank line on the same date whose amount differs by less
//! than the tolerance. An earlier book line can therefore claim a bank line
//! that a later one matches more closely; that tie-break is deliberate.

use bigdecimal::BigDecimal;

use super::types::*;
use crate::types::*;

/// Matches bank statement lines against posted ledger lines
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    tolerance: BigDecimal,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }

    pub fn with_tolerance(tolerance: BigDecimal) -> Self {
        Self { tolerance }
    }

    /// Posted lines on `account_id` dated inside `period`, in entry order
    pub fn book_transactions(
        account_id: &str,
        period: &Period,
        entries: &[JournalEntry],
    ) -> Vec<BookTransaction> {
        entries
            .iter()
            .filter(|entry| entry.is_posted() && period.contains(entry.date))
            .flat_map(|entry| {
                entry
                    .lines
                    .iter()
                    .filter(|line| line.account_id == account_id)
                    .map(move |line| BookTransaction {
                        entry_id: entry.id.clone(),
                        line_id: line.id.clone(),
                        date: entry.date,
                        reference: entry.reference.clone(),
                        amount: line.net_debit(),
                    })
            })
            .collect()
    }

    /// Reconcile one account for one period. Never fails; an unreconcilable
    /// period is reported through `differences`.
    pub fn reconcile(
        &self,
        account_id: &str,
        period: &Period,
        entries: &[JournalEntry],
        bank_lines: &[BankStatementLine],
    ) -> ReconciliationResult {
        let book = Self::book_transactions(account_id, period, entries);
        let mut bank_matched = vec![false; bank_lines.len()];
        let mut matches = Vec::new();
        let mut differences = Vec::new();

        for txn in &book {
            let candidate = bank_lines.iter().enumerate().position(|(i, bank)| {
                !bank_matched[i]
                    && bank.date == txn.date
                    && (&txn.amount - &bank.amount).abs() < self.tolerance
            });

            match candidate {
                Some(i) => {
                    bank_matched[i] = true;
                    matches.push(MatchedPair {
                        book_line_id: txn.line_id.clone(),
                        bank_line_id: bank_lines[i].id.clone(),
                        amount: txn.amount.clone(),
                    });
                }
                None => differences.push(ReconciliationDifference {
                    kind: DifferenceKind::Missing,
                    source_id: txn.line_id.clone(),
                    date: txn.date,
                    amount: txn.amount.clone(),
                    reference: txn.reference.clone(),
                }),
            }
        }

        for (bank, _) in bank_lines
            .iter()
            .zip(bank_matched.iter())
            .filter(|(_, matched)| !**matched)
        {
            differences.push(ReconciliationDifference {
                kind: DifferenceKind::Extra,
                source_id: bank.id.clone(),
                date: bank.date,
                amount: bank.amount.clone(),
                reference: bank.reference.clone(),
            });
        }

        let book_balance: BigDecimal = book.iter().map(|t| &t.amount).sum();
        let bank_balance: BigDecimal = bank_lines.iter().map(|b| &b.amount).sum();
        let difference = &book_balance - &bank_balance;
        let is_reconciled = differences.is_empty() && difference.abs() < self.tolerance;

        let missing_count = differences
            .iter()
            .filter(|d| d.kind == DifferenceKind::Missing)
            .count();
        let summary = ReconciliationSummary {
            book_balance,
            bank_balance,
            difference,
            matched_count: matches.len(),
            missing_count,
            extra_count: differences.len() - missing_count,
        };

        tracing::info!(
            account_id,
            matched = summary.matched_count,
            missing = summary.missing_count,
            extra = summary.extra_count,
            difference = %summary.difference,
            is_reconciled,
            "reconciliation finished"
        );

        ReconciliationResult {
            account_id: account_id.to_string(),
            period: *period,
            is_reconciled,
            matches,
            differences,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::journal::patterns;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn march() -> Period {
        Period::new(date(1), date(31)).unwrap()
    }

    fn posted(mut entry: JournalEntry) -> JournalEntry {
        entry.status = EntryStatus::Posted;
        entry
    }

    fn book() -> Vec<JournalEntry> {
        vec![
            posted(patterns::sale("je1", date(4), "Deposit", "bank", "fuel_sales", BigDecimal::from(1000))),
            posted(patterns::expense_payment("je2", date(6), "Power bill", "utilities_expense", "bank", BigDecimal::from(250))),
            posted(patterns::sale("je3", date(6), "Deposit", "bank", "store_sales", BigDecimal::from(400))),
        ]
    }

    #[test]
    fn test_exact_statement_reconciles() {
        let bank = vec![
            BankStatementLine::new("b1", date(4), BigDecimal::from(1000)),
            BankStatementLine::new("b2", date(6), BigDecimal::from(-250)),
            BankStatementLine::new("b3", date(6), BigDecimal::from(400)),
        ];

        let result = ReconciliationEngine::new().reconcile("bank", &march(), &book(), &bank);
        assert!(result.is_reconciled);
        assert!(result.differences.is_empty());
        assert_eq!(result.summary.matched_count, 3);
        assert_eq!(result.summary.book_balance, BigDecimal::from(1150));
        assert_eq!(result.summary.difference, BigDecimal::from(0));
    }

    #[test]
    fn test_missing_and_extra() {
        let bank = vec![
            BankStatementLine::new("b1", date(4), BigDecimal::from(1000)),
            BankStatementLine::new("b2", date(7), BigDecimal::from(-250)),
            BankStatementLine::new("fee", date(31), BigDecimal::from(-15)),
        ];

        let result = ReconciliationEngine::new().reconcile("bank", &march(), &book(), &bank);
        assert!(!result.is_reconciled);

        let kinds: Vec<(DifferenceKind, &str)> = result
            .differences
            .iter()
            .map(|d| (d.kind, d.source_id.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (DifferenceKind::Missing, "je2-2"),
                (DifferenceKind::Missing, "je3-1"),
                (DifferenceKind::Extra, "b2"),
                (DifferenceKind::Extra, "fee"),
            ]
        );
        assert_eq!(result.summary.bank_balance, BigDecimal::from(735));
        assert_eq!(result.summary.difference, BigDecimal::from(415));
    }

    #[test]
    fn test_first_seen_book_line_wins() {
        let entries = vec![
            posted(patterns::sale("je1", date(10), "A", "bank", "fuel_sales", "100.00".parse().unwrap())),
            posted(patterns::sale("je2", date(10), "B", "bank", "fuel_sales", "100.005".parse().unwrap())),
        ];
        // Only one bank line; both book lines are within tolerance of it.
        let bank = vec![BankStatementLine::new("b1", date(10), "100.005".parse().unwrap())];

        let result = ReconciliationEngine::new().reconcile("bank", &march(), &entries, &bank);
        assert_eq!(result.matches[0].book_line_id, "je1-1");
        assert_eq!(result.differences.len(), 1);
        assert_eq!(result.differences[0].source_id, "je2-1");
    }

    #[test]
    fn test_entries_outside_period_ignored() {
        let mut entries = book();
        entries.push(posted(patterns::sale("je9", NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), "April", "bank", "fuel_sales", BigDecimal::from(5))));

        let txns = ReconciliationEngine::book_transactions("bank", &march(), &entries);
        assert_eq!(txns.len(), 3);
    }
}

//! Journal entry validation.
//!
//! The validator never stops at the first problem: every rule is evaluated and
//! all findings are returned together in a [`ValidationReport`].

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::ledger::account::AccountCatalog;
use crate::ledger::rules::ReductionPolicy;
use crate::traits::JournalValidator;
use crate::types::*;
use crate::utils::validation::MetadataSchema;

/// A single reason a journal entry cannot be posted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("entry must have at least two lines (found {count})")]
    InsufficientLines { count: usize },
    #[error("line {line_id}: account not found: {account_id}")]
    AccountNotFound { line_id: String, account_id: String },
    #[error("line {line_id}: account {account_id} is inactive")]
    InactiveAccount { line_id: String, account_id: String },
    #[error("line {line_id}: {reason}")]
    InvalidAmount { line_id: String, reason: String },
    #[error("line {line_id}: {side:?} against {account_type:?} account {account_id} is not allowed")]
    DirectionViolation {
        line_id: String,
        account_id: String,
        account_type: AccountType,
        side: EntryType,
    },
    #[error("metadata: {problem}")]
    InvalidMetadata { problem: String },
    #[error("entry is not balanced: debits = {debits}, credits = {credits}")]
    Unbalanced {
        debits: BigDecimal,
        credits: BigDecimal,
    },
}

/// Outcome of validating one entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Default validator implementing the double-entry and direction rules
#[derive(Debug, Clone)]
pub struct EntryValidator {
    tolerance: BigDecimal,
    reductions: ReductionPolicy,
    metadata: MetadataSchema,
}

impl Default for EntryValidator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl EntryValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tolerance: config.tolerance.clone(),
            reductions: config.validation.reduction_policy(),
            metadata: config.metadata.clone(),
        }
    }

    /// Validate an entry against the chart of accounts
    pub fn validate(&self, entry: &JournalEntry, catalog: &AccountCatalog) -> ValidationReport {
        let mut errors = Vec::new();
        let zero = BigDecimal::from(0);

        if entry.lines.len() < 2 {
            errors.push(ValidationError::InsufficientLines {
                count: entry.lines.len(),
            });
        }

        let mut debits = BigDecimal::from(0);
        let mut credits = BigDecimal::from(0);

        for line in &entry.lines {
            if let Some(reason) = amount_problem(line, &zero) {
                errors.push(ValidationError::InvalidAmount {
                    line_id: line.id.clone(),
                    reason,
                });
            }

            let Some(account) = catalog.get(&line.account_id) else {
                errors.push(ValidationError::AccountNotFound {
                    line_id: line.id.clone(),
                    account_id: line.account_id.clone(),
                });
                continue;
            };

            if !account.is_active {
                errors.push(ValidationError::InactiveAccount {
                    line_id: line.id.clone(),
                    account_id: account.id.clone(),
                });
            }

            for (side, amount) in [(EntryType::Debit, &line.debit), (EntryType::Credit, &line.credit)] {
                if *amount > zero && !self.reductions.reduction_allowed(account, side) {
                    errors.push(ValidationError::DirectionViolation {
                        line_id: line.id.clone(),
                        account_id: account.id.clone(),
                        account_type: account.account_type,
                        side,
                    });
                }
            }

            debits += &line.debit;
            credits += &line.credit;
        }

        errors.extend(
            self.metadata
                .check(&entry.metadata)
                .into_iter()
                .map(|problem| ValidationError::InvalidMetadata { problem }),
        );

        if !within_tolerance(&debits, &credits, &self.tolerance) {
            errors.push(ValidationError::Unbalanced { debits, credits });
        }

        if !errors.is_empty() {
            tracing::debug!(
                entry_id = %entry.id,
                error_count = errors.len(),
                "journal entry failed validation"
            );
        }

        ValidationReport { errors }
    }
}

/// Double-entry rules no posting may skip: at least two lines, well-formed
/// amounts, known accounts and debits equal to credits within `tolerance`.
///
/// The ledger runs these alongside whatever [`JournalValidator`] it was given.
pub fn double_entry_errors(
    entry: &JournalEntry,
    catalog: &AccountCatalog,
    tolerance: &BigDecimal,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let zero = BigDecimal::from(0);

    if entry.lines.len() < 2 {
        errors.push(ValidationError::InsufficientLines {
            count: entry.lines.len(),
        });
    }

    let mut debits = BigDecimal::from(0);
    let mut credits = BigDecimal::from(0);
    for line in &entry.lines {
        if let Some(reason) = amount_problem(line, &zero) {
            errors.push(ValidationError::InvalidAmount {
                line_id: line.id.clone(),
                reason,
            });
        }
        if catalog.get(&line.account_id).is_none() {
            errors.push(ValidationError::AccountNotFound {
                line_id: line.id.clone(),
                account_id: line.account_id.clone(),
            });
            continue;
        }
        debits += &line.debit;
        credits += &line.credit;
    }

    if !within_tolerance(&debits, &credits, tolerance) {
        errors.push(ValidationError::Unbalanced { debits, credits });
    }
    errors
}

fn amount_problem(line: &LedgerLine, zero: &BigDecimal) -> Option<String> {
    if line.debit < *zero || line.credit < *zero {
        return Some("amounts cannot be negative".to_string());
    }
    match (line.debit > *zero, line.credit > *zero) {
        (true, true) => Some("a line is either a debit or a credit, not both".to_string()),
        (false, false) => Some("line amount must be non-zero".to_string()),
        _ => None,
    }
}

impl JournalValidator for EntryValidator {
    fn validate_entry(&self, entry: &JournalEntry, catalog: &AccountCatalog) -> ValidationReport {
        self.validate(entry, catalog)
    }
}

//! Validation utilities for accounts and the metadata extension point

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::*;

/// Validate that an account ID is valid
pub fn validate_account_id(account_id: &str) -> LedgerResult<()> {
    if account_id.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account ID cannot be empty".to_string(),
        ));
    }

    if account_id.len() > 50 {
        return Err(LedgerError::Validation(
            "Account ID cannot exceed 50 characters".to_string(),
        ));
    }

    if !account_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "Account ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate an account code (digits and dots, e.g. "1000" or "1000.10")
pub fn validate_account_code(code: &str) -> LedgerResult<()> {
    if code.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account code cannot be empty".to_string(),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(LedgerError::Validation(format!(
            "Account code '{}' may only contain digits and dots",
            code
        )));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Run the field checks on an account and confirm its category matches its type
pub fn validate_account(account: &Account) -> LedgerResult<()> {
    validate_account_id(&account.id)?;
    validate_account_code(&account.code)?;
    validate_account_name(&account.name)?;

    if account.category.account_type() != account.account_type {
        return Err(LedgerError::Validation(format!(
            "Account '{}' has category {:?} which does not belong to type {:?}",
            account.id, account.category, account.account_type
        )));
    }

    Ok(())
}

/// Schema for the free-form metadata maps on accounts and journal entries.
///
/// Core computations never read metadata; the schema only keeps the map tidy
/// at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSchema {
    /// Permitted keys; an empty list permits any key
    pub allowed_keys: Vec<String>,
    /// Keys that must be present
    pub required_keys: Vec<String>,
    /// Longest accepted value, in bytes
    pub max_value_length: usize,
}

impl Default for MetadataSchema {
    fn default() -> Self {
        Self {
            allowed_keys: Vec::new(),
            required_keys: Vec::new(),
            max_value_length: 256,
        }
    }
}

impl MetadataSchema {
    /// Return a description of every problem found; empty means valid
    pub fn check(&self, metadata: &HashMap<String, String>) -> Vec<String> {
        let mut problems = Vec::new();

        for key in &self.required_keys {
            if !metadata.contains_key(key) {
                problems.push(format!("missing required metadata key '{}'", key));
            }
        }

        let mut keys: Vec<&String> = metadata.keys().collect();
        keys.sort();
        for key in keys {
            if key.trim().is_empty() {
                problems.push("metadata keys cannot be empty".to_string());
                continue;
            }
            if !self.allowed_keys.is_empty() && !self.allowed_keys.contains(key) {
                problems.push(format!("metadata key '{}' is not allowed", key));
            }
            if metadata[key].len() > self.max_value_length {
                problems.push(format!(
                    "metadata value for '{}' exceeds {} bytes",
                    key, self.max_value_length
                ));
            }
        }

        problems
    }
}

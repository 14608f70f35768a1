//! Engine configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all) is
//! enough to build a working [`EngineConfig`].

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::analysis::ratios::RatioThresholds;
use crate::ledger::cache::DEFAULT_CACHE_CAPACITY;
use crate::ledger::rules::ReductionPolicy;
use crate::types::{default_tolerance, LedgerError, LedgerResult};
use crate::utils::validation::MetadataSchema;

/// Top-level configuration consumed by the ledger and its components
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest difference still treated as equal (defaults to 0.01)
    pub tolerance: BigDecimal,
    /// Journal entry validation rules
    pub validation: ValidationConfig,
    /// Allowed metadata keys on accounts and entries
    pub metadata: MetadataSchema,
    /// Band thresholds used when classifying ratios
    pub ratio_thresholds: RatioThresholds,
    /// Most `(account, period)` balances the ledger keeps cached
    pub balance_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            validation: ValidationConfig::default(),
            metadata: MetadataSchema::default(),
            ratio_thresholds: RatioThresholds::default(),
            balance_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> LedgerResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot express
    pub fn validate(&self) -> LedgerResult<()> {
        if self.tolerance < BigDecimal::from(0) {
            return Err(LedgerError::Config(format!(
                "tolerance must not be negative, got {}",
                self.tolerance
            )));
        }
        self.ratio_thresholds.validate()
    }

    /// Allow reductions on the given account in addition to the configured ones
    pub fn allow_reduction(mut self, account_id: impl Into<String>) -> Self {
        self.validation
            .reduction_allowed_accounts
            .push(account_id.into());
        self
    }
}

/// Rules applied by the entry validator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// When false, credits to assets and debits to liabilities are never flagged
    pub enforce_direction_rules: bool,
    /// Account ids that may be reduced on their restricted side
    pub reduction_allowed_accounts: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_direction_rules: true,
            reduction_allowed_accounts: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Build the reduction policy described by this configuration
    pub fn reduction_policy(&self) -> ReductionPolicy {
        if self.enforce_direction_rules {
            ReductionPolicy::strict(self.reduction_allowed_accounts.iter().cloned())
        } else {
            ReductionPolicy::permissive()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config.tolerance, default_tolerance());
        assert!(config.validation.enforce_direction_rules);
        assert!(config.validation.reduction_allowed_accounts.is_empty());
    }

    #[test]
    fn test_partial_document() {
        let config = EngineConfig::from_json(
            r#"{
                "tolerance": "0.05",
                "validation": { "reduction_allowed_accounts": ["cash", "bank"] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.tolerance, "0.05".parse::<BigDecimal>().unwrap());
        assert!(config.validation.enforce_direction_rules);
        assert_eq!(config.validation.reduction_allowed_accounts.len(), 2);
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let result = EngineConfig::from_json(r#"{ "tolerance": "-1" }"#);
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(LedgerError::Config(_))
        ));
    }
}

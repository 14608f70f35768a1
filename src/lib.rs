//! # Ledger Engine
//!
//! Double-entry ledger integrity and financial statement engine.
//!
//! ## Features
//!
//! - **Journal validation**: every rule is checked and all failures are reported together
//! - **Balances**: recomputed from posted entries for any date window, with a targeted cache
//! - **Statements**: balance sheet, income statement, indirect cash flow and trial balance
//! - **Reconciliation**: greedy matching of bank statement lines against ledger lines
//! - **Analysis**: liquidity, profitability, efficiency and leverage ratios with bands
//! - **Tax**: taxable income and progressive bracket liability
//! - **Storage abstraction**: the ledger reads and appends through the [`LedgerStore`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_engine::{patterns, EngineConfig, Ledger, MemoryStore, Period};
//! use ledger_engine::ledger::account::utils::standard_chart;
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let config = EngineConfig::default().allow_reduction("cash");
//!     let ledger = Ledger::with_config(MemoryStore::with_accounts(standard_chart()), config);
//!
//!     let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//!     let sale = patterns::sale("je-1", date, "Pump 2 shift", "cash", "fuel_sales", BigDecimal::from(500));
//!     ledger.post_entry(sale).await.unwrap();
//!
//!     let cash = ledger.account_balance("cash", &Period::through(date)).await.unwrap();
//!     assert_eq!(cash, BigDecimal::from(500));
//! });
//! ```

pub mod analysis;
pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use analysis::*;
pub use config::*;
pub use ledger::*;
pub use reconciliation::*;
pub use reports::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStore;

//! Ledger module containing the chart of accounts, journal validation and balances

pub mod account;
pub mod balance;
pub mod cache;
pub mod core;
pub mod journal;
pub mod rules;
pub mod validator;

pub use account::*;
pub use balance::*;
pub use cache::*;
pub use self::core::*;
pub use journal::*;
pub use rules::*;
pub use validator::*;

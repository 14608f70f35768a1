//! Financial statements: balance sheet, income statement, cash flow and trial balance

pub mod generator;
pub mod types;

pub use generator::*;
pub use types::*;

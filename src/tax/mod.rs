//! Income tax computation

pub mod income;

pub use income::*;

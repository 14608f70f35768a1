//! Statement analysis

pub mod ratios;

pub use ratios::*;

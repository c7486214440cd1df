//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod enriched;
pub mod error;
pub mod metrics;
pub mod price;
pub mod returns;
pub mod signal;
pub mod strategy;
pub mod trade;
pub mod validation;

//! Core domain types and logic.

pub mod price;
pub mod frame;
pub mod resample;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod universe;
pub mod config_validation;
pub mod error;

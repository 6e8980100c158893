//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod series;
pub mod trend;
pub mod forecast;
pub mod analysis;
pub mod service;
pub mod error;

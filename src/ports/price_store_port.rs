//! Flat price record store port trait.

use crate::domain::error::TickercastError;
use crate::domain::ohlcv::RawRow;

/// A single-symbol table of daily rows, read and rewritten wholesale.
pub trait PriceStorePort {
    /// Create an empty (header-only) store if none exists yet.
    fn ensure_exists(&self) -> Result<(), TickercastError>;

    /// Every row in the store, in file order.
    fn load_rows(&self) -> Result<Vec<RawRow>, TickercastError>;

    /// Replace the whole store with `rows`, written in ascending date order.
    fn replace(&self, rows: &[RawRow]) -> Result<(), TickercastError>;
}

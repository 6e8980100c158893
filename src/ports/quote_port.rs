//! Remote daily quote source port trait.

use crate::domain::error::FetchError;
use crate::domain::ohlcv::RawRow;

pub trait QuotePort {
    /// The provider's recent window of daily bars for `symbol`, ascending by date.
    fn fetch_daily(&self, symbol: &str) -> Result<Vec<RawRow>, FetchError>;
}

//! Daily OHLCV records: raw string cells and typed bars.

use chrono::NaiveDate;

/// One row exactly as it appears in a store or a quote response.
///
/// Cells are kept as text so that parsing (and dropping) happens in one place,
/// during series preparation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl RawRow {
    pub fn new(
        date: impl Into<String>,
        open: impl Into<String>,
        high: impl Into<String>,
        low: impl Into<String>,
        close: impl Into<String>,
        volume: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume: volume.into(),
        }
    }
}

/// A typed daily bar. Close is always present; other fields may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// Calendar days between this bar and `origin`.
    pub fn day_offset(&self, origin: NaiveDate) -> i64 {
        day_offset(self.date, origin)
    }
}

/// Integer count of calendar days from `origin` to `date`.
pub fn day_offset(date: NaiveDate, origin: NaiveDate) -> i64 {
    (date - origin).num_days()
}

//! Rolling statistics over a date-ordered bar slice.
//!
//! - `IndicatorPoint`: one point of an indicator series, flagged invalid during warmup
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values, with explicit backward fill

pub mod daily_return;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    SampleStddev(usize),
    DailyReturn,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Index of the first point with a full window, if any.
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }

    /// Values with the warmup region replaced by the first valid value.
    ///
    /// Warmup points before the first full window take that window's value.
    /// Invalid points after it stay missing. With no valid point at all every
    /// entry is `None`.
    pub fn backfilled(&self) -> Vec<Option<f64>> {
        let Some(first) = self.first_valid() else {
            return vec![None; self.values.len()];
        };
        let seed = self.values[first].value;

        self.values
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i < first {
                    Some(seed)
                } else if p.valid {
                    Some(p.value)
                } else {
                    None
                }
            })
            .collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::SampleStddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::DailyReturn => write!(f, "RETURN"),
        }
    }
}

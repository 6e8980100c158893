//! Fractional close-to-close change.
//!
//! RETURN[i] = (C[i] - C[i-1]) / C[i-1]
//! RETURN[0] = 0, and a zero previous close gives 0.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_daily_return(bars: &[Bar]) -> IndicatorSeries {
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = if i == 0 {
                0.0
            } else {
                let prev_close = bars[i - 1].close;
                if prev_close == 0.0 {
                    0.0
                } else {
                    (bar.close - prev_close) / prev_close
                }
            };
            IndicatorPoint {
                date: bar.date,
                valid: true,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::DailyReturn,
        values,
    }
}

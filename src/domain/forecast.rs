//! Forecaster: project a fitted trend over future calendar days.

use chrono::{Days, NaiveDate};

use crate::domain::ohlcv::day_offset;
use crate::domain::series::PreparedSeries;
use crate::domain::trend::TrendModel;

/// Horizon served by the forecast view.
pub const DEFAULT_HORIZON_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_close: f64,
}

/// Predicted closes for the `horizon_days` calendar days after the last bar.
///
/// Weekends and holidays are not skipped. An empty series, or a zero
/// horizon, gives an empty forecast.
pub fn predict(model: &TrendModel, series: &PreparedSeries, horizon_days: usize) -> Vec<ForecastPoint> {
    let (Some(origin), Some(anchor)) = (series.min_date(), series.max_date()) else {
        return Vec::new();
    };

    (1..=horizon_days as u64)
        .map_while(|step| anchor.checked_add_days(Days::new(step)))
        .map(|date| ForecastPoint {
            date,
            predicted_close: model.predict_at(day_offset(date, origin) as f64),
        })
        .collect()
}

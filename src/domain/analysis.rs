//! Analysis state and the read-only query views over it.

use chrono::NaiveDate;

use crate::domain::forecast::{self, ForecastPoint, DEFAULT_HORIZON_DAYS};
use crate::domain::series::PreparedSeries;
use crate::domain::trend::TrendModel;

/// Bars returned by the recent window view.
pub const RECENT_WINDOW: usize = 7;

/// Lifecycle of the analysis pipeline.
///
/// `Loaded` holds a series the model was not fitted on, which only happens
/// when the series is empty. Series and model always change together.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisState {
    #[default]
    Uninitialized,
    Loaded(PreparedSeries),
    Ready {
        series: PreparedSeries,
        model: TrendModel,
    },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub moving_average_5: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecentPoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl AnalysisState {
    /// Build the next state from a freshly prepared series, fitting when possible.
    pub fn from_series(series: PreparedSeries) -> Self {
        match TrendModel::fit(&series) {
            Some(model) => Self::Ready { series, model },
            None => Self::Loaded(series),
        }
    }

    pub fn series(&self) -> Option<&PreparedSeries> {
        match self {
            Self::Uninitialized => None,
            Self::Loaded(series) | Self::Ready { series, .. } => Some(series),
        }
    }

    pub fn model(&self) -> Option<&TrendModel> {
        match self {
            Self::Ready { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Date, close, and 5-bar moving average for every bar.
    pub fn historical(&self) -> Vec<HistoricalPoint> {
        self.series()
            .map(|series| {
                series
                    .bars()
                    .iter()
                    .map(|b| HistoricalPoint {
                        date: b.bar.date,
                        close: b.bar.close,
                        moving_average_5: b.moving_average_5,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The last [`RECENT_WINDOW`] bars, oldest first.
    pub fn recent_window(&self) -> Vec<RecentPoint> {
        let Some(series) = self.series() else {
            return Vec::new();
        };
        let bars = series.bars();
        let start = bars.len().saturating_sub(RECENT_WINDOW);
        bars[start..]
            .iter()
            .map(|b| RecentPoint {
                date: b.bar.date,
                close: b.bar.close,
            })
            .collect()
    }

    /// Forecast over `horizon_days`; empty unless a model is fitted.
    pub fn forecast(&self, horizon_days: usize) -> Vec<ForecastPoint> {
        match self {
            Self::Ready { series, model } => forecast::predict(model, series, horizon_days),
            _ => Vec::new(),
        }
    }

    /// Forecast over the default seven-day horizon.
    pub fn forecast_view(&self) -> Vec<ForecastPoint> {
        self.forecast(DEFAULT_HORIZON_DAYS)
    }
}

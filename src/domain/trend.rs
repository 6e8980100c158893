//! Trend model: ordinary least squares of close on day offset.
//!
//! close ≈ intercept + slope * day_offset, where day_offset counts calendar days
//! from the series' earliest date. Offsets are recomputed from the series on
//! every fit, never stored on the bars.

use tracing::{info, warn};

use crate::domain::series::PreparedSeries;

const SINGULAR_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination over the fitted points.
    pub r_squared: f64,
    pub observations: usize,
}

impl TrendModel {
    /// Fit over the series, or `None` when the series is empty.
    ///
    /// A degenerate design (one bar, or every bar on the same date) has no
    /// unique slope; the model is then flat at the mean close.
    pub fn fit(series: &PreparedSeries) -> Option<Self> {
        let points = series.offsets_and_closes();
        if points.is_empty() {
            warn!("no data to train the model");
            return None;
        }

        let model = fit_points(&points);
        info!(
            slope = model.slope,
            intercept = model.intercept,
            r_squared = model.r_squared,
            observations = model.observations,
            "model trained"
        );
        Some(model)
    }

    pub fn predict_at(&self, day_offset: f64) -> f64 {
        self.intercept + self.slope * day_offset
    }
}

fn fit_points(points: &[(f64, f64)]) -> TrendModel {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    // centred sums keep large offsets well conditioned
    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = if sxx.abs() < SINGULAR_EPSILON {
        0.0
    } else {
        sxy / sxx
    };
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = if ss_tot > SINGULAR_EPSILON {
        1.0 - ss_res / ss_tot
    } else {
        1.0
    };

    TrendModel {
        slope,
        intercept,
        r_squared,
        observations: points.len(),
    }
}

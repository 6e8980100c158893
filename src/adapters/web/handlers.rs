//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use askama::Template;
use std::sync::Arc;

use crate::domain::analysis::{HistoricalPoint, RecentPoint};
use crate::domain::forecast::ForecastPoint;
use crate::domain::trend::TrendModel;

use super::{AppState, WebError};

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let snapshot = state.service.snapshot();
    let last = snapshot.series().and_then(|s| s.last());
    let template = super::templates::DashboardTemplate {
        symbol: state.service.symbol(),
        bars: snapshot.series().map_or(0, |s| s.len()),
        last_date: last
            .map(|b| b.bar.date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        last_close: last.map(|b| b.bar.close),
    };
    let html = template
        .render()
        .map_err(|e| WebError::internal(e.to_string()))?;
    Ok(Html(html).into_response())
}

pub async fn historical(State(state): State<Arc<AppState>>) -> Json<Vec<HistoricalPoint>> {
    Json(state.service.snapshot().historical())
}

pub async fn recent_window(State(state): State<Arc<AppState>>) -> Json<Vec<RecentPoint>> {
    Json(state.service.snapshot().recent_window())
}

pub async fn predict(State(state): State<Arc<AppState>>) -> Json<Vec<ForecastPoint>> {
    Json(state.service.snapshot().forecast_view())
}

pub async fn model_summary(State(state): State<Arc<AppState>>) -> Json<Option<TrendModel>> {
    Json(state.service.snapshot().model().copied())
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let service = Arc::clone(&state.service);
    let report = tokio::task::spawn_blocking(move || service.refresh())
        .await
        .map_err(|e| WebError::internal(format!("refresh task failed: {e}")))??;

    Ok(Json(serde_json::json!({
        "message": "Data updated successfully!",
        "bars": report.prepared,
        "model_fitted": report.model_fitted,
    }))
    .into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}

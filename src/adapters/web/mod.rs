//! Web server adapter.
//!
//! Axum router serving the analysis views as JSON, plus a small dashboard page.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::service::AnalysisService;

pub struct AppState {
    pub service: Arc<AnalysisService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/data", get(handlers::historical))
        .route("/previous-7-days", get(handlers::recent_window))
        .route("/predict", get(handlers::predict))
        .route("/model", get(handlers::model_summary))
        .route("/fetch-data", get(handlers::refresh))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

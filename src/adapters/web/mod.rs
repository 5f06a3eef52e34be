//! HTTP JSON API adapter.
//!
//! Axum router exposing the backtest, reversal, snapshot and volume-trend
//! pipelines. Handlers parse the request body themselves so that missing
//! keys and malformed JSON get the API's own error bodies.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::analysis::SharedDataPort;
use crate::ports::config_port::ConfigPort;

pub struct AppState {
    pub data_port: Arc<SharedDataPort>,
    /// Supplies request defaults (the `[reversal]` section).
    pub config: Arc<dyn ConfigPort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/backtest", post(handlers::backtest))
        .route("/api/reversal", get(handlers::reversal))
        .route("/get_stock_data", post(handlers::stock_data))
        .route("/api/volume_trend", post(handlers::volume_trend))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

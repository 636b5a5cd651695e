pub mod handlers;

pub use handlers::{health_check, reconcile, ReconcileResponse};

use crate::config::AppConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 路由
pub fn router(config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reconcile", post(reconcile))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .with_state(Arc::new(config.reconcile.clone()))
}

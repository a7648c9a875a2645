use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::dashboards::d100_sales_returns::DatasetCache;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DatasetCache>,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D100 SALES & RETURNS DASHBOARD
        // ========================================
        .route(
            "/api/d100/dashboard",
            post(handlers::d100_sales_returns::get_dashboard),
        )
        .route(
            "/api/d100/filter_options",
            get(handlers::d100_sales_returns::get_filter_options),
        )
        .route(
            "/api/d100/reload",
            post(handlers::d100_sales_returns::reload),
        )
        .with_state(state)
}

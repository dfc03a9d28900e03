//! clocker-server library
//!
//! JSON API under `/api/v1` (including the view data for the pages), the
//! static pages and a health endpoint.

use std::sync::Arc;

use axum::Router;
use clocker_common::holidays::FederalState;
use clocker_common::{Calendar, StatisticsConfig, StatisticsService};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub calendar: Calendar,
    pub statistics: Arc<StatisticsService>,
}

impl AppState {
    pub fn new(db: SqlitePool, holiday_state: FederalState, statistics: StatisticsConfig) -> Self {
        Self {
            calendar: Calendar::new(db, holiday_state),
            statistics: Arc::new(StatisticsService::new(statistics)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::api_routes())
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

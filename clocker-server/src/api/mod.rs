//! HTTP API handlers for clocker-server

pub mod entries;
pub mod health;
pub mod statistics;
pub mod ui;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use health::health_routes;
pub use ui::ui_routes;

/// Routes nested under `/api/v1`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(entries::list_entries))
        .route(
            "/entries/batch/vacation/preview",
            get(entries::preview_vacation),
        )
        .route("/entries/batch/vacation", post(entries::create_vacation))
        .route(
            "/entries/:date",
            get(entries::get_entry)
                .post(entries::create_entry)
                .patch(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route("/entries/:date/copy", post(entries::copy_entry))
        .route("/statistics", get(statistics::get_statistics))
        .route("/views/month", get(views::month_view))
        .route("/views/entries/:date", get(views::entry_view))
        .route("/views/year", get(views::year_view))
}

//! UI serving routes
//!
//! Pages are static HTML; each one reads its parameters from the URL and
//! loads the matching view data from `/api/v1/views`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::AppState;

const CALENDAR_HTML: &str = include_str!("../ui/calendar.html");
const ENTRY_HTML: &str = include_str!("../ui/entry.html");
const STATISTICS_HTML: &str = include_str!("../ui/statistics.html");
const APP_JS: &str = include_str!("../ui/app.js");
const STYLE_CSS: &str = include_str!("../ui/style.css");

/// GET /
pub async fn serve_root() -> Redirect {
    Redirect::temporary("/calendar/view")
}

/// GET /calendar/view, /calendar/:year/:month/view
pub async fn serve_calendar() -> Html<&'static str> {
    Html(CALENDAR_HTML)
}

/// GET /entries/:date/view
pub async fn serve_entry() -> Html<&'static str> {
    Html(ENTRY_HTML)
}

/// GET /statistics/view, /statistics/:year/view
pub async fn serve_statistics() -> Html<&'static str> {
    Html(STATISTICS_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /static/style.css
pub async fn serve_style_css() -> Response {
    (StatusCode::OK, [("content-type", "text/css")], STYLE_CSS).into_response()
}

/// Build page and asset routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_root))
        .route("/calendar/view", get(serve_calendar))
        .route("/calendar/:year/:month/view", get(serve_calendar))
        .route("/entries/:date/view", get(serve_entry))
        .route("/statistics/view", get(serve_statistics))
        .route("/statistics/:year/view", get(serve_statistics))
        .route("/static/app.js", get(serve_app_js))
        .route("/static/style.css", get(serve_style_css))
}

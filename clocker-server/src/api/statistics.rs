//! Yearly statistics endpoint
//!
//! Responses use a `{success, data, message}` envelope; failures become
//! `{success: false, error: {code, message}}`.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, NaiveDate};
use clocker_common::statistics::Statistics;
use clocker_common::time::today;
use clocker_common::CalendarEntry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsMetadata {
    pub year: i32,
    pub total_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct StatisticsData {
    pub entries: BTreeMap<NaiveDate, CalendarEntry>,
    pub statistics: Statistics,
    pub metadata: StatisticsMetadata,
}

#[derive(Debug, Serialize)]
pub struct StatisticsEnvelope {
    pub success: bool,
    pub data: StatisticsData,
    pub message: String,
}

/// GET /api/v1/statistics?year=
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Response {
    let year = query.year.unwrap_or_else(|| today().year());

    match collect(&state, year).await {
        Ok(data) => {
            debug!("Statistics for {}: {} entries", year, data.metadata.total_entries);
            Json(StatisticsEnvelope {
                success: true,
                data,
                message: format!("Successfully retrieved statistics for {}", year),
            })
            .into_response()
        }
        Err(err) => failure(err),
    }
}

async fn collect(state: &AppState, year: i32) -> Result<StatisticsData, ApiError> {
    let entries = state.calendar.get_year(year).await?;
    let statistics = state.statistics.calculate_statistics(entries.values());

    Ok(StatisticsData {
        metadata: StatisticsMetadata {
            year,
            total_entries: entries.len(),
        },
        statistics,
        entries,
    })
}

fn failure(err: ApiError) -> Response {
    let (status, code, message) = err.parts();
    let code = if status.is_server_error() {
        error!("Failed to calculate statistics: {}", message);
        "SERVER_ERROR"
    } else {
        code
    };

    let body = Json(json!({
        "success": false,
        "error": {
            "code": code,
            "message": message,
        }
    }));
    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_failure_envelope_for_server_errors() {
        let err = clocker_common::Error::Internal("database unavailable".into());
        let response = failure(ApiError::from(err));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "SERVER_ERROR");
        assert_eq!(body["error"]["message"], "Internal error: database unavailable");
    }

    #[test]
    fn test_failure_keeps_client_error_status() {
        let response = failure(ApiError::BadRequest("Invalid year: 0".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

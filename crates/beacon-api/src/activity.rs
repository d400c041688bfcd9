use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};

use beacon_types::Category;
use beacon_types::api::ActivityResponse;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// `GET /activity`: newest activity entries first.
pub async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let limit = query.limit.min(200);

    // Run the blocking query off the async runtime
    let rows = tokio::task::spawn_blocking(move || db.recent_activity(limit))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("Failed to load activity: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let entries: Vec<ActivityResponse> = rows
        .into_iter()
        .filter_map(|row| {
            let category = match row.category.parse::<Category>() {
                Ok(category) => category,
                Err(e) => {
                    warn!("Skipping activity '{}': {}", row.id, e);
                    return None;
                }
            };
            let created_at = row
                .created_at
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|e| {
                    warn!("Corrupt created_at '{}' on activity '{}': {}", row.created_at, row.id, e);
                    chrono::DateTime::default()
                });

            Some(ActivityResponse {
                id: row.id,
                category,
                title: row.title,
                message: row.message,
                created_at,
            })
        })
        .collect();

    Ok(Json(entries))
}

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::warn;

use beacon_types::api::{HealthResponse, NotifyRequest, NotifyResponse};

use crate::state::AppState;

/// `POST /notify`: broadcast a domain event to every connected client.
///
/// Responds 202: the broadcast is best-effort and the count is diagnostic.
pub async fn send_notification(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.title.trim().is_empty() {
        warn!("Rejected notification with empty title");
        return Err(StatusCode::BAD_REQUEST);
    }

    let delivered = state.notifier.notify(req);

    Ok((StatusCode::ACCEPTED, Json(NotifyResponse { delivered })))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.registry().len(),
    })
}

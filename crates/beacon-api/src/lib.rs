pub mod activity;
pub mod notify;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};

pub use state::{AppState, AppStateInner};

/// HTTP surface for domain services: trigger a broadcast, read the activity
/// feed, check health.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/notify", post(notify::send_notification))
        .route("/activity", get(activity::recent_activity))
        .route("/health", get(notify::health))
        .with_state(state)
}

pub mod config;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use beacon_api::AppState;
use beacon_gateway::ConnectionRegistry;
use beacon_gateway::connection;

pub use config::ServerConfig;

/// Full HTTP + WebSocket surface: the API routes plus `GET /ws`.
pub fn build_router(state: AppState) -> Router {
    let ws_route = Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(state.registry().clone());

    Router::new()
        .merge(beacon_api::router(state))
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn ws_upgrade(
    State(registry): State<ConnectionRegistry>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_connection(socket, registry))
}

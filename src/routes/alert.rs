use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::alert::AlertOutcome;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/alert", get(handler))
}

/// Ask the decision endpoint for a fresh verdict on every call.
async fn handler(State(state): State<AppState>) -> Json<AlertOutcome> {
    // ---
    info!("GET /alert - querying {}", state.alerts.url());
    Json(state.alerts.evaluate().await)
}

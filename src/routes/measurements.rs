use axum::{extract::Query, extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use super::AppState;
use crate::decoder;
use crate::models::{MeasurementRecord, RemoteObject};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/measurements", get(handler))
}

/// Query parameters for `GET /measurements`
#[derive(Debug, Deserialize)]
pub struct MeasurementsQuery {
    /// Full object path as returned by `/intervals`, e.g. `daily/<file>.csv`
    path: String,
}

/// Download one measurement file and return its decoded rows.
///
/// A failed download yields an empty list; the cause is only logged.
async fn handler(
    Query(params): Query<MeasurementsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!("GET /measurements - {}", params.path);

    let object = RemoteObject::from_full_path(params.path);
    let records: Vec<MeasurementRecord> = match state.store.read(&object).await {
        Ok(content) => decoder::decode(&content, &state.dates),
        Err(e) => {
            error!("Failed to download '{}': {}", object.full_path, e);
            Vec::new()
        }
    };

    info!("Returning {} measurements", records.len());
    Json(records)
}

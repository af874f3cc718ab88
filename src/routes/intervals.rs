use std::collections::BTreeMap;

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::Utc;
use tracing::{debug, info};

use super::AppState;
use crate::catalog::build_catalog;
use crate::models::{IntervalBucket, ProjectedObject};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/intervals", get(all_handler))
        .route("/intervals/{interval}", get(handler))
}

/// `GET /intervals/{interval}`: one bucket, in catalog order.
async fn handler(Path(interval): Path<String>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let Some(bucket) = IntervalBucket::from_prefix(&interval) else {
        debug!("GET /intervals/{} - unknown interval", interval);
        return (StatusCode::NOT_FOUND, Json("Unknown interval")).into_response();
    };

    info!("GET /intervals/{} - building catalog", bucket);
    let catalog = build_catalog(state.store.clone(), &state.dates, Utc::now()).await;
    let projected = catalog.project(bucket, &state.dates);

    info!("Returning {} {} objects", projected.len(), bucket);
    (StatusCode::OK, Json(projected)).into_response()
}

/// `GET /intervals`: every bucket from a single catalog pass.
async fn all_handler(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    info!("GET /intervals - building catalog");
    let catalog = build_catalog(state.store.clone(), &state.dates, Utc::now()).await;

    let buckets: BTreeMap<&'static str, Vec<ProjectedObject>> = IntervalBucket::ALL
        .into_iter()
        .map(|bucket| (bucket.as_str(), catalog.project(bucket, &state.dates)))
        .collect();

    (StatusCode::OK, Json(buckets))
}

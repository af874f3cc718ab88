//! HTTP API gateway.
//!
//! Each sibling module exports a subrouter; this gateway merges them and
//! attaches the shared state, so `main.rs` never sees individual endpoints.

use std::sync::Arc;

use axum::Router;

use crate::alert::AlertClient;
use crate::dates::DateConfig;
use crate::store::ObjectStore;

mod alert;
mod health;
mod intervals;
mod measurements;

// ---

/// State shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub dates: DateConfig,
    pub alerts: AlertClient,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(intervals::router())
        .merge(measurements::router())
        .merge(alert::router())
        .merge(health::router())
        .with_state(state)
}

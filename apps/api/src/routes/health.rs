use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and the active risk profile.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let profile = state.engine.profile();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "carebridge-api",
        "profile": profile.name,
        "profile_version": profile.version,
        "explainer": state.explainer.backend()
    }))
}

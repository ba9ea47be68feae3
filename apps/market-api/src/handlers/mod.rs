//! # HTTP Handlers
//!
//! One module per resource; DTOs live next to the handlers that use them.
//! Handlers validate input, call repositories, and shape responses - no SQL
//! and no business rules here.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

pub mod auth;
pub mod orders;
pub mod products;
pub mod settings;
pub mod tags;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Liveness endpoint.
/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = if state.db.health_check().await {
        "up"
    } else {
        "down"
    };

    Json(HealthResponse {
        status: "ok",
        database,
    })
}

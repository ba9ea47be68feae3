//! Tag Handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use market_core::{validation, Tag};

/// GET /api/tags and GET /api/admin/tags - all tags ordered by name.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    let tags = state.db.tags().list().await?;
    Ok(Json(tags))
}

/// GET /api/admin/tags/{id}
pub async fn admin_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Tag>> {
    let tag = state
        .db
        .tags()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag", id))?;
    Ok(Json(tag))
}

#[derive(Debug, Deserialize)]
pub struct TagCreateRequest {
    pub name: String,
}

/// POST /api/admin/tags
pub async fn admin_create(
    State(state): State<AppState>,
    Json(payload): Json<TagCreateRequest>,
) -> ApiResult<Json<Tag>> {
    let name = validation::validate_tag_name(&payload.name)?;
    let tag = state.db.tags().create(&name).await?;
    Ok(Json(tag))
}

/// DELETE /api/admin/tags/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<bool>> {
    state.db.tags().delete(id).await?;
    Ok(Json(true))
}

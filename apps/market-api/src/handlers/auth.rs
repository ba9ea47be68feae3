//! Admin Authentication Handlers

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentAdmin;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use market_db::repository::admin_user::verify_password;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminInfo,
}

/// POST /api/admin/login - exchange credentials for a bearer token.
///
/// The response never distinguishes "unknown user" from "wrong password".
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .db
        .admin_users()
        .find_by_username(payload.username.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    let token = state.jwt.generate_token(&user.username)?;

    info!(username = %user.username, "Admin logged in");

    Ok(Json(LoginResponse {
        token,
        user: AdminInfo {
            id: user.id,
            username: user.username,
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub username: String,
}

/// GET /api/admin/me - echo the authenticated identity.
pub async fn me(Extension(admin): Extension<CurrentAdmin>) -> Json<MeResponse> {
    Json(MeResponse {
        authenticated: true,
        username: admin.username,
    })
}

//! Shop Settings Handlers
//!
//! The admin view over the singleton settings row. Updates invalidate the
//! process-local cache, so the next read (from any handler) is fresh.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;
use market_core::ShopSettings;
use market_db::SettingsPatch;

/// GET /api/admin/settings
pub async fn admin_get(State(state): State<AppState>) -> ApiResult<Json<ShopSettings>> {
    let settings = state.db.settings().get_or_create().await?;
    Ok(Json(settings))
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdateRequest {
    pub line_oa_id: Option<String>,
    pub bank_name_code: Option<String>,
    pub bank_account: Option<String>,
}

/// PATCH /api/admin/settings - partial update.
pub async fn admin_update(
    State(state): State<AppState>,
    Json(payload): Json<SettingsUpdateRequest>,
) -> ApiResult<Json<ShopSettings>> {
    let updated = state
        .db
        .settings()
        .update(SettingsPatch {
            line_oa_id: payload.line_oa_id,
            bank_name_code: payload.bank_name_code,
            bank_account: payload.bank_account,
        })
        .await?;

    info!("Shop settings updated");

    Ok(Json(updated))
}

//! Order Handlers
//!
//! Order placement, listing/detail, and the admin status update. Order
//! responses are enriched with the shop's transfer instructions and LINE
//! contact links, built from the cached settings row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use market_core::{validation, OrderItem, OrderLine, OrderStatus, ShopSettings};
use market_db::{OrderDraft, OrderWithItems};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderCreateRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_store_address: String,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// Substring match over order_no and customer phone.
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i64,
    pub order_no: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_store_address: String,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(value: OrderWithItems) -> Self {
        let order = value.order;
        OrderResponse {
            id: order.id,
            order_no: order.order_no,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            pickup_store_address: order.pickup_store_address,
            total_cents: order.total_cents,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: value.items,
        }
    }
}

/// Bank-transfer instructions attached to order responses.
#[derive(Debug, Serialize)]
pub struct TransferInfo {
    pub bank_name_code: String,
    pub bank_account: String,
    pub amount: i64,
}

/// LINE contact links attached to order responses.
#[derive(Debug, Serialize)]
pub struct LineInfo {
    pub oa_id: String,
    pub chat_url: String,
    pub add_friend_url: String,
}

/// An order enriched with payment/contact metadata.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub transfer: TransferInfo,
    pub line: LineInfo,
}

fn line_chat_url(oa_id: &str) -> String {
    format!("https://line.me/R/ti/p/{}", oa_id)
}

fn with_extras(order: OrderResponse, settings: ShopSettings) -> OrderDetailResponse {
    let chat_url = line_chat_url(&settings.line_oa_id);
    let transfer = TransferInfo {
        bank_name_code: settings.bank_name_code,
        bank_account: settings.bank_account,
        amount: order.total_cents,
    };
    let line = LineInfo {
        oa_id: settings.line_oa_id,
        add_friend_url: chat_url.clone(),
        chat_url,
    };

    OrderDetailResponse {
        order,
        transfer,
        line,
    }
}

// =============================================================================
// Public Handlers
// =============================================================================

/// POST /api/orders/create - place an order.
///
/// 201 with the order plus transfer/line extras; 400 on validation failure
/// or missing/inactive products; 500 if order-number generation exhausts.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<OrderCreateRequest>,
) -> ApiResult<(StatusCode, Json<OrderDetailResponse>)> {
    let draft = OrderDraft {
        customer_name: validation::validate_customer_name(&payload.customer_name)?,
        customer_phone: validation::validate_customer_phone(&payload.customer_phone)?,
        pickup_store_address: validation::validate_pickup_address(&payload.pickup_store_address)?,
    };
    validation::validate_order_lines(&payload.items)?;

    let created = state
        .db
        .orders()
        .create(
            draft,
            &payload.items,
            &*state.order_no,
            state.order_no_attempts,
        )
        .await?;

    let settings = state.db.settings().get_or_create().await?;

    Ok((
        StatusCode::CREATED,
        Json(with_extras(created.into(), settings)),
    ))
}

/// GET /api/orders - orders newest-first, with optional search.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = state.db.orders().list(query.search.as_deref()).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /api/orders/{order_no} - order detail with extras.
pub async fn detail(
    State(state): State<AppState>,
    Path(order_no): Path<String>,
) -> ApiResult<Json<OrderDetailResponse>> {
    let order = state
        .db
        .orders()
        .get_by_order_no(&order_no)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_no))?;

    let settings = state.db.settings().get_or_create().await?;
    Ok(Json(with_extras(order.into(), settings)))
}

// =============================================================================
// Admin Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: String,
}

/// PATCH /api/admin/orders/{order_no} - update the status, nothing else.
///
/// Any value outside NEW/CONFIRMED/CANCELLED is a 400; an unknown order_no
/// is a 404.
pub async fn admin_update_status(
    State(state): State<AppState>,
    Path(order_no): Path<String>,
    Json(payload): Json<OrderStatusRequest>,
) -> ApiResult<Json<OrderDetailResponse>> {
    let status = OrderStatus::parse(payload.status.trim())?;

    let orders = state.db.orders();
    orders.update_status(&order_no, status).await?;

    let order = orders
        .get_by_order_no(&order_no)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_no))?;

    let settings = state.db.settings().get_or_create().await?;
    Ok(Json(with_extras(order.into(), settings)))
}

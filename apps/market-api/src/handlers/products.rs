//! Product Handlers
//!
//! Public listing/detail (active products only) and the admin CRUD surface.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use market_core::{validation, ProductVariant, Tag};
use market_db::{NewProduct, NewVariant, ProductDetail, ProductFilter, ProductUpdate};

// =============================================================================
// DTOs
// =============================================================================

/// Product as served to clients: the row plus tags, variants, and the
/// derived `has_variants` flag.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    pub has_variants: bool,
    pub image_url: String,
    pub description: String,
    pub tags: Vec<Tag>,
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDetail> for ProductResponse {
    fn from(detail: ProductDetail) -> Self {
        ProductResponse {
            id: detail.product.id,
            name: detail.product.name,
            price_cents: detail.product.price_cents,
            is_active: detail.product.is_active,
            has_variants: !detail.variants.is_empty(),
            image_url: detail.product.image_url,
            description: detail.product.description,
            tags: detail.tags,
            variants: detail.variants,
            created_at: detail.product.created_at,
            updated_at: detail.product.updated_at,
        }
    }
}

/// Query parameters of the product listings.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Comma-separated tag names; products carrying any of them match.
    pub tags: Option<String>,
    /// Substring match over name and description.
    pub search: Option<String>,
}

impl ProductListQuery {
    fn into_filter(self, active_only: bool) -> ProductFilter {
        let tag_names = self
            .tags
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        ProductFilter {
            tag_names,
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            active_only,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct VariantInput {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i64,
}

impl VariantInput {
    fn into_new(self) -> ApiResult<NewVariant> {
        let name = validation::validate_tag_name(&self.name)?;
        validation::validate_price_cents(self.price_cents)?;

        Ok(NewVariant {
            name,
            price_cents: self.price_cents,
            image_url: self.image_url,
            is_active: self.is_active,
            sort_order: self.sort_order,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    pub price_cents: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag_names: Vec<String>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

#[derive(Debug, Deserialize)]
pub struct ProductUpdateRequest {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tag_names: Option<Vec<String>>,
    pub variants: Option<Vec<VariantInput>>,
}

// =============================================================================
// Public Handlers
// =============================================================================

/// GET /api/products - active products with optional tag/search filters.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let filter = query.into_filter(true);
    let products = state.db.products().list(&filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/products/{id} - active product detail.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .db
        .products()
        .get(id, true)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    Ok(Json(product.into()))
}

// =============================================================================
// Admin Handlers
// =============================================================================

/// GET /api/admin/products - all products, inactive included.
pub async fn admin_list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let filter = query.into_filter(false);
    let products = state.db.products().list(&filter).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/products/{id}
pub async fn admin_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .db
        .products()
        .get(id, false)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    Ok(Json(product.into()))
}

/// POST /api/admin/products
pub async fn admin_create(
    State(state): State<AppState>,
    Json(payload): Json<ProductCreateRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let name = validation::validate_product_name(&payload.name)?;
    validation::validate_price_cents(payload.price_cents)?;

    let variants = payload
        .variants
        .into_iter()
        .map(VariantInput::into_new)
        .collect::<ApiResult<Vec<_>>>()?;

    let created = state
        .db
        .products()
        .create(NewProduct {
            name,
            price_cents: payload.price_cents,
            is_active: payload.is_active,
            image_url: payload.image_url,
            description: payload.description,
            tag_names: payload.tag_names,
            variants,
        })
        .await?;

    Ok(Json(created.into()))
}

/// PATCH /api/admin/products/{id}
pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdateRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let name = match payload.name {
        Some(name) => Some(validation::validate_product_name(&name)?),
        None => None,
    };
    if let Some(price_cents) = payload.price_cents {
        validation::validate_price_cents(price_cents)?;
    }

    let variants = match payload.variants {
        Some(variants) => Some(
            variants
                .into_iter()
                .map(VariantInput::into_new)
                .collect::<ApiResult<Vec<_>>>()?,
        ),
        None => None,
    };

    let updated = state
        .db
        .products()
        .update(
            id,
            ProductUpdate {
                name,
                price_cents: payload.price_cents,
                is_active: payload.is_active,
                image_url: payload.image_url,
                description: payload.description,
                tag_names: payload.tag_names,
                variants,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// DELETE /api/admin/products/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<bool>> {
    state.db.products().delete(id).await?;
    Ok(Json(true))
}

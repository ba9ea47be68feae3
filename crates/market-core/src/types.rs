//! # Domain Types
//!
//! Core domain types for the Market shop.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  order_no       │   │  order_id       │       │
//! │  │  price_cents    │   │  status         │   │  *_snapshot     │       │
//! │  │  is_active      │   │  total_cents    │   │  line_total     │       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │ 1:N                                                        │
//! │  ┌────────┴────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductVariant  │   │      Tag        │   │  ShopSettings   │       │
//! │  │  name, price    │   │  name (unique)  │   │  singleton row  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderItem` freezes the resolved product name and unit price at order
//! time, so later catalog edits or deletions never retroactively alter
//! historical orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tag
// =============================================================================

/// A catalog tag; products carry a set of these for filtering.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Tag {
    pub id: i64,
    /// Unique tag name.
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product available in the shop.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name shown in the storefront and snapshotted into orders.
    pub name: String,

    /// Base price in the smallest currency unit. A matching active variant
    /// overrides this; see [`crate::pricing::resolve_line`].
    pub price_cents: i64,

    /// Whether the product is purchasable (soft delete / take-down flag).
    pub is_active: bool,

    pub image_url: String,

    pub description: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A priced sub-option of a product (e.g. a colour).
///
/// `(product_id, name)` is unique. A product with at least one variant is
/// variant-priced: when an order line references an active variant, its
/// price and combined name win over the product's own.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductVariant {
    pub id: i64,

    pub product_id: i64,

    /// Variant name, combined with the product name for display
    /// ("{product} - {variant}").
    pub name: String,

    /// Price in the smallest currency unit for this variant.
    pub price_cents: i64,

    pub image_url: String,

    pub is_active: bool,

    /// Sort key for listing; variants list as (sort_order, id).
    pub sort_order: i64,
}

impl ProductVariant {
    /// Returns the variant price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A product together with its variants, as pricing and order creation
/// consume it. Assembled by the catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    pub product: Product,
    pub variants: Vec<ProductVariant>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// Created as `New`; only an admin moves it afterwards. Status and
/// `updated_at` are the only order fields ever mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Placed by a customer, not yet handled.
    New,
    /// Confirmed by the shop.
    Confirmed,
    /// Cancelled by the shop.
    Cancelled,
}

impl OrderStatus {
    /// All values accepted on the admin status-update endpoint.
    pub const ALLOWED: [&'static str; 3] = ["NEW", "CONFIRMED", "CANCELLED"];

    /// Parses a wire value, rejecting anything outside the allowed set.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "NEW" => Ok(OrderStatus::New),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: Self::ALLOWED.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    /// The wire/storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::New
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// Human-readable unique identifier (PREFIX-YYYYMMDD-HHMMSS-RRRR).
    /// Immutable once assigned.
    pub order_no: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_store_address: String,
    /// Sum of the item line totals, frozen at creation.
    pub total_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item of an order.
///
/// Uses the snapshot pattern: the resolved display name and unit price are
/// copied in at creation and never recomputed from live catalog state.
/// `product_id` is nullable so history survives product deletion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    /// Resolved display name at order time (frozen).
    pub product_name_snapshot: String,
    /// Resolved unit price at order time (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price_cents * quantity, stored explicitly.
    pub line_total_cents: i64,
}

impl OrderItem {
    /// Returns the snapshotted unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// One requested line of a new order, as submitted by the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Optional variant reference; stale references degrade gracefully to
    /// the product's base price (see pricing).
    #[serde(default)]
    pub variant_id: Option<i64>,
}

// =============================================================================
// Shop Settings
// =============================================================================

/// The shop's singleton configuration row.
///
/// Stored in the database so admins can edit payment/contact details
/// without a deploy. Created lazily with these defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShopSettings {
    /// LINE official account id used for the customer chat link.
    pub line_oa_id: String,
    /// Bank name/code shown on the transfer instructions.
    pub bank_name_code: String,
    /// Bank account shown on the transfer instructions.
    pub bank_account: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Admin User
// =============================================================================

/// An admin account for the management surface.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string; never serialized to clients by the API layer.
    pub password_hash: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("NEW").unwrap(), OrderStatus::New);
        assert_eq!(
            OrderStatus::parse("CONFIRMED").unwrap(),
            OrderStatus::Confirmed
        );
        assert_eq!(
            OrderStatus::parse("CANCELLED").unwrap(),
            OrderStatus::Cancelled
        );

        assert!(OrderStatus::parse("SHIPPED").is_err());
        assert!(OrderStatus::parse("new").is_err());
        assert!(OrderStatus::parse("").is_err());
    }

    #[test]
    fn test_order_status_roundtrip() {
        for value in OrderStatus::ALLOWED {
            let status = OrderStatus::parse(value).unwrap();
            assert_eq!(status.as_str(), value);
        }
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::New);
    }

    #[test]
    fn test_money_helpers() {
        let product = Product {
            id: 1,
            name: "Apple".to_string(),
            price_cents: 100,
            is_active: true,
            image_url: String::new(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.price(), Money::from_cents(100));
    }
}

//! # Order Repository
//!
//! The order-creation transaction plus order listing and admin mutation.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   create() - one atomic transaction                     │
//! │                                                                         │
//! │  1. Fetch ACTIVE products (+ variants) for the requested ids           │
//! │  2. Requested ids not fetched → MissingProducts error, abort           │
//! │  3. Resolve prices/names, compute the order total                      │
//! │  4. Up to max_attempts times:                                          │
//! │     └── generate order number, INSERT order                            │
//! │         ├── ok → continue                                              │
//! │         ├── UNIQUE violation → retry with a fresh number               │
//! │         └── attempts exhausted → NumberExhausted error, abort          │
//! │  5. INSERT one item per line carrying the resolved snapshot            │
//! │  6. COMMIT                                                             │
//! │                                                                         │
//! │  Any failure before commit leaves zero order/item rows.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Uniqueness of order numbers rests entirely on the `orders.order_no`
//! UNIQUE constraint; there is no application-level locking. Catalog reads
//! are not locked against concurrent admin edits - a product deactivated
//! between the existence check and the snapshot keeps the price/name pair
//! fetched moments earlier, an accepted narrow race.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::order_no::OrderNoGenerator;
use market_core::{
    order_total, resolve_line, CatalogProduct, Order, OrderItem, OrderLine, OrderStatus, Product,
    ProductVariant,
};

const ORDER_COLUMNS: &str = "id, order_no, customer_name, customer_phone, \
                             pickup_store_address, total_cents, status, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name_snapshot, \
                            unit_price_cents, quantity, line_total_cents";

/// Customer-supplied fields of a new order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_store_address: String,
}

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Failures of the order-creation transaction.
///
/// Business failures are kept apart from [`DbError`] so the API layer can
/// map them to precise status codes.
#[derive(Debug, Error)]
pub enum CreateOrderError {
    /// Requested product ids that are unknown or no longer active. Covers
    /// both "never existed" and "deactivated since add-to-cart".
    #[error("Products not found or inactive: {0:?}")]
    MissingProducts(Vec<i64>),

    /// Every generated order number collided; fatal for this request, the
    /// client may simply resubmit.
    #[error("Could not generate a unique order number after {attempts} attempts")]
    NumberExhausted { attempts: u32 },

    /// Underlying database failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order atomically; see the module docs for the exact steps.
    ///
    /// On success exactly one order row and `lines.len()` item rows exist;
    /// on any failure path, none.
    pub async fn create(
        &self,
        draft: OrderDraft,
        lines: &[OrderLine],
        order_no: &dyn OrderNoGenerator,
        max_attempts: u32,
    ) -> Result<OrderWithItems, CreateOrderError> {
        // Emptiness is rejected at the validation layer; an empty id set
        // would render an invalid IN () clause below.
        debug_assert!(!lines.is_empty(), "order lines are validated non-empty upstream");

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Distinct requested ids, in stable order for error reporting.
        let ids: Vec<i64> = lines
            .iter()
            .map(|l| l.product_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let placeholders = vec!["?"; ids.len()].join(", ");

        let sql = format!(
            "SELECT id, name, price_cents, is_active, image_url, description, \
             created_at, updated_at FROM products \
             WHERE is_active = 1 AND id IN ({placeholders})"
        );
        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let products = query.fetch_all(&mut *tx).await.map_err(DbError::from)?;

        let missing: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| !products.iter().any(|p| p.id == *id))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Order rejected: unknown or inactive products");
            return Err(CreateOrderError::MissingProducts(missing));
        }

        // Variants for the fetched products; the pricing resolver applies
        // the is_active rule per line.
        let sql = format!(
            "SELECT id, product_id, name, price_cents, image_url, is_active, sort_order \
             FROM product_variants WHERE product_id IN ({placeholders}) \
             ORDER BY sort_order, id"
        );
        let mut query = sqlx::query_as::<_, ProductVariant>(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let variants = query.fetch_all(&mut *tx).await.map_err(DbError::from)?;

        let mut catalog: HashMap<i64, CatalogProduct> = products
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    CatalogProduct {
                        product: p,
                        variants: Vec::new(),
                    },
                )
            })
            .collect();
        for variant in variants {
            if let Some(entry) = catalog.get_mut(&variant.product_id) {
                entry.variants.push(variant);
            }
        }

        let total = order_total(lines, &catalog);
        let now = Utc::now();

        // Optimistic insert loop: the UNIQUE constraint on order_no is the
        // arbiter; a violation means a same-second collision, so try again
        // with a fresh number.
        let mut inserted: Option<(i64, String)> = None;
        for attempt in 1..=max_attempts {
            let candidate = order_no.generate();

            let result = sqlx::query(
                "INSERT INTO orders (order_no, customer_name, customer_phone, \
                 pickup_store_address, total_cents, status, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&candidate)
            .bind(&draft.customer_name)
            .bind(&draft.customer_phone)
            .bind(&draft.pickup_store_address)
            .bind(total.cents())
            .bind(OrderStatus::New)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(r) => {
                    inserted = Some((r.last_insert_rowid(), candidate));
                    break;
                }
                Err(e) => {
                    let db_err = DbError::from(e);
                    if db_err.is_unique_violation() {
                        debug!(attempt, order_no = %candidate, "Order number collision, retrying");
                        continue;
                    }
                    return Err(db_err.into());
                }
            }
        }

        let Some((order_id, order_no)) = inserted else {
            warn!(attempts = max_attempts, "Order number generation exhausted");
            return Err(CreateOrderError::NumberExhausted {
                attempts: max_attempts,
            });
        };

        // Snapshot items: the resolved name/price is copied in, decoupling
        // this order from any later catalog edit.
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let entry = &catalog[&line.product_id];
            let resolved = resolve_line(&entry.product, &entry.variants, line.variant_id);
            let line_total = resolved.unit_price.multiply_quantity(line.quantity);

            let result = sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_name_snapshot, \
                 unit_price_cents, quantity, line_total_cents) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&resolved.display_name)
            .bind(resolved.unit_price.cents())
            .bind(line.quantity)
            .bind(line_total.cents())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            items.push(OrderItem {
                id: result.last_insert_rowid(),
                order_id,
                product_id: Some(line.product_id),
                product_name_snapshot: resolved.display_name,
                unit_price_cents: resolved.unit_price.cents(),
                quantity: line.quantity,
                line_total_cents: line_total.cents(),
            });
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(order_no = %order_no, total = %total, items = items.len(), "Order created");

        Ok(OrderWithItems {
            order: Order {
                id: order_id,
                order_no,
                customer_name: draft.customer_name,
                customer_phone: draft.customer_phone,
                pickup_store_address: draft.pickup_store_address,
                total_cents: total.cents(),
                status: OrderStatus::New,
                created_at: now,
                updated_at: now,
            },
            items,
        })
    }

    /// Lists orders newest-first, optionally filtered by an order_no or
    /// customer-phone substring.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<OrderWithItems>> {
        let mut sql = format!("SELECT {ORDER_COLUMNS} FROM orders");

        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        if pattern.is_some() {
            sql.push_str(" WHERE order_no LIKE ? OR customer_phone LIKE ?");
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut query = sqlx::query_as::<_, Order>(&sql);
        if let Some(pattern) = &pattern {
            query = query.bind(pattern).bind(pattern);
        }

        let orders = query.fetch_all(&self.pool).await?;
        self.attach_items(orders).await
    }

    /// Gets one order by its order number, with items.
    pub async fn get_by_order_no(&self, order_no: &str) -> DbResult<Option<OrderWithItems>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_no = ?");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_no)
            .fetch_optional(&self.pool)
            .await?;

        match order {
            Some(order) => Ok(self.attach_items(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Updates an order's status; `status` and `updated_at` are the only
    /// fields ever mutated after creation.
    pub async fn update_status(&self, order_no: &str, status: OrderStatus) -> DbResult<Order> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE order_no = ?")
            .bind(status)
            .bind(now)
            .bind(order_no)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_no));
        }

        info!(order_no = %order_no, status = %status.as_str(), "Order status updated");

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_no = ?");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_no)
            .fetch_one(&self.pool)
            .await?;

        Ok(order)
    }

    /// Attaches line items to a page of orders.
    async fn attach_items(&self, orders: Vec<Order>) -> DbResult<Vec<OrderWithItems>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE order_id IN ({placeholders}) ORDER BY id"
        );

        let mut query = sqlx::query_as::<_, OrderItem>(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let items = query.fetch_all(&self.pool).await?;

        let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let id = order.id;
                OrderWithItems {
                    order,
                    items: grouped.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Product Repository
//!
//! Database operations for products, their variants and tag links.
//!
//! ## Key Operations
//! - Filtered listing (active-only, tag-name membership, substring search)
//! - CRUD with nested variants and get-or-create tag linking
//! - Catalog assembly (product + tags + variants) for the API layer

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use market_core::{Product, ProductVariant, Tag};

const PRODUCT_COLUMNS: &str =
    "id, name, price_cents, is_active, image_url, description, created_at, updated_at";

const VARIANT_COLUMNS: &str = "id, product_id, name, price_cents, image_url, is_active, sort_order";

/// A product assembled with its tags and variants, as the API serves it.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: Product,
    pub tags: Vec<Tag>,
    pub variants: Vec<ProductVariant>,
}

/// Filters for product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Keep only products carrying at least one of these tag names.
    pub tag_names: Vec<String>,
    /// Case-insensitive substring match over name and description.
    pub search: Option<String>,
    /// Hide inactive products (the public listing); admin listing passes false.
    pub active_only: bool,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    pub image_url: String,
    pub description: String,
    /// Tag names to link; missing tags are created on the fly.
    pub tag_names: Vec<String>,
    pub variants: Vec<NewVariant>,
}

/// Input for one variant of a product.
#[derive(Debug, Clone)]
pub struct NewVariant {
    pub name: String,
    pub price_cents: i64,
    pub image_url: String,
    pub is_active: bool,
    pub sort_order: i64,
}

/// Partial update of a product. `None` fields are left untouched;
/// `Some(vec![])` on tag_names/variants clears the respective set.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tag_names: Option<Vec<String>>,
    /// Replacement semantics: the existing variant set is dropped and
    /// recreated from this list.
    pub variants: Option<Vec<NewVariant>>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products matching the filter, with tags and variants attached.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<ProductDetail>> {
        debug!(?filter, "Listing products");

        let mut sql = String::from(
            "SELECT DISTINCT p.id, p.name, p.price_cents, p.is_active, p.image_url, \
             p.description, p.created_at, p.updated_at FROM products p",
        );

        if !filter.tag_names.is_empty() {
            sql.push_str(
                " JOIN product_tags pt ON pt.product_id = p.id \
                 JOIN tags t ON t.id = pt.tag_id",
            );
        }

        sql.push_str(" WHERE 1 = 1");

        if filter.active_only {
            sql.push_str(" AND p.is_active = 1");
        }

        if !filter.tag_names.is_empty() {
            let placeholders = vec!["?"; filter.tag_names.len()].join(", ");
            sql.push_str(&format!(" AND t.name IN ({placeholders})"));
        }

        if filter.search.is_some() {
            sql.push_str(" AND (p.name LIKE ? OR p.description LIKE ?)");
        }

        sql.push_str(" ORDER BY p.id");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for name in &filter.tag_names {
            query = query.bind(name);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.trim());
            query = query.bind(pattern.clone()).bind(pattern);
        }

        let products = query.fetch_all(&self.pool).await?;
        self.assemble(products).await
    }

    /// Gets one product by id, with tags and variants attached.
    ///
    /// With `active_only`, inactive products read as absent (the public
    /// detail endpoint); the admin surface passes false.
    pub async fn get(&self, id: i64, active_only: bool) -> DbResult<Option<ProductDetail>> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        if active_only {
            sql.push_str(" AND is_active = 1");
        }

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match product {
            Some(product) => Ok(self.assemble(vec![product]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Creates a product with its tag links and variants in one transaction.
    pub async fn create(&self, new: NewProduct) -> DbResult<ProductDetail> {
        debug!(name = %new.name, "Creating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO products (name, price_cents, is_active, image_url, description, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(new.price_cents)
        .bind(new.is_active)
        .bind(&new.image_url)
        .bind(&new.description)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();

        link_tags(&mut tx, id, &new.tag_names).await?;
        insert_variants(&mut tx, id, &new.variants).await?;

        tx.commit().await?;

        self.get(id, false)
            .await?
            .ok_or_else(|| DbError::Internal("product vanished after insert".to_string()))
    }

    /// Applies a partial update; tag and variant lists use replacement
    /// semantics when present.
    pub async fn update(&self, id: i64, patch: ProductUpdate) -> DbResult<ProductDetail> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products SET \
                name = COALESCE(?, name), \
                price_cents = COALESCE(?, price_cents), \
                is_active = COALESCE(?, is_active), \
                image_url = COALESCE(?, image_url), \
                description = COALESCE(?, description), \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(&patch.name)
        .bind(patch.price_cents)
        .bind(patch.is_active)
        .bind(&patch.image_url)
        .bind(&patch.description)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        if let Some(tag_names) = &patch.tag_names {
            sqlx::query("DELETE FROM product_tags WHERE product_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_tags(&mut tx, id, tag_names).await?;
        }

        if let Some(variants) = &patch.variants {
            sqlx::query("DELETE FROM product_variants WHERE product_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_variants(&mut tx, id, variants).await?;
        }

        tx.commit().await?;

        self.get(id, false)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product outright.
    ///
    /// Variant and tag-link rows cascade; historical order items keep their
    /// snapshots and fall back to a NULL product reference.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Attaches tags and variants to a page of products.
    async fn assemble(&self, products: Vec<Product>) -> DbResult<Vec<ProductDetail>> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let mut tags = self.tags_for(&ids).await?;
        let mut variants = self.variants_for(&ids).await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let id = product.id;
                ProductDetail {
                    product,
                    tags: tags.remove(&id).unwrap_or_default(),
                    variants: variants.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Fetches tags for a set of products, grouped by product id.
    async fn tags_for(&self, product_ids: &[i64]) -> DbResult<HashMap<i64, Vec<Tag>>> {
        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let sql = format!(
            "SELECT pt.product_id, t.id, t.name FROM product_tags pt \
             JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.product_id IN ({placeholders}) ORDER BY t.name"
        );

        let mut query = sqlx::query_as::<_, (i64, i64, String)>(&sql);
        for id in product_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut grouped: HashMap<i64, Vec<Tag>> = HashMap::new();
        for (product_id, id, name) in rows {
            grouped.entry(product_id).or_default().push(Tag { id, name });
        }

        Ok(grouped)
    }

    /// Fetches variants for a set of products, grouped by product id and
    /// ordered by (sort_order, id).
    async fn variants_for(
        &self,
        product_ids: &[i64],
    ) -> DbResult<HashMap<i64, Vec<ProductVariant>>> {
        let placeholders = vec!["?"; product_ids.len()].join(", ");
        let sql = format!(
            "SELECT {VARIANT_COLUMNS} FROM product_variants \
             WHERE product_id IN ({placeholders}) ORDER BY sort_order, id"
        );

        let mut query = sqlx::query_as::<_, ProductVariant>(&sql);
        for id in product_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut grouped: HashMap<i64, Vec<ProductVariant>> = HashMap::new();
        for variant in rows {
            grouped.entry(variant.product_id).or_default().push(variant);
        }

        Ok(grouped)
    }
}

/// Links a product to tags by name, creating missing tags on the fly.
async fn link_tags(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    tag_names: &[String],
) -> DbResult<()> {
    for name in tag_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&mut **tx)
            .await?;

        let tag_id: i64 = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO product_tags (product_id, tag_id) VALUES (?, ?)")
            .bind(product_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Inserts a product's variants.
async fn insert_variants(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    variants: &[NewVariant],
) -> DbResult<()> {
    for variant in variants {
        sqlx::query(
            "INSERT INTO product_variants (product_id, name, price_cents, image_url, \
             is_active, sort_order) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(&variant.name)
        .bind(variant.price_cents)
        .bind(&variant.image_url)
        .bind(variant.is_active)
        .bind(variant.sort_order)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_product(name: &str, price_cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price_cents,
            is_active: true,
            image_url: String::new(),
            description: String::new(),
            tag_names: Vec::new(),
            variants: Vec::new(),
        }
    }

    fn new_variant(name: &str, price_cents: i64, active: bool) -> NewVariant {
        NewVariant {
            name: name.to_string(),
            price_cents,
            image_url: String::new(),
            is_active: active,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn test_create_with_tags_and_variants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let mut input = new_product("Shirt", 200);
        input.tag_names = vec!["clothing".to_string(), "sale".to_string()];
        input.variants = vec![new_variant("red", 150, true), new_variant("blue", 180, true)];

        let detail = products.create(input).await.unwrap();
        assert_eq!(detail.product.name, "Shirt");
        assert_eq!(detail.tags.len(), 2);
        assert_eq!(detail.variants.len(), 2);

        // Tags were created on the fly
        let tags = db.tags().list().await.unwrap();
        assert_eq!(tags.len(), 2);

        // Reusing a tag name links the existing row instead of duplicating
        let mut second = new_product("Pants", 300);
        second.tag_names = vec!["clothing".to_string()];
        products.create(second).await.unwrap();
        assert_eq!(db.tags().list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let mut apple = new_product("Apple", 100);
        apple.tag_names = vec!["fruit".to_string()];
        apple.description = "crisp and sweet".to_string();
        products.create(apple).await.unwrap();

        let mut chips = new_product("Chips", 80);
        chips.tag_names = vec!["snack".to_string()];
        products.create(chips).await.unwrap();

        let mut hidden = new_product("Old apple", 10);
        hidden.is_active = false;
        products.create(hidden).await.unwrap();

        // Public listing hides inactive
        let filter = ProductFilter {
            active_only: true,
            ..Default::default()
        };
        assert_eq!(products.list(&filter).await.unwrap().len(), 2);

        // Admin listing shows everything
        assert_eq!(
            products.list(&ProductFilter::default()).await.unwrap().len(),
            3
        );

        // Tag membership
        let filter = ProductFilter {
            tag_names: vec!["fruit".to_string()],
            active_only: true,
            ..Default::default()
        };
        let found = products.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product.name, "Apple");

        // Substring search over name and description
        let filter = ProductFilter {
            search: Some("crisp".to_string()),
            active_only: true,
            ..Default::default()
        };
        assert_eq!(products.list(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_active_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let mut input = new_product("Hidden", 50);
        input.is_active = false;
        let created = products.create(input).await.unwrap();

        assert!(products.get(created.product.id, true).await.unwrap().is_none());
        assert!(products.get(created.product.id, false).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_replaces_variants() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let mut input = new_product("Shirt", 200);
        input.variants = vec![new_variant("red", 150, true), new_variant("blue", 180, true)];
        let created = products.create(input).await.unwrap();

        let patch = ProductUpdate {
            price_cents: Some(220),
            variants: Some(vec![new_variant("green", 190, true)]),
            ..Default::default()
        };
        let updated = products.update(created.product.id, patch).await.unwrap();

        assert_eq!(updated.product.price_cents, 220);
        assert_eq!(updated.product.name, "Shirt");
        assert_eq!(updated.variants.len(), 1);
        assert_eq!(updated.variants[0].name, "green");
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .products()
            .update(9999, ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let created = products.create(new_product("Doomed", 10)).await.unwrap();
        products.delete(created.product.id).await.unwrap();
        assert!(products.get(created.product.id, false).await.unwrap().is_none());
        assert!(products.delete(created.product.id).await.is_err());
    }
}

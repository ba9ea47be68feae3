//! # Pricing Module
//!
//! Resolves the effective unit price and display name of an order line
//! across the product/variant hierarchy, and sums order totals.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_line(product, variants, variant_id)                            │
//! │                                                                         │
//! │  variant_id absent ───────────────► (product.price, product.name)       │
//! │                                                                         │
//! │  variant_id present                                                     │
//! │    ├── matches an ACTIVE variant ─► (variant.price,                     │
//! │    │   of this product              "{product.name} - {variant.name}")  │
//! │    │                                                                    │
//! │    └── no match (deleted,                                               │
//! │        deactivated, or another ──► (product.price, product.name)        │
//! │        product's id)                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fallback branch is a deliberate permissive policy: a stale variant
//! reference (e.g. deactivated between add-to-cart and checkout) degrades
//! gracefully to the base price instead of failing the whole order.

use std::collections::HashMap;

use crate::money::Money;
use crate::types::{CatalogProduct, OrderLine, Product, ProductVariant};

/// The resolved price and display name of one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub unit_price: Money,
    pub display_name: String,
}

/// Resolves the effective unit price and display name for a product and an
/// optional variant reference.
///
/// `variants` is the product's own variant list; the function picks the one
/// with a matching id that is active, so callers may pass active and
/// inactive variants alike.
pub fn resolve_line(
    product: &Product,
    variants: &[ProductVariant],
    variant_id: Option<i64>,
) -> ResolvedLine {
    if let Some(variant_id) = variant_id {
        if let Some(variant) = variants
            .iter()
            .find(|v| v.id == variant_id && v.is_active)
        {
            return ResolvedLine {
                unit_price: variant.price(),
                display_name: format!("{} - {}", product.name, variant.name),
            };
        }
    }

    ResolvedLine {
        unit_price: product.price(),
        display_name: product.name.clone(),
    }
}

/// Sums the total of an order over the requested lines.
///
/// Every `product_id` referenced by `lines` must be present in `catalog`;
/// a missing entry is a programming error (existence is validated one layer
/// up, before totals are computed) and panics via map indexing.
pub fn order_total(lines: &[OrderLine], catalog: &HashMap<i64, CatalogProduct>) -> Money {
    let mut total = Money::zero();
    for line in lines {
        let entry = &catalog[&line.product_id];
        let resolved = resolve_line(&entry.product, &entry.variants, line.variant_id);
        total += resolved.unit_price.multiply_quantity(line.quantity);
    }
    total
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, name: &str, price_cents: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price_cents,
            is_active: true,
            image_url: String::new(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(id: i64, product_id: i64, name: &str, price_cents: i64, active: bool) -> ProductVariant {
        ProductVariant {
            id,
            product_id,
            name: name.to_string(),
            price_cents,
            image_url: String::new(),
            is_active: active,
            sort_order: 0,
        }
    }

    #[test]
    fn test_resolve_without_variant_id() {
        let p = product(1, "Apple", 100);
        let resolved = resolve_line(&p, &[], None);
        assert_eq!(resolved.unit_price, Money::from_cents(100));
        assert_eq!(resolved.display_name, "Apple");
    }

    #[test]
    fn test_resolve_simple_product_ignores_variant_id() {
        // A product with zero variants resolves to its base price no matter
        // what variant id the client sends.
        let p = product(1, "Apple", 100);
        let resolved = resolve_line(&p, &[], Some(42));
        assert_eq!(resolved.unit_price, Money::from_cents(100));
        assert_eq!(resolved.display_name, "Apple");
    }

    #[test]
    fn test_resolve_active_variant() {
        let p = product(2, "Shirt", 200);
        let vs = vec![
            variant(10, 2, "red", 150, true),
            variant(11, 2, "blue", 180, true),
        ];

        let resolved = resolve_line(&p, &vs, Some(10));
        assert_eq!(resolved.unit_price, Money::from_cents(150));
        assert_eq!(resolved.display_name, "Shirt - red");
    }

    #[test]
    fn test_resolve_inactive_variant_falls_back() {
        let p = product(2, "Shirt", 200);
        let vs = vec![variant(10, 2, "red", 150, false)];

        let resolved = resolve_line(&p, &vs, Some(10));
        assert_eq!(resolved, resolve_line(&p, &vs, None));
    }

    #[test]
    fn test_resolve_unknown_variant_falls_back() {
        let p = product(2, "Shirt", 200);
        let vs = vec![variant(10, 2, "red", 150, true)];

        let resolved = resolve_line(&p, &vs, Some(999));
        assert_eq!(resolved.unit_price, Money::from_cents(200));
        assert_eq!(resolved.display_name, "Shirt");
    }

    #[test]
    fn test_order_total() {
        // Product A (100, no variants) x2 + product B variant "red" (150) x1
        // = 350.
        let a = product(1, "A", 100);
        let b = product(2, "B", 200);
        let b_red = variant(10, 2, "red", 150, true);

        let mut catalog = HashMap::new();
        catalog.insert(
            1,
            CatalogProduct {
                product: a,
                variants: vec![],
            },
        );
        catalog.insert(
            2,
            CatalogProduct {
                product: b,
                variants: vec![b_red],
            },
        );

        let lines = vec![
            OrderLine {
                product_id: 1,
                quantity: 2,
                variant_id: None,
            },
            OrderLine {
                product_id: 2,
                quantity: 1,
                variant_id: Some(10),
            },
        ];

        assert_eq!(order_total(&lines, &catalog), Money::from_cents(350));
    }

    #[test]
    fn test_order_total_empty() {
        let catalog = HashMap::new();
        assert_eq!(order_total(&[], &catalog), Money::zero());
    }
}

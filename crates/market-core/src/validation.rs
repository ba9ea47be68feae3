//! # Validation Module
//!
//! Input validation for order placement and catalog administration.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  ├── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (order_no, tag name, variant name)             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::OrderLine;
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, bounded text field; returns the trimmed value.
fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a customer name (non-empty, at most 100 characters).
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    validate_required("customer_name", name, 100)
}

/// Validates a customer phone (non-empty, at most 30 characters).
pub fn validate_customer_phone(phone: &str) -> ValidationResult<String> {
    validate_required("customer_phone", phone, 30)
}

/// Validates a pickup address (non-empty free text).
pub fn validate_pickup_address(address: &str) -> ValidationResult<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ValidationError::Required {
            field: "pickup_store_address".to_string(),
        });
    }
    Ok(address.to_string())
}

/// Validates a product name (non-empty, at most 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    validate_required("name", name, 200)
}

/// Validates a tag name (non-empty, at most 50 characters).
pub fn validate_tag_name(name: &str) -> ValidationResult<String> {
    validate_required("name", name, 50)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`] (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in the smallest currency unit.
///
/// Zero is allowed (free items); negative is not.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the requested lines of a new order: the list must be non-empty
/// and every quantity in range.
pub fn validate_order_lines(lines: &[OrderLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
            variant_id: None,
        }
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name("  Ann  ").unwrap(), "Ann");
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_customer_phone() {
        assert!(validate_customer_phone("0912-345-678").is_ok());
        assert!(validate_customer_phone("").is_err());
        assert!(validate_customer_phone(&"9".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_order_lines() {
        assert!(validate_order_lines(&[]).is_err());
        assert!(validate_order_lines(&[line(1, 2)]).is_ok());
        assert!(validate_order_lines(&[line(1, 2), line(2, 0)]).is_err());
        assert!(validate_order_lines(&[line(1, 1000)]).is_err());
    }

    #[test]
    fn test_validate_tag_name() {
        assert_eq!(validate_tag_name(" fruit ").unwrap(), "fruit");
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name(&"t".repeat(60)).is_err());
    }
}

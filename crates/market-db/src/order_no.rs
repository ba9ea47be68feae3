//! # Order Number Generation
//!
//! Human-readable, time-based order identifiers.
//!
//! ## Format
//! ```text
//! PREFIX-YYYYMMDD-HHMMSS-RRRR
//!   │       │        │     └── uniform random in 1000..=9999
//!   │       │        └── local wall clock, second resolution
//!   │       └── local date
//!   └── configurable shop prefix (default "MKT")
//! ```
//!
//! ## Example
//! `MKT-20260807-143015-4821`
//!
//! Numbers are NOT unique by construction: two orders in the same second
//! have a 1-in-9000 chance of colliding. Uniqueness is enforced by the
//! `orders.order_no` UNIQUE constraint, and the order-creation transaction
//! retries generation on conflict - cheap generation plus optimistic retry
//! instead of a coordination service.

use chrono::Local;
use rand::Rng;

/// Default prefix for generated order numbers.
pub const DEFAULT_PREFIX: &str = "MKT";

/// Source of candidate order numbers.
///
/// A trait so the exhaustion path of the create-order retry loop can be
/// driven deterministically in tests with a fixed-output generator.
pub trait OrderNoGenerator: Send + Sync {
    /// Produces one candidate order number.
    fn generate(&self) -> String;
}

/// The production generator: local wall clock + random 4-digit suffix.
#[derive(Debug, Clone)]
pub struct WallClockOrderNo {
    prefix: String,
}

impl WallClockOrderNo {
    /// Creates a generator with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        WallClockOrderNo {
            prefix: prefix.into(),
        }
    }
}

impl Default for WallClockOrderNo {
    fn default() -> Self {
        WallClockOrderNo::new(DEFAULT_PREFIX)
    }
}

impl OrderNoGenerator for WallClockOrderNo {
    fn generate(&self) -> String {
        let now = Local::now();
        let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
        format!("{}-{}-{}", self.prefix, now.format("%Y%m%d-%H%M%S"), suffix)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

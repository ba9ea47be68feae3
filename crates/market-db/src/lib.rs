//! # market-db: Database Layer for the Market backend
//!
//! SQLite persistence for the shop: catalog, orders, settings and admin
//! credentials, behind repository types sharing one connection pool.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Market Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (market-api)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     market-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  tag/product  │    │  (embedded)  │  │   │
//! │  │   │   SqlitePool  │    │  order        │    │ 001_init.sql │  │   │
//! │  │   │   WAL mode    │    │  settings     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`order_no`] - Human-readable order number generation
//! - [`repository`] - Repository implementations

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod order_no;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use order_no::{OrderNoGenerator, WallClockOrderNo};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::admin_user::AdminUserRepository;
pub use repository::order::{CreateOrderError, OrderDraft, OrderRepository, OrderWithItems};
pub use repository::product::{
    NewProduct, NewVariant, ProductDetail, ProductFilter, ProductRepository, ProductUpdate,
};
pub use repository::settings::{SettingsCache, SettingsPatch, SettingsRepository};
pub use repository::tag::TagRepository;

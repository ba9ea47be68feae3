//! # Market API
//!
//! Axum HTTP server for the Market order-taking backend.
//!
//! ## Surfaces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           HTTP Surface                                  │
//! │                                                                         │
//! │  Public                          Admin (JWT bearer)                     │
//! │  ──────                          ───────────────────                    │
//! │  GET  /api/tags                  POST  /api/admin/login                 │
//! │  GET  /api/products              GET   /api/admin/me                    │
//! │  GET  /api/products/{id}         GET/POST /api/admin/tags               │
//! │  GET  /api/orders                GET/DELETE /api/admin/tags/{id}        │
//! │  POST /api/orders/create         GET/POST /api/admin/products           │
//! │  GET  /api/orders/{order_no}     GET/PATCH/DELETE                       │
//! │  GET  /api/health                      /api/admin/products/{id}         │
//! │                                  PATCH /api/admin/orders/{order_no}     │
//! │                                  GET/PATCH /api/admin/settings          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `HTTP_PORT` - listen port (default: 8000)
//! - `DATABASE_PATH` - SQLite file path (default: ./market.db)
//! - `JWT_SECRET` - secret for admin bearer tokens
//! - `JWT_LIFETIME_SECS` - token lifetime (default: 86400)
//! - `ORDER_NO_PREFIX` - order number prefix (default: MKT)
//! - `ORDER_NO_ATTEMPTS` - insert attempts before giving up (default: 5)

use std::sync::Arc;

use market_db::{Database, OrderNoGenerator};

use crate::auth::JwtManager;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use router::router;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    /// Candidate order-number source; a trait object so tests can force
    /// collisions deterministically.
    pub order_no: Arc<dyn OrderNoGenerator>,
    /// Insert attempts before order creation gives up on a unique number.
    pub order_no_attempts: u32,
}

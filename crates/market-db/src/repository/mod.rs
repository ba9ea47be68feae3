//! # Repository Module
//!
//! Database repository implementations for the Market backend.
//!
//! ## Repository Pattern
//! Each repository abstracts the SQL for one aggregate behind a clean API:
//!
//! - [`tag::TagRepository`] - tag listing and CRUD
//! - [`product::ProductRepository`] - catalog CRUD, filters, variant/tag links
//! - [`order::OrderRepository`] - the order-creation transaction, listing,
//!   status updates
//! - [`settings::SettingsRepository`] - the singleton settings row + cache
//! - [`admin_user::AdminUserRepository`] - admin credential storage
//!
//! Handlers never see SQL; repositories never see HTTP.

pub mod admin_user;
pub mod order;
pub mod product;
pub mod settings;
pub mod tag;

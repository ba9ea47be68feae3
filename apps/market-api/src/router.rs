//! # Router Composition
//!
//! Public routes are open; everything under the admin group passes through
//! the bearer-token middleware first (except login, which issues tokens).

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_admin;
use crate::handlers::{self, auth, orders, products, settings, tags};
use crate::AppState;

/// Builds the application router with all routes and layers attached.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/tags", get(tags::list))
        .route("/api/products", get(products::list))
        .route("/api/products/{id}", get(products::detail))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/create", post(orders::create))
        .route("/api/orders/{order_no}", get(orders::detail))
        .route("/api/admin/login", post(auth::login));

    let admin = Router::new()
        .route("/api/admin/me", get(auth::me))
        .route("/api/admin/tags", get(tags::list).post(tags::admin_create))
        .route(
            "/api/admin/tags/{id}",
            get(tags::admin_get).delete(tags::admin_delete),
        )
        .route(
            "/api/admin/products",
            get(products::admin_list).post(products::admin_create),
        )
        .route(
            "/api/admin/products/{id}",
            get(products::admin_get)
                .patch(products::admin_update)
                .delete(products::admin_delete),
        )
        .route(
            "/api/admin/orders/{order_no}",
            patch(orders::admin_update_status),
        )
        .route(
            "/api/admin/settings",
            get(settings::admin_get).patch(settings::admin_update),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    public
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

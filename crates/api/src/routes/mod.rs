//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth_middleware, tenant_middleware},
};

pub mod accounts;
pub mod branches;
pub mod health;
pub mod journal_entries;
pub mod tenants;

/// Creates the API router.
///
/// Layers run last-added first, so on protected routes the tenant is
/// resolved before the token is checked against it.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    let tenant_routes = Router::new()
        .merge(tenants::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ));

    let protected_routes = Router::new()
        .merge(journal_entries::routes())
        .merge(accounts::routes())
        .merge(branches::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(tenant_routes)
        .merge(protected_routes)
}

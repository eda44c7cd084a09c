use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use basekit_auth::RouteAuth;

use crate::app::services::AppServices;
use crate::middleware::{AuthState, auth_middleware};

pub mod admin;
pub mod auth;
pub mod health;
pub mod index;

/// All API routes, grouped by their auth annotation. Paths are absolute
/// (already under the API prefix).
pub fn router(services: &AppServices) -> Router {
    let base = services.base_path.as_str();
    let at = |path: &str| format!("{base}{path}");

    let public = Router::new()
        .route(base, get(index::index))
        .route(&at("/health"), get(health::health))
        .route(&at("/health/detailed"), get(health::detailed));

    let unverified = Router::new().route(&at("/auth/verification"), get(auth::verification));

    let protected = Router::new().route(&at("/auth/me"), get(auth::me));

    let admin = Router::new().route(&at("/admin/status"), get(admin::status));

    Router::new()
        .merge(guarded(public, services, RouteAuth::PUBLIC))
        .merge(guarded(unverified, services, RouteAuth::UNVERIFIED))
        .merge(guarded(protected, services, RouteAuth::PROTECTED))
        .merge(guarded(admin, services, RouteAuth::ADMIN))
        .layer(Extension(Arc::clone(&services.health)))
        .layer(Extension(services.environment))
}

/// `route_layer` so unmatched paths still reach the 404 fallback instead of
/// the guard.
fn guarded(routes: Router, services: &AppServices, route: RouteAuth) -> Router {
    routes.route_layer(axum::middleware::from_fn_with_state(
        AuthState::new(Arc::clone(&services.verifier), route),
        auth_middleware,
    ))
}

//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborators built once at startup (health, verifier)
//! - `routes/`: HTTP handlers, one file per area
//! - `extract.rs`: validating extractors
//! - `errors.rs`: the failure boundary

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

use basekit_observability::CORRELATION_HEADER;

use crate::config::CorsOrigin;
use crate::middleware;

pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
///
/// Layers, outermost first: CORS, request context/logging, failure
/// boundary, panic catcher, then the per-group auth guards inside the routes.
pub fn build_app(services: AppServices) -> Router {
    let boundary = ServiceBuilder::new()
        .layer(cors_layer(&services.cors))
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(axum::middleware::from_fn_with_state(
            services.normalizer(),
            errors::exception_filter,
        ))
        .layer(CatchPanicLayer::custom(errors::panic_response));

    routes::router(&services)
        .fallback(errors::not_found)
        .layer(boundary)
}

fn cors_layer(origin: &CorsOrigin) -> CorsLayer {
    let correlation = HeaderName::from_static(CORRELATION_HEADER);
    let allow_origin = match origin {
        CorsOrigin::Any => AllowOrigin::mirror_request(),
        CorsOrigin::List(origins) => AllowOrigin::list(origins.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|e| tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, correlation.clone(), header::ACCEPT])
        .expose_headers([correlation])
}

pub mod handlers;
pub mod models;
pub mod openapi;

use crate::config::Config;
use axum::{Json, Router, http::header, routing::get};
use handlers::SharedService;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Full application: API routes under the configured prefix, service
/// endpoints at the root, and the HTTP middleware stack.
pub fn app(service: SharedService, config: &Config) -> Router {
    let api = handlers::api_routes(service);
    let prefix = config.api_prefix.trim_end_matches('/');
    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(|| async { Json(openapi::ApiDoc::openapi()) }));
    let router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(prefix, api)
    };

    router
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
}

//! Route registration: module routes plus system endpoints.

use std::any::Any;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;

use socialnet_core::ServiceError;

/// Build the complete router.
///
/// Module routers already carry their state and auth layers; they are
/// merged at the root next to `/health` and `/version`.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        tracing::debug!("mounting module {}", name);
        app = app.merge(router);
    }

    app.fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "socialnetd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> ServiceError {
    ServiceError::NotFound("route not found".into())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ServiceError::Internal(format!("handler panicked: {}", detail)).into_response()
}

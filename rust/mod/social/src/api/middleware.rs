use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use socialnet_core::ServiceError;

use crate::api::AppState;

/// Collections whose reads are open to anonymous callers.
const PUBLIC_READ_PREFIXES: &[&str] = &["/users", "/posts", "/comments"];

/// POST routes that work without a token: registration and login.
const PUBLIC_POST_PATHS: &[&str] = &["/users", "/users/login"];

/// Whether a request may skip authentication.
pub fn is_public(method: &Method, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    if *method == Method::GET || *method == Method::HEAD {
        return PUBLIC_READ_PREFIXES.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        });
    }
    *method == Method::POST && PUBLIC_POST_PATHS.contains(&path)
}

/// JWT authentication middleware.
///
/// Public routes pass through untouched. Otherwise the Bearer token must
/// verify; the decoded identity is stored as an extension for handlers to
/// extract via `Extension<AuthenticatedIdentity>`.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => {
            return ServiceError::Unauthorized("Unauthorized access".into()).into_response();
        }
    };

    match svc.verify_token(&token) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(path = %req.uri().path(), "rejected token: {}", e);
            ServiceError::from(e).into_response()
        }
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

mod comments;
mod middleware;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::Router;

use crate::service::SocialService;

/// Shared application state.
pub type AppState = Arc<SocialService>;

/// Build the complete social API router.
///
/// Routes live at the server root. Reads and registration/login are
/// public; every other route requires a bearer token.
pub fn build_router(svc: Arc<SocialService>) -> Router {
    Router::new()
        .merge(users::routes())
        .merge(posts::routes())
        .merge(comments::routes())
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Router};

use socialnet_core::{ListParams, Payload, Reply, ServiceError};

use crate::api::AppState;
use crate::model::{AuthenticatedIdentity, CreatePost, ReactionRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).patch(update_post).delete(delete_post))
        .route("/posts/{id}/likes", post(react_to_post))
}

async fn list_posts(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Reply, ServiceError> {
    let result = svc.list_posts(&params).map_err(ServiceError::from)?;
    Reply::ok("Posts fetched")
        .with("posts", result.items)?
        .with("total", result.total)
}

async fn create_post(
    State(svc): State<AppState>,
    Extension(actor): Extension<AuthenticatedIdentity>,
    Payload(input): Payload<CreatePost>,
) -> Result<Reply, ServiceError> {
    let post = svc.create_post(&actor, input).map_err(ServiceError::from)?;
    Reply::created("Post created").with("post", post)
}

async fn get_post(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, ServiceError> {
    let post = svc.get_post(&id).map_err(ServiceError::from)?;
    Reply::ok("Post fetched").with("post", post)
}

async fn update_post(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Payload(patch): Payload<serde_json::Value>,
) -> Result<Reply, ServiceError> {
    let post = svc.update_post(&id, patch).map_err(ServiceError::from)?;
    Reply::ok("Post updated").with("post", post)
}

async fn delete_post(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, ServiceError> {
    svc.delete_post(&id).map_err(ServiceError::from)?;
    Ok(Reply::ok("Post deleted"))
}

async fn react_to_post(
    State(svc): State<AppState>,
    Extension(actor): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
    Payload(req): Payload<ReactionRequest>,
) -> Result<Reply, ServiceError> {
    let (action, counts) = svc
        .react_to_post(&actor, &id, req.action.as_deref())
        .map_err(ServiceError::from)?;
    Reply::ok(format!("Post {}", action.done()))
        .with("likes", counts.likes)?
        .with("dislikes", counts.dislikes)
}

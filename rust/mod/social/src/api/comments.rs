use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Router};

use socialnet_core::{ListParams, Payload, Reply, ServiceError};

use crate::api::AppState;
use crate::model::{AuthenticatedIdentity, CreateComment, ReactionRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments", get(list_comments).post(create_comment))
        .route(
            "/comments/{id}",
            get(get_comment).post(update_comment).delete(delete_comment),
        )
        .route("/comments/{id}/likes", post(react_to_comment))
}

async fn list_comments(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Reply, ServiceError> {
    let result = svc.list_comments(&params).map_err(ServiceError::from)?;
    Reply::ok("Comments fetched")
        .with("comments", result.items)?
        .with("total", result.total)
}

async fn create_comment(
    State(svc): State<AppState>,
    Extension(actor): Extension<AuthenticatedIdentity>,
    Payload(input): Payload<CreateComment>,
) -> Result<Reply, ServiceError> {
    let comment = svc.create_comment(&actor, input).map_err(ServiceError::from)?;
    Reply::created("Comment created").with("comment", comment)
}

async fn get_comment(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, ServiceError> {
    let comment = svc.get_comment(&id).map_err(ServiceError::from)?;
    Reply::ok("Comment fetched").with("comment", comment)
}

async fn update_comment(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Payload(patch): Payload<serde_json::Value>,
) -> Result<Reply, ServiceError> {
    let comment = svc.update_comment(&id, patch).map_err(ServiceError::from)?;
    Reply::ok("Comment updated").with("comment", comment)
}

async fn delete_comment(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, ServiceError> {
    svc.delete_comment(&id).map_err(ServiceError::from)?;
    Ok(Reply::ok("Comment deleted"))
}

async fn react_to_comment(
    State(svc): State<AppState>,
    Extension(actor): Extension<AuthenticatedIdentity>,
    Path(id): Path<String>,
    Payload(req): Payload<ReactionRequest>,
) -> Result<Reply, ServiceError> {
    let (action, counts) = svc
        .react_to_comment(&actor, &id, req.action.as_deref())
        .map_err(ServiceError::from)?;
    Reply::ok(format!("Comment {}", action.done()))
        .with("likes", counts.likes)?
        .with("dislikes", counts.dislikes)
}

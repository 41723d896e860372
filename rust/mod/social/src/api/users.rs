use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Router};

use socialnet_core::{ListParams, Payload, Reply, ServiceError};

use crate::api::AppState;
use crate::model::{
    AuthenticatedIdentity, CreateUser, FriendAction, FriendRequest, LoginRequest, PublicUser,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(register))
        .route("/users/login", post(login))
        .route("/users/addfriend", post(change_friendship))
        .route("/users/{id}", get(get_user).patch(update_user).delete(delete_user))
}

async fn list_users(
    State(svc): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Reply, ServiceError> {
    let result = svc.list_users(&params).map_err(ServiceError::from)?;
    Reply::ok("Users fetched")
        .with("users", result.items)?
        .with("total", result.total)
}

async fn register(
    State(svc): State<AppState>,
    Payload(input): Payload<CreateUser>,
) -> Result<Reply, ServiceError> {
    let user = svc.register(input).map_err(ServiceError::from)?;
    Reply::created("New user has been created").with("user", PublicUser::from(&user))
}

async fn login(
    State(svc): State<AppState>,
    Payload(input): Payload<LoginRequest>,
) -> Result<Reply, ServiceError> {
    let token = svc.login(input).map_err(ServiceError::from)?;
    Reply::ok("Login successful").with("token", token)
}

async fn get_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, ServiceError> {
    let user = svc.get_user(&id).map_err(ServiceError::from)?;
    Reply::ok("User fetched").with("user", PublicUser::from(&user))
}

async fn update_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Payload(patch): Payload<serde_json::Value>,
) -> Result<Reply, ServiceError> {
    let user = svc.update_user(&id, patch).map_err(ServiceError::from)?;
    Reply::ok("User updated").with("user", PublicUser::from(&user))
}

async fn delete_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply, ServiceError> {
    svc.delete_user(&id).map_err(ServiceError::from)?;
    Ok(Reply::ok("User deleted"))
}

async fn change_friendship(
    State(svc): State<AppState>,
    Extension(actor): Extension<AuthenticatedIdentity>,
    Payload(req): Payload<FriendRequest>,
) -> Result<Reply, ServiceError> {
    let (action, me) = svc
        .change_friendship(&actor, req)
        .map_err(ServiceError::from)?;
    let message = match action {
        FriendAction::Add => "Friend added",
        FriendAction::Delete => "Friend deleted",
    };
    Reply::ok(message).with("user", PublicUser::from(&me))
}

pub mod comment;
pub mod friend;
pub mod password;
pub mod post;
pub mod reaction;
pub mod token;
pub mod user;

use std::sync::Arc;

use thiserror::Error;

use socialnet_core::ServiceError;
use socialnet_kv::KVStore;
use socialnet_store::{Document, Repo};

use crate::model::{AccessPolicy, Comment, Post, ReactionMode, ReactionRejection, User};
use token::{TokenError, TokenService};

/// Social service error type.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// A state transition that would not change anything.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl From<SocialError> for ServiceError {
    fn from(e: SocialError) -> Self {
        match e {
            SocialError::NotFound(m) => ServiceError::NotFound(m),
            SocialError::Conflict(m) => ServiceError::Conflict(m),
            SocialError::Validation(m) => ServiceError::Validation(m),
            SocialError::Rejected(m) => ServiceError::Rejected(m),
            SocialError::Unauthorized(m) => ServiceError::Unauthorized(m),
            SocialError::Storage(m) => ServiceError::Storage(m),
            SocialError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

impl From<ServiceError> for SocialError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(m) => SocialError::NotFound(m),
            ServiceError::Conflict(m) => SocialError::Conflict(m),
            ServiceError::Validation(m) => SocialError::Validation(m),
            ServiceError::Rejected(m) => SocialError::Rejected(m),
            ServiceError::Unauthorized(m) => SocialError::Unauthorized(m),
            ServiceError::Storage(m) => SocialError::Storage(m),
            ServiceError::Internal(m) => SocialError::Internal(m),
        }
    }
}

impl From<TokenError> for SocialError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(m) => SocialError::Internal(m),
            other => SocialError::Unauthorized(other.to_string()),
        }
    }
}

impl From<ReactionRejection> for SocialError {
    fn from(e: ReactionRejection) -> Self {
        SocialError::Rejected(e.to_string())
    }
}

/// Configuration for the social service.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in minutes (default: 20).
    pub token_ttl_minutes: i64,
    /// How like and dislike interact for one user.
    pub reaction_mode: ReactionMode,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "socialnet-dev-secret-change-me".to_string(),
            token_ttl_minutes: 20,
            reaction_mode: ReactionMode::Independent,
        }
    }
}

/// The social service: users, friendships, posts, comments and reactions.
pub struct SocialService {
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) users: Repo<User>,
    pub(crate) posts: Repo<Post>,
    pub(crate) comments: Repo<Comment>,
    pub(crate) tokens: TokenService,
    pub(crate) policy: AccessPolicy,
    pub(crate) config: SocialConfig,
}

impl SocialService {
    /// Create a new SocialService with the built-in access policy.
    pub fn new(kv: Arc<dyn KVStore>, config: SocialConfig) -> Arc<Self> {
        Self::with_policy(kv, config, AccessPolicy::standard())
    }

    pub fn with_policy(
        kv: Arc<dyn KVStore>,
        config: SocialConfig,
        policy: AccessPolicy,
    ) -> Arc<Self> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_minutes);
        Arc::new(Self {
            users: Repo::new(kv.clone()),
            posts: Repo::new(kv.clone()),
            comments: Repo::new(kv.clone()),
            kv,
            tokens,
            policy,
            config,
        })
    }
}

/// Trimmed value of a required text field, or a "<field> is required" error.
pub(crate) fn required(field: &str, value: Option<String>) -> Result<String, SocialError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SocialError::Validation(format!("{} is required", field))),
    }
}

/// Trim every required field present in a merge-patch, rejecting blanks
/// and non-strings the way creation does.
pub(crate) fn required_in_patch(
    patch: &mut serde_json::Value,
    fields: &[&str],
) -> Result<(), SocialError> {
    if let Some(obj) = patch.as_object_mut() {
        for field in fields {
            if let Some(value) = obj.get_mut(*field) {
                let trimmed = required(field, value.as_str().map(str::to_string))?;
                *value = serde_json::Value::String(trimmed);
            }
        }
    }
    Ok(())
}

/// Apply a merge-patch to `record` through its JSON form.
pub(crate) fn patch_record<T: Document>(
    record: &mut T,
    patch: &serde_json::Value,
) -> Result<(), SocialError> {
    let mut base =
        serde_json::to_value(&*record).map_err(|e| SocialError::Internal(e.to_string()))?;
    socialnet_core::merge_patch(&mut base, patch);
    *record = serde_json::from_value(base)
        .map_err(|e| SocialError::Validation(format!("invalid {} update: {}", T::KIND, e)))?;
    Ok(())
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use socialnet_store::Document;
use thiserror::Error;

/// Like / dislike sets of a post or comment. Each holds user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub likes: BTreeSet<String>,
    #[serde(default)]
    pub dislikes: BTreeSet<String>,
}

/// Requested reaction change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Like,
    Unlike,
    Dislike,
    Undislike,
}

impl ReactionAction {
    pub fn parse(raw: Option<&str>) -> Result<Self, ReactionRejection> {
        match raw {
            Some("like") => Ok(ReactionAction::Like),
            Some("unlike") => Ok(ReactionAction::Unlike),
            Some("dislike") => Ok(ReactionAction::Dislike),
            Some("undislike") => Ok(ReactionAction::Undislike),
            _ => Err(ReactionRejection::NoValidAction),
        }
    }

    /// Past-tense label used in response messages.
    pub fn done(&self) -> &'static str {
        match self {
            ReactionAction::Like => "liked",
            ReactionAction::Unlike => "unliked",
            ReactionAction::Dislike => "disliked",
            ReactionAction::Undislike => "undisliked",
        }
    }
}

/// Whether a like and a dislike from the same user may coexist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReactionMode {
    /// The two sets are maintained independently.
    #[default]
    Independent,
    /// Liking removes a dislike by the same user and vice versa.
    Exclusive,
}

/// A reaction change that would not change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReactionRejection {
    #[error("already liked")]
    AlreadyLiked,
    #[error("not liked")]
    NotLiked,
    #[error("already disliked")]
    AlreadyDisliked,
    #[error("not disliked")]
    NotDisliked,
    #[error("no valid action")]
    NoValidAction,
}

/// Counts after a successful reaction change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    pub likes: usize,
    pub dislikes: usize,
}

impl Reactions {
    /// Apply `action` on behalf of `user_id`, leaving the sets untouched on
    /// rejection.
    pub fn apply(
        &mut self,
        user_id: &str,
        action: ReactionAction,
        mode: ReactionMode,
    ) -> Result<ReactionCounts, ReactionRejection> {
        match action {
            ReactionAction::Like => {
                if self.likes.contains(user_id) {
                    return Err(ReactionRejection::AlreadyLiked);
                }
                self.likes.insert(user_id.to_string());
                if mode == ReactionMode::Exclusive {
                    self.dislikes.remove(user_id);
                }
            }
            ReactionAction::Unlike => {
                if !self.likes.remove(user_id) {
                    return Err(ReactionRejection::NotLiked);
                }
            }
            ReactionAction::Dislike => {
                if self.dislikes.contains(user_id) {
                    return Err(ReactionRejection::AlreadyDisliked);
                }
                self.dislikes.insert(user_id.to_string());
                if mode == ReactionMode::Exclusive {
                    self.likes.remove(user_id);
                }
            }
            ReactionAction::Undislike => {
                if !self.dislikes.remove(user_id) {
                    return Err(ReactionRejection::NotDisliked);
                }
            }
        }
        Ok(self.counts())
    }

    pub fn counts(&self) -> ReactionCounts {
        ReactionCounts {
            likes: self.likes.len(),
            dislikes: self.dislikes.len(),
        }
    }
}

/// Request body of a reaction endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionRequest {
    #[serde(default)]
    pub action: Option<String>,
}

/// A stored document that carries reactions.
pub trait Reactable: Document {
    fn reactions_mut(&mut self) -> &mut Reactions;
}

use serde::{Deserialize, Serialize};
use socialnet_store::Document;

use super::{PostView, Reactable, Reactions};

/// A comment, optionally attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    /// Target post id. Not checked for existence.
    #[serde(default)]
    pub comment_on_post: Option<String>,
    pub posted_by: String,
    #[serde(flatten)]
    pub reactions: Reactions,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for Comment {
    const KIND: &'static str = "comment";

    fn kv_prefix() -> &'static str {
        "social:comment:"
    }

    fn key_value(&self) -> String {
        self.id.clone()
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }

    fn before_create(&mut self) {
        if self.id.is_empty() {
            self.id = socialnet_core::new_id();
        }
        let now = socialnet_core::now_rfc3339();
        self.created_at = now.clone();
        self.updated_at = now;
    }

    fn before_update(&mut self) {
        self.updated_at = socialnet_core::now_rfc3339();
    }
}

impl Reactable for Comment {
    fn reactions_mut(&mut self) -> &mut Reactions {
        &mut self.reactions
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub comment_on_post: Option<String>,
}

/// Comment with its target post (and that post's author) resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub post: Option<PostView>,
}

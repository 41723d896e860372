use serde::{Deserialize, Serialize};
use socialnet_store::Document;

use super::{PublicUser, Reactable, Reactions};

/// A post authored by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Author user id.
    pub posted_by: String,
    #[serde(flatten)]
    pub reactions: Reactions,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for Post {
    const KIND: &'static str = "post";

    fn kv_prefix() -> &'static str {
        "social:post:"
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

impl Reactable for Post {
    fn reactions_mut(&mut self) -> &mut Reactions {
        &mut self.reactions
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Post with its author resolved. `author` is null when the author no
/// longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<PublicUser>,
}

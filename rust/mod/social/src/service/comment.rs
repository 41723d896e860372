use socialnet_core::{ListParams, ListResult, retain_keys};

use crate::model::{
    Action, AuthenticatedIdentity, Comment, CommentView, CreateComment, ReactionAction,
    ReactionCounts, Reactions, Resource,
};
use crate::service::{SocialError, SocialService, patch_record, required, required_in_patch};

const UPDATABLE_FIELDS: &[&str] = &["content", "commentOnPost"];

impl SocialService {
    /// Create a comment authored by the caller. The target post id is
    /// stored as given.
    pub fn create_comment(
        &self,
        actor: &AuthenticatedIdentity,
        input: CreateComment,
    ) -> Result<Comment, SocialError> {
        self.policy
            .check(actor.role, Resource::Comment, Action::CreateOwn)
            .map_err(SocialError::Unauthorized)?;

        let content = required("content", input.content)?;

        let comment = self.comments.save_new(Comment {
            id: String::new(),
            content,
            comment_on_post: input.comment_on_post,
            posted_by: actor.id.clone(),
            reactions: Reactions::default(),
            created_at: String::new(),
            updated_at: String::new(),
        })?;

        tracing::info!(comment_id = %comment.id, user_id = %actor.id, "comment created");
        Ok(comment)
    }

    pub fn get_comment(&self, id: &str) -> Result<Comment, SocialError> {
        Ok(self.comments.get_or_err(id)?)
    }

    /// Comment with its post and the post's author resolved.
    pub fn view_comment(&self, comment: Comment) -> Result<CommentView, SocialError> {
        let post = match comment.comment_on_post.as_deref() {
            Some(post_id) => match self.posts.get(post_id)? {
                Some(post) => Some(self.view_post(post)?),
                None => None,
            },
            None => None,
        };
        Ok(CommentView { comment, post })
    }

    /// List comments, oldest first, with posts resolved.
    pub fn list_comments(&self, params: &ListParams) -> Result<ListResult<CommentView>, SocialError> {
        let page = self.comments.list_paginated(params)?;
        let mut items = Vec::with_capacity(page.items.len());
        for comment in page.items {
            items.push(self.view_comment(comment)?);
        }
        Ok(ListResult { items, total: page.total })
    }

    pub fn update_comment(&self, id: &str, patch: serde_json::Value) -> Result<Comment, SocialError> {
        let mut patch = retain_keys(&patch, UPDATABLE_FIELDS);
        required_in_patch(&mut patch, &["content"])?;

        let (updated, ()) = self.comments.update_with(id, |comment| patch_record(comment, &patch))?;
        tracing::info!(comment_id = %id, "comment updated");
        Ok(updated)
    }

    /// Delete a comment. Idempotent.
    pub fn delete_comment(&self, id: &str) -> Result<bool, SocialError> {
        let existed = self.comments.delete(id)?;
        if existed {
            tracing::info!(comment_id = %id, "comment deleted");
        }
        Ok(existed)
    }

    pub fn react_to_comment(
        &self,
        actor: &AuthenticatedIdentity,
        id: &str,
        action: Option<&str>,
    ) -> Result<(ReactionAction, ReactionCounts), SocialError> {
        self.react(&self.comments, Resource::Comment, actor, id, action)
    }
}

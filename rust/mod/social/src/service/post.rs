use chrono::{DateTime, Utc};
use socialnet_core::{ListParams, ListResult, retain_keys};

use crate::model::{
    Action, AuthenticatedIdentity, CreatePost, Post, PostView, PublicUser, ReactionAction,
    ReactionCounts, Reactions, Resource,
};
use crate::service::{SocialError, SocialService, patch_record, required, required_in_patch};

const UPDATABLE_FIELDS: &[&str] = &["title", "content"];

impl SocialService {
    /// Create a post authored by the caller.
    ///
    /// The role check runs before any input validation.
    pub fn create_post(
        &self,
        actor: &AuthenticatedIdentity,
        input: CreatePost,
    ) -> Result<Post, SocialError> {
        self.policy
            .check(actor.role, Resource::Post, Action::CreateOwn)
            .map_err(SocialError::Unauthorized)?;

        let title = required("title", input.title)?;
        let content = required("content", input.content)?;

        let post = self.posts.save_new(Post {
            id: String::new(),
            title,
            content,
            posted_by: actor.id.clone(),
            reactions: Reactions::default(),
            created_at: String::new(),
            updated_at: String::new(),
        })?;

        tracing::info!(post_id = %post.id, user_id = %actor.id, "post created");
        Ok(post)
    }

    pub fn get_post(&self, id: &str) -> Result<Post, SocialError> {
        Ok(self.posts.get_or_err(id)?)
    }

    /// Post with its author resolved.
    pub fn view_post(&self, post: Post) -> Result<PostView, SocialError> {
        let author = self.users.get(&post.posted_by)?.as_ref().map(PublicUser::from);
        Ok(PostView { post, author })
    }

    /// List posts, oldest first, with authors resolved.
    pub fn list_posts(&self, params: &ListParams) -> Result<ListResult<PostView>, SocialError> {
        let page = self.posts.list_paginated(params)?;
        let mut items = Vec::with_capacity(page.items.len());
        for post in page.items {
            items.push(self.view_post(post)?);
        }
        Ok(ListResult { items, total: page.total })
    }

    /// Update title and/or content with merge-patch semantics.
    pub fn update_post(&self, id: &str, patch: serde_json::Value) -> Result<Post, SocialError> {
        let mut patch = retain_keys(&patch, UPDATABLE_FIELDS);
        required_in_patch(&mut patch, UPDATABLE_FIELDS)?;

        let (updated, ()) = self.posts.update_with(id, |post| patch_record(post, &patch))?;
        tracing::info!(post_id = %id, "post updated");
        Ok(updated)
    }

    /// Delete a post. Idempotent. Comments pointing at it are kept.
    pub fn delete_post(&self, id: &str) -> Result<bool, SocialError> {
        let existed = self.posts.delete(id)?;
        if existed {
            tracing::info!(post_id = %id, "post deleted");
        }
        Ok(existed)
    }

    pub fn react_to_post(
        &self,
        actor: &AuthenticatedIdentity,
        id: &str,
        action: Option<&str>,
    ) -> Result<(ReactionAction, ReactionCounts), SocialError> {
        self.react(&self.posts, Resource::Post, actor, id, action)
    }

    /// Posts created at or after `since`, oldest first.
    pub fn list_posts_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, SocialError> {
        Ok(self.posts.filter(|p| {
            DateTime::parse_from_rfc3339(&p.created_at)
                .map(|t| t.with_timezone(&Utc) >= since)
                .unwrap_or(false)
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReactionMode, Role};
    use crate::service::SocialConfig;
    use crate::service::testing::{identity, make_service, make_service_with, register};

    fn input(title: &str, content: &str) -> CreatePost {
        CreatePost {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    #[test]
    fn create_sets_author_from_actor() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();
        assert_eq!(post.posted_by, a.id);
        assert!(post.reactions.likes.is_empty());

        let views = svc.list_posts(&Default::default()).unwrap();
        assert_eq!(views.total, 1);
        assert_eq!(views.items[0].author.as_ref().unwrap().id, a.id);
    }

    #[test]
    fn admin_cannot_post_even_with_invalid_body() {
        let (svc, _dir) = make_service();
        let admin = register(&svc, "root@example.com", Role::Admin);
        let err = svc.create_post(&identity(&admin), CreatePost::default()).unwrap_err();
        assert!(matches!(err, SocialError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Cannot create posts with role: admin");
        assert_eq!(svc.list_posts(&Default::default()).unwrap().total, 0);
    }

    #[test]
    fn missing_title_rejected() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let err = svc
            .create_post(&identity(&a), CreatePost { title: None, content: Some("c".into()) })
            .unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn update_only_touches_title_and_content() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();

        let updated = svc
            .update_post(&post.id, serde_json::json!({"title": "Bye", "postedBy": "other", "likes": ["x"]}))
            .unwrap();
        assert_eq!(updated.title, "Bye");
        assert_eq!(updated.content, "World");
        assert_eq!(updated.posted_by, a.id);
        assert!(updated.reactions.likes.is_empty());

        let err = svc.update_post("missing", serde_json::json!({"title": "x"})).unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }

    #[test]
    fn update_cannot_blank_required_fields() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();

        let err = svc.update_post(&post.id, serde_json::json!({"title": ""})).unwrap_err();
        assert_eq!(err.to_string(), "title is required");
        let err = svc.update_post(&post.id, serde_json::json!({"content": null})).unwrap_err();
        assert_eq!(err.to_string(), "content is required");

        let stored = svc.get_post(&post.id).unwrap();
        assert_eq!((stored.title.as_str(), stored.content.as_str()), ("Hello", "World"));
    }

    #[test]
    fn concurrent_likes_all_land() {
        let (svc, _dir) = make_service();
        let author = register(&svc, "author@example.com", Role::User);
        let post = svc.create_post(&identity(&author), input("Hello", "World")).unwrap();
        let fans: Vec<_> = (0..16)
            .map(|i| register(&svc, &format!("fan{}@example.com", i), Role::User))
            .collect();

        let threads: Vec<_> = fans
            .iter()
            .map(|fan| {
                let svc = svc.clone();
                let fan = identity(fan);
                let post_id = post.id.clone();
                std::thread::spawn(move || svc.react_to_post(&fan, &post_id, Some("like")))
            })
            .collect();
        for t in threads {
            t.join().unwrap().unwrap();
        }

        let stored = svc.get_post(&post.id).unwrap();
        assert_eq!(stored.reactions.likes.len(), 16);
        for fan in &fans {
            assert!(stored.reactions.likes.contains(&fan.id));
        }
    }

    #[test]
    fn concurrent_duplicate_like_counted_once() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                let me = identity(&a);
                let post_id = post.id.clone();
                std::thread::spawn(move || svc.react_to_post(&me, &post_id, Some("like")))
            })
            .collect();
        let results: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for err in results.into_iter().filter_map(Result::err) {
            assert_eq!(err.to_string(), "already liked");
        }
        assert_eq!(svc.get_post(&post.id).unwrap().reactions.likes.len(), 1);
    }

    #[test]
    fn reactions_toggle() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let b = register(&svc, "b@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();

        let (_, counts) = svc.react_to_post(&identity(&b), &post.id, Some("like")).unwrap();
        assert_eq!(counts.likes, 1);
        let err = svc.react_to_post(&identity(&b), &post.id, Some("like")).unwrap_err();
        assert!(matches!(err, SocialError::Rejected(ref m) if m == "already liked"));

        let (_, counts) = svc.react_to_post(&identity(&b), &post.id, Some("dislike")).unwrap();
        assert_eq!((counts.likes, counts.dislikes), (1, 1));

        let err = svc.react_to_post(&identity(&b), &post.id, None).unwrap_err();
        assert_eq!(err.to_string(), "no valid action");

        let err = svc.react_to_post(&identity(&b), "missing", Some("like")).unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }

    #[test]
    fn exclusive_reactions() {
        let config = SocialConfig {
            reaction_mode: ReactionMode::Exclusive,
            ..Default::default()
        };
        let (svc, _dir) = make_service_with(config);
        let a = register(&svc, "a@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();

        svc.react_to_post(&identity(&a), &post.id, Some("like")).unwrap();
        let (_, counts) = svc.react_to_post(&identity(&a), &post.id, Some("dislike")).unwrap();
        assert_eq!((counts.likes, counts.dislikes), (0, 1));
    }

    #[test]
    fn orphaned_post_has_null_author() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        svc.create_post(&identity(&a), input("Hello", "World")).unwrap();
        svc.delete_user(&a.id).unwrap();

        let views = svc.list_posts(&Default::default()).unwrap();
        assert!(views.items[0].author.is_none());
    }

    #[test]
    fn created_since_filters_by_timestamp() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let before = Utc::now() - chrono::Duration::seconds(1);
        svc.create_post(&identity(&a), input("One", "1")).unwrap();
        svc.create_post(&identity(&a), input("Two", "2")).unwrap();

        let recent = svc.list_posts_created_since(before).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "One");

        let future = Utc::now() + chrono::Duration::minutes(1);
        assert!(svc.list_posts_created_since(future).unwrap().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let (svc, _dir) = make_service();
        let a = register(&svc, "a@example.com", Role::User);
        let post = svc.create_post(&identity(&a), input("Hello", "World")).unwrap();
        assert!(svc.delete_post(&post.id).unwrap());
        assert!(!svc.delete_post(&post.id).unwrap());
    }
}

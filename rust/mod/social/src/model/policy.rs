use std::collections::{HashMap, HashSet};
use std::fmt;

use super::Role;

/// Resource kinds covered by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Post,
    Comment,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Post => "post",
            Resource::Comment => "comment",
        })
    }
}

/// Actions a role may be granted on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a resource owned by the caller.
    CreateOwn,
    /// Like or dislike a resource.
    React,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::CreateOwn => "create",
            Action::React => "react to",
        })
    }
}

/// Static role → resource → actions table. Anything not granted is denied.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    grants: HashMap<Role, HashMap<Resource, HashSet<Action>>>,
}

impl AccessPolicy {
    /// Empty policy: denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `action` on `resource` to `role`.
    pub fn grant(mut self, role: Role, resource: Resource, action: Action) -> Self {
        self.grants
            .entry(role)
            .or_default()
            .entry(resource)
            .or_default()
            .insert(action);
        self
    }

    /// The built-in table. Admins may comment and react but not post.
    pub fn standard() -> Self {
        Self::new()
            .grant(Role::User, Resource::Post, Action::CreateOwn)
            .grant(Role::User, Resource::Post, Action::React)
            .grant(Role::User, Resource::Comment, Action::CreateOwn)
            .grant(Role::User, Resource::Comment, Action::React)
            .grant(Role::Admin, Resource::Post, Action::React)
            .grant(Role::Admin, Resource::Comment, Action::CreateOwn)
            .grant(Role::Admin, Resource::Comment, Action::React)
    }

    pub fn is_allowed(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.grants
            .get(&role)
            .and_then(|by_resource| by_resource.get(&resource))
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Ok if allowed, otherwise the denial message.
    pub fn check(&self, role: Role, resource: Resource, action: Action) -> Result<(), String> {
        if self.is_allowed(role, resource, action) {
            Ok(())
        } else {
            Err(format!("Cannot {} {}s with role: {}", action, resource, role))
        }
    }
}

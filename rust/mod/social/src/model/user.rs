use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use socialnet_store::Document;

/// Role carried by a user and by every token issued to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    /// Lower-cased, trimmed. Unique across users.
    pub email: String,

    /// argon2id PHC string. Never leaves the service.
    pub password_hash: String,

    #[serde(default)]
    pub role: Role,

    /// Ids of befriended users. Symmetric: if B is in A's set, A is in B's.
    #[serde(default)]
    pub friends: BTreeSet<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

impl Document for User {
    const KIND: &'static str = "user";

    fn kv_prefix() -> &'static str {
        "social:user:"
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

/// User as returned over the API: everything but the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub friends: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            role: u.role,
            friends: u.friends.iter().cloned().collect(),
            created_at: u.created_at.clone(),
            updated_at: u.updated_at.clone(),
        }
    }
}

/// Listing entry with each friend id resolved to its public record.
///
/// Friends that no longer exist are left out.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithFriends {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub friends: Vec<PublicUser>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserWithFriends {
    pub fn new(u: &User, friends: Vec<PublicUser>) -> Self {
        Self {
            id: u.id.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            role: u.role,
            friends,
            created_at: u.created_at.clone(),
            updated_at: u.updated_at.clone(),
        }
    }
}

/// Registration input. Fields are optional so a missing one can be
/// reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Canonical form of an email address used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

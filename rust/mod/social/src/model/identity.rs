use serde::{Deserialize, Serialize};

use super::{Role, User};

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,

    pub email: String,

    pub first_name: String,

    pub role: Role,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Who is making the request. Decoded from a verified token and stored in
/// request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub role: Role,
}

impl From<&User> for AuthenticatedIdentity {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            role: u.role,
        }
    }
}

impl From<Claims> for AuthenticatedIdentity {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            first_name: c.first_name,
            role: c.role,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

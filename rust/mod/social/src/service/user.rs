use socialnet_core::{ListParams, ListResult, ServiceError, new_id, retain_keys};
use socialnet_kv::WriteBatch;
use socialnet_store::retry_on_change;

use crate::model::{
    AuthenticatedIdentity, CreateUser, LoginRequest, PublicUser, User, UserWithFriends,
    normalize_email,
};
use crate::service::password::{hash_password, verify_password};
use crate::service::{SocialError, SocialService, patch_record, required, required_in_patch};

const EMAIL_TAKEN: &str = "User exists with the provided email";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Fields a client may change through `update_user`.
const UPDATABLE_FIELDS: &[&str] = &["first_name", "last_name", "email", "password", "role"];

/// Index key mapping a normalized email to its user id.
fn email_key(email: &str) -> String {
    format!("social:email:{}", email)
}

impl SocialService {
    /// Register a new user. The email index entry is written in the same
    /// commit as the user, so two concurrent registrations of one address
    /// cannot both succeed.
    pub fn register(&self, input: CreateUser) -> Result<User, SocialError> {
        let first_name = required("first_name", input.first_name)?;
        let last_name = required("last_name", input.last_name)?;
        let email = normalize_email(&required("email", input.email)?);
        let password = match input.password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(SocialError::Validation("password is required".into())),
        };

        if self.find_user_by_email(&email)?.is_some() {
            return Err(SocialError::Conflict(EMAIL_TAKEN.into()));
        }

        let user = User {
            id: new_id(),
            first_name,
            last_name,
            email: email.clone(),
            password_hash: hash_password(&password)?,
            role: input.role.unwrap_or_default(),
            friends: Default::default(),
            created_at: String::new(),
            updated_at: String::new(),
        };

        let mut index = WriteBatch::new();
        index
            .expect_absent(email_key(&email))
            .set(email_key(&email), user.id.as_bytes().to_vec());

        let user = self.users.save_new_with(user, index).map_err(|e| match e {
            ServiceError::Conflict(_) => SocialError::Conflict(EMAIL_TAKEN.into()),
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password fail identically.
    pub fn login(&self, input: LoginRequest) -> Result<String, SocialError> {
        let email = normalize_email(&required("email", input.email)?);
        let password = match input.password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(SocialError::Validation("password is required".into())),
        };

        let user = match self.find_user_by_email(&email)? {
            Some(u) if verify_password(&password, &u.password_hash) => u,
            _ => {
                tracing::warn!("login failed");
                return Err(SocialError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
        };

        let token = self.tokens.issue(&AuthenticatedIdentity::from(&user))?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Verify a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<AuthenticatedIdentity, SocialError> {
        Ok(self.tokens.verify(token)?)
    }

    /// Look up a user through the email index.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, SocialError> {
        let key = email_key(&normalize_email(email));
        let id = match self.kv.get(&key) {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .map_err(|e| SocialError::Internal(format!("email index: {}", e)))?,
            Ok(None) => return Ok(None),
            Err(e) => return Err(SocialError::Storage(e.to_string())),
        };
        Ok(self.users.get(&id)?)
    }

    pub fn get_user(&self, id: &str) -> Result<User, SocialError> {
        Ok(self.users.get_or_err(id)?)
    }

    /// List users with each friend id resolved.
    pub fn list_users(&self, params: &ListParams) -> Result<ListResult<UserWithFriends>, SocialError> {
        let page = self.users.list_paginated(params)?;
        let mut items = Vec::with_capacity(page.items.len());
        for user in &page.items {
            let mut friends = Vec::with_capacity(user.friends.len());
            for fid in &user.friends {
                if let Some(friend) = self.users.get(fid)? {
                    friends.push(PublicUser::from(&friend));
                }
            }
            items.push(UserWithFriends::new(user, friends));
        }
        Ok(ListResult { items, total: page.total })
    }

    /// Update a user with JSON merge-patch semantics.
    ///
    /// Only the profile fields, email, password and role are writable.
    /// A new password is re-hashed; a new email must be free. The patch is
    /// applied to the latest stored user, so a concurrent friendship change
    /// or email change is never overwritten.
    pub fn update_user(&self, id: &str, patch: serde_json::Value) -> Result<User, SocialError> {
        let mut patch = retain_keys(&patch, UPDATABLE_FIELDS);
        required_in_patch(&mut patch, &["first_name", "last_name"])?;

        if let Some(obj) = patch.as_object_mut() {
            if let Some(pw) = obj.remove("password") {
                match pw.as_str() {
                    Some(p) if !p.is_empty() => {
                        obj.insert("password_hash".into(), serde_json::json!(hash_password(p)?));
                    }
                    _ => return Err(SocialError::Validation("password must be a non-empty string".into())),
                }
            }
            if let Some(email) = obj.get("email").and_then(|v| v.as_str()) {
                let email = normalize_email(email);
                if email.is_empty() {
                    return Err(SocialError::Validation("email is required".into()));
                }
                obj.insert("email".into(), serde_json::json!(email));
            }
        }

        let updated = retry_on_change(|| -> Result<Option<User>, SocialError> {
            let snap = self.users.snapshot(id)?;
            let mut updated = snap.record.clone();
            patch_record(&mut updated, &patch)?;

            let mut batch = WriteBatch::new();
            if updated.email != snap.record.email {
                batch
                    .expect_absent(email_key(&updated.email))
                    .set(email_key(&updated.email), updated.id.as_bytes().to_vec())
                    .delete(email_key(&snap.record.email));
            }
            let updated = self.users.stage_over(&mut batch, &snap, updated)?;
            match self.users.try_commit(batch) {
                Ok(committed) => Ok(committed.then_some(updated)),
                Err(ServiceError::Conflict(_)) => Err(SocialError::Conflict(EMAIL_TAKEN.into())),
                Err(e) => Err(e.into()),
            }
        })?;

        tracing::info!(user_id = %id, "user updated");
        Ok(updated)
    }

    /// Delete a user and their email index entry. Idempotent.
    ///
    /// Friend sets of other users are left as they are; dangling ids are
    /// skipped when friends are resolved.
    pub fn delete_user(&self, id: &str) -> Result<bool, SocialError> {
        let existed = retry_on_change(|| -> Result<Option<bool>, SocialError> {
            let snap = match self.users.snapshot(id) {
                Ok(snap) => snap,
                Err(ServiceError::NotFound(_)) => return Ok(Some(false)),
                Err(e) => return Err(e.into()),
            };
            let mut batch = WriteBatch::new();
            batch.delete(email_key(&snap.record.email));
            self.users.delete_over(&mut batch, &snap);
            Ok(self.users.try_commit(batch)?.then_some(true))
        })?;
        if existed {
            tracing::info!(user_id = %id, "user deleted");
        }
        Ok(existed)
    }
}

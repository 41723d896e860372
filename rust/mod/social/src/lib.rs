//! Social module: users, friendships, posts, comments and reactions.
//!
//! The HTTP API is mounted at the server root:
//! - `/users` registration, login, profile CRUD and `/users/addfriend`
//! - `/posts` CRUD and `/posts/{id}/likes`
//! - `/comments` CRUD and `/comments/{id}/likes`

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use socialnet_core::Module;

pub use service::{SocialConfig, SocialError, SocialService};

/// Module wrapper registered by the server binary.
pub struct SocialModule {
    service: Arc<SocialService>,
}

impl SocialModule {
    pub fn new(service: Arc<SocialService>) -> Self {
        Self { service }
    }
}

impl Module for SocialModule {
    fn name(&self) -> &str {
        "social"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}

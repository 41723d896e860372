pub mod config;
pub mod error;
pub mod module;
pub mod payload;
pub mod reply;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use payload::Payload;
pub use reply::Reply;
pub use types::{ListParams, ListResult, merge_patch, new_id, now_rfc3339, retain_keys};

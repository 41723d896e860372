//! Generic document persistence over a [`socialnet_kv::KVStore`].
//!
//! Models implement [`Document`] to declare their key prefix and lifecycle
//! hooks; [`Repo`] provides create/get/list/update/delete on top. Updates
//! are guarded by the snapshot they were computed from, so concurrent
//! writers retry instead of overwriting each other.

pub mod kv;

pub use kv::{Document, Repo, Snapshot, retry_on_change};

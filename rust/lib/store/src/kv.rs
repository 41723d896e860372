//! Document trait + Repo CRUD operations.
//!
//! The model impls `Document` to declare its prefix and hooks.
//! `Repo<T>` provides the actual get/save/update/list/delete using a KVStore backend.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use socialnet_core::{ListParams, ListResult, ServiceError};
use socialnet_kv::{KVError, KVStore, WriteBatch};

/// Trait implemented by models to declare KV storage behavior.
///
/// Hooks have default no-op impls.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource name used in error messages, e.g. "post".
    const KIND: &'static str;

    /// KV key prefix: "{module}:{resource}:".
    fn kv_prefix() -> &'static str;

    /// Extract the key value from this instance as a string.
    fn key_value(&self) -> String;

    /// RFC 3339 creation timestamp, used for list ordering.
    fn created_at(&self) -> &str;

    /// Called before inserting a new record. Use for auto-fill (uuid, timestamps).
    fn before_create(&mut self) {}

    /// Called before updating an existing record.
    fn before_update(&mut self) {}
}

/// Attempts a read-modify-write makes before giving up.
const MAX_ATTEMPTS: usize = 64;

/// Run `attempt` until it commits. `attempt` returns `Ok(None)` when its
/// commit lost a race with another writer.
pub fn retry_on_change<R, E>(mut attempt: impl FnMut() -> Result<Option<R>, E>) -> Result<R, E>
where
    E: From<ServiceError>,
{
    for _ in 0..MAX_ATTEMPTS {
        if let Some(done) = attempt()? {
            return Ok(done);
        }
    }
    Err(ServiceError::Conflict("too many concurrent updates, try again".into()).into())
}

/// A stored record together with the exact bytes it was read from.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub record: T,
    key: String,
    raw: Vec<u8>,
}

/// CRUD operations for a Document model. Holds a reference to the KV backend.
pub struct Repo<T: Document> {
    kv: Arc<dyn KVStore>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Document> Clone for Repo<T> {
    fn clone(&self) -> Self {
        Self::new(self.kv.clone())
    }
}

impl<T: Document> Repo<T> {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Full storage key for a record id.
    pub fn key(id: &str) -> String {
        format!("{}{}", T::kv_prefix(), id)
    }

    fn kv_err(e: KVError) -> ServiceError {
        match e {
            KVError::Exists(key) => ServiceError::Conflict(format!("key '{}' already exists", key)),
            other => ServiceError::Storage(other.to_string()),
        }
    }

    fn encode(record: &T) -> Result<Vec<u8>, ServiceError> {
        serde_json::to_vec(record)
            .map_err(|e| ServiceError::Internal(format!("serialize {}: {}", T::KIND, e)))
    }

    fn decode(bytes: &[u8]) -> Result<T, ServiceError> {
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::Internal(format!("deserialize {}: {}", T::KIND, e)))
    }

    /// Get a record by key value. Returns None if not found.
    pub fn get(&self, id: &str) -> Result<Option<T>, ServiceError> {
        match self.kv.get(&Self::key(id)).map_err(Self::kv_err)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Get a record or return NotFound error.
    pub fn get_or_err(&self, id: &str) -> Result<T, ServiceError> {
        self.get(id)?.ok_or_else(|| {
            ServiceError::NotFound(format!("{} '{}' not found", T::KIND, id))
        })
    }

    /// List all records with this prefix, oldest first.
    pub fn list(&self) -> Result<Vec<T>, ServiceError> {
        let entries = self.kv.scan(T::kv_prefix()).map_err(Self::kv_err)?;
        let mut records = Vec::with_capacity(entries.len());
        for (_key, bytes) in entries {
            records.push(Self::decode(&bytes)?);
        }
        records.sort_by(|a, b| a.created_at().cmp(b.created_at()));
        Ok(records)
    }

    /// List records with pagination (limit/offset).
    ///
    /// Scans all entries then slices in memory. For KV stores the full scan
    /// is unavoidable; pagination just controls how much is returned to the caller.
    pub fn list_paginated(&self, params: &ListParams) -> Result<ListResult<T>, ServiceError> {
        let all = self.list()?;
        let total = all.len();
        let items: Vec<T> = all
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect();
        Ok(ListResult { items, total })
    }

    /// Records matching a predicate, oldest first.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Result<Vec<T>, ServiceError> {
        Ok(self.list()?.into_iter().filter(|r| pred(r)).collect())
    }

    /// Create a new record. Calls before_create hook, rejects duplicate keys.
    pub fn save_new(&self, record: T) -> Result<T, ServiceError> {
        self.save_new_with(record, WriteBatch::new())
    }

    /// Create a new record together with extra writes in one atomic commit.
    ///
    /// Any `expect_absent` guard in `extra` failing aborts the whole commit
    /// with `ServiceError::Conflict`.
    pub fn save_new_with(&self, mut record: T, mut extra: WriteBatch) -> Result<T, ServiceError> {
        record.before_create();

        let key = Self::key(&record.key_value());
        extra.expect_absent(key.clone());
        extra.set(key, Self::encode(&record)?);
        self.kv.commit(extra).map_err(Self::kv_err)?;

        Ok(record)
    }

    /// Read, modify and write back one record without losing concurrent
    /// updates.
    ///
    /// `change` runs against the latest stored version; if another writer
    /// commits in between, the record is reloaded and `change` runs again.
    /// An error from `change` aborts without writing.
    pub fn update_with<R, E>(
        &self,
        id: &str,
        mut change: impl FnMut(&mut T) -> Result<R, E>,
    ) -> Result<(T, R), E>
    where
        E: From<ServiceError>,
    {
        retry_on_change(|| -> Result<Option<(T, R)>, E> {
            let snap = self.snapshot(id)?;
            let mut record = snap.record.clone();
            let out = change(&mut record)?;

            let mut batch = WriteBatch::new();
            let record = self.stage_over(&mut batch, &snap, record)?;
            Ok(self.try_commit(batch)?.then_some((record, out)))
        })
    }

    /// Load a record along with the stored bytes it was decoded from.
    pub fn snapshot(&self, id: &str) -> Result<Snapshot<T>, ServiceError> {
        let key = Self::key(id);
        match self.kv.get(&key).map_err(Self::kv_err)? {
            Some(raw) => Ok(Snapshot {
                record: Self::decode(&raw)?,
                key,
                raw,
            }),
            None => Err(ServiceError::NotFound(format!("{} '{}' not found", T::KIND, id))),
        }
    }

    /// Stage `record` as the successor of `snap`. The batch only commits if
    /// the stored record is still the one `snap` was taken from.
    pub fn stage_over(
        &self,
        batch: &mut WriteBatch,
        snap: &Snapshot<T>,
        record: T,
    ) -> Result<T, ServiceError> {
        batch.expect_value(snap.key.clone(), snap.raw.clone());
        self.stage(batch, record)
    }

    /// Add an update of `record` to `batch` without committing.
    fn stage(&self, batch: &mut WriteBatch, mut record: T) -> Result<T, ServiceError> {
        record.before_update();
        batch.set(Self::key(&record.key_value()), Self::encode(&record)?);
        Ok(record)
    }

    /// Stage removal of the record `snap` was taken from, guarded like
    /// [`Repo::stage_over`].
    pub fn delete_over(&self, batch: &mut WriteBatch, snap: &Snapshot<T>) {
        batch.expect_value(snap.key.clone(), snap.raw.clone());
        batch.delete(snap.key.clone());
    }

    /// Atomically apply a batch built with [`Repo::stage_over`].
    ///
    /// Returns `false` when a snapshot guard failed because another writer
    /// got there first; nothing was written and the caller should reload.
    pub fn try_commit(&self, batch: WriteBatch) -> Result<bool, ServiceError> {
        match self.kv.commit(batch) {
            Ok(()) => Ok(true),
            Err(KVError::Changed(key)) => {
                tracing::debug!(%key, "record changed concurrently, retrying");
                Ok(false)
            }
            Err(e) => Err(Self::kv_err(e)),
        }
    }

    /// Delete a record by key value.
    ///
    /// Idempotent: returns whether the record existed, never NotFound.
    pub fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let key = Self::key(id);
        let existed = self.kv.get(&key).map_err(Self::kv_err)?.is_some();
        self.kv.delete(&key).map_err(Self::kv_err)?;
        Ok(existed)
    }
}

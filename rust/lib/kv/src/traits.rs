use crate::error::KVError;

/// KVStore provides a key-value storage interface.
///
/// Keys follow a namespaced convention: `social:user:<id>`,
/// `social:email:<address>`, etc.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;

    /// Apply a batch atomically: either every write lands or none does.
    ///
    /// Fails with `KVError::Exists` if any `expect_absent` key is present,
    /// or with `KVError::Changed` if any `expect_value` key no longer holds
    /// the expected bytes, when the batch is applied.
    fn commit(&self, batch: WriteBatch) -> Result<(), KVError>;
}

/// A set of writes applied in a single transaction.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    pub(crate) expect_absent: Vec<String>,
    pub(crate) expect_value: Vec<(String, Vec<u8>)>,
    pub(crate) sets: Vec<(String, Vec<u8>)>,
    pub(crate) deletes: Vec<String>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the whole batch if `key` exists.
    pub fn expect_absent(&mut self, key: impl Into<String>) -> &mut Self {
        self.expect_absent.push(key.into());
        self
    }

    /// Abort the whole batch unless `key` still holds exactly `value`.
    pub fn expect_value(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.expect_value.push((key.into(), value));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.sets.push((key.into(), value));
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.deletes.push(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expect_absent.is_empty()
            && self.expect_value.is_empty()
            && self.sets.is_empty()
            && self.deletes.is_empty()
    }
}

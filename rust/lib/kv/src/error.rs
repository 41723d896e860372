use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    /// A key guarded with `expect_absent` already existed at commit time.
    #[error("key already exists: {0}")]
    Exists(String),

    /// A key guarded with `expect_value` no longer held the expected bytes.
    #[error("key changed concurrently: {0}")]
    Changed(String),

    #[error("storage error: {0}")]
    Storage(String),
}

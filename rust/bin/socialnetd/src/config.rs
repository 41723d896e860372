//! Server configuration, loaded from a TOML file.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/socialnet"
//!
//! [jwt]
//! secret = "change-me"
//! ttl_minutes = 20
//!
//! [reactions]
//! exclusive = false
//!
//! [digest]
//! enabled = true
//! interval_secs = 120
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory searched for named configs.
const CONFIG_DIR: &str = "/etc/socialnet";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub reactions: ReactionsConfig,
    #[serde(default)]
    pub digest: DigestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Overrides `{data_dir}/data.redb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    /// Token lifetime in minutes.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReactionsConfig {
    /// Like and dislike by the same user exclude each other.
    #[serde(default)]
    pub exclusive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_ttl_minutes() -> i64 {
    20
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    120
}

impl ServerConfig {
    /// A bare name resolves to `/etc/socialnet/<name>.toml`; anything
    /// containing `/` or `.` is used as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            Path::new(CONFIG_DIR).join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

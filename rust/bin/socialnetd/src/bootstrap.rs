//! Start-up checks.

use crate::config::ServerConfig;

/// Refuse to start with a configuration that cannot work.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!(
            "JWT secret is empty.\n\
             Set [jwt] secret in the config file, or pass --jwt-secret / JWT_SECRET_KEY."
        );
    }
    if config.jwt.ttl_minutes <= 0 {
        anyhow::bail!("[jwt] ttl_minutes must be positive.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.digest.enabled && config.digest.interval_secs == 0 {
        anyhow::bail!("[digest] interval_secs must be positive when the digest is enabled.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DigestConfig, JwtConfig, ReactionsConfig, StorageConfig};

    fn config() -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
                db_path: None,
            },
            jwt: JwtConfig {
                secret: "test".to_string(),
                ttl_minutes: 20,
            },
            reactions: ReactionsConfig::default(),
            digest: DigestConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(verify_config(&config()).is_ok());
    }

    #[test]
    fn test_empty_secret() {
        let mut c = config();
        c.jwt.secret = String::new();
        assert!(verify_config(&c).is_err());
    }

    #[test]
    fn test_empty_data_dir() {
        let mut c = config();
        c.storage.data_dir = String::new();
        assert!(verify_config(&c).is_err());
    }

    #[test]
    fn test_zero_digest_interval() {
        let mut c = config();
        c.digest.interval_secs = 0;
        assert!(verify_config(&c).is_err());
        c.digest.enabled = false;
        assert!(verify_config(&c).is_ok());
    }
}

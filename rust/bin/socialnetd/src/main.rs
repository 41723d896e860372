//! `socialnetd`: the social network server binary.
//!
//! Usage:
//!   socialnetd -c <config-name-or-path> [--listen <addr>] [--jwt-secret <secret>]
//!
//! A config name resolves to `/etc/socialnet/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod digest;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use socialnet_core::Module;
use tokio::signal;
use tracing::{error, info};

use config::ServerConfig;
use social::model::ReactionMode;
use social::{SocialConfig, SocialModule, SocialService};

/// Social network server.
#[derive(Parser, Debug)]
#[command(name = "socialnetd", about = "Social network server", version)]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// JWT signing secret (overrides the config file).
    #[arg(long = "jwt-secret", env = "JWT_SECRET_KEY", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let mut server_config = ServerConfig::load(&config_path)?;
    if let Some(secret) = cli.jwt_secret {
        server_config.jwt.secret = secret;
    }

    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = socialnet_core::ServiceConfig {
        data_dir: Some(data_dir),
        db_path: server_config.storage.db_path.as_ref().map(PathBuf::from),
        listen: cli.listen.clone(),
    };

    let kv: Arc<dyn socialnet_kv::KVStore> = Arc::new(
        socialnet_kv::RedbStore::open(&core_config.resolve_db_path())
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );

    let social_config = SocialConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        token_ttl_minutes: server_config.jwt.ttl_minutes,
        reaction_mode: if server_config.reactions.exclusive {
            ReactionMode::Exclusive
        } else {
            ReactionMode::Independent
        },
    };
    let service = SocialService::new(Arc::clone(&kv), social_config);
    let social_module = SocialModule::new(Arc::clone(&service));
    info!("Social module initialized");

    let app = routes::build_router(vec![(social_module.name(), social_module.routes())]);

    let digest = server_config
        .digest
        .enabled
        .then(|| digest::start(Arc::clone(&service), server_config.digest.interval_secs));

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("socialnetd listening on {}", core_config.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(cancel) = digest {
        cancel.cancel();
    }
    info!("socialnetd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

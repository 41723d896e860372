//! Periodic digest of newly created posts.
//!
//! Each tick asks the social service for posts created during the last
//! interval and logs a summary. Delivery to subscribers happens elsewhere.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use social::{SocialError, SocialService};

/// Collect and log posts created at or after `since`. Returns how many.
pub fn run_once(svc: &SocialService, since: DateTime<Utc>) -> Result<usize, SocialError> {
    let posts = svc.list_posts_created_since(since)?;
    for post in &posts {
        debug!(post_id = %post.id, author = %post.posted_by, "digest: {}", post.title);
    }
    Ok(posts.len())
}

/// Start the digest loop. Cancel the returned token to stop it.
pub fn start(svc: Arc<SocialService>, interval_secs: u64) -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!("post digest started (interval={interval:?})");
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("post digest stopped");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let since = Utc::now() - chrono::Duration::seconds(interval_secs as i64);
                    match run_once(&svc, since) {
                        Ok(0) => debug!("digest: no new posts"),
                        Ok(n) => info!("digest: {n} new posts since {since}"),
                        Err(e) => error!("digest error: {e}"),
                    }
                }
            }
        }
    });

    cancel
}

//! Publish command - reconcile every local post with the remote CMS

use anyhow::Result;

use crate::config::PublishConfig;
use crate::content::ContentLoader;
use crate::publish::{Outcome, Reconciler};
use crate::remote::{CmsApi, DryRunClient, WpClient};

/// Counts for one publish run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    /// Posts that reached the remote steps and failed there
    pub failed: usize,
    /// Files that never became posts (parse failures)
    pub skipped: usize,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Run a full publish pass. One post is reconciled end to end before the
/// next begins; a failing post is logged and the run moves on.
pub async fn run(config: &PublishConfig) -> Result<RunSummary> {
    let loader = ContentLoader::new(&config.content_dir, config.strict);
    let loaded = loader.load_posts()?;
    tracing::info!(
        "Loaded {} posts from {:?} ({} skipped)",
        loaded.posts.len(),
        config.content_dir,
        loaded.failed.len()
    );

    let api: Box<dyn CmsApi> = if config.dry_run {
        tracing::info!("Dry-run mode: every write will be logged and skipped");
        Box::new(DryRunClient::new(WpClient::new(config.clone())?))
    } else {
        Box::new(WpClient::new(config.clone())?)
    };

    let mut reconciler = Reconciler::new(api.as_ref());
    let mut summary = RunSummary {
        skipped: loaded.failed.len(),
        ..Default::default()
    };

    for post in &loaded.posts {
        match reconciler.reconcile(post).await {
            Ok(Outcome::Created) => {
                tracing::info!("Created post {:?}", post.slug);
                summary.created += 1;
            }
            Ok(Outcome::Updated) => {
                tracing::info!("Updated post {:?}", post.slug);
                summary.updated += 1;
            }
            Err(e) => {
                tracing::error!("Failed to publish {:?}: {}", post.slug, e);
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        "Done: {} created, {} updated, {} failed, {} skipped",
        summary.created,
        summary.updated,
        summary.failed,
        summary.skipped
    );
    Ok(summary)
}

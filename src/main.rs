//! CLI entry point for markpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use markpress::config::PublishConfig;

#[derive(Parser)]
#[command(name = "markpress")]
#[command(version)]
#[command(about = "Publish Markdown content to WordPress via the REST API", long_about = None)]
struct Cli {
    /// Base URL of the WordPress site (env: WP_BASE_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Username for Basic authentication (env: WP_USER)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Application password (env: WP_PASS)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Root of the local content tree
    #[arg(long, default_value = "content", global = true)]
    content: PathBuf,

    /// Also log to a file (optionally with a custom path)
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "markpress.log")]
    log_file: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every local post with the remote site
    #[command(alias = "p")]
    Publish {
        /// Log every write and skip it; no remote state is mutated
        #[arg(long)]
        dry_run: bool,

        /// Require explicit slugs and exit non-zero when any post fails
        #[arg(long)]
        strict: bool,
    },

    /// List local posts without touching the network
    List,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // pick up WP_* variables from a local .env, if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Publish { dry_run, strict } => {
            let config = PublishConfig::resolve(
                cli.url,
                cli.user,
                cli.password,
                cli.content,
                dry_run,
                strict,
            )?;
            tracing::info!("Publishing to {}", config.base_url);

            let summary = markpress::commands::publish::run(&config).await?;
            println!(
                "{} created, {} updated, {} failed, {} skipped",
                summary.created, summary.updated, summary.failed, summary.skipped
            );

            if config.strict && !summary.all_succeeded() {
                anyhow::bail!(
                    "{} post(s) did not publish cleanly",
                    summary.failed + summary.skipped
                );
            }
        }

        Commands::List => {
            markpress::commands::list::run(&cli.content)?;
        }

        Commands::Version => {
            println!("markpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_logging(debug: bool, log_file: Option<&std::path::Path>) -> Result<()> {
    let filter = if debug {
        "markpress=debug,info"
    } else {
        "markpress=info"
    };

    let registry = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer());

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
            tracing::debug!("File logging enabled: {:?}", path);
        }
        None => registry.init(),
    }

    Ok(())
}

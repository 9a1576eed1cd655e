//! Publisher configuration resolved from CLI flags and environment

use std::env;
use std::path::PathBuf;

use crate::error::{PublishError, Result};

/// Environment variable fallbacks for the connection flags
pub const ENV_BASE_URL: &str = "WP_BASE_URL";
pub const ENV_USER: &str = "WP_USER";
pub const ENV_PASS: &str = "WP_PASS";

/// Connection and run parameters for a publish run
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// CMS base URL without a trailing slash
    pub base_url: String,
    /// Account used for Basic authentication
    pub username: String,
    /// Application password for the account
    pub password: String,
    /// Root directory of the local content tree
    pub content_dir: PathBuf,
    /// Log every write and skip it, returning placeholder identifiers
    pub dry_run: bool,
    /// Require explicit slugs and exit non-zero when any post fails
    pub strict: bool,
}

impl PublishConfig {
    /// Resolve configuration from CLI values, falling back to environment
    /// variables for the connection parameters. Missing values are a fatal
    /// configuration error, reported before any network call.
    pub fn resolve(
        url: Option<String>,
        user: Option<String>,
        password: Option<String>,
        content_dir: PathBuf,
        dry_run: bool,
        strict: bool,
    ) -> Result<Self> {
        let url = url.or_else(|| env::var(ENV_BASE_URL).ok());
        let user = user.or_else(|| env::var(ENV_USER).ok());
        let password = password.or_else(|| env::var(ENV_PASS).ok());
        Self::from_parts(url, user, password, content_dir, dry_run, strict)
    }

    /// Validate explicit values without touching the environment
    pub fn from_parts(
        url: Option<String>,
        user: Option<String>,
        password: Option<String>,
        content_dir: PathBuf,
        dry_run: bool,
        strict: bool,
    ) -> Result<Self> {
        let base_url = url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| missing("base URL", "--url", ENV_BASE_URL))?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PublishError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                base_url
            )));
        }

        let username = user
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| missing("username", "--user", ENV_USER))?;

        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| missing("password", "--password", ENV_PASS))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            content_dir,
            dry_run,
            strict,
        })
    }

    /// REST route for a resource, e.g. `https://blog.example/wp-json/wp/v2/posts`
    pub fn api_url(&self, resource: &str) -> String {
        format!("{}/wp-json/wp/v2/{}", self.base_url, resource)
    }
}

fn missing(what: &str, flag: &str, env_var: &str) -> PublishError {
    PublishError::Config(format!(
        "missing {} (pass {} or set {})",
        what, flag, env_var
    ))
}

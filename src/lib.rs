//! markpress: publish Markdown content to WordPress via the REST API
//!
//! Walks a directory of Markdown files with YAML front-matter, uploads
//! bundled images to the media library, ensures categories and tags
//! exist, and creates or updates the matching posts idempotently, keyed
//! by slug.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod publish;
pub mod remote;

pub use config::PublishConfig;
pub use error::PublishError;

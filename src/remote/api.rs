//! The remote API surface the reconciliation core is written against

use async_trait::async_trait;

use super::types::{Applied, PostFields, RemoteMedia, RemotePost, RemoteTerm, TermFields, Taxonomy};
use crate::error::Result;

/// Abstraction over a REST-style CMS: posts, taxonomy terms and media.
///
/// The reconciliation core only talks to this trait, so tests can swap in
/// mocks and the dry-run wrapper can intercept writes. Search endpoints
/// are substring searches on the remote side; callers must post-filter
/// results with an exact key comparison before trusting a match.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CmsApi: Send + Sync {
    /// Substring search of the media library by filename
    async fn search_media(&self, filename: &str) -> Result<Vec<RemoteMedia>>;

    /// Upload raw image bytes under `filename`
    async fn upload_media(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Applied<RemoteMedia>>;

    /// Set descriptive alt text on an existing media entry
    async fn set_media_alt(&self, media_id: i64, alt: &str) -> Result<Applied<()>>;

    /// Substring search of a taxonomy by term name
    async fn search_terms(&self, taxonomy: Taxonomy, name: &str) -> Result<Vec<RemoteTerm>>;

    async fn create_term(&self, taxonomy: Taxonomy, fields: &TermFields)
        -> Result<Applied<RemoteTerm>>;

    async fn update_term(
        &self,
        taxonomy: Taxonomy,
        term_id: i64,
        fields: &TermFields,
    ) -> Result<Applied<RemoteTerm>>;

    /// Exact lookup by the dedicated slug query, `None` when absent
    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<RemotePost>>;

    async fn create_post(&self, fields: &PostFields) -> Result<Applied<RemotePost>>;

    async fn update_post(&self, post_id: i64, fields: &PostFields) -> Result<Applied<RemotePost>>;
}

//! HTTP client for the WordPress REST API, plus the dry-run wrapper

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::api::CmsApi;
use super::types::{
    Applied, PostFields, RemoteMedia, RemotePost, RemoteTerm, Rendered, TermFields, Taxonomy,
    DRY_RUN_ID,
};
use crate::config::PublishConfig;
use crate::error::{PublishError, Result};

/// Real client against `{base}/wp-json/wp/v2/…`, authenticating every
/// request with the configured credential pair.
pub struct WpClient {
    http: reqwest::Client,
    config: PublishConfig,
}

impl WpClient {
    pub fn new(config: PublishConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("markpress/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.config.api_url(resource))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.config.api_url(resource))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(PublishError::from_response(status.as_u16(), &text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CmsApi for WpClient {
    async fn search_media(&self, filename: &str) -> Result<Vec<RemoteMedia>> {
        tracing::debug!("Searching media library for {:?}", filename);
        self.get_json("media", &[("search", filename)]).await
    }

    async fn upload_media(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Applied<RemoteMedia>> {
        tracing::info!("Uploading media {:?} ({} bytes)", filename, bytes.len());
        let response = self
            .http
            .post(self.config.api_url("media"))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            )
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let media: RemoteMedia = Self::decode(response).await?;
        Ok(Applied::Committed(media))
    }

    async fn set_media_alt(&self, media_id: i64, alt: &str) -> Result<Applied<()>> {
        tracing::info!("Setting alt text for media {}: {:?}", media_id, alt);
        let route = format!("media/{}", media_id);
        let _: RemoteMedia = self
            .post_json(&route, &serde_json::json!({ "alt_text": alt }))
            .await?;
        Ok(Applied::Committed(()))
    }

    async fn search_terms(&self, taxonomy: Taxonomy, name: &str) -> Result<Vec<RemoteTerm>> {
        tracing::debug!("Searching {} terms for {:?}", taxonomy, name);
        self.get_json(taxonomy.rest_base(), &[("search", name)])
            .await
    }

    async fn create_term(
        &self,
        taxonomy: Taxonomy,
        fields: &TermFields,
    ) -> Result<Applied<RemoteTerm>> {
        tracing::info!("Creating {} {:?}", taxonomy, fields.name);
        let term = self.post_json(taxonomy.rest_base(), fields).await?;
        Ok(Applied::Committed(term))
    }

    async fn update_term(
        &self,
        taxonomy: Taxonomy,
        term_id: i64,
        fields: &TermFields,
    ) -> Result<Applied<RemoteTerm>> {
        tracing::info!("Updating {} {} ({:?})", taxonomy, term_id, fields.name);
        let route = format!("{}/{}", taxonomy.rest_base(), term_id);
        let term = self.post_json(&route, fields).await?;
        Ok(Applied::Committed(term))
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<RemotePost>> {
        tracing::debug!("Looking up post by slug {:?}", slug);
        let posts: Vec<RemotePost> = self.get_json("posts", &[("slug", slug)]).await?;
        Ok(posts.into_iter().find(|p| p.slug == slug))
    }

    async fn create_post(&self, fields: &PostFields) -> Result<Applied<RemotePost>> {
        tracing::info!("Creating post {:?}", fields.slug);
        let post = self.post_json("posts", fields).await?;
        Ok(Applied::Committed(post))
    }

    async fn update_post(&self, post_id: i64, fields: &PostFields) -> Result<Applied<RemotePost>> {
        tracing::info!("Updating post {} ({:?})", post_id, fields.slug);
        let route = format!("posts/{}", post_id);
        let post = self.post_json(&route, fields).await?;
        Ok(Applied::Committed(post))
    }
}

/// Wraps any [`CmsApi`]: reads pass through, writes are logged and
/// skipped, returning [`Applied::Simulated`] values with deterministic
/// placeholder identifiers.
pub struct DryRunClient<C> {
    inner: C,
}

impl<C: CmsApi> DryRunClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

/// Placeholder URL for a simulated media upload
fn placeholder_url(filename: &str) -> String {
    format!("https://dry-run.invalid/media/{}", filename)
}

#[async_trait]
impl<C: CmsApi> CmsApi for DryRunClient<C> {
    async fn search_media(&self, filename: &str) -> Result<Vec<RemoteMedia>> {
        self.inner.search_media(filename).await
    }

    async fn upload_media(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Applied<RemoteMedia>> {
        tracing::info!(
            "[dry-run] would upload {:?} ({} bytes, {})",
            filename,
            bytes.len(),
            content_type
        );
        Ok(Applied::Simulated(RemoteMedia {
            id: DRY_RUN_ID,
            source_url: placeholder_url(filename),
            title: Rendered {
                rendered: filename.to_string(),
            },
            alt_text: String::new(),
        }))
    }

    async fn set_media_alt(&self, media_id: i64, alt: &str) -> Result<Applied<()>> {
        tracing::info!("[dry-run] would set alt text for media {}: {:?}", media_id, alt);
        Ok(Applied::Simulated(()))
    }

    async fn search_terms(&self, taxonomy: Taxonomy, name: &str) -> Result<Vec<RemoteTerm>> {
        self.inner.search_terms(taxonomy, name).await
    }

    async fn create_term(
        &self,
        taxonomy: Taxonomy,
        fields: &TermFields,
    ) -> Result<Applied<RemoteTerm>> {
        tracing::info!("[dry-run] would create {} {:?}", taxonomy, fields.name);
        Ok(Applied::Simulated(RemoteTerm {
            id: DRY_RUN_ID,
            name: fields.name.clone(),
            description: fields.description.clone(),
            meta: Default::default(),
        }))
    }

    async fn update_term(
        &self,
        taxonomy: Taxonomy,
        term_id: i64,
        fields: &TermFields,
    ) -> Result<Applied<RemoteTerm>> {
        tracing::info!(
            "[dry-run] would update {} {} ({:?})",
            taxonomy,
            term_id,
            fields.name
        );
        Ok(Applied::Simulated(RemoteTerm {
            id: term_id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            meta: Default::default(),
        }))
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<RemotePost>> {
        self.inner.find_post_by_slug(slug).await
    }

    async fn create_post(&self, fields: &PostFields) -> Result<Applied<RemotePost>> {
        tracing::info!("[dry-run] would create post {:?}", fields.slug);
        Ok(Applied::Simulated(RemotePost {
            id: DRY_RUN_ID,
            slug: fields.slug.clone(),
        }))
    }

    async fn update_post(&self, post_id: i64, fields: &PostFields) -> Result<Applied<RemotePost>> {
        tracing::info!("[dry-run] would update post {} ({:?})", post_id, fields.slug);
        Ok(Applied::Simulated(RemotePost {
            id: post_id,
            slug: fields.slug.clone(),
        }))
    }
}

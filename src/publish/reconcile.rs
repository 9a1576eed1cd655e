//! Post reconciler - drives one post from loaded record to remote state

use regex::Regex;

use super::media::AssetPublisher;
use super::terms::TermResolver;
use crate::content::{MarkdownRenderer, PostRecord};
use crate::error::{PublishError, Result};
use crate::remote::{CmsApi, PostFields, Taxonomy};

/// Terminal state of a reconciled post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
}

/// Reconciles post records against the remote system, one at a time:
/// images, then rendering, then taxonomy terms, then the post itself.
pub struct Reconciler<'a> {
    api: &'a dyn CmsApi,
    media: AssetPublisher<'a>,
    terms: TermResolver<'a>,
    renderer: MarkdownRenderer,
}

impl<'a> Reconciler<'a> {
    pub fn new(api: &'a dyn CmsApi) -> Self {
        Self {
            api,
            media: AssetPublisher::new(api),
            terms: TermResolver::new(api),
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Create or update the remote post matching `post.slug`.
    ///
    /// A missing local image is skipped with a warning; remote failures
    /// abort this post (and only this post).
    pub async fn reconcile(&mut self, post: &PostRecord) -> Result<Outcome> {
        tracing::info!("Processing post {:?} ({:?})", post.slug, post.title);
        let mut body = post.raw.clone();
        let mut featured: Option<i64> = None;

        // explicitly declared featured image wins
        if let Some(name) = &post.featured_image {
            let path = post.dir.join(name);
            match self
                .media
                .resolve_image(&path, post.featured_alt.as_deref())
                .await
            {
                Ok(media) => featured = Some(media.id),
                Err(PublishError::NotFound(path)) => {
                    tracing::warn!("Featured image missing, skipping: {:?}", path);
                }
                Err(e) => return Err(e),
            }
        }

        // bundled images: upload-or-reuse, then rewrite body references
        for path in &post.images {
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.media.resolve_image(path, post.alt_for(filename)).await {
                Ok(media) => {
                    // fallback policy: first resolved image becomes featured
                    // when the front-matter declares none
                    if featured.is_none() {
                        featured = Some(media.id);
                    }
                    body = rewrite_image_refs(&body, filename, &media.url);
                }
                Err(PublishError::NotFound(path)) => {
                    tracing::warn!("Image vanished during run, skipping: {:?}", path);
                }
                Err(e) => return Err(e),
            }
        }

        let content = self
            .renderer
            .render(&body)
            .map_err(|e| PublishError::Parse {
                path: post.source.clone(),
                reason: format!("markdown rendering failed: {}", e),
            })?;

        let mut categories = Vec::with_capacity(post.categories.len());
        for spec in &post.categories {
            categories.push(self.terms.resolve_term(spec, Taxonomy::Category).await?);
        }
        let mut tags = Vec::with_capacity(post.tags.len());
        for spec in &post.tags {
            tags.push(self.terms.resolve_term(spec, Taxonomy::Tag).await?);
        }

        // the full field set is always sent; a partial update could clear
        // the array fields remotely
        let fields = PostFields {
            title: post.title.clone(),
            slug: post.slug.clone(),
            content,
            status: post.status,
            categories,
            tags,
            featured_media: featured,
        };

        match self.api.find_post_by_slug(&post.slug).await? {
            Some(existing) => {
                self.api.update_post(existing.id, &fields).await?;
                Ok(Outcome::Updated)
            }
            None => {
                self.api.create_post(&fields).await?;
                Ok(Outcome::Created)
            }
        }
    }
}

/// Rewrite every inline image reference to `filename` so it points at
/// `url`. Matching the whole `![alt](filename)` token keeps filenames
/// that appear in prose, or as substrings of longer names, untouched.
pub fn rewrite_image_refs(body: &str, filename: &str, url: &str) -> String {
    let pattern = format!(
        r#"!\[([^\]]*)\]\(\s*(?:\./)?{}(\s+"[^"]*")?\s*\)"#,
        regex::escape(filename)
    );
    let re = Regex::new(&pattern).expect("escaped filename yields a valid pattern");
    re.replace_all(body, |caps: &regex::Captures| {
        format!("![{}]({})", &caps[1], url)
    })
    .into_owned()
}

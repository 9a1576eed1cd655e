//! Asset publisher - resolves local image files to remote media entries

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PublishError, Result};
use crate::remote::{CmsApi, RemoteMedia};

/// A resolved media entry: the remote id plus the stable URL body text
/// references are rewritten to.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRef {
    pub id: i64,
    pub url: String,
}

/// Cache entry: the resolved reference plus the alt text the remote
/// currently carries, so later posts can still reconcile alt drift.
struct CachedMedia {
    reference: MediaRef,
    alt_text: String,
}

/// Resolves image files against the remote media library: reuse by
/// filename when the file was uploaded before, upload otherwise.
///
/// Keeps a per-run filename cache so an image shared across posts is
/// looked up once. The remote system stays the source of truth between
/// runs; the cache never outlives one.
pub struct AssetPublisher<'a> {
    api: &'a dyn CmsApi,
    resolved: HashMap<String, CachedMedia>,
}

impl<'a> AssetPublisher<'a> {
    pub fn new(api: &'a dyn CmsApi) -> Self {
        Self {
            api,
            resolved: HashMap::new(),
        }
    }

    /// Resolve one image file to a remote (id, url) pair.
    ///
    /// Safe to call twice with the same input: the second call reuses the
    /// existing entry and performs at most an idempotent alt-text update.
    /// A missing local file is a `NotFound` error the caller is expected
    /// to skip over.
    pub async fn resolve_image(&mut self, path: &Path, alt: Option<&str>) -> Result<MediaRef> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PublishError::NotFound(path.to_path_buf()))?
            .to_string();

        if let Some(known) = self.resolved.get(&filename) {
            let reference = known.reference.clone();
            let current = known.alt_text.clone();
            // a later post may carry alt text the first resolver call did not
            if let Some(applied) = self.sync_alt(reference.id, &current, alt).await {
                if let Some(entry) = self.resolved.get_mut(&filename) {
                    entry.alt_text = applied;
                }
            }
            return Ok(reference);
        }

        if !path.is_file() {
            return Err(PublishError::NotFound(path.to_path_buf()));
        }

        // The media search is a substring match on the remote side, so a
        // result only counts when its title equals the filename exactly.
        let candidates = self.api.search_media(&filename).await?;
        let media = match candidates.into_iter().find(|m| title_matches(m, &filename)) {
            Some(existing) => {
                tracing::info!("Reusing existing media for {:?} [{}]", filename, existing.id);
                existing
            }
            None => {
                let bytes = tokio::fs::read(path).await?;
                self.api
                    .upload_media(&filename, bytes, content_type_for(&filename))
                    .await?
                    .into_inner()
            }
        };

        let mut alt_text = media.alt_text.clone();
        if let Some(applied) = self.sync_alt(media.id, &media.alt_text, alt).await {
            alt_text = applied;
        }

        let resolved = MediaRef {
            id: media.id,
            url: media.source_url,
        };
        self.resolved.insert(
            filename,
            CachedMedia {
                reference: resolved.clone(),
                alt_text,
            },
        );
        Ok(resolved)
    }

    /// Set alt text when supplied and different from the current value,
    /// returning the text now in effect remotely. Failure here never
    /// fails the post.
    async fn sync_alt(&self, media_id: i64, current: &str, alt: Option<&str>) -> Option<String> {
        let alt = alt.filter(|a| !a.is_empty())?;
        if current == alt {
            return None;
        }
        match self.api.set_media_alt(media_id, alt).await {
            Ok(_) => Some(alt.to_string()),
            Err(e) => {
                tracing::warn!("Failed to set alt text for media {}: {}", media_id, e);
                None
            }
        }
    }
}

/// Exact (case-insensitive) title match against the filename or its stem;
/// the remote strips extensions from media titles.
fn title_matches(media: &RemoteMedia, filename: &str) -> bool {
    let title = media.title.rendered.as_str();
    if title.eq_ignore_ascii_case(filename) {
        return true;
    }
    match filename.rsplit_once('.') {
        Some((stem, _)) => title.eq_ignore_ascii_case(stem),
        None => false,
    }
}

/// Content type inferred from the file extension
fn content_type_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::api::MockCmsApi;
    use crate::remote::{Applied, Rendered};
    use std::fs::write;
    use tempfile::TempDir;

    fn media(id: i64, title: &str, url: &str) -> RemoteMedia {
        RemoteMedia {
            id,
            source_url: url.to_string(),
            title: Rendered {
                rendered: title.to_string(),
            },
            alt_text: String::new(),
        }
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.gif"), "image/png");
    }

    #[test]
    fn test_title_match_rejects_substrings() {
        // "cover.jpg" must not match media titled "book-cover.jpg"
        assert!(!title_matches(&media(1, "book-cover.jpg", ""), "cover.jpg"));
        assert!(title_matches(&media(1, "cover.jpg", ""), "cover.jpg"));
        assert!(title_matches(&media(1, "cover", ""), "cover.jpg"));
        assert!(title_matches(&media(1, "Cover.JPG", ""), "cover.jpg"));
    }

    #[tokio::test]
    async fn test_existing_media_is_not_reuploaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.jpg");
        write(&path, b"jpegdata").unwrap();

        let mut api = MockCmsApi::new();
        api.expect_search_media()
            .withf(|f| f == "cover.jpg")
            .returning(|_| Ok(vec![media(12, "cover", "https://cms/media/cover.jpg")]));
        api.expect_upload_media().times(0);

        let mut publisher = AssetPublisher::new(&api);
        let resolved = publisher.resolve_image(&path, None).await.unwrap();
        assert_eq!(resolved.id, 12);
        assert_eq!(resolved.url, "https://cms/media/cover.jpg");
    }

    #[tokio::test]
    async fn test_unmatched_media_is_uploaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("diagram.png");
        write(&path, b"pngdata").unwrap();

        let mut api = MockCmsApi::new();
        // a substring hit for another file must not count as a match
        api.expect_search_media()
            .returning(|_| Ok(vec![media(3, "big-diagram", "https://cms/other.png")]));
        api.expect_upload_media()
            .withf(|f, bytes, ct| {
                f == "diagram.png" && bytes.as_slice() == b"pngdata" && ct == "image/png"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(Applied::Committed(media(
                    44,
                    "diagram",
                    "https://cms/media/diagram.png",
                )))
            });

        let mut publisher = AssetPublisher::new(&api);
        let resolved = publisher.resolve_image(&path, None).await.unwrap();
        assert_eq!(resolved.id, 44);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let api = MockCmsApi::new();
        let mut publisher = AssetPublisher::new(&api);
        let err = publisher
            .resolve_image(Path::new("/no/such/image.png"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.jpg");
        write(&path, b"jpegdata").unwrap();

        let mut api = MockCmsApi::new();
        api.expect_search_media()
            .times(1)
            .returning(|_| Ok(vec![media(9, "cover", "https://cms/media/cover.jpg")]));

        let mut publisher = AssetPublisher::new(&api);
        let first = publisher.resolve_image(&path, None).await.unwrap();
        let second = publisher.resolve_image(&path, None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_alt_text_updated_when_different() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.jpg");
        write(&path, b"jpegdata").unwrap();

        let mut api = MockCmsApi::new();
        api.expect_search_media()
            .returning(|_| Ok(vec![media(12, "cover", "https://cms/media/cover.jpg")]));
        api.expect_set_media_alt()
            .withf(|id, alt| *id == 12 && alt == "A sunrise")
            .times(1)
            .returning(|_, _| Ok(Applied::Committed(())));

        let mut publisher = AssetPublisher::new(&api);
        publisher
            .resolve_image(&path, Some("A sunrise"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cache_hit_still_syncs_new_alt_text() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.jpg");
        write(&path, b"jpegdata").unwrap();

        let mut api = MockCmsApi::new();
        api.expect_search_media()
            .times(1)
            .returning(|_| Ok(vec![media(12, "cover", "https://cms/media/cover.jpg")]));
        api.expect_set_media_alt()
            .withf(|id, alt| *id == 12 && alt == "A sunrise")
            .times(1)
            .returning(|_, _| Ok(Applied::Committed(())));

        let mut publisher = AssetPublisher::new(&api);
        // first post carries no alt text; a later post supplies it
        publisher.resolve_image(&path, None).await.unwrap();
        publisher.resolve_image(&path, Some("A sunrise")).await.unwrap();
        // once applied, a repeat with the same text issues no further write
        publisher.resolve_image(&path, Some("A sunrise")).await.unwrap();
    }

    #[tokio::test]
    async fn test_alt_text_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cover.jpg");
        write(&path, b"jpegdata").unwrap();

        let mut api = MockCmsApi::new();
        api.expect_search_media()
            .returning(|_| Ok(vec![media(12, "cover", "https://cms/media/cover.jpg")]));
        api.expect_set_media_alt().returning(|_, _| {
            Err(PublishError::Remote {
                status: 403,
                body: "forbidden".to_string(),
            })
        });

        let mut publisher = AssetPublisher::new(&api);
        let resolved = publisher
            .resolve_image(&path, Some("A sunrise"))
            .await
            .unwrap();
        assert_eq!(resolved.id, 12);
    }
}

//! Post record model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use super::frontmatter::TermSpec;

/// Remote publication status of a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Publish,
    Private,
    Pending,
    Future,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
            PostStatus::Private => "private",
            PostStatus::Pending => "pending",
            PostStatus::Future => "future",
        };
        f.write_str(s)
    }
}

/// One local post, parsed from a front-matter file. Immutable once
/// loaded; the reconciler works on a copy of `raw` when it rewrites
/// image references.
#[derive(Debug, Clone)]
pub struct PostRecord {
    /// Post title
    pub title: String,

    /// Unique key within the remote system
    pub slug: String,

    /// Publication status
    pub status: PostStatus,

    /// Raw markdown body
    pub raw: String,

    /// The markdown file this record was parsed from
    pub source: PathBuf,

    /// Directory holding the post's assets (parent of `source`)
    pub dir: PathBuf,

    /// Image files bundled with the post, traversal order
    pub images: Vec<PathBuf>,

    /// Categories in declaration order
    pub categories: Vec<TermSpec>,

    /// Tags in declaration order
    pub tags: Vec<TermSpec>,

    /// Explicitly declared featured image filename
    pub featured_image: Option<String>,

    /// Alt text for the featured image
    pub featured_alt: Option<String>,

    /// Alt text for body images, keyed by filename
    pub image_alt: HashMap<String, String>,
}

impl PostRecord {
    /// Alt text for a bundled image, if declared
    pub fn alt_for(&self, filename: &str) -> Option<&str> {
        self.image_alt.get(filename).map(String::as_str)
    }
}

/// Whether a file looks like an image the publisher should upload
pub fn is_image_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            e == "png" || e == "jpg" || e == "jpeg"
        })
        .unwrap_or(false)
}

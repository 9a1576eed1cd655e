//! Wire types for the CMS REST API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::content::PostStatus;

/// The two taxonomies the publisher reconciles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    Category,
    Tag,
}

impl Taxonomy {
    /// REST collection route for the taxonomy
    pub fn rest_base(self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Tag => "tags",
        }
    }

    /// Meta key used for this taxonomy's presentation field
    pub fn meta_key(self) -> &'static str {
        match self {
            Taxonomy::Category => "category_icon",
            Taxonomy::Tag => "tag_color",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Taxonomy::Category => f.write_str("category"),
            Taxonomy::Tag => f.write_str("tag"),
        }
    }
}

/// WordPress renders some string fields as `{ "rendered": "..." }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// A taxonomy term as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteTerm {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub meta: HashMap<String, serde_json::Value>,
}

/// A media library entry as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteMedia {
    pub id: i64,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub alt_text: String,
}

/// A post as returned by the API; only the fields reconciliation needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
}

/// Fields sent when creating or updating a term
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermFields {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// The full field set sent on post create and update.
///
/// Updates always carry every field; partial updates risk clearing the
/// array fields on the remote side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostFields {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: PostStatus,
    pub categories: Vec<i64>,
    pub tags: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<i64>,
}

/// Result of a write against the remote system. Dry runs produce
/// `Simulated` values with placeholder identifiers so downstream logic
/// runs its full path without inspecting a flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    Committed(T),
    Simulated(T),
}

impl<T> Applied<T> {
    pub fn into_inner(self) -> T {
        match self {
            Applied::Committed(v) | Applied::Simulated(v) => v,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Applied::Simulated(_))
    }
}

/// Placeholder id returned for simulated writes
pub const DRY_RUN_ID: i64 = -1;

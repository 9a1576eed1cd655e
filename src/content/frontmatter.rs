//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::content::post::PostStatus;
use crate::error::{PublishError, Result};

/// A category or tag as written in front-matter: either a bare name or a
/// structured entry carrying description and presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
}

impl TermSpec {
    pub fn name(&self) -> &str {
        match self {
            TermSpec::Name(name) => name,
            TermSpec::Detailed { name, .. } => name,
        }
    }

    /// Description, empty string when absent
    pub fn description(&self) -> &str {
        match self {
            TermSpec::Name(_) => "",
            TermSpec::Detailed { description, .. } => description.as_deref().unwrap_or(""),
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            TermSpec::Name(_) => None,
            TermSpec::Detailed { icon, .. } => icon.as_deref(),
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            TermSpec::Name(_) => None,
            TermSpec::Detailed { color, .. } => color.as_deref(),
        }
    }
}

/// Custom deserializer that accepts a single term or a list of terms
fn term_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<TermSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(TermSpec),
        Many(Vec<TermSpec>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(spec)) => vec![spec],
        Some(OneOrMany::Many(specs)) => specs,
    })
}

/// Front-matter data recognized by the publisher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<PostStatus>,
    #[serde(deserialize_with = "term_or_vec")]
    pub categories: Vec<TermSpec>,
    #[serde(deserialize_with = "term_or_vec")]
    pub tags: Vec<TermSpec>,
    /// Filename of the featured image, relative to the post directory
    pub featured_image: Option<String>,
    /// Alt text for the featured image
    pub featured_alt: Option<String>,
    /// Alt text for body images, keyed by filename
    pub images: HashMap<String, String>,
}

impl FrontMatter {
    /// Parse front-matter from the start of a content file.
    /// Returns the parsed front-matter and the remaining body text.
    ///
    /// A file without a leading `---` block has no front-matter; everything
    /// is body. A block that is present but not valid YAML is a parse
    /// error, attributed to `path`.
    pub fn parse<'a>(content: &'a str, path: &Path) -> Result<(Self, &'a str)> {
        let trimmed = content.trim_start();
        let Some(rest) = trimmed.strip_prefix("---") else {
            return Ok((FrontMatter::default(), trimmed));
        };
        // consume exactly one line terminator after the opening marker
        // so an immediately following `---` still reads as an empty block
        let rest = rest.strip_prefix('\r').unwrap_or(rest);
        let rest = rest.strip_prefix('\n').unwrap_or(rest);

        let (yaml, after) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else if let Some(end) = rest.find("\n---") {
            (&rest[..end], &rest[end + 4..])
        } else {
            // opening marker without a closing one
            return Err(PublishError::Parse {
                path: path.to_path_buf(),
                reason: "front-matter block is not closed with ---".to_string(),
            });
        };

        let body = after.trim_start_matches(['\n', '\r']);

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml).map_err(|e| PublishError::Parse {
            path: path.to_path_buf(),
            reason: format!("invalid front-matter: {}", e),
        })?;

        Ok((fm, body))
    }
}

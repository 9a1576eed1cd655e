//! Content module - parses the local content tree into post records

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{FrontMatter, TermSpec};
pub use loader::{ContentLoader, LoadedContent};
pub use markdown::MarkdownRenderer;
pub use post::{is_image_file, PostRecord, PostStatus};

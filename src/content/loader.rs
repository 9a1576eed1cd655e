//! Content loader - turns a directory tree into post records

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::post::{is_image_file, PostRecord};
use super::FrontMatter;
use crate::error::{PublishError, Result};

/// Everything found under the content root: the posts that parsed, and
/// the files that failed to (already logged, counted for exit policy).
#[derive(Debug, Default)]
pub struct LoadedContent {
    pub posts: Vec<PostRecord>,
    pub failed: Vec<PathBuf>,
}

/// Loads post records from the content root.
///
/// Two layouts are recognized:
/// - `<root>/<post-dir>/index.md` with sibling image files, and
/// - flat `<root>/**/*.md` files without bundled assets.
pub struct ContentLoader {
    root: PathBuf,
    strict: bool,
}

impl ContentLoader {
    pub fn new<P: AsRef<Path>>(root: P, strict: bool) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            strict,
        }
    }

    /// Walk the content root and parse every markdown file found.
    ///
    /// A file that fails to parse is logged and recorded in `failed`;
    /// it never aborts the rest of the walk.
    pub fn load_posts(&self) -> Result<LoadedContent> {
        if !self.root.is_dir() {
            return Err(PublishError::Config(format!(
                "content directory does not exist: {}",
                self.root.display()
            )));
        }

        let mut loaded = LoadedContent::default();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let bundled = path.file_name().and_then(|n| n.to_str()) == Some("index.md");
            match self.load_post(path, bundled) {
                Ok(post) => {
                    tracing::debug!("Loaded post {:?} from {:?}", post.slug, path);
                    loaded.posts.push(post);
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    loaded.failed.push(path.to_path_buf());
                }
            }
        }

        Ok(loaded)
    }

    /// Load a single post. `bundled` posts own the sibling images of their
    /// directory; flat posts carry no assets beyond an explicit
    /// `featured_image`.
    fn load_post(&self, path: &Path, bundled: bool) -> Result<PostRecord> {
        let text = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&text, path)?;

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let dir_name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        let file_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);

        let title = fm.title.clone().unwrap_or_else(|| {
            let fallback = if bundled { &dir_name } else { &file_stem };
            fallback.clone().unwrap_or_else(|| "Untitled".to_string())
        });

        let slug = match fm.slug {
            Some(slug) => slug,
            None if self.strict => {
                return Err(PublishError::Parse {
                    path: path.to_path_buf(),
                    reason: "missing required field: slug".to_string(),
                });
            }
            // lenient fallbacks: directory name for bundles, slugified title otherwise
            None if bundled && dir_name.is_some() => dir_name.clone().unwrap_or_default(),
            None => slug::slugify(&title),
        };

        let images = if bundled {
            list_images(&dir)?
        } else {
            Vec::new()
        };

        Ok(PostRecord {
            title,
            slug,
            status: fm.status.unwrap_or_default(),
            raw: body.to_string(),
            source: path.to_path_buf(),
            dir,
            images,
            categories: fm.categories,
            tags: fm.tags,
            featured_image: fm.featured_image,
            featured_alt: fm.featured_alt,
            image_alt: fm.images,
        })
    }
}

/// Image files directly inside a post directory, sorted by filename so
/// repeated runs see the same order (the featured-image fallback depends
/// on it).
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();
    Ok(images)
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, write};
    use tempfile::TempDir;

    fn write_post(root: &Path, dir: &str, frontmatter: &str, body: &str) {
        let post_dir = root.join(dir);
        create_dir_all(&post_dir).unwrap();
        write(
            post_dir.join("index.md"),
            format!("---\n{}---\n\n{}", frontmatter, body),
        )
        .unwrap();
    }

    #[test]
    fn test_load_bundled_post() {
        let tmp = TempDir::new().unwrap();
        write_post(
            tmp.path(),
            "hello",
            "title: Hello\nslug: hello\nstatus: publish\n",
            "Hi there.",
        );
        write(tmp.path().join("hello/cover.jpg"), b"jpg").unwrap();
        write(tmp.path().join("hello/diagram.png"), b"png").unwrap();
        write(tmp.path().join("hello/notes.txt"), b"txt").unwrap();

        let loaded = ContentLoader::new(tmp.path(), false).load_posts().unwrap();
        assert_eq!(loaded.posts.len(), 1);
        assert!(loaded.failed.is_empty());

        let post = &loaded.posts[0];
        assert_eq!(post.slug, "hello");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.raw, "Hi there.");
        let names: Vec<_> = post
            .images
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["cover.jpg", "diagram.png"]);
    }

    #[test]
    fn test_slug_defaults_to_directory_name() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "my-first-post", "title: First\n", "Body.");

        let loaded = ContentLoader::new(tmp.path(), false).load_posts().unwrap();
        assert_eq!(loaded.posts[0].slug, "my-first-post");
    }

    #[test]
    fn test_flat_post_slug_from_title() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path().join("announcement.md"),
            "---\ntitle: Big News Today\n---\nBody.",
        )
        .unwrap();

        let loaded = ContentLoader::new(tmp.path(), false).load_posts().unwrap();
        assert_eq!(loaded.posts.len(), 1);
        assert_eq!(loaded.posts[0].slug, "big-news-today");
        assert!(loaded.posts[0].images.is_empty());
    }

    #[test]
    fn test_strict_missing_slug_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "no-slug", "title: No Slug Here\n", "Body.");

        let loaded = ContentLoader::new(tmp.path(), true).load_posts().unwrap();
        assert!(loaded.posts.is_empty());
        assert_eq!(loaded.failed.len(), 1);
    }

    #[test]
    fn test_malformed_frontmatter_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_post(tmp.path(), "good", "title: Good\nslug: good\n", "Body.");
        write(
            tmp.path().join("bad.md"),
            "---\ntitle: [broken\n---\nBody.",
        )
        .unwrap();

        let loaded = ContentLoader::new(tmp.path(), false).load_posts().unwrap();
        assert_eq!(loaded.posts.len(), 1);
        assert_eq!(loaded.posts[0].slug, "good");
        assert_eq!(loaded.failed.len(), 1);
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let err = ContentLoader::new("/nonexistent/content", false)
            .load_posts()
            .unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
    }

    #[test]
    fn test_untitled_default() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path().join("note.md"), "No front-matter at all.").unwrap();

        let loaded = ContentLoader::new(tmp.path(), false).load_posts().unwrap();
        assert_eq!(loaded.posts[0].title, "note");
        assert_eq!(loaded.posts[0].slug, "note");
    }
}

//! List local content without touching the network

use anyhow::Result;
use std::path::Path;

use crate::content::ContentLoader;

/// Print every post found under the content root
pub fn run(content_dir: &Path) -> Result<()> {
    let loader = ContentLoader::new(content_dir, false);
    let loaded = loader.load_posts()?;

    println!("Posts ({}):", loaded.posts.len());
    for post in &loaded.posts {
        println!(
            "  {} - {} [{}] ({} images, {} categories, {} tags)",
            post.slug,
            post.title,
            post.status,
            post.images.len(),
            post.categories.len(),
            post.tags.len()
        );
    }

    if !loaded.failed.is_empty() {
        println!("Unparseable ({}):", loaded.failed.len());
        for path in &loaded.failed {
            println!("  {}", path.display());
        }
    }

    Ok(())
}

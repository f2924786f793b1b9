//! Content loader - builds the post index from the posts directory

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{parse_post, ContentError, MarkdownRenderer, PostIndex, Result};
use crate::config::MarkdownConfig;
use crate::Blog;

/// Loads every post file in a directory into a fresh [`PostIndex`]
pub struct ContentLoader {
    posts_dir: PathBuf,
    extension: String,
    renderer: MarkdownRenderer,
}

impl ContentLoader {
    /// Create a loader for a directory of `*.<extension>` post files
    pub fn new<P: AsRef<Path>>(
        posts_dir: P,
        extension: &str,
        markdown: &MarkdownConfig,
    ) -> Result<Self> {
        let posts_dir = posts_dir.as_ref().to_path_buf();
        let renderer = MarkdownRenderer::from_config(markdown).map_err(|message| {
            ContentError::Conversion {
                path: posts_dir.clone(),
                message,
            }
        })?;

        Ok(Self {
            posts_dir,
            extension: extension.trim_start_matches('.').to_string(),
            renderer,
        })
    }

    /// Create a loader from the blog's configuration
    pub fn for_blog(blog: &Blog) -> Result<Self> {
        Self::new(
            &blog.posts_dir,
            &blog.config.post_extension,
            &blog.config.markdown,
        )
    }

    /// List the post files, in the order the index is built from
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let discovery = |reason: String| ContentError::Discovery {
            dir: self.posts_dir.clone(),
            reason,
        };

        if !self.posts_dir.is_dir() {
            return Err(discovery("not a directory".to_string()));
        }

        let dir = self
            .posts_dir
            .to_str()
            .ok_or_else(|| discovery("path is not valid UTF-8".to_string()))?;
        let pattern = format!("{}/*.{}", glob::Pattern::escape(dir), self.extension);

        let mut files = Vec::new();
        for entry in glob::glob(&pattern).map_err(|e| discovery(e.to_string()))? {
            let path = entry.map_err(|e| discovery(e.to_string()))?;
            if path.is_file() {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Build a new index from everything in the posts directory
    pub fn load_all(&self) -> Result<PostIndex> {
        let start = Instant::now();
        let files = self.discover()?;
        let index = self.load_files(files)?;

        tracing::info!(
            "Loaded {} posts from {:?} in {}ms",
            index.len(),
            self.posts_dir,
            start.elapsed().as_millis()
        );
        Ok(index)
    }

    /// Build a new index from the given files, in order
    ///
    /// Stops at the first file that fails. When two files share a slug the
    /// later one wins.
    pub fn load_files<I>(&self, files: I) -> Result<PostIndex>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut index = PostIndex::new();

        for path in files {
            let bytes = fs::read(&path).map_err(|source| ContentError::Read {
                path: path.clone(),
                source,
            })?;

            let mut post = parse_post(&bytes).map_err(|source| ContentError::Parse {
                path: path.clone(),
                source,
            })?;

            post.slug = slug_for(&path);
            if slug::slugify(&post.slug) != post.slug {
                tracing::warn!("Post slug {:?} from {:?} is not URL-safe", post.slug, path);
            }

            post.content = self.renderer.render(&post.raw);

            tracing::debug!("Parsed post {:?} from {:?}", post.slug, path);
            if let Some(previous) = index.insert(post) {
                tracing::warn!(
                    "Duplicate slug {:?}: {:?} replaces an earlier post",
                    previous.slug,
                    path
                );
            }
        }

        Ok(index)
    }
}

/// The slug is the file name without its extension
fn slug_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

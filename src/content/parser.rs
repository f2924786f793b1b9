//! Post file parsing
//!
//! A post file is a single YAML mapping. Only `title`, `excerpt`, `created`
//! and `content` are read; other keys are ignored.

use serde::Deserialize;

use super::Post;

/// The recognized fields of a post file
///
/// Scalars are read as their source text, so `created: 2024.10` stays
/// `"2024.10"` rather than becoming a number.
#[derive(Debug, Default, Deserialize)]
struct PostFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Parse the bytes of one post file
///
/// The returned post has empty `content` and `slug`; the loader fills both.
/// An empty or null document is a post with every field empty.
pub fn parse_post(bytes: &[u8]) -> Result<Post, serde_yaml::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Post::default());
    }

    let file = serde_yaml::from_slice::<Option<PostFile>>(bytes)?.unwrap_or_default();
    Ok(Post {
        title: file.title.unwrap_or_default(),
        excerpt: file.excerpt.unwrap_or_default(),
        date: file.created.unwrap_or_default(),
        raw: file.content.unwrap_or_default(),
        content: String::new(),
        slug: String::new(),
    })
}

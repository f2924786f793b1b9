//! Page templates using the Tera template engine
//!
//! Default templates are embedded in the binary. A file with the same name
//! in the site's templates directory replaces the embedded one.

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;

/// Layout shared by every page
pub const BASE_TEMPLATE: &str = "base.html";
/// Listing of all posts
pub const LISTING_TEMPLATE: &str = "blog.page.html";
/// A single post
pub const POST_TEMPLATE: &str = "posts.page.html";

const DEFAULT_TEMPLATES: [(&str, &str); 3] = [
    (BASE_TEMPLATE, include_str!("default/base.html")),
    (LISTING_TEMPLATE, include_str!("default/blog.page.html")),
    (POST_TEMPLATE, include_str!("default/posts.page.html")),
];

/// Template renderer
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer with only the embedded templates
    pub fn new() -> Result<Self> {
        Self::build(DEFAULT_TEMPLATES.map(|(name, src)| (name, src.to_string())))
    }

    /// Create a renderer, preferring templates found in `templates_dir`
    pub fn with_overrides<P: AsRef<Path>>(templates_dir: P) -> Result<Self> {
        let dir = templates_dir.as_ref();
        let mut templates = Vec::with_capacity(DEFAULT_TEMPLATES.len());

        for (name, default) in DEFAULT_TEMPLATES {
            let path = dir.join(name);
            let source = if path.is_file() {
                tracing::debug!("Using template override {:?}", path);
                std::fs::read_to_string(&path)
                    .with_context(|| format!("reading template {:?}", path))?
            } else {
                default.to_string()
            };
            templates.push((name, source));
        }

        Self::build(templates)
    }

    fn build<I>(templates: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a page
    pub fn render(&self, site: &SiteData, page: &PageData) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        let template = match page {
            PageData::Listing { posts } => {
                context.insert("posts", posts);
                LISTING_TEMPLATE
            }
            PageData::Post { post } => {
                context.insert("post", post);
                POST_TEMPLATE
            }
        };

        Ok(self.tera.render(template, &context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result.trim().to_string()))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// What a page shows: one post, or the list of all posts
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageData {
    Listing { posts: Vec<PostData> },
    Post { post: PostData },
}

impl PageData {
    pub fn listing<'a, I>(posts: I) -> Self
    where
        I: IntoIterator<Item = &'a Post>,
    {
        PageData::Listing {
            posts: posts.into_iter().map(PostData::from).collect(),
        }
    }

    pub fn post(post: &Post) -> Self {
        PageData::Post {
            post: PostData::from(post),
        }
    }
}

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
        }
    }
}

/// A post as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub slug: String,
    pub path: String,
    /// Rendered HTML; templates embed it with `| safe`
    pub content: String,
}

impl From<&Post> for PostData {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            date: post.date.clone(),
            slug: post.slug.clone(),
            path: format!("/post/{}", post.slug),
            content: post.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData::from(&SiteConfig::default())
    }

    fn sample_post() -> Post {
        Post {
            title: "Fish & Chips".to_string(),
            excerpt: String::new(),
            date: "2024-01-15".to_string(),
            raw: "Hello *world*".to_string(),
            content: "<p>Hello <em>world</em></p>\n".to_string(),
            slug: "fish-and-chips".to_string(),
        }
    }

    #[test]
    fn test_render_post_embeds_html() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render(&site(), &PageData::post(&sample_post()))
            .unwrap();
        assert!(html.contains("<p>Hello <em>world</em></p>"));
        assert!(html.contains("<h1>Fish &amp; Chips</h1>"));
        assert!(html.contains("2024-01-15"));
    }

    #[test]
    fn test_render_listing() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = sample_post();
        let html = renderer
            .render(&site(), &PageData::listing([&post]))
            .unwrap();
        assert!(html.contains(r#"href="/post/fish-and-chips""#));
        // No excerpt: falls back to the text of the content
        assert!(html.contains("Hello world"));
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn test_render_empty_listing() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer
            .render(&site(), &PageData::Listing { posts: Vec::new() })
            .unwrap();
        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn test_template_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(POST_TEMPLATE),
            "<div>{{ post.slug }}|{{ post.content | safe }}</div>",
        )
        .unwrap();
        let renderer = TemplateRenderer::with_overrides(dir.path()).unwrap();
        let html = renderer
            .render(&site(), &PageData::post(&sample_post()))
            .unwrap();
        assert_eq!(
            html,
            "<div>fish-and-chips|<p>Hello <em>world</em></p>\n</div>"
        );
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let out = truncate_chars_filter(&tera::Value::from("hello world"), &args).unwrap();
        assert_eq!(out, tera::Value::from("hello..."));
    }
}

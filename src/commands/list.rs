//! List posts

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::content::Post;
use crate::Blog;

/// Output format for `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct Entry<'a> {
    slug: &'a str,
    title: &'a str,
    date: &'a str,
    excerpt: &'a str,
}

impl<'a> From<&'a Post> for Entry<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            slug: &post.slug,
            title: &post.title,
            date: &post.date,
            excerpt: &post.excerpt,
        }
    }
}

/// Print every post in listing order
pub fn run(blog: &Blog, format: Format) -> Result<()> {
    let stdout = std::io::stdout();
    write_posts(blog, format, &mut stdout.lock())
}

fn write_posts<W: Write>(blog: &Blog, format: Format, out: &mut W) -> Result<()> {
    let index = blog.load_all()?;
    let posts = index.sorted(blog.config.listing.order);

    match format {
        Format::Text => {
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                let date = if post.date.is_empty() { "-" } else { post.date.as_str() };
                writeln!(out, "  {} - {} [{}]", date, post.title, post.slug)?;
            }
        }
        Format::Json => {
            let entries: Vec<Entry> = posts.into_iter().map(Entry::from).collect();
            serde_json::to_writer_pretty(&mut *out, &entries)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

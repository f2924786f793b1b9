//! In-memory post index keyed by slug

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::Post;
use crate::config::ListingOrder;

/// Posts from one build, keyed by slug
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostIndex {
    posts: BTreeMap<String, Post>,
}

impl PostIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a post under its slug, returning the post it replaced
    pub fn insert(&mut self, post: Post) -> Option<Post> {
        self.posts.insert(post.slug.clone(), post)
    }

    /// Look up a post by slug
    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.get(slug)
    }

    /// Whether a post exists for the slug
    pub fn contains(&self, slug: &str) -> bool {
        self.posts.contains_key(slug)
    }

    /// All posts, in ascending slug order
    pub fn all(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    /// All posts in the given listing order
    pub fn sorted(&self, order: ListingOrder) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.all().collect();
        match order {
            ListingOrder::Slug => {}
            ListingOrder::DateDesc => posts.sort_by(|a, b| compare_dates(a, b, true)),
            ListingOrder::DateAsc => posts.sort_by(|a, b| compare_dates(a, b, false)),
        }
        posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Dated posts first in the requested direction, undated posts last; ties by slug
fn compare_dates(a: &Post, b: &Post, newest_first: bool) -> Ordering {
    match (a.parsed_date(), b.parsed_date()) {
        (Some(da), Some(db)) => {
            let ord = if newest_first { db.cmp(&da) } else { da.cmp(&db) };
            ord.then_with(|| a.slug.cmp(&b.slug))
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slug.cmp(&b.slug),
    }
}

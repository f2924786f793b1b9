//! Content module - post files, markdown conversion, and the post index

mod index;
pub mod loader;
mod markdown;
mod parser;
mod post;
mod shared;

pub use crate::error::{ContentError, Result};
pub use index::PostIndex;
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use parser::parse_post;
pub use post::Post;
pub use shared::SharedIndex;

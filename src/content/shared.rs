//! Process-wide index that is swapped, never edited in place

use arc_swap::ArcSwap;
use std::sync::Arc;

use super::{ContentLoader, PostIndex, Result};

/// A post index shared between requests
///
/// Readers always see a complete index: `refresh` builds a new one off to
/// the side and only swaps it in after the whole build succeeds. A failed
/// build leaves the previous index in place.
pub struct SharedIndex {
    current: ArcSwap<PostIndex>,
}

impl SharedIndex {
    /// Start from an existing index
    pub fn new(index: PostIndex) -> Self {
        Self {
            current: ArcSwap::from_pointee(index),
        }
    }

    /// Build the initial index with `loader`
    pub fn load(loader: &ContentLoader) -> Result<Self> {
        Ok(Self::new(loader.load_all()?))
    }

    /// The index readers should use right now
    pub fn snapshot(&self) -> Arc<PostIndex> {
        self.current.load_full()
    }

    /// Rebuild and swap in the new index on success
    pub fn refresh(&self, loader: &ContentLoader) -> Result<Arc<PostIndex>> {
        match loader.load_all() {
            Ok(index) => {
                let index = Arc::new(index);
                self.current.store(Arc::clone(&index));
                Ok(index)
            }
            Err(e) => {
                tracing::error!(
                    "Keeping previous index ({} posts): {}",
                    self.current.load().len(),
                    e
                );
                Err(e)
            }
        }
    }
}

//! Errors raised while building the post index

use std::path::PathBuf;
use thiserror::Error;

/// A failure that aborts one index build
#[derive(Error, Debug)]
pub enum ContentError {
    /// The posts directory cannot be enumerated
    #[error("cannot list posts in {dir:?}: {reason}")]
    Discovery { dir: PathBuf, reason: String },

    /// A listed post file could not be read
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A post file is not a valid post document
    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Markdown conversion failed for a decoded post
    #[error("cannot convert {path:?} to HTML: {message}")]
    Conversion { path: PathBuf, message: String },
}

impl ContentError {
    /// The file (or directory, for discovery failures) the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            ContentError::Discovery { dir, .. } => dir,
            ContentError::Read { path, .. }
            | ContentError::Parse { path, .. }
            | ContentError::Conversion { path, .. } => path,
        }
    }
}

/// Result type for the content pipeline
pub type Result<T> = std::result::Result<T, ContentError>;

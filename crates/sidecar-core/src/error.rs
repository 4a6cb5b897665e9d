use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sidecar generation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("at least one extension is required")]
    NoExtensions,

    #[error("invalid extension {0:?}: expected a dot-prefixed suffix like \".graphql\"")]
    InvalidExtension(String),

    #[error("failed to resolve {specifier}: {source}")]
    Resolve {
        specifier: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transform failed for {path}: {source}")]
    Transform {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

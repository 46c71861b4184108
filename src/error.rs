use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, parsing or saving translation catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TS document. `position` is the byte offset reported by the reader.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("no catalog found for {domain} ({locales})")]
    NotFound { domain: String, locales: String },

    #[error("duplicate message '{source_text}' in context '{context}'")]
    DuplicateKey { context: String, source_text: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        CatalogError::Parse {
            position,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

use std::sync::Arc;

use reqwest::StatusCode;

use crate::client::StoreError;

/// Failure of a filesystem operation on the virtual tree
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("no such entry: {0}")]
    NotFound(String),
    #[error("not implemented on a read-only tree")]
    NotImplemented,
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("is a directory: {0}")]
    IsADirectory(String),
    #[error("backing store request for {path} failed: {source}")]
    Backend {
        path: String,
        #[source]
        source: Arc<StoreError>,
    },
    #[error("failed to render {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FsError {
    /// Wrap a store failure for `path`. A 404 from the store means the
    /// index, type or document named by the path does not exist.
    pub fn from_store(path: &str, source: Arc<StoreError>) -> Self {
        let missing = matches!(
            source.as_ref(),
            StoreError::HttpStatus(status, _) if *status == StatusCode::NOT_FOUND
        );
        if missing {
            Self::NotFound(path.to_string())
        } else {
            Self::Backend {
                path: path.to_string(),
                source,
            }
        }
    }
}

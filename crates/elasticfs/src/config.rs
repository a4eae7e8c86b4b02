use std::path::PathBuf;

use url::Url;

use crate::client::ClientConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // store configuration
    /// base URL of the document store, e.g. `http://localhost:9200`
    pub remote: Url,
    pub client: ClientConfig,

    // mount configuration
    /// local directory the tree is mounted on
    pub mount_point: PathBuf,
    /// let users other than the mounting one see the tree
    pub allow_other: bool,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

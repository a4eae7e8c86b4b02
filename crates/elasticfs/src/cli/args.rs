pub use clap::Parser;

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use elasticfs::client::ClientConfig;
use elasticfs::Config;

#[derive(Parser, Debug)]
#[command(name = "elasticfs")]
#[command(about = "Mount a document store index as a read-only filesystem")]
pub struct Args {
    /// Base URL of the document store
    pub elasticsearch: Url,

    /// Local directory to mount on
    pub directory: PathBuf,

    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Also write daily rolling logs into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Give up on a store request after this many seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Allow other users to access the mount
    #[arg(long)]
    pub allow_other: bool,
}

impl Args {
    pub fn into_config(self) -> Config {
        Config {
            remote: self.elasticsearch,
            client: ClientConfig {
                timeout: self.request_timeout.map(Duration::from_secs),
            },
            mount_point: self.directory,
            allow_other: self.allow_other,
            log_level: self.log_level,
            log_dir: self.log_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::parse_from(["elasticfs", "http://localhost:9200", "/mnt/es"]);
        let config = args.into_config();

        assert_eq!(config.remote.as_str(), "http://localhost:9200/");
        assert_eq!(config.mount_point, PathBuf::from("/mnt/es"));
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert!(config.client.timeout.is_none());
        assert!(!config.allow_other);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "elasticfs",
            "--log-level",
            "debug",
            "--request-timeout",
            "30",
            "--allow-other",
            "http://es.internal:9200",
            "/mnt/es",
        ]);
        let config = args.into_config();

        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.client.timeout, Some(Duration::from_secs(30)));
        assert!(config.allow_other);
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(Args::try_parse_from(["elasticfs", "not a url", "/mnt/es"]).is_err());
    }
}

//! Process setup: logging, mounting and shutdown.

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::Config;

const LOG_FILE: &str = "elasticfs.log";

/// `level` unless `RUST_LOG` says otherwise
fn level_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Daily rolling writer for `log_dir`, creating the directory first
fn file_writer(log_dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging and the panic logger.
/// Returns guards that must be kept alive for the duration of the program.
pub fn init_logging(config: &Config) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(level_filter(config.log_level));

    // Without a usable directory the mount still logs to stdout
    let file_layer = config
        .log_dir
        .as_deref()
        .and_then(|log_dir| match file_writer(log_dir) {
            Ok((writer, guard)) => {
                guards.push(guard);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(level_filter(config.log_level)),
                )
            }
            Err(e) => {
                eprintln!("Warning: cannot log to {:?}: {}", log_dir, e);
                None
            }
        });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    register_panic_logger();

    guards
}

/// Registers a panic hook that logs panics using the `tracing` crate
pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

#[cfg(feature = "fuse")]
pub use mount::{run, MountError};

#[cfg(feature = "fuse")]
mod mount {
    use std::path::PathBuf;
    use std::sync::Arc;

    use tokio::signal::unix::{signal, SignalKind};

    use crate::client::{StoreClient, StoreError};
    use crate::config::Config;
    use crate::fs::ElasticFs;
    use crate::fuse::ElasticFuse;

    #[derive(Debug, thiserror::Error)]
    pub enum MountError {
        #[error("failed to create store client: {0}")]
        Client(#[from] StoreError),
        #[error("mount point {0:?} is not a directory")]
        NotADirectory(PathBuf),
        #[error("failed to mount at {path:?}: {source}")]
        Mount {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("failed to install signal handler: {0}")]
        Signal(#[source] std::io::Error),
    }

    /// Mount the tree and serve it until SIGINT or SIGTERM.
    pub async fn run(config: Config) -> Result<(), MountError> {
        if !config.mount_point.is_dir() {
            return Err(MountError::NotADirectory(config.mount_point));
        }

        let client = StoreClient::new(&config.remote, config.client.clone())?;
        let fs = Arc::new(ElasticFs::new(client));
        let fuse = ElasticFuse::new(tokio::runtime::Handle::current(), fs);

        let mut sigint = signal(SignalKind::interrupt()).map_err(MountError::Signal)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(MountError::Signal)?;

        tracing::info!(
            remote = %config.remote,
            "Mounting FUSE filesystem at {:?}",
            config.mount_point
        );
        let options = ElasticFuse::mount_options(config.allow_other);
        let session = fuser::spawn_mount2(fuse, &config.mount_point, &options).map_err(
            |source| MountError::Mount {
                path: config.mount_point.clone(),
                source,
            },
        )?;

        tokio::select! {
            _ = sigint.recv() => tracing::debug!("unmounting on SIGINT"),
            _ = sigterm.recv() => tracing::debug!("unmounting on SIGTERM"),
        }

        // Dropping the session unmounts
        drop(session);
        tracing::info!("Unmounted {:?}", config.mount_point);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_writer_creates_log_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs").join("elasticfs");

        let (_writer, _guard) = file_writer(&log_dir).unwrap();
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_file_writer_fails_below_a_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        assert!(file_writer(&blocker.join("logs")).is_err());
    }
}

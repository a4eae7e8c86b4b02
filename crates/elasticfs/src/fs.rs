//! Path level filesystem operations over the virtual tree
//!
//! Every call classifies its path afresh and resolves it against the store.
//! The tree is read-only: mutating operations always fail with
//! [`FsError::NotImplemented`].

use std::time::SystemTime;

use crate::client::StoreClient;
use crate::error::FsError;
use crate::path::Node;
use crate::resolver::{Attributes, Resolver};

pub struct ElasticFs {
    resolver: Resolver,
}

impl ElasticFs {
    pub fn new(client: StoreClient) -> Self {
        Self {
            resolver: Resolver::new(client),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Attributes of `path`, timestamped with the time of the call
    pub async fn get_attributes(&self, path: &str) -> Result<Attributes, FsError> {
        tracing::debug!(%path, "getattr");
        let node = Node::classify(path);
        let result = self.resolver.attributes(&node).await;
        logged("getattr", path, result).map(|attr| attr.stamped(SystemTime::now()))
    }

    /// `.` and `..` followed by the node's children. Recomputed on every call.
    pub async fn list_directory(&self, path: &str) -> Result<Vec<String>, FsError> {
        tracing::debug!(%path, "readdir");
        let node = Node::classify(path);
        let children = logged("readdir", path, self.resolver.children(&node).await)?;

        let mut entries = Vec::with_capacity(children.len() + 2);
        entries.push(".".to_string());
        entries.push("..".to_string());
        entries.extend(children);
        Ok(entries)
    }

    /// Bytes `[offset, offset + length)` of the file at `path`, clipped to its size
    pub async fn read_file(&self, path: &str, offset: u64, length: u64) -> Result<Vec<u8>, FsError> {
        tracing::debug!(%path, offset, length, "read");
        let node = Node::classify(path);
        let content = logged("read", path, self.resolver.content(&node).await)?;

        let start = offset.min(content.len() as u64) as usize;
        let end = offset.saturating_add(length).min(content.len() as u64) as usize;
        Ok(content[start..end].to_vec())
    }

    pub fn create(&self, path: &str, _mode: u32) -> Result<(), FsError> {
        read_only("create", path)
    }

    pub fn mkdir(&self, path: &str, _mode: u32) -> Result<(), FsError> {
        read_only("mkdir", path)
    }

    pub fn mknod(&self, path: &str, _mode: u32, _dev: u32) -> Result<(), FsError> {
        read_only("mknod", path)
    }

    pub fn rmdir(&self, path: &str) -> Result<(), FsError> {
        read_only("rmdir", path)
    }

    pub fn unlink(&self, path: &str) -> Result<(), FsError> {
        read_only("unlink", path)
    }

    pub fn rename(&self, from: &str, _to: &str) -> Result<(), FsError> {
        read_only("rename", from)
    }

    pub fn link(&self, _target: &str, name: &str) -> Result<(), FsError> {
        read_only("link", name)
    }

    pub fn symlink(&self, _target: &str, name: &str) -> Result<(), FsError> {
        read_only("symlink", name)
    }

    pub fn utimens(&self, path: &str, _times: Option<(SystemTime, SystemTime)>) -> Result<(), FsError> {
        read_only("utimens", path)
    }
}

fn read_only(op: &str, path: &str) -> Result<(), FsError> {
    tracing::debug!(%path, op, "rejecting mutation");
    Err(FsError::NotImplemented)
}

fn logged<T>(op: &str, path: &str, result: Result<T, FsError>) -> Result<T, FsError> {
    if let Err(e) = &result {
        match e {
            FsError::NotFound(_) | FsError::NotADirectory(_) | FsError::IsADirectory(_) => {
                tracing::debug!(%path, op, "{}", e)
            }
            _ => tracing::warn!(%path, op, "{}", e),
        }
    }
    result
}

//! Inode to path mapping for the FUSE adapter
//!
//! The kernel names nodes by inode; the tree is addressed by path.
//! Inodes are handed out on first sight of a path and never reused.

use std::collections::HashMap;

pub const ROOT_INODE: u64 = 1;

/// Bidirectional mapping between inodes and absolute paths
pub struct InodeTable {
    path_to_inode: HashMap<String, u64>,
    inode_to_path: HashMap<u64, String>,
    next_inode: u64,
}

impl InodeTable {
    /// Create a new inode table with root directory at inode 1
    pub fn new() -> Self {
        let mut table = Self {
            path_to_inode: HashMap::new(),
            inode_to_path: HashMap::new(),
            next_inode: ROOT_INODE + 1,
        };

        table.path_to_inode.insert("/".to_string(), ROOT_INODE);
        table.inode_to_path.insert(ROOT_INODE, "/".to_string());

        table
    }

    /// Get inode for a path, creating one if it doesn't exist
    pub fn get_or_create(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.path_to_inode.get(path) {
            return ino;
        }

        let ino = self.next_inode;
        self.next_inode += 1;
        self.path_to_inode.insert(path.to_string(), ino);
        self.inode_to_path.insert(ino, path.to_string());
        ino
    }

    pub fn get_path(&self, inode: u64) -> Option<&str> {
        self.inode_to_path.get(&inode).map(String::as_str)
    }

    /// Absolute path of `name` inside `parent`
    pub fn child_path(parent: &str, name: &str) -> String {
        if parent == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", parent, name)
        }
    }

    /// Parent of an absolute path; the root is its own parent
    pub fn parent_path(path: &str) -> String {
        match path.trim_end_matches('/').rsplit_once('/') {
            Some(("", _)) | None => "/".to_string(),
            Some((parent, _)) => parent.to_string(),
        }
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_inode_one() {
        let table = InodeTable::new();
        assert_eq!(table.get_path(ROOT_INODE), Some("/"));
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let mut table = InodeTable::new();
        let a = table.get_or_create("/movies");
        let b = table.get_or_create("/movies/film");
        assert_ne!(a, b);
        assert_eq!(table.get_or_create("/movies"), a);
        assert_eq!(table.get_path(b), Some("/movies/film"));
        assert_eq!(table.get_path(999), None);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(InodeTable::child_path("/", "movies"), "/movies");
        assert_eq!(InodeTable::child_path("/movies", "film"), "/movies/film");
        assert_eq!(InodeTable::parent_path("/movies/film"), "/movies");
        assert_eq!(InodeTable::parent_path("/movies"), "/");
        assert_eq!(InodeTable::parent_path("/"), "/");
    }
}

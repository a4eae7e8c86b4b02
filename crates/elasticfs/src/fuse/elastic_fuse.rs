//! fuser::Filesystem implementation for the elastic tree
//!
//! Each request is resolved on the tokio runtime and answered from the
//! spawned task, so a slow store request only holds up its own caller.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, Request, TimeOrNow,
};
use parking_lot::RwLock;
use tokio::runtime::Handle;

use super::inode_table::{InodeTable, ROOT_INODE};
use crate::error::FsError;
use crate::fs::ElasticFs;
use crate::path::Node;
use crate::resolver::Attributes;

impl FsError {
    pub fn errno(&self) -> i32 {
        match self {
            FsError::NotFound(_) => libc::ENOENT,
            FsError::NotImplemented => libc::ENOSYS,
            FsError::NotADirectory(_) => libc::ENOTDIR,
            FsError::IsADirectory(_) => libc::EISDIR,
            FsError::Backend { .. } | FsError::Render { .. } => libc::EIO,
        }
    }
}

/// FUSE filesystem backed by an [`ElasticFs`]
pub struct ElasticFuse {
    /// Tokio runtime handle for async operations
    rt: Handle,
    fs: Arc<ElasticFs>,
    inodes: Arc<RwLock<InodeTable>>,
}

impl ElasticFuse {
    const ATTR_TTL: Duration = Duration::from_secs(1);

    const BLOCK_SIZE: u32 = 512;

    pub fn new(rt: Handle, fs: Arc<ElasticFs>) -> Self {
        Self {
            rt,
            fs,
            inodes: Arc::new(RwLock::new(InodeTable::new())),
        }
    }

    /// Options for a read-only mount
    pub fn mount_options(allow_other: bool) -> Vec<MountOption> {
        let mut options = vec![
            MountOption::RO,
            MountOption::FSName("elasticfs".to_string()),
            MountOption::AutoUnmount,
        ];
        if allow_other {
            options.push(MountOption::AllowOther);
        }
        options
    }

    fn path_of(&self, ino: u64) -> Option<String> {
        self.inodes.read().get_path(ino).map(str::to_string)
    }

    /// Path of `name` under `parent`, for requests that never resolve it
    fn named_path(&self, parent: u64, name: &OsStr) -> String {
        let parent = self.path_of(parent).unwrap_or_else(|| "/".to_string());
        InodeTable::child_path(&parent, &name.to_string_lossy())
    }

    fn make_attr(ino: u64, attr: &Attributes) -> FileAttr {
        let kind = if attr.is_dir {
            FileType::Directory
        } else {
            FileType::RegularFile
        };

        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.size.div_ceil(Self::BLOCK_SIZE as u64),
            atime: attr.atime,
            mtime: attr.mtime,
            ctime: attr.ctime,
            crtime: attr.ctime,
            kind,
            perm: attr.perm,
            nlink: attr.nlink,
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
            rdev: 0,
            blksize: Self::BLOCK_SIZE,
            flags: 0,
        }
    }
}

/// errno for a mutation the tree turned down
fn rejected(result: Result<(), FsError>) -> i32 {
    result.err().map_or(libc::ENOSYS, |e| e.errno())
}

fn system_time(t: TimeOrNow) -> SystemTime {
    match t {
        TimeOrNow::SpecificTime(t) => t,
        TimeOrNow::Now => SystemTime::now(),
    }
}

impl Filesystem for ElasticFuse {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(name) = name.to_str() else {
            return reply.error(libc::ENOENT);
        };
        let Some(parent_path) = self.path_of(parent) else {
            return reply.error(libc::ENOENT);
        };

        let path = InodeTable::child_path(&parent_path, name);
        let fs = self.fs.clone();
        let inodes = self.inodes.clone();

        self.rt.spawn(async move {
            match fs.get_attributes(&path).await {
                Ok(attr) => {
                    let ino = inodes.write().get_or_create(&path);
                    reply.entry(&Self::ATTR_TTL, &Self::make_attr(ino, &attr), 0)
                }
                Err(e) => reply.error(e.errno()),
            }
        });
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let Some(path) = self.path_of(ino) else {
            return reply.error(libc::ENOENT);
        };
        let fs = self.fs.clone();

        self.rt.spawn(async move {
            match fs.get_attributes(&path).await {
                Ok(attr) => reply.attr(&Self::ATTR_TTL, &Self::make_attr(ino, &attr)),
                Err(e) => reply.error(e.errno()),
            }
        });
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let Some(path) = self.path_of(ino) else {
            return reply.error(libc::ENOENT);
        };
        let fs = self.fs.clone();
        let inodes = self.inodes.clone();

        self.rt.spawn(async move {
            let names = match fs.list_directory(&path).await {
                Ok(names) => names,
                Err(e) => return reply.error(e.errno()),
            };

            let parent_ino = if ino == ROOT_INODE {
                ROOT_INODE
            } else {
                inodes.write().get_or_create(&InodeTable::parent_path(&path))
            };

            for (i, name) in names.iter().enumerate().skip(offset.max(0) as usize) {
                let (entry_ino, kind) = match name.as_str() {
                    "." => (ino, FileType::Directory),
                    ".." => (parent_ino, FileType::Directory),
                    _ => {
                        let child = InodeTable::child_path(&path, name);
                        let kind = if Node::classify(&child).is_dir() {
                            FileType::Directory
                        } else {
                            FileType::RegularFile
                        };
                        (inodes.write().get_or_create(&child), kind)
                    }
                };

                if reply.add(entry_ino, (i + 1) as i64, kind, name) {
                    break;
                }
            }

            reply.ok()
        });
    }

    fn open(&mut self, _req: &Request<'_>, _ino: u64, _flags: i32, reply: ReplyOpen) {
        // Sizes are computed per request; keep the kernel page cache out of it
        reply.opened(0, fuser::consts::FOPEN_DIRECT_IO)
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Some(path) = self.path_of(ino) else {
            return reply.error(libc::ENOENT);
        };
        let fs = self.fs.clone();

        self.rt.spawn(async move {
            match fs.read_file(&path, offset.max(0) as u64, size as u64).await {
                Ok(data) => reply.data(&data),
                Err(e) => reply.error(e.errno()),
            }
        });
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        reply.error(rejected(self.fs.create(&self.named_path(parent, name), mode)))
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(rejected(self.fs.mkdir(&self.named_path(parent, name), mode)))
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        rdev: u32,
        reply: ReplyEntry,
    ) {
        reply.error(rejected(self.fs.mknod(&self.named_path(parent, name), mode, rdev)))
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        reply.error(rejected(self.fs.unlink(&self.named_path(parent, name))))
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        reply.error(rejected(self.fs.rmdir(&self.named_path(parent, name))))
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        link_name: &OsStr,
        target: &Path,
        reply: ReplyEntry,
    ) {
        let name = self.named_path(parent, link_name);
        reply.error(rejected(self.fs.symlink(&target.to_string_lossy(), &name)))
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        let from = self.named_path(parent, name);
        let to = self.named_path(newparent, newname);
        reply.error(rejected(self.fs.rename(&from, &to)))
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        newparent: u64,
        newname: &OsStr,
        reply: ReplyEntry,
    ) {
        let target = self.path_of(ino).unwrap_or_default();
        let name = self.named_path(newparent, newname);
        reply.error(rejected(self.fs.link(&target, &name)))
    }

    /// Only reached for timestamp and size changes, none of which apply
    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let path = self.path_of(ino).unwrap_or_default();
        let times = atime.zip(mtime).map(|(a, m)| (system_time(a), system_time(m)));
        reply.error(rejected(self.fs.utimens(&path, times)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(FsError::NotFound("/x".into()).errno(), libc::ENOENT);
        assert_eq!(FsError::NotImplemented.errno(), libc::ENOSYS);
        assert_eq!(FsError::NotADirectory("/x".into()).errno(), libc::ENOTDIR);
        assert_eq!(FsError::IsADirectory("/x".into()).errno(), libc::EISDIR);
        assert_eq!(rejected(Err(FsError::NotImplemented)), libc::ENOSYS);
    }

    #[test]
    fn test_mount_is_read_only() {
        let options = ElasticFuse::mount_options(false);
        assert!(options.contains(&MountOption::RO));
        assert!(!options.contains(&MountOption::AllowOther));
        assert!(ElasticFuse::mount_options(true).contains(&MountOption::AllowOther));
    }

    #[test]
    fn test_make_attr() {
        let attr = ElasticFuse::make_attr(7, &Attributes::file(1025));
        assert_eq!(attr.ino, 7);
        assert_eq!(attr.kind, FileType::RegularFile);
        assert_eq!(attr.perm, 0o444);
        assert_eq!(attr.nlink, 1);
        assert_eq!(attr.blocks, 3);

        let attr = ElasticFuse::make_attr(ROOT_INODE, &Attributes::dir());
        assert_eq!(attr.kind, FileType::Directory);
        assert_eq!(attr.perm, 0o755);
        assert_eq!(attr.nlink, 2);
    }
}

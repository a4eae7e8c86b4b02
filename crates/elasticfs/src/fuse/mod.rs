//! FUSE adapter for the elastic tree
//!
//! Translates inode based kernel requests into path level [`ElasticFs`]
//! calls and mounts the result read-only.
//!
//! [`ElasticFs`]: crate::fs::ElasticFs

pub mod elastic_fuse;
pub mod inode_table;

pub use elastic_fuse::ElasticFuse;

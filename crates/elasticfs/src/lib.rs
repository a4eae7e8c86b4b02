//! Browse a document store index as a read-only filesystem.
//!
//! Indices, document types, field mappings and documents appear as
//! directories and files. Paths are classified by [`path::Node`], resolved
//! against the store by [`resolver::Resolver`] and served through
//! [`fs::ElasticFs`]; the `fuse` feature mounts that into the kernel.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fs;
pub mod json;
pub mod path;
pub mod process;
pub mod resolver;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use config::Config;
pub use error::FsError;
pub use fs::ElasticFs;
pub use path::Node;
pub use resolver::Attributes;

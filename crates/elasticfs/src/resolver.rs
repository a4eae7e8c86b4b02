//! Resolution of tree nodes into attributes, listings and file content.
//!
//! Mapping documents and document bodies go through two bounded caches keyed
//! by request URL. Top-level listings (`/_aliases`, index mappings) and search
//! pages are fetched fresh on every call.

use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

use crate::cache::ContentCache;
use crate::client::{MappingDocument, StoreClient, StoreError};
use crate::error::FsError;
use crate::json;
use crate::path::{Node, BUCKETS, DOCUMENTS, PAGE_SIZE, PROPERTIES};

const DIR_PERM: u16 = 0o755;
const FILE_PERM: u16 = 0o444;

/// Metadata reported for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub is_dir: bool,
    /// Byte length of the content `read` serves
    pub size: u64,
    pub perm: u16,
    pub nlink: u32,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
}

impl Attributes {
    pub fn dir() -> Self {
        Self::new(true, 0)
    }

    pub fn file(size: u64) -> Self {
        Self::new(false, size)
    }

    fn new(is_dir: bool, size: u64) -> Self {
        let now = SystemTime::now();
        Self {
            is_dir,
            size,
            perm: if is_dir { DIR_PERM } else { FILE_PERM },
            nlink: if is_dir { 2 } else { 1 },
            atime: now,
            mtime: now,
            ctime: now,
        }
    }

    /// Set every timestamp to `at`
    pub fn stamped(mut self, at: SystemTime) -> Self {
        self.atime = at;
        self.mtime = at;
        self.ctime = at;
        self
    }
}

pub struct Resolver {
    client: StoreClient,
    /// Type mapping URL → decoded mapping document
    mappings: ContentCache<Arc<MappingDocument>>,
    /// Document URL → pretty printed body
    documents: ContentCache<Arc<str>>,
}

impl Resolver {
    pub fn new(client: StoreClient) -> Self {
        Self {
            client,
            mappings: ContentCache::new("mappings"),
            documents: ContentCache::new("documents"),
        }
    }

    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    pub fn mapping_cache(&self) -> &ContentCache<Arc<MappingDocument>> {
        &self.mappings
    }

    pub fn document_cache(&self) -> &ContentCache<Arc<str>> {
        &self.documents
    }

    pub async fn attributes(&self, node: &Node) -> Result<Attributes, FsError> {
        if node.is_dir() {
            return Ok(Attributes::dir());
        }
        // Size comes from freshly rendered content so it always matches read
        let content = self.content(node).await?;
        Ok(Attributes::file(content.len() as u64))
    }

    /// Child names of a directory node, in store order where the store has one
    pub async fn children(&self, node: &Node) -> Result<Vec<String>, FsError> {
        let path = node.path();
        match node {
            Node::Root => {
                let aliases = self
                    .client
                    .aliases()
                    .await
                    .map_err(|e| FsError::from_store(&path, Arc::new(e)))?;
                Ok(aliases.into_keys().collect())
            }
            Node::Index { index } => {
                let mapping = self
                    .client
                    .index_mapping(index)
                    .await
                    .map_err(|e| FsError::from_store(&path, Arc::new(e)))?;
                let index_mapping = mapping
                    .index(index)
                    .ok_or_else(|| FsError::NotFound(path.clone()))?;
                Ok(index_mapping.mappings.keys().cloned().collect())
            }
            Node::Type { .. } => Ok(vec![PROPERTIES.to_string(), DOCUMENTS.to_string()]),
            Node::Properties { index, doc_type } => {
                let mapping = self.type_mapping(&path, index, doc_type).await?;
                let properties = mapping
                    .properties(index, doc_type)
                    .ok_or_else(|| FsError::NotFound(path.clone()))?;
                Ok(properties.keys().cloned().collect())
            }
            Node::Documents { .. } => Ok(BUCKETS.iter().map(|b| b.to_string()).collect()),
            Node::Bucket {
                index,
                doc_type,
                bucket,
            } => {
                let from: u64 = bucket
                    .parse()
                    .map_err(|_| FsError::NotFound(path.clone()))?;
                let hits = self
                    .client
                    .search(index, doc_type, from, PAGE_SIZE)
                    .await
                    .map_err(|e| FsError::from_store(&path, Arc::new(e)))?;
                Ok(hits.ids())
            }
            Node::Property { .. } | Node::Document { .. } | Node::Unknown { .. } => {
                Err(FsError::NotADirectory(path))
            }
        }
    }

    /// Full content of a file node
    pub async fn content(&self, node: &Node) -> Result<Vec<u8>, FsError> {
        match node {
            Node::Property {
                index,
                doc_type,
                field,
            } => {
                let path = node.path();
                let mapping = self.type_mapping(&path, index, doc_type).await?;
                let definition = mapping
                    .property(index, doc_type, field)
                    .ok_or_else(|| FsError::NotFound(path.clone()))?;
                let mut text =
                    json::to_inline_string(definition).map_err(|source| FsError::Render {
                        path: path.clone(),
                        source,
                    })?;
                text.push('\n');
                Ok(text.into_bytes())
            }
            Node::Document {
                index,
                doc_type,
                id,
                ..
            } => {
                let text = self.document(&node.path(), index, doc_type, id).await?;
                Ok(text.as_bytes().to_vec())
            }
            Node::Unknown { .. } => Ok(Vec::new()),
            _ => Err(FsError::IsADirectory(node.path())),
        }
    }

    async fn type_mapping(
        &self,
        path: &str,
        index: &str,
        doc_type: &str,
    ) -> Result<Arc<MappingDocument>, FsError> {
        let url = self.client.type_mapping_url(index, doc_type);
        let client = &self.client;
        self.mappings
            .get_with(&url, async {
                client.get_json::<MappingDocument>(&url).await.map(Arc::new)
            })
            .await
            .map_err(|e| FsError::from_store(path, e))
    }

    async fn document(
        &self,
        path: &str,
        index: &str,
        doc_type: &str,
        id: &str,
    ) -> Result<Arc<str>, FsError> {
        let url = self.client.document_url(index, doc_type, id);
        let client = &self.client;
        self.documents
            .get_with(&url, async {
                let body: Value = client.get_json(&url).await?;
                json::to_pretty_string(&body)
                    .map(Arc::from)
                    .map_err(|source| StoreError::Decode {
                        url: url.clone(),
                        source,
                    })
            })
            .await
            .map_err(|e| FsError::from_store(path, e))
    }
}

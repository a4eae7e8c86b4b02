//! Classification of filesystem paths into nodes of the virtual tree
//!
//! ```text
//! /                                         Root
//! /{index}                                  Index
//! /{index}/{type}                           Type
//! /{index}/{type}/properties                Properties
//! /{index}/{type}/properties/{field}        Property  (file)
//! /{index}/{type}/documents                 Documents
//! /{index}/{type}/documents/{bucket}        Bucket
//! /{index}/{type}/documents/{bucket}/{id}   Document  (file)
//! ```
//!
//! Anything else is `Unknown` and behaves as an empty file.

pub const PROPERTIES: &str = "properties";
pub const DOCUMENTS: &str = "documents";

/// Pagination labels under `documents`, one page of `PAGE_SIZE` hits each
pub const BUCKETS: [&str; 10] = ["0", "10", "20", "30", "40", "50", "60", "70", "80", "90"];
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Root,
    Index {
        index: String,
    },
    Type {
        index: String,
        doc_type: String,
    },
    Properties {
        index: String,
        doc_type: String,
    },
    Documents {
        index: String,
        doc_type: String,
    },
    Property {
        index: String,
        doc_type: String,
        field: String,
    },
    Bucket {
        index: String,
        doc_type: String,
        bucket: String,
    },
    Document {
        index: String,
        doc_type: String,
        bucket: String,
        id: String,
    },
    /// Outside the tree layout; reported as an empty file
    Unknown {
        path: String,
    },
}

impl Node {
    /// Classify a slash separated path. Never fails and never looks at the store.
    pub fn classify(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let owned = |i: usize| segments[i].to_string();

        match segments.as_slice() {
            [] => Node::Root,
            [_] => Node::Index { index: owned(0) },
            [_, _] => Node::Type {
                index: owned(0),
                doc_type: owned(1),
            },
            [_, _, PROPERTIES] => Node::Properties {
                index: owned(0),
                doc_type: owned(1),
            },
            [_, _, DOCUMENTS] => Node::Documents {
                index: owned(0),
                doc_type: owned(1),
            },
            [_, _, PROPERTIES, _] => Node::Property {
                index: owned(0),
                doc_type: owned(1),
                field: owned(3),
            },
            [_, _, DOCUMENTS, _] => Node::Bucket {
                index: owned(0),
                doc_type: owned(1),
                bucket: owned(3),
            },
            [_, _, DOCUMENTS, _, _] => Node::Document {
                index: owned(0),
                doc_type: owned(1),
                bucket: owned(3),
                id: owned(4),
            },
            _ => Node::Unknown {
                path: format!("/{}", segments.join("/")),
            },
        }
    }

    pub fn is_dir(&self) -> bool {
        !matches!(
            self,
            Node::Property { .. } | Node::Document { .. } | Node::Unknown { .. }
        )
    }

    /// Canonical absolute path of the node
    pub fn path(&self) -> String {
        match self {
            Node::Root => "/".to_string(),
            Node::Index { index } => format!("/{}", index),
            Node::Type { index, doc_type } => format!("/{}/{}", index, doc_type),
            Node::Properties { index, doc_type } => {
                format!("/{}/{}/{}", index, doc_type, PROPERTIES)
            }
            Node::Documents { index, doc_type } => {
                format!("/{}/{}/{}", index, doc_type, DOCUMENTS)
            }
            Node::Property {
                index,
                doc_type,
                field,
            } => format!("/{}/{}/{}/{}", index, doc_type, PROPERTIES, field),
            Node::Bucket {
                index,
                doc_type,
                bucket,
            } => format!("/{}/{}/{}/{}", index, doc_type, DOCUMENTS, bucket),
            Node::Document {
                index,
                doc_type,
                bucket,
                id,
            } => format!("/{}/{}/{}/{}/{}", index, doc_type, DOCUMENTS, bucket, id),
            Node::Unknown { path } => path.clone(),
        }
    }
}

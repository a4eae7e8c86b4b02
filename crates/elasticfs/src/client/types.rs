//! Typed views of the document store responses the filesystem consumes.
//!
//! Field definitions and document bodies stay opaque (`serde_json::Value`);
//! only the structure the tree is navigated by gets a concrete type.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// `GET /_aliases`: index name → alias description.
pub type Aliases = IndexMap<String, Value>;

/// `GET /{index}/_mapping` or `GET /{index}/{type}/_mapping`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MappingDocument(pub IndexMap<String, IndexMapping>);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexMapping {
    #[serde(default)]
    pub mappings: IndexMap<String, TypeMapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeMapping {
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

impl MappingDocument {
    pub fn index(&self, index: &str) -> Option<&IndexMapping> {
        self.0.get(index)
    }

    /// Field definitions of `index`/`doc_type`, if both exist.
    pub fn properties(&self, index: &str, doc_type: &str) -> Option<&IndexMap<String, Value>> {
        self.index(index)?
            .mappings
            .get(doc_type)
            .map(|t| &t.properties)
    }

    pub fn property(&self, index: &str, doc_type: &str, field: &str) -> Option<&Value> {
        self.properties(index, doc_type)?.get(field)
    }
}

/// `GET /{index}/{type}/_search`, reduced to the hit ids.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
}

impl SearchResponse {
    pub fn ids(self) -> Vec<String> {
        self.hits.hits.into_iter().map(|h| h.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_lookup() {
        let doc: MappingDocument = serde_json::from_value(serde_json::json!({
            "movies": {"mappings": {"film": {"properties": {
                "title": {"type": "text"},
                "year": {"type": "integer"}
            }}}}
        }))
        .unwrap();

        let props = doc.properties("movies", "film").unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["title", "year"]);
        assert_eq!(
            doc.property("movies", "film", "year"),
            Some(&serde_json::json!({"type": "integer"}))
        );
        assert!(doc.properties("movies", "tv").is_none());
        assert!(doc.property("books", "film", "title").is_none());
        assert!(doc.property("movies", "film", "rating").is_none());
    }

    #[test]
    fn test_type_without_properties() {
        let doc: MappingDocument = serde_json::from_value(serde_json::json!({
            "logs": {"mappings": {"event": {"dynamic": "strict"}}}
        }))
        .unwrap();

        assert!(doc.properties("logs", "event").unwrap().is_empty());
    }

    #[test]
    fn test_search_ids_keep_hit_order() {
        let resp: SearchResponse = serde_json::from_value(serde_json::json!({
            "took": 3,
            "hits": {"total": 3, "hits": [
                {"_id": "c", "_score": 2.0},
                {"_id": "a", "_score": 1.5},
                {"_id": "b", "_score": 1.0}
            ]}
        }))
        .unwrap();

        assert_eq!(resp.ids(), vec!["c", "a", "b"]);
    }
}

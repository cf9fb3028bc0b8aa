//! Record types stored in and returned from the search index.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One indexed text value for one field of one entity.
///
/// A record is identified by the `(model, field, foreign_id)` triple;
/// `content` is payload, not identity. Re-indexing an entity replaces
/// the content of its records without creating duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    /// Database rowid, assigned on insert.
    pub id: i64,
    /// Entity type the record belongs to.
    pub model: String,
    /// Field of the entity the content was taken from.
    pub field: String,
    /// Identifier of the indexed entity.
    pub foreign_id: String,
    /// Searchable text.
    pub content: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}

impl PartialEq for IndexRecord {
    fn eq(&self, other: &Self) -> bool {
        self.model == other.model
            && self.field == other.field
            && self.foreign_id == other.foreign_id
    }
}

impl Eq for IndexRecord {}

impl Hash for IndexRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model.hash(state);
        self.field.hash(state);
        self.foreign_id.hash(state);
    }
}

/// A single search result row.
///
/// Hits are grouped per entity, so one hit stands for all records of
/// `foreign_id` that matched; `score` is the best score among them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Identifier of the matched entity.
    pub foreign_id: String,
    /// Entity type of the matched entity.
    pub model: String,
    /// Best relevance score across the entity's matching records.
    pub score: f64,
}

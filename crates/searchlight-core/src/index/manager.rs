//! High-level indexing pipeline for application entities.
//!
//! Entities describe their searchable text through [`Indexable`]; the
//! manager normalizes each field and writes it through the store.
//! Indexing the same entity again replaces its records, and a field
//! whose text has become empty loses its record, so repeated runs
//! always converge on the entity's current state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;

use super::store::SearchIndex;

/// Implemented by entity types that feed the search index.
pub trait Indexable {
    /// Entity type name stored as the record `model`.
    fn model(&self) -> &str;

    /// Identifier of this entity instance.
    fn foreign_id(&self) -> String;

    /// Field name and raw text pairs to index. A `None` or blank text
    /// drops that field's record instead of writing one.
    fn searchable_fields(&self) -> Vec<(String, Option<String>)>;
}

/// Outcome of indexing one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Number of field records written.
    pub indexed: usize,
    /// Number of field records dropped because their text was empty.
    pub removed: usize,
}

/// Normalize raw field text before indexing.
///
/// Collapses whitespace runs to single spaces and trims the ends.
/// Returns `None` when nothing searchable remains.
pub fn normalize_content(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Writes entities into a [`SearchIndex`].
pub struct IndexManager {
    index: Arc<SearchIndex>,
}

impl IndexManager {
    pub fn new(index: Arc<SearchIndex>) -> Self {
        Self { index }
    }

    /// The underlying store.
    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    /// Index every searchable field of an entity.
    pub fn index_entity(&self, entity: &dyn Indexable) -> Result<IndexSummary> {
        let fields = entity.searchable_fields();
        self.index_fields(entity.model(), &entity.foreign_id(), &fields)
    }

    /// Index explicit field and text pairs for one entity.
    pub fn index_fields(
        &self,
        model: &str,
        foreign_id: &str,
        fields: &[(String, Option<String>)],
    ) -> Result<IndexSummary> {
        let mut summary = IndexSummary::default();

        for (field, raw) in fields {
            match raw.as_deref().and_then(normalize_content) {
                Some(content) => {
                    self.index.upsert(model, field, foreign_id, &content)?;
                    summary.indexed += 1;
                }
                None => {
                    if self.index.remove(model, field, foreign_id)? {
                        summary.removed += 1;
                    }
                }
            }
        }

        debug!(
            "Indexed {} {}: {} fields written, {} dropped",
            model, foreign_id, summary.indexed, summary.removed
        );
        Ok(summary)
    }

    /// Remove all records of an entity. Returns the number removed.
    pub fn remove_entity(&self, model: &str, foreign_id: &str) -> Result<usize> {
        self.index.remove_entity(model, foreign_id)
    }

    /// Drop the whole index and rebuild it from the given entities.
    /// Returns the number of entities indexed.
    pub fn rebuild<'a, I>(&self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a dyn Indexable>,
    {
        self.index.clear()?;

        let mut count = 0;
        for entity in entities {
            self.index_entity(entity)?;
            count += 1;
        }

        self.index.checkpoint_wal()?;
        info!("Rebuilt search index from {} entities", count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    struct TestPerson {
        id: String,
        name: Option<String>,
        bio: Option<String>,
    }

    impl Indexable for TestPerson {
        fn model(&self) -> &str {
            "Person"
        }

        fn foreign_id(&self) -> String {
            self.id.clone()
        }

        fn searchable_fields(&self) -> Vec<(String, Option<String>)> {
            vec![
                ("name".to_string(), self.name.clone()),
                ("bio".to_string(), self.bio.clone()),
            ]
        }
    }

    fn create_test_manager() -> (IndexManager, TempDir) {
        let temp = TempDir::new().unwrap();
        let index = SearchIndex::open(temp.path().join("test_index.db")).unwrap();
        (IndexManager::new(Arc::new(index)), temp)
    }

    fn person(id: &str, name: Option<&str>, bio: Option<&str>) -> TestPerson {
        TestPerson {
            id: id.to_string(),
            name: name.map(String::from),
            bio: bio.map(String::from),
        }
    }

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("hello"), Some("hello".to_string()));
        assert_eq!(
            normalize_content("  a \t b \n c  "),
            Some("a b c".to_string())
        );
        assert_eq!(normalize_content(""), None);
        assert_eq!(normalize_content("   \n\t "), None);
    }

    #[test]
    fn test_index_entity_writes_fields() {
        let (manager, _temp) = create_test_manager();

        let summary = manager
            .index_entity(&person("42", Some("Alice"), Some("Singer from Detroit")))
            .unwrap();
        assert_eq!(summary, IndexSummary { indexed: 2, removed: 0 });

        let record = manager
            .index()
            .find_existing("Person", "bio", "42")
            .unwrap()
            .unwrap();
        assert_eq!(record.content, "Singer from Detroit");
    }

    #[test]
    fn test_index_entity_is_idempotent() {
        let (manager, _temp) = create_test_manager();

        manager
            .index_entity(&person("42", Some("Alice"), Some("Singer")))
            .unwrap();
        manager
            .index_entity(&person("42", Some("Alicia"), Some("Singer")))
            .unwrap();

        assert_eq!(manager.index().count().unwrap(), 2);
        let record = manager
            .index()
            .find_existing("Person", "name", "42")
            .unwrap()
            .unwrap();
        assert_eq!(record.content, "Alicia");
    }

    #[test]
    fn test_missing_field_never_creates_record() {
        let (manager, _temp) = create_test_manager();

        let summary = manager
            .index_entity(&person("42", Some("Alice"), None))
            .unwrap();
        assert_eq!(summary, IndexSummary { indexed: 1, removed: 0 });
        assert!(manager
            .index()
            .find_existing("Person", "bio", "42")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_blank_field_drops_existing_record() {
        let (manager, _temp) = create_test_manager();

        manager
            .index_entity(&person("42", Some("Alice"), Some("Singer")))
            .unwrap();
        let summary = manager
            .index_entity(&person("42", Some("Alice"), Some("   ")))
            .unwrap();

        assert_eq!(summary, IndexSummary { indexed: 1, removed: 1 });
        assert!(manager
            .index()
            .find_existing("Person", "bio", "42")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_index_fields_normalizes_whitespace() {
        let (manager, _temp) = create_test_manager();

        manager
            .index_fields(
                "Person",
                "42",
                &[("name".to_string(), Some("  Alice \n Cooper ".to_string()))],
            )
            .unwrap();

        let record = manager
            .index()
            .find_existing("Person", "name", "42")
            .unwrap()
            .unwrap();
        assert_eq!(record.content, "Alice Cooper");
    }

    #[test]
    fn test_remove_entity() {
        let (manager, _temp) = create_test_manager();

        manager
            .index_entity(&person("42", Some("Alice"), Some("Singer")))
            .unwrap();
        assert_eq!(manager.remove_entity("Person", "42").unwrap(), 2);
        assert_eq!(manager.index().count().unwrap(), 0);
    }

    #[test]
    fn test_rebuild_replaces_stale_records() {
        let (manager, _temp) = create_test_manager();

        manager
            .index()
            .upsert("Ghost", "name", "1", "left over")
            .unwrap();

        let people = [
            person("1", Some("Alice"), None),
            person("2", Some("Bob"), Some("Bass")),
        ];
        let count = manager
            .rebuild(people.iter().map(|p| p as &dyn Indexable))
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(manager.index().count().unwrap(), 3);
        assert_eq!(manager.index().count_model("Ghost").unwrap(), 0);
    }
}

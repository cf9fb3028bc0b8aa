//! Entity text indexing and ranked search.
//!
//! The index is a side table: entities live elsewhere, and only their
//! searchable text is copied here as one record per `(model, field,
//! foreign_id)` triple. Searching returns entity identifiers ranked by
//! relevance; callers load the entities themselves.

pub mod fts;
pub mod manager;
pub mod query;
pub mod record;
pub mod store;

pub use fts::{FtsConfig, FtsManager, FtsStats};
pub use manager::{normalize_content, IndexManager, IndexSummary, Indexable};
pub use query::{build_like_pattern, build_match_query, escape_match_term, QuerySpec};
pub use record::{IndexRecord, SearchHit};
pub use store::SearchIndex;

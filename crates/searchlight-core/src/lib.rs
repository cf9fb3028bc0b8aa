//! Full-text search side table for application entities.
//!
//! Entities live wherever the application keeps them; this crate keeps
//! a copy of their searchable text in a SQLite database and answers
//! queries with ranked entity identifiers. Matching combines FTS5
//! relevance with a plain substring channel, so short or partial
//! queries still find their targets.
//!
//! - [`SearchIndex`]: the record store and query executor
//! - [`IndexManager`] / [`Indexable`]: write entities into the index
//! - [`SearchEngine`]: validate queries, run hooks, report results
//! - [`HookRegistry`] / [`EntityMetadataSource`]: per-entity-type
//!   search customization
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use searchlight::{IndexManager, SearchEngine, SearchIndex};
//!
//! let index = Arc::new(SearchIndex::open("search_index.db")?);
//!
//! let manager = IndexManager::new(Arc::clone(&index));
//! manager.index_fields(
//!     "Person",
//!     "42",
//!     &[("name".to_string(), Some("Ada Lovelace".to_string()))],
//! )?;
//!
//! let engine = SearchEngine::new(index);
//! let ids = engine.search("lovelace", Some("Person"), None)?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod index;

pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use hooks::{
    EntityMetadataSource, HookRegistry, PostSearchHandler, PreSearchHandler, ResolvedHooks,
    SearchHookDescriptor, StaticMetadataSource,
};
pub use index::{
    FtsConfig, FtsManager, FtsStats, IndexManager, IndexRecord, IndexSummary, Indexable,
    QuerySpec, SearchHit, SearchIndex,
};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

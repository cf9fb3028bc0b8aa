//! Search façade.
//!
//! [`SearchEngine`] is the entry point applications call: it validates
//! input, resolves the target entity types' hooks, runs the index
//! query and reports results. Single-entity searches return bare
//! entity identifiers; multi-entity searches return hits that carry
//! the entity type alongside the identifier.

use std::sync::Arc;

use tracing::debug;

use crate::config::ScoringConfig;
use crate::error::{Result, SearchError};
use crate::hooks::{EntityMetadataSource, HookRegistry, ResolvedHooks, StaticMetadataSource};
use crate::index::{QuerySpec, SearchHit, SearchIndex};

const PRE_SEARCH: &str = "pre-search";
const POST_SEARCH: &str = "post-search";

/// High-level search interface over a [`SearchIndex`].
pub struct SearchEngine {
    index: Arc<SearchIndex>,
    metadata: Arc<dyn EntityMetadataSource>,
    hooks: Arc<HookRegistry>,
    min_score_factor: f64,
}

impl SearchEngine {
    /// Create an engine with no hooks and default scoring.
    pub fn new(index: Arc<SearchIndex>) -> Self {
        Self {
            index,
            metadata: Arc::new(StaticMetadataSource::new()),
            hooks: Arc::new(HookRegistry::new()),
            min_score_factor: ScoringConfig::MIN_SCORE_FACTOR,
        }
    }

    /// Use the given metadata source for hook declarations.
    pub fn with_metadata_source(mut self, metadata: Arc<dyn EntityMetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Use the given registry for hook implementations.
    pub fn with_hook_registry(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override the score floor multiplier.
    pub fn with_min_score_factor(mut self, factor: f64) -> Self {
        self.min_score_factor = factor;
        self
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    /// Search one entity type (or all of them when `entity` is `None`)
    /// and return matching entity identifiers, best match first.
    ///
    /// When `entity` is given, its declared pre and post search hooks
    /// run around the query.
    pub fn search(
        &self,
        query: &str,
        entity: Option<&str>,
        field: Option<&str>,
    ) -> Result<Vec<String>> {
        Self::validate_query(query)?;
        if let Some(value) = entity {
            Self::validate_filter("entity", value)?;
        }
        if let Some(value) = field {
            Self::validate_filter("field", value)?;
        }

        let mut spec = QuerySpec::new(query).with_min_score_factor(self.min_score_factor);
        if let Some(model) = entity {
            spec = spec.with_model(model);
        }
        if let Some(name) = field {
            spec = spec.with_field(name);
        }

        let resolved = match entity {
            Some(model) => self.hooks.resolve(self.metadata.as_ref(), model),
            None => ResolvedHooks::default(),
        };

        if let (Some(handler), Some(model)) = (&resolved.pre, entity) {
            spec = handler
                .pre_search(spec, query, model, field)
                .map_err(|cause| SearchError::Hook {
                    entity: model.to_string(),
                    phase: PRE_SEARCH,
                    cause,
                })?;
        }

        let hits = self.index.search(&spec)?;

        let hits = match (&resolved.post, entity) {
            (Some(handler), Some(model)) => {
                handler
                    .post_search(hits, query, model, field)
                    .map_err(|cause| SearchError::Hook {
                        entity: model.to_string(),
                        phase: POST_SEARCH,
                        cause,
                    })?
            }
            _ => hits,
        };

        debug!("Search {:?} matched {} entities", query, hits.len());
        Ok(hits.into_iter().map(|hit| hit.foreign_id).collect())
    }

    /// Search several entity types at once.
    ///
    /// Hits are grouped per `(entity, type)` pair so the same
    /// identifier can appear once per entity type. Every targeted
    /// type's pre hooks run before the query and its post hooks after,
    /// in the order the types were passed.
    pub fn search_entities(
        &self,
        query: &str,
        entities: &[String],
        fields: &[String],
    ) -> Result<Vec<SearchHit>> {
        Self::validate_query(query)?;
        for value in entities {
            Self::validate_filter("entity", value)?;
        }
        for value in fields {
            Self::validate_filter("field", value)?;
        }

        let mut spec = QuerySpec::new(query)
            .with_min_score_factor(self.min_score_factor)
            .with_models(entities.iter().cloned())
            .with_fields(fields.iter().cloned())
            .grouped_by_model();

        let resolved: Vec<(&str, ResolvedHooks)> = entities
            .iter()
            .map(|model| {
                (
                    model.as_str(),
                    self.hooks.resolve(self.metadata.as_ref(), model),
                )
            })
            .collect();

        for (model, hooks) in &resolved {
            if let Some(handler) = &hooks.pre {
                spec = handler
                    .pre_search(spec, query, model, None)
                    .map_err(|cause| SearchError::Hook {
                        entity: model.to_string(),
                        phase: PRE_SEARCH,
                        cause,
                    })?;
            }
        }

        let mut hits = self.index.search(&spec)?;

        for (model, hooks) in &resolved {
            if let Some(handler) = &hooks.post {
                hits = handler
                    .post_search(hits, query, model, None)
                    .map_err(|cause| SearchError::Hook {
                        entity: model.to_string(),
                        phase: POST_SEARCH,
                        cause,
                    })?;
            }
        }

        debug!("Multi-entity search {:?} matched {} hits", query, hits.len());
        Ok(hits)
    }

    fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            Err(SearchError::EmptyQuery)
        } else {
            Ok(())
        }
    }

    fn validate_filter(kind: &'static str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            Err(SearchError::InvalidFilter {
                kind,
                value: value.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

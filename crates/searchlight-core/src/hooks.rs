//! Search extension hooks.
//!
//! Entity types can customize searches that target them: a pre-search
//! handler adjusts the [`QuerySpec`] before it runs, and a post-search
//! handler reshapes the hits afterwards. Entities declare handlers by
//! name through an [`EntityMetadataSource`]; the [`HookRegistry`] maps
//! those names to implementations. A declared name with no matching
//! registration is skipped with a warning, never a failure, so stale
//! metadata cannot break search.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::index::{QuerySpec, SearchHit};

/// Adjusts a query specification before execution.
pub trait PreSearchHandler: Send + Sync {
    /// Return the spec to execute in place of `spec`. `query`, `model`
    /// and `field` describe the original request.
    fn pre_search(
        &self,
        spec: QuerySpec,
        query: &str,
        model: &str,
        field: Option<&str>,
    ) -> anyhow::Result<QuerySpec>;
}

/// Reshapes search hits after execution.
pub trait PostSearchHandler: Send + Sync {
    /// Return the hits to report in place of `hits`. Handlers may
    /// filter, reorder or augment them.
    fn post_search(
        &self,
        hits: Vec<SearchHit>,
        query: &str,
        model: &str,
        field: Option<&str>,
    ) -> anyhow::Result<Vec<SearchHit>>;
}

/// Hook names one entity type declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHookDescriptor {
    pub pre_search: Option<String>,
    pub post_search: Option<String>,
}

/// Source of per-entity search metadata.
pub trait EntityMetadataSource: Send + Sync {
    /// Hook declaration for an entity type, or `None` when it declares
    /// none.
    fn search_hooks(&self, model: &str) -> Option<SearchHookDescriptor>;
}

/// Metadata source backed by explicit declarations.
#[derive(Default)]
pub struct StaticMetadataSource {
    hooks: RwLock<HashMap<String, SearchHookDescriptor>>,
}

impl StaticMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the hooks for an entity type.
    pub fn declare(&self, model: impl Into<String>, descriptor: SearchHookDescriptor) {
        match self.hooks.write() {
            Ok(mut map) => {
                map.insert(model.into(), descriptor);
            }
            Err(_) => warn!("Metadata lock poisoned; hook declaration dropped"),
        }
    }
}

impl EntityMetadataSource for StaticMetadataSource {
    fn search_hooks(&self, model: &str) -> Option<SearchHookDescriptor> {
        self.hooks.read().ok()?.get(model).cloned()
    }
}

/// Handlers resolved for one entity type.
#[derive(Default)]
pub struct ResolvedHooks {
    pub pre: Option<Arc<dyn PreSearchHandler>>,
    pub post: Option<Arc<dyn PostSearchHandler>>,
}

/// Registry of named hook implementations.
pub struct HookRegistry {
    pre: RwLock<HashMap<String, Arc<dyn PreSearchHandler>>>,
    post: RwLock<HashMap<String, Arc<dyn PostSearchHandler>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            pre: RwLock::new(HashMap::new()),
            post: RwLock::new(HashMap::new()),
        }
    }

    /// Register a pre-search handler under a name.
    pub fn register_pre(&self, name: impl Into<String>, handler: Arc<dyn PreSearchHandler>) {
        match self.pre.write() {
            Ok(mut map) => {
                map.insert(name.into(), handler);
            }
            Err(_) => warn!("Hook registry lock poisoned; registration dropped"),
        }
    }

    /// Register a post-search handler under a name.
    pub fn register_post(&self, name: impl Into<String>, handler: Arc<dyn PostSearchHandler>) {
        match self.post.write() {
            Ok(mut map) => {
                map.insert(name.into(), handler);
            }
            Err(_) => warn!("Hook registry lock poisoned; registration dropped"),
        }
    }

    /// Look up a pre-search handler by name.
    pub fn get_pre(&self, name: &str) -> Option<Arc<dyn PreSearchHandler>> {
        self.pre.read().ok()?.get(name).cloned()
    }

    /// Look up a post-search handler by name.
    pub fn get_post(&self, name: &str) -> Option<Arc<dyn PostSearchHandler>> {
        self.post.read().ok()?.get(name).cloned()
    }

    /// Resolve an entity type's declared hooks to implementations.
    ///
    /// Names that resolve to nothing are logged and dropped.
    pub fn resolve(&self, metadata: &dyn EntityMetadataSource, model: &str) -> ResolvedHooks {
        let Some(descriptor) = metadata.search_hooks(model) else {
            return ResolvedHooks::default();
        };

        let pre = descriptor.pre_search.as_deref().and_then(|name| {
            let handler = self.get_pre(name);
            if handler.is_none() {
                warn!(
                    "Pre-search hook '{}' declared by {} is not registered, skipping",
                    name, model
                );
            }
            handler
        });

        let post = descriptor.post_search.as_deref().and_then(|name| {
            let handler = self.get_post(name);
            if handler.is_none() {
                warn!(
                    "Post-search hook '{}' declared by {} is not registered, skipping",
                    name, model
                );
            }
            handler
        });

        ResolvedHooks { pre, post }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

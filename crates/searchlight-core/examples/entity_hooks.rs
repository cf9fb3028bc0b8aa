//! Per-entity search hook demonstration.
//!
//! `Person` declares a registered pre-search hook that narrows matches
//! to the name field. `Group` declares a hook name nobody registered;
//! watch the log for the warning while its search still succeeds.
//!
//! Usage: cargo run --example entity_hooks

use std::sync::Arc;

use searchlight::config::IndexConfig;
use searchlight::{
    HookRegistry, PreSearchHandler, QuerySpec, SearchEngine, SearchHookDescriptor, SearchIndex,
    StaticMetadataSource,
};

struct NameFieldOnly;

impl PreSearchHandler for NameFieldOnly {
    fn pre_search(
        &self,
        spec: QuerySpec,
        _query: &str,
        _model: &str,
        _field: Option<&str>,
    ) -> anyhow::Result<QuerySpec> {
        Ok(spec.with_field("name"))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let dir = tempfile::tempdir()?;
    let index = Arc::new(SearchIndex::open(dir.path().join(IndexConfig::DB_FILENAME))?);

    index.upsert("Person", "name", "1", "Marie Curie")?;
    index.upsert("Person", "bio", "2", "Wrote about Marie Curie")?;
    index.upsert("Group", "name", "9", "Curie fan club")?;

    let metadata = StaticMetadataSource::new();
    metadata.declare(
        "Person",
        SearchHookDescriptor {
            pre_search: Some("person_name_only".to_string()),
            post_search: None,
        },
    );
    metadata.declare(
        "Group",
        SearchHookDescriptor {
            pre_search: Some("legacy_group_filter".to_string()),
            post_search: None,
        },
    );

    let registry = HookRegistry::new();
    registry.register_pre("person_name_only", Arc::new(NameFieldOnly));

    let engine = SearchEngine::new(index)
        .with_metadata_source(Arc::new(metadata))
        .with_hook_registry(Arc::new(registry));

    println!("People matching 'curie' (name field only, via hook):");
    for id in engine.search("curie", Some("Person"), None)? {
        println!("  Person {}", id);
    }

    println!("\nGroups matching 'curie' (declared hook is unregistered):");
    for id in engine.search("curie", Some("Group"), None)? {
        println!("  Group {}", id);
    }

    Ok(())
}

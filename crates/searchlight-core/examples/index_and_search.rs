//! Basic indexing and search walkthrough.
//!
//! Usage: cargo run --example index_and_search -- [query]

use std::sync::Arc;

use searchlight::config::IndexConfig;
use searchlight::{IndexManager, SearchEngine, SearchIndex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "ada".to_string());

    let dir = tempfile::tempdir()?;
    let index = Arc::new(SearchIndex::open(dir.path().join(IndexConfig::DB_FILENAME))?);

    let manager = IndexManager::new(Arc::clone(&index));
    manager.index_fields(
        "Person",
        "1",
        &[
            ("name".to_string(), Some("Ada Lovelace".to_string())),
            (
                "bio".to_string(),
                Some("Wrote the first published program".to_string()),
            ),
        ],
    )?;
    manager.index_fields(
        "Person",
        "2",
        &[
            ("name".to_string(), Some("Charles Babbage".to_string())),
            ("bio".to_string(), Some("Designed the analytical engine".to_string())),
        ],
    )?;
    manager.index_fields(
        "Project",
        "1",
        &[("title".to_string(), Some("Analytical Engine Notes".to_string()))],
    )?;

    println!("Indexed {} records\n", index.count()?);

    let engine = SearchEngine::new(Arc::clone(&index));

    println!("People matching {:?}:", query);
    let ids = engine.search(&query, Some("Person"), None)?;
    if ids.is_empty() {
        println!("  (no matches)");
    }
    for id in &ids {
        println!("  Person {}", id);
    }

    println!("\nAll entity types:");
    let hits = engine.search_entities(&query, &[], &[])?;
    if hits.is_empty() {
        println!("  (no matches)");
    }
    for hit in hits {
        println!("  {} {} (score {:.2})", hit.model, hit.foreign_id, hit.score);
    }

    Ok(())
}

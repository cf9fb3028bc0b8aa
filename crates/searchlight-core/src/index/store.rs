//! SQLite-backed record store and ranked search execution.
//!
//! All writes go through the `index_records` table; the FTS5 mirror is
//! maintained by triggers (see [`super::fts`]). Search combines two
//! channels in one query: a relevance channel that scores full-text
//! matches with bm25 and keeps those above a length-derived floor, and
//! a substring channel that admits rows whose raw content contains the
//! query. Hits are grouped per entity with the best score winning.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::config::IndexConfig;
use crate::error::{Result, SearchError};

use super::fts::{FtsConfig, FtsManager, FtsStats};
use super::query::QuerySpec;
use super::record::{IndexRecord, SearchHit};

/// Persistent search index over entity text records.
pub struct SearchIndex {
    db_path: PathBuf,
    conn: Arc<Mutex<Connection>>,
    fts: FtsManager,
}

impl SearchIndex {
    /// Open (or create) an index database at the given path.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(db_path, FtsConfig::default())
    }

    /// Open an index with a custom FTS configuration.
    pub fn open_with_config(db_path: impl AsRef<Path>, fts_config: FtsConfig) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| SearchError::Io {
                    message: "Failed to create index directory".to_string(),
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let conn = Connection::open(&db_path).map_err(|e| SearchError::Database {
            message: format!("Failed to open index database: {}", e),
            source: Some(e),
        })?;

        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        let fts = FtsManager::new(fts_config);
        fts.ensure_setup(&conn)?;

        info!("Opened search index at {:?}", db_path);

        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(conn)),
            fts,
        })
    }

    /// Path of the underlying database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SearchError::Database {
            message: "Index connection mutex poisoned".to_string(),
            source: None,
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout={};
             PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;",
            IndexConfig::BUSY_TIMEOUT_MS
        ))
        .map_err(|e| SearchError::Database {
            message: format!("Failed to configure connection: {}", e),
            source: Some(e),
        })
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS index_records (
                id INTEGER PRIMARY KEY,
                model TEXT NOT NULL,
                field TEXT NOT NULL,
                foreign_id TEXT NOT NULL,
                content TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(model, field, foreign_id)
            );
            CREATE INDEX IF NOT EXISTS idx_records_model
                ON index_records(model);
            CREATE INDEX IF NOT EXISTS idx_records_entity
                ON index_records(model, foreign_id);",
        )
        .map_err(|e| SearchError::Database {
            message: format!("Failed to create index schema: {}", e),
            source: Some(e),
        })
    }

    /// Insert or replace the record for `(model, field, foreign_id)`.
    ///
    /// Writing the same triple twice updates content in place; the
    /// uniqueness constraint guarantees no duplicate rows.
    pub fn upsert(&self, model: &str, field: &str, foreign_id: &str, content: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let updated_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO index_records (model, field, foreign_id, content, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(model, field, foreign_id) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at",
            params![model, field, foreign_id, content, updated_at],
        )
        .map_err(|e| SearchError::Database {
            message: format!("Failed to upsert index record: {}", e),
            source: Some(e),
        })?;

        debug!("Upserted index record {}/{} for {}", model, field, foreign_id);
        Ok(())
    }

    /// Look up the record for `(model, field, foreign_id)`, if any.
    pub fn find_existing(
        &self,
        model: &str,
        field: &str,
        foreign_id: &str,
    ) -> Result<Option<IndexRecord>> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT id, model, field, foreign_id, content, updated_at
             FROM index_records
             WHERE model = ?1 AND field = ?2 AND foreign_id = ?3",
            params![model, field, foreign_id],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| SearchError::Database {
            message: format!("Failed to look up index record: {}", e),
            source: Some(e),
        })
    }

    /// Delete one record. Returns true if a row was removed.
    pub fn remove(&self, model: &str, field: &str, foreign_id: &str) -> Result<bool> {
        let conn = self.lock_conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM index_records
                 WHERE model = ?1 AND field = ?2 AND foreign_id = ?3",
                params![model, field, foreign_id],
            )
            .map_err(|e| SearchError::Database {
                message: format!("Failed to delete index record: {}", e),
                source: Some(e),
            })?;

        if deleted > 0 {
            debug!("Removed index record {}/{} for {}", model, field, foreign_id);
        }
        Ok(deleted > 0)
    }

    /// Delete every record of one entity. Returns the number removed.
    pub fn remove_entity(&self, model: &str, foreign_id: &str) -> Result<usize> {
        let conn = self.lock_conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM index_records WHERE model = ?1 AND foreign_id = ?2",
                params![model, foreign_id],
            )
            .map_err(|e| SearchError::Database {
                message: format!("Failed to delete entity records: {}", e),
                source: Some(e),
            })?;

        debug!("Removed {} index records for {} {}", deleted, model, foreign_id);
        Ok(deleted)
    }

    /// Delete every record of one entity type. Returns the number removed.
    pub fn remove_model(&self, model: &str) -> Result<usize> {
        let conn = self.lock_conn()?;
        let deleted = conn
            .execute("DELETE FROM index_records WHERE model = ?1", params![model])
            .map_err(|e| SearchError::Database {
                message: format!("Failed to delete model records: {}", e),
                source: Some(e),
            })?;

        info!("Removed {} index records for model {}", deleted, model);
        Ok(deleted)
    }

    /// Total number of records in the index.
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.query_row("SELECT COUNT(*) FROM index_records", [], |row| row.get(0))
            .map_err(|e| SearchError::Database {
                message: format!("Failed to count index records: {}", e),
                source: Some(e),
            })
    }

    /// Number of records for one entity type.
    pub fn count_model(&self, model: &str) -> Result<i64> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT COUNT(*) FROM index_records WHERE model = ?1",
            params![model],
            |row| row.get(0),
        )
        .map_err(|e| SearchError::Database {
            message: format!("Failed to count model records: {}", e),
            source: Some(e),
        })
    }

    /// Remove all records from the index.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        let count = conn
            .execute("DELETE FROM index_records", [])
            .map_err(|e| SearchError::Database {
                message: format!("Failed to clear index: {}", e),
                source: Some(e),
            })?;

        info!("Cleared {} records from search index", count);
        Ok(count)
    }

    /// Execute a search and return ranked, grouped hits.
    ///
    /// A row qualifies when its bm25 relevance beats the spec's score
    /// floor or its raw content contains the query as a substring.
    /// Results are grouped by entity (optionally per model), carry the
    /// best score of the group, and are ordered best-first with
    /// `foreign_id` as a stable tiebreak.
    pub fn search(&self, spec: &QuerySpec) -> Result<Vec<SearchHit>> {
        if spec.query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let conn = self.lock_conn()?;
        let fts_table = &self.fts.config().table_name;

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(spec.match_query()),
            Box::new(spec.min_score()),
            Box::new(spec.like_pattern()),
        ];

        let mut sql = format!(
            "SELECT i.foreign_id, i.model, MAX(COALESCE(h.score, 0.0)) AS score
             FROM index_records i
             LEFT JOIN (
                 SELECT rowid AS record_id, -bm25({}) AS score
                 FROM {} WHERE {} MATCH ?
             ) h ON h.record_id = i.id
             WHERE (COALESCE(h.score, 0.0) > ? OR i.content LIKE ? ESCAPE '\\')",
            fts_table, fts_table, fts_table
        );

        if !spec.models.is_empty() {
            let placeholders = vec!["?"; spec.models.len()].join(", ");
            sql.push_str(&format!(" AND i.model IN ({})", placeholders));
            for model in &spec.models {
                params_vec.push(Box::new(model.clone()));
            }
        }

        if !spec.fields.is_empty() {
            let placeholders = vec!["?"; spec.fields.len()].join(", ");
            sql.push_str(&format!(" AND i.field IN ({})", placeholders));
            for field in &spec.fields {
                params_vec.push(Box::new(field.clone()));
            }
        }

        if spec.group_by_model {
            sql.push_str(
                " GROUP BY i.foreign_id, i.model
                  ORDER BY score DESC, i.foreign_id ASC, i.model ASC",
            );
        } else {
            sql.push_str(" GROUP BY i.foreign_id ORDER BY score DESC, i.foreign_id ASC");
        }

        if let Some(limit) = spec.limit {
            sql.push_str(" LIMIT ?");
            params_vec.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql).map_err(|e| SearchError::Database {
            message: format!("Failed to prepare search query: {}", e),
            source: Some(e),
        })?;

        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(SearchHit {
                    foreign_id: row.get(0)?,
                    model: row.get(1)?,
                    score: row.get(2)?,
                })
            })
            .map_err(|e| SearchError::Database {
                message: format!("Failed to execute search query: {}", e),
                source: Some(e),
            })?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row.map_err(|e| SearchError::Database {
                message: format!("Failed to read search result: {}", e),
                source: Some(e),
            })?);
        }

        debug!("Search for {:?} returned {} hits", spec.query, hits.len());
        Ok(hits)
    }

    /// Rebuild the full-text index from the records table.
    pub fn rebuild_fts(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        self.fts.rebuild(&conn)
    }

    /// Merge full-text index segments.
    pub fn optimize_fts(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        self.fts.optimize(&conn)
    }

    /// Statistics about the full-text mirror.
    pub fn fts_stats(&self) -> Result<FtsStats> {
        let conn = self.lock_conn()?;
        self.fts.get_stats(&conn)
    }

    /// Checkpoint the WAL file into the main database.
    pub fn checkpoint_wal(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(|e| SearchError::Database {
                message: format!("Failed to checkpoint WAL: {}", e),
                source: Some(e),
            })?;
        debug!("Checkpointed search index WAL");
        Ok(())
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<IndexRecord> {
        Ok(IndexRecord {
            id: row.get(0)?,
            model: row.get(1)?,
            field: row.get(2)?,
            foreign_id: row.get(3)?,
            content: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

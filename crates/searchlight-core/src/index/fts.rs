//! Full-text search table management.
//!
//! The FTS5 table is an external-content mirror of `index_records`:
//! token data lives in the FTS index while row content stays in the
//! base table. Triggers keep the mirror in sync on every write, so
//! callers never touch it directly.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, SearchError};

/// Configuration for the full-text mirror table.
#[derive(Debug, Clone)]
pub struct FtsConfig {
    /// Name of the FTS5 virtual table.
    pub table_name: String,
    /// FTS5 tokenizer specification.
    pub tokenizer: String,
}

impl Default for FtsConfig {
    fn default() -> Self {
        Self {
            table_name: "record_search".to_string(),
            tokenizer: "unicode61 remove_diacritics 1".to_string(),
        }
    }
}

/// Sets up and maintains the FTS5 mirror of the records table.
pub struct FtsManager {
    config: FtsConfig,
}

impl FtsManager {
    pub fn new(config: FtsConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FtsConfig::default())
    }

    pub fn config(&self) -> &FtsConfig {
        &self.config
    }

    /// Check if the FTS5 table exists.
    pub fn table_exists(&self, conn: &Connection) -> Result<bool> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [&self.config.table_name],
                |row| row.get(0),
            )
            .map_err(|e| SearchError::Database {
                message: format!("Failed to check FTS5 table existence: {}", e),
                source: Some(e),
            })?;
        Ok(count > 0)
    }

    /// Check if the sync triggers exist.
    pub fn triggers_exist(&self, conn: &Connection) -> Result<bool> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='trigger' AND name LIKE ?1",
                [format!("{}_a%", self.config.table_name)],
                |row| row.get(0),
            )
            .map_err(|e| SearchError::Database {
                message: format!("Failed to check FTS5 triggers: {}", e),
                source: Some(e),
            })?;
        Ok(count >= 3)
    }

    /// Ensure the FTS5 table and triggers exist, rebuilding the token
    /// index when rows may have been written while triggers were
    /// missing.
    pub fn ensure_setup(&self, conn: &Connection) -> Result<()> {
        let fresh = !self.table_exists(conn)?;
        if fresh {
            self.create_table(conn)?;
        }
        let synced = self.triggers_exist(conn)?;
        self.create_triggers(conn)?;
        if fresh || !synced {
            self.rebuild(conn)?;
        }
        Ok(())
    }

    /// Create the FTS5 virtual table.
    pub fn create_table(&self, conn: &Connection) -> Result<()> {
        let create_sql = format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING fts5(
                content,
                model UNINDEXED,
                field UNINDEXED,
                foreign_id UNINDEXED,
                content='index_records',
                content_rowid='id',
                tokenize='{}'
            )",
            self.config.table_name, self.config.tokenizer
        );

        conn.execute(&create_sql, []).map_err(|e| SearchError::Database {
            message: format!("Failed to create FTS5 table: {}", e),
            source: Some(e),
        })?;

        info!("Created FTS5 table: {}", self.config.table_name);
        Ok(())
    }

    /// Create triggers that keep the mirror synchronized with
    /// `index_records`. External-content tables require the 'delete'
    /// command form before a row's tokens can be replaced or dropped.
    fn create_triggers(&self, conn: &Connection) -> Result<()> {
        let insert_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {}_ai AFTER INSERT ON index_records BEGIN
                INSERT INTO {}(rowid, content, model, field, foreign_id)
                VALUES (new.id, new.content, new.model, new.field, new.foreign_id);
            END",
            self.config.table_name, self.config.table_name
        );

        let update_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {}_au AFTER UPDATE ON index_records BEGIN
                INSERT INTO {}({}, rowid, content, model, field, foreign_id)
                VALUES ('delete', old.id, old.content, old.model, old.field, old.foreign_id);
                INSERT INTO {}(rowid, content, model, field, foreign_id)
                VALUES (new.id, new.content, new.model, new.field, new.foreign_id);
            END",
            self.config.table_name,
            self.config.table_name,
            self.config.table_name,
            self.config.table_name
        );

        let delete_trigger = format!(
            "CREATE TRIGGER IF NOT EXISTS {}_ad AFTER DELETE ON index_records BEGIN
                INSERT INTO {}({}, rowid, content, model, field, foreign_id)
                VALUES ('delete', old.id, old.content, old.model, old.field, old.foreign_id);
            END",
            self.config.table_name, self.config.table_name, self.config.table_name
        );

        for sql in [&insert_trigger, &update_trigger, &delete_trigger] {
            conn.execute(sql, []).map_err(|e| SearchError::Database {
                message: format!("Failed to create FTS5 trigger: {}", e),
                source: Some(e),
            })?;
        }

        debug!("Created FTS5 sync triggers for {}", self.config.table_name);
        Ok(())
    }

    /// Rebuild the token index from the records table.
    pub fn rebuild(&self, conn: &Connection) -> Result<()> {
        let sql = format!(
            "INSERT INTO {}({}) VALUES('rebuild')",
            self.config.table_name, self.config.table_name
        );
        conn.execute(&sql, []).map_err(|e| SearchError::Database {
            message: format!("Failed to rebuild FTS5 index: {}", e),
            source: Some(e),
        })?;

        info!("Rebuilt FTS5 index: {}", self.config.table_name);
        Ok(())
    }

    /// Merge FTS5 b-tree segments for better query performance.
    pub fn optimize(&self, conn: &Connection) -> Result<()> {
        let sql = format!(
            "INSERT INTO {}({}) VALUES('optimize')",
            self.config.table_name, self.config.table_name
        );
        conn.execute(&sql, []).map_err(|e| SearchError::Database {
            message: format!("Failed to optimize FTS5 index: {}", e),
            source: Some(e),
        })?;

        debug!("Optimized FTS5 index: {}", self.config.table_name);
        Ok(())
    }

    /// Get statistics about the FTS5 table.
    pub fn get_stats(&self, conn: &Connection) -> Result<FtsStats> {
        let row_count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", self.config.table_name),
                [],
                |row| row.get(0),
            )
            .map_err(|e| SearchError::Database {
                message: format!("Failed to get FTS5 stats: {}", e),
                source: Some(e),
            })?;

        Ok(FtsStats {
            table_name: self.config.table_name.clone(),
            row_count,
            tokenizer: self.config.tokenizer.clone(),
        })
    }
}

/// Statistics about the FTS5 mirror.
#[derive(Debug, Clone)]
pub struct FtsStats {
    pub table_name: String,
    pub row_count: i64,
    pub tokenizer: String,
}

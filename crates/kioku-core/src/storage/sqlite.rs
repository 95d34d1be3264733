//! SQLite Storage Implementation
//!
//! Persistent item store. One row per `(knowledge, id)` with JSON-encoded
//! contents and similar ids next to the three score columns.

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::{ItemStore, Result, StorageError};
use crate::memory::{
    DomainStats, ItemContents, KnowledgeType, LearningItem, ScoreRecord, ScoreUpdate,
};

const ITEM_COLUMNS: &str =
    "id, contents, similar_ids, short_score, long_score, last_asked, enabled";

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed item store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, so the store can be shared as `Arc<SqliteStore>`.
pub struct SqliteStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16000;
             PRAGMA temp_store = MEMORY;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Default database location in the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "kioku", "kioku").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        Ok(proj_dirs.data_dir().join("kioku.db"))
    }

    /// Open (or create) a store. `None` uses [`SqliteStore::default_path`].
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Migrations run on the writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!(path = %path.display(), "Created item database");
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    /// Database file location
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader.lock().map_err(|_| StorageError::Lock("Reader"))
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer.lock().map_err(|_| StorageError::Lock("Writer"))
    }

    /// Decode a JSON column, surfacing failures as conversion errors
    fn parse_json<T: serde::de::DeserializeOwned>(
        value: &str,
        column: usize,
    ) -> rusqlite::Result<T> {
        serde_json::from_str(value).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    }

    /// Convert a row selected with `ITEM_COLUMNS` to a LearningItem
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<LearningItem> {
        let contents_json: String = row.get(1)?;
        let similar_json: String = row.get(2)?;
        let contents: ItemContents = Self::parse_json(&contents_json, 1)?;
        let similar_item_ids: Vec<u32> = Self::parse_json(&similar_json, 2)?;

        Ok(LearningItem {
            id: row.get(0)?,
            contents,
            similar_item_ids,
            short_score: row.get(3)?,
            long_score: row.get(4)?,
            last_asked: row.get(5)?,
            enabled: row.get(6)?,
        })
    }

    // ========================================================================
    // CATALOG MANAGEMENT
    // ========================================================================

    /// Insert or refresh items.
    ///
    /// New items are stored as given. For existing items only the contents
    /// and similar ids change; scores and the enabled flag are kept.
    pub fn import_items(&self, items: &[LearningItem]) -> Result<usize> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (knowledge, id, contents, similar_ids,
                                    short_score, long_score, last_asked, enabled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(knowledge, id) DO UPDATE SET
                     contents = excluded.contents,
                     similar_ids = excluded.similar_ids",
            )?;
            for item in items {
                stmt.execute(params![
                    item.knowledge_type().as_str(),
                    item.id,
                    serde_json::to_string(&item.contents)?,
                    serde_json::to_string(&item.similar_item_ids)?,
                    item.short_score,
                    item.long_score,
                    item.last_asked,
                    item.enabled,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(count = items.len(), "Imported items");
        Ok(items.len())
    }

    /// Enable or disable the given ids, returning how many rows changed
    pub fn set_enabled(
        &self,
        knowledge: KnowledgeType,
        ids: &[u32],
        enabled: bool,
    ) -> Result<usize> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        let mut changed = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE items SET enabled = ?1 WHERE knowledge = ?2 AND id = ?3")?;
            for id in ids {
                changed += stmt.execute(params![enabled, knowledge.as_str(), id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Enable or disable a whole domain
    pub fn set_all_enabled(&self, knowledge: KnowledgeType, enabled: bool) -> Result<usize> {
        let writer = self.writer()?;
        let changed = writer.execute(
            "UPDATE items SET enabled = ?1 WHERE knowledge = ?2",
            params![enabled, knowledge.as_str()],
        )?;
        Ok(changed)
    }

    /// Zero every score of a domain and mark all items never asked
    pub fn reset_scores(&self, knowledge: KnowledgeType) -> Result<usize> {
        let writer = self.writer()?;
        let changed = writer.execute(
            "UPDATE items SET short_score = 0.0, long_score = 0.0, last_asked = 0
             WHERE knowledge = ?1",
            params![knowledge.as_str()],
        )?;
        tracing::info!(knowledge = %knowledge, count = changed, "Reset scores");
        Ok(changed)
    }

    /// Every item of a domain, ordered by id
    pub fn get_all_items(&self, knowledge: KnowledgeType) -> Result<Vec<LearningItem>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {} FROM items WHERE knowledge = ?1 ORDER BY id",
            ITEM_COLUMNS
        ))?;
        let items = stmt
            .query_map(params![knowledge.as_str()], Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Progress summary of a domain
    pub fn get_stats(&self, knowledge: KnowledgeType) -> Result<DomainStats> {
        let reader = self.reader()?;
        let stats = reader.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(enabled), 0),
                    COALESCE(SUM(CASE WHEN enabled = 1 AND short_score >= 1.0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN enabled = 1 AND long_score > 0.0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN enabled = 1 AND last_asked = 0 THEN 1 ELSE 0 END), 0)
             FROM items WHERE knowledge = ?1",
            params![knowledge.as_str()],
            |row| {
                Ok(DomainStats {
                    knowledge_type: knowledge,
                    total_items: row.get(0)?,
                    enabled_items: row.get(1)?,
                    short_term_known: row.get(2)?,
                    long_term_started: row.get(3)?,
                    never_asked: row.get(4)?,
                })
            },
        )?;
        Ok(stats)
    }
}

impl ItemStore for SqliteStore {
    fn enabled_scores(&self, knowledge: KnowledgeType) -> Result<Vec<ScoreRecord>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, short_score, long_score, last_asked FROM items
             WHERE knowledge = ?1 AND enabled = 1 ORDER BY id",
        )?;
        let records = stmt
            .query_map(params![knowledge.as_str()], |row| {
                Ok(ScoreRecord::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn get_item(&self, knowledge: KnowledgeType, id: u32) -> Result<Option<LearningItem>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!(
            "SELECT {} FROM items WHERE knowledge = ?1 AND id = ?2",
            ITEM_COLUMNS
        ))?;
        let item = stmt
            .query_row(params![knowledge.as_str(), id], Self::row_to_item)
            .optional()?;
        Ok(item)
    }

    fn is_item_enabled(&self, knowledge: KnowledgeType, id: u32) -> Result<bool> {
        let reader = self.reader()?;
        let enabled: Option<bool> = reader
            .query_row(
                "SELECT enabled FROM items WHERE knowledge = ?1 AND id = ?2",
                params![knowledge.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(enabled.unwrap_or(false))
    }

    fn apply_score_updates(&self, knowledge: KnowledgeType, updates: &[ScoreUpdate]) -> Result<()> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE items SET short_score = ?1, long_score = ?2, last_asked = ?3
                 WHERE knowledge = ?4 AND id = ?5",
            )?;
            for update in updates {
                let changed = stmt.execute(params![
                    update.short_score,
                    update.long_score,
                    update.last_asked,
                    knowledge.as_str(),
                    update.item_id,
                ])?;
                // Dropping the transaction rolls back earlier rows
                if changed == 0 {
                    return Err(StorageError::NotFound(format!(
                        "{} #{}",
                        knowledge, update.item_id
                    )));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn min_last_asked(&self, knowledge: KnowledgeType) -> Result<Option<i64>> {
        let reader = self.reader()?;
        let min: Option<i64> = reader.query_row(
            "SELECT MIN(last_asked) FROM items
             WHERE knowledge = ?1 AND enabled = 1 AND last_asked != 0",
            params![knowledge.as_str()],
            |row| row.get(0),
        )?;
        Ok(min)
    }
}

// ============================================================================
// TESTS
// ============================================================================

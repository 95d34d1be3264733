//! Storage Module
//!
//! Item and score persistence behind the [`ItemStore`] trait:
//! - [`MemoryStore`] for tests, benches and throwaway sessions
//! - [`SqliteStore`] for the CLI, with WAL and a versioned schema

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use migrations::{apply_migrations, get_current_version, Migration, MIGRATIONS};
pub use sqlite::SqliteStore;

use std::sync::Arc;

use crate::memory::{KnowledgeType, LearningItem, ScoreRecord, ScoreUpdate};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Item contents could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A connection or map lock was poisoned
    #[error("{0} lock poisoned")]
    Lock(&'static str),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// ITEM STORE
// ============================================================================

/// Read and update access to learning items, scoped by knowledge domain.
///
/// All methods take `&self`; implementations lock internally so one store
/// can be shared by several sessions.
pub trait ItemStore {
    /// Score records of every enabled item in the domain, ordered by id
    fn enabled_scores(&self, knowledge: KnowledgeType) -> Result<Vec<ScoreRecord>>;

    /// Full item, or `None` if the id is unknown
    fn get_item(&self, knowledge: KnowledgeType, id: u32) -> Result<Option<LearningItem>>;

    /// Whether the item exists and is enabled
    fn is_item_enabled(&self, knowledge: KnowledgeType, id: u32) -> Result<bool>;

    /// Write short score, long score and last asked time of several items.
    ///
    /// Either every update is stored or none is.
    fn apply_score_updates(&self, knowledge: KnowledgeType, updates: &[ScoreUpdate]) -> Result<()>;

    /// Write short score, long score and last asked time in one step
    fn apply_score_update(&self, knowledge: KnowledgeType, update: &ScoreUpdate) -> Result<()> {
        self.apply_score_updates(knowledge, std::slice::from_ref(update))
    }

    /// Smallest non-zero `last_asked` among enabled items
    fn min_last_asked(&self, knowledge: KnowledgeType) -> Result<Option<i64>>;
}

impl<T: ItemStore + ?Sized> ItemStore for &T {
    fn enabled_scores(&self, knowledge: KnowledgeType) -> Result<Vec<ScoreRecord>> {
        (**self).enabled_scores(knowledge)
    }

    fn get_item(&self, knowledge: KnowledgeType, id: u32) -> Result<Option<LearningItem>> {
        (**self).get_item(knowledge, id)
    }

    fn is_item_enabled(&self, knowledge: KnowledgeType, id: u32) -> Result<bool> {
        (**self).is_item_enabled(knowledge, id)
    }

    fn apply_score_updates(&self, knowledge: KnowledgeType, updates: &[ScoreUpdate]) -> Result<()> {
        (**self).apply_score_updates(knowledge, updates)
    }

    fn min_last_asked(&self, knowledge: KnowledgeType) -> Result<Option<i64>> {
        (**self).min_last_asked(knowledge)
    }
}

impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    fn enabled_scores(&self, knowledge: KnowledgeType) -> Result<Vec<ScoreRecord>> {
        (**self).enabled_scores(knowledge)
    }

    fn get_item(&self, knowledge: KnowledgeType, id: u32) -> Result<Option<LearningItem>> {
        (**self).get_item(knowledge, id)
    }

    fn is_item_enabled(&self, knowledge: KnowledgeType, id: u32) -> Result<bool> {
        (**self).is_item_enabled(knowledge, id)
    }

    fn apply_score_updates(&self, knowledge: KnowledgeType, updates: &[ScoreUpdate]) -> Result<()> {
        (**self).apply_score_updates(knowledge, updates)
    }

    fn min_last_asked(&self, knowledge: KnowledgeType) -> Result<Option<i64>> {
        (**self).min_last_asked(knowledge)
    }
}

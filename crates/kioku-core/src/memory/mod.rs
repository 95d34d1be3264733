//! Memory module - Core types and data structures
//!
//! Implements the flashcard data model with:
//! - Learning items grouped by knowledge domain
//! - Tagged item contents (kana, kanji, word)
//! - Short-term / long-term score records and updates

mod item;
mod score;

pub use item::{ItemContents, KnowledgeType, LearningItem};
pub use score::{Certainty, ScoreRecord, ScoreUpdate};

use serde::{Deserialize, Serialize};

// ============================================================================
// DOMAIN STATISTICS
// ============================================================================

/// Progress summary of one knowledge domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub knowledge_type: KnowledgeType,
    /// All items in the domain
    pub total_items: i64,
    /// Items taking part in quizzes
    pub enabled_items: i64,
    /// Enabled items with a full short-term score
    pub short_term_known: i64,
    /// Enabled items with a non-zero long-term score
    pub long_term_started: i64,
    /// Enabled items never asked
    pub never_asked: i64,
}

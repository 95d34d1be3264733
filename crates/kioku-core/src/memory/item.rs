//! Learning Item - The fundamental unit of study
//!
//! Each item represents one flashcard subject with:
//! - Domain-specific contents (kana, kanji, word)
//! - A "similar items" relation used to pick distractors
//! - Short-term / long-term memory strength
//! - Last time it was asked

use serde::{Deserialize, Serialize};

// ============================================================================
// KNOWLEDGE TYPES
// ============================================================================

/// Knowledge domain an item belongs to. Item ids are unique per domain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeType {
    /// Hiragana and katakana
    #[default]
    Kana,
    /// Single kanji characters
    Kanji,
    /// Vocabulary words
    Word,
}

impl KnowledgeType {
    /// All domains, in display order
    pub const ALL: [KnowledgeType; 3] =
        [KnowledgeType::Kana, KnowledgeType::Kanji, KnowledgeType::Word];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeType::Kana => "kana",
            KnowledgeType::Kanji => "kanji",
            KnowledgeType::Word => "word",
        }
    }
}

impl std::fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for KnowledgeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kana" => Ok(KnowledgeType::Kana),
            "kanji" => Ok(KnowledgeType::Kanji),
            "word" | "words" => Ok(KnowledgeType::Word),
            _ => Err(format!("Unknown knowledge type: {}", s)),
        }
    }
}

// ============================================================================
// ITEM CONTENTS
// ============================================================================

/// Domain payload of an item.
///
/// Opaque to the scheduler except for [`ItemContents::key_text`] (answer
/// identity fallback) and [`ItemContents::parts`] (composition quizzes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemContents {
    Kana {
        kana: String,
        romaji: String,
    },
    Kanji {
        kanji: String,
        #[serde(default)]
        on_readings: Vec<String>,
        #[serde(default)]
        kun_readings: Vec<String>,
        #[serde(default)]
        meanings: Vec<String>,
        /// Ids of the kanji items this character is built from
        #[serde(default)]
        parts: Vec<u32>,
    },
    Word {
        kanji: String,
        kana: String,
        meaning: String,
    },
}

impl ItemContents {
    /// The written form shown as the question (kana, kanji or word spelling)
    pub fn key_text(&self) -> &str {
        match self {
            ItemContents::Kana { kana, .. } => kana,
            ItemContents::Kanji { kanji, .. } => kanji,
            ItemContents::Word { kanji, .. } => kanji,
        }
    }

    /// Component ids for kanji; empty for other domains
    pub fn parts(&self) -> &[u32] {
        match self {
            ItemContents::Kanji { parts, .. } => parts,
            ItemContents::Kana { .. } | ItemContents::Word { .. } => &[],
        }
    }

    /// Domain this payload belongs to
    pub fn knowledge_type(&self) -> KnowledgeType {
        match self {
            ItemContents::Kana { .. } => KnowledgeType::Kana,
            ItemContents::Kanji { .. } => KnowledgeType::Kanji,
            ItemContents::Word { .. } => KnowledgeType::Word,
        }
    }
}

// ============================================================================
// LEARNING ITEM
// ============================================================================

/// A flashcard subject plus its persisted memory-strength state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    /// Identifier, unique within the knowledge domain
    pub id: u32,
    /// Domain payload
    pub contents: ItemContents,
    /// Items that look or read alike, preferred as distractors
    #[serde(default)]
    pub similar_item_ids: Vec<u32>,

    // ========== Memory strength ==========
    /// Short-term mastery in [0, 1]; 1 means known this cycle
    #[serde(default)]
    pub short_score: f64,
    /// Long-term retention in [0, 1]
    #[serde(default)]
    pub long_score: f64,
    /// Epoch seconds of the last answer, 0 if never asked
    #[serde(default)]
    pub last_asked: i64,

    /// Whether the item takes part in quizzes
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl LearningItem {
    /// Create a fresh, enabled, never-asked item
    pub fn new(id: u32, contents: ItemContents) -> Self {
        Self {
            id,
            contents,
            similar_item_ids: Vec::new(),
            short_score: 0.0,
            long_score: 0.0,
            last_asked: 0,
            enabled: true,
        }
    }

    /// Builder-style setter for the similar items relation
    pub fn with_similar(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.similar_item_ids = ids.into_iter().collect();
        self
    }

    pub fn knowledge_type(&self) -> KnowledgeType {
        self.contents.knowledge_type()
    }

    /// Scheduler view of this item
    pub fn score_record(&self) -> super::ScoreRecord {
        super::ScoreRecord {
            item_id: self.id,
            short_score: self.short_score,
            long_score: self.long_score,
            last_asked: self.last_asked,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

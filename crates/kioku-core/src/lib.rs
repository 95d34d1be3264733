//! # Kioku Core
//!
//! Spaced-repetition scheduling for Japanese kana, kanji and vocabulary
//! flashcards.
//!
//! - **Dual scores**: every item carries a short-term score (mastery in the
//!   current learning cycle) and a long-term score (retention over days)
//! - **Forgetting probabilities**: a two-stage estimator turns the scores of
//!   all enabled items into sampling weights, balancing fresh items against
//!   long-known ones that are coming due
//! - **Quiz sessions**: weighted question picks with an anti-repetition
//!   window, answer sets drawn from similar items, grading that writes score
//!   updates back to storage, and a suspend/resume state blob
//! - **Storage**: an in-memory store for tests and a SQLite store for real use
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kioku_core::prelude::*;
//!
//! let store = SqliteStore::new(None)?;
//! let mut quiz = QuizEngine::new(&store, KnowledgeType::Kana, Config::default());
//!
//! quiz.prepare_new_question()?;
//! let question = quiz.current_question().unwrap();
//! let position = quiz
//!     .current_answers()
//!     .iter()
//!     .position(|answer| answer.id == question.id);
//! quiz.select_answer(Certainty::Sure, position, &mut ())?;
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): build SQLite from source via rusqlite

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod memory;
pub mod storage;

/// Quiz sessions: question selection, answer sets, grading, suspend/resume
pub mod quiz;

/// Score math: forgetting probabilities and the score update law
pub mod srs;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Configuration
pub use config::{Config, ConfigError, DistractorPolicy, QuizConfig, SrsParameters};

// Memory types
pub use memory::{
    Certainty, DomainStats, ItemContents, KnowledgeType, LearningItem, ScoreRecord, ScoreUpdate,
};

// Scheduling math
pub use srs::{estimate, update_score, Coefficients, ProbabilityData, ProbabilityRecord};

// Quiz sessions
pub use quiz::{
    AnswerListener, AnswerRenderer, Callbacks, Clock, History, HistoryEntry, ManualClock, Phase,
    QuizEngine, QuizError, RecentQuestions, SessionState, StateError, SystemClock,
};

// Storage layer
pub use storage::{ItemStore, MemoryStore, Result, SqliteStore, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Certainty, Config, HistoryEntry, ItemContents, ItemStore, KnowledgeType, LearningItem,
        MemoryStore, QuizConfig, QuizEngine, QuizError, SqliteStore, StorageError,
    };
}

//! Quiz Module
//!
//! Session-level orchestration on top of the SRS math:
//! - Question selection by weighted sampling, avoiding recent questions
//! - Answer sets built from similar items plus random fill
//! - Grading that feeds score updates back to the store
//! - Bounded answer history and a suspend/resume state blob

mod engine;
mod history;
mod sampling;
mod state;

pub use engine::{AnswerRenderer, QuizEngine};
pub use history::{History, HistoryEntry, DEFAULT_HISTORY_CAPACITY};
pub use sampling::{sample_distinct, weighted_pick};
pub use state::SessionState;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::config::ConfigError;
use crate::memory::LearningItem;
use crate::storage::StorageError;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Session state decoding error
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Blob ended in the middle of a field
    #[error("State blob is truncated")]
    Truncated,
    /// Unknown record tag or flag byte
    #[error("Unknown tag byte: {0}")]
    UnknownTag(u8),
    /// Bytes left after the last field
    #[error("{0} trailing bytes after session state")]
    TrailingBytes(usize),
}

/// Quiz engine error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Not enough enabled items to build an answer set
    #[error("Not enough enabled items: {enabled} available, {required} required")]
    InsufficientItems { enabled: usize, required: usize },
    /// Item referenced by the session is missing from the store
    #[error("Unknown item: {0}")]
    UnknownItem(u32),
    /// Grading was requested with no question on screen
    #[error("No question is waiting for an answer")]
    NoQuestion,
    /// Selected answer position is out of range
    #[error("Answer position {position} out of range (0..{len})")]
    InvalidPosition { position: usize, len: usize },
    /// Corrupt session state blob
    #[error("Invalid session state: {0}")]
    State(#[from] StateError),
    /// Session settings cannot produce a quiz
    #[error("Invalid quiz config: {0}")]
    Config(#[from] ConfigError),
}

/// Quiz result type
pub type Result<T> = std::result::Result<T, QuizError>;

// ============================================================================
// SESSION PHASE
// ============================================================================

/// Where a session stands in its prepare / show / grade cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Waiting for `prepare_new_question`
    #[default]
    AwaitingQuestion,
    /// A question and its answers are on screen
    QuestionShown,
    /// The current question was graded
    Graded,
}

// ============================================================================
// CLOCK
// ============================================================================

/// Source of "now" in epoch seconds
pub trait Clock: Send {
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// ANSWER LISTENER
// ============================================================================

/// Callbacks fired synchronously while an answer is graded
pub trait AnswerListener {
    fn on_good(&mut self, _question: &LearningItem) {}
    fn on_wrong(&mut self, _question: &LearningItem, _selected: &LearningItem) {}
    fn on_unknown(&mut self, _question: &LearningItem) {}
}

impl AnswerListener for () {}

/// [`AnswerListener`] built from three closures
pub struct Callbacks<G, W, U> {
    pub good: G,
    pub wrong: W,
    pub unknown: U,
}

impl<G, W, U> AnswerListener for Callbacks<G, W, U>
where
    G: FnMut(&LearningItem),
    W: FnMut(&LearningItem, &LearningItem),
    U: FnMut(&LearningItem),
{
    fn on_good(&mut self, question: &LearningItem) {
        (self.good)(question)
    }

    fn on_wrong(&mut self, question: &LearningItem, selected: &LearningItem) {
        (self.wrong)(question, selected)
    }

    fn on_unknown(&mut self, question: &LearningItem) {
        (self.unknown)(question)
    }
}

// ============================================================================
// RECENT QUESTIONS
// ============================================================================

/// FIFO of the last asked item ids, used to avoid immediate repeats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentQuestions {
    ids: VecDeque<u32>,
    capacity: usize,
}

impl RecentQuestions {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Remember an id, forgetting the oldest past capacity
    pub fn push(&mut self, id: u32) {
        if self.capacity == 0 {
            return;
        }
        while self.ids.len() >= self.capacity {
            self.ids.pop_front();
        }
        self.ids.push_back(id);
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }
}

// ============================================================================
// TESTS
// ============================================================================

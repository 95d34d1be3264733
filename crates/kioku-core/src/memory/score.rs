//! Score state exchanged between the store and the scheduler

use serde::{Deserialize, Serialize};

/// How sure the learner was about an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    /// Answered without hesitation
    Sure,
    /// Answered, but hesitated
    Maybe,
    /// Gave up, or the answer was wrong
    DontKnow,
}

impl Certainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Certainty::Sure => "sure",
            Certainty::Maybe => "maybe",
            Certainty::DontKnow => "dontknow",
        }
    }
}

impl std::fmt::Display for Certainty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One enabled item as seen by the probability estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub item_id: u32,
    pub short_score: f64,
    pub long_score: f64,
    /// Epoch seconds, 0 if never asked
    pub last_asked: i64,
}

impl ScoreRecord {
    pub fn new(item_id: u32, short_score: f64, long_score: f64, last_asked: i64) -> Self {
        Self {
            item_id,
            short_score,
            long_score,
            last_asked,
        }
    }
}

/// New memory-strength state for one item, applied atomically by the store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub item_id: u32,
    pub short_score: f64,
    pub long_score: f64,
    pub last_asked: i64,
    /// Baseline used for the day computations (diagnostics only)
    pub min_last_asked: Option<i64>,
}

//! Scheduler and quiz configuration
//!
//! All knobs of the probability estimator, the score updater and the quiz
//! engine live here. Every struct has a `Default` matching the tuned
//! values and deserializes with missing fields falling back to it, so a
//! config file only needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Configuration error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its allowed range
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ============================================================================
// SRS PARAMETERS
// ============================================================================

/// Constants of the probability estimator and the score updater
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SrsParameters {
    /// Short score gained on a sure answer
    pub step: f64,
    /// Highest short score a hesitant answer can reach
    pub maybe_cap: f64,
    /// Largest long score increase from a single answer
    pub max_long_increment: f64,
    /// Floor weight of a long-term-due item with a perfect long score
    pub min_long_weight: f64,
    /// Unknown ratio at which the short share starts rising
    pub min_ratio: f64,
    /// Unknown ratio at which the short share reaches its ceiling
    pub max_ratio: f64,
    /// Lower bound of the short-term share of the sampling weight
    pub min_proba_short_unknown: f64,
    /// Upper bound of the short-term share of the sampling weight
    pub max_proba_short_unknown: f64,
    /// Number of unknown items that saturates the short-term share
    pub max_count_short_unknown: f64,
}

impl Default for SrsParameters {
    fn default() -> Self {
        Self {
            step: 0.34,
            maybe_cap: 0.7,
            max_long_increment: 0.125,
            min_long_weight: 0.1,
            min_ratio: 0.1,
            max_ratio: 0.5,
            min_proba_short_unknown: 0.2,
            max_proba_short_unknown: 0.5,
            max_count_short_unknown: 30.0,
        }
    }
}

// ============================================================================
// QUIZ CONFIG
// ============================================================================

/// How distractors are filtered before sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DistractorPolicy {
    /// Every enabled item may be a distractor
    #[default]
    Standard,
    /// One part of the question kanji is removed from every pool, so the
    /// learner must pick the whole character rather than a component
    ExcludeOnePart,
}

/// Session-level settings of a quiz engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizConfig {
    /// Number of answers shown, question included
    pub answer_count: usize,
    /// Number of recent questions that are not asked again
    pub recent_window: usize,
    /// Number of graded answers kept in the history
    pub history_capacity: usize,
    pub distractor_policy: DistractorPolicy,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            answer_count: 6,
            recent_window: 6,
            history_capacity: 40,
            distractor_policy: DistractorPolicy::Standard,
        }
    }
}

impl QuizConfig {
    /// Settings of the composition quiz (nine answers, one part excluded)
    pub fn composition() -> Self {
        Self {
            answer_count: 9,
            distractor_policy: DistractorPolicy::ExcludeOnePart,
            ..Self::default()
        }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Top-level configuration file
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub srs: SrsParameters,
    pub quiz: QuizConfig,
}

impl Config {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Check ranges the scheduler relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let srs = &self.srs;
        let unit_fields = [
            ("step", srs.step),
            ("maybeCap", srs.maybe_cap),
            ("maxLongIncrement", srs.max_long_increment),
            ("minLongWeight", srs.min_long_weight),
            ("minRatio", srs.min_ratio),
            ("maxRatio", srs.max_ratio),
            ("minProbaShortUnknown", srs.min_proba_short_unknown),
            ("maxProbaShortUnknown", srs.max_proba_short_unknown),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} is outside [0, 1]", value),
                });
            }
        }
        if srs.min_ratio >= srs.max_ratio {
            return Err(ConfigError::Invalid {
                field: "minRatio",
                reason: "must be lower than maxRatio".to_string(),
            });
        }
        if srs.max_count_short_unknown <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "maxCountShortUnknown",
                reason: "must be positive".to_string(),
            });
        }
        if self.quiz.answer_count < 2 {
            return Err(ConfigError::Invalid {
                field: "answerCount",
                reason: "a quiz needs at least two answers".to_string(),
            });
        }
        if self.quiz.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "historyCapacity",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

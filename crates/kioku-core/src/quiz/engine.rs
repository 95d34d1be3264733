//! Quiz engine
//!
//! One engine drives one session: it picks the next question from the
//! forgetting probabilities, assembles the answer set, grades the answer
//! and writes the resulting score updates back to the store.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{
    sample_distinct, weighted_pick, AnswerListener, Clock, History, HistoryEntry, Phase,
    QuizError, RecentQuestions, Result, SessionState, SystemClock,
};
use crate::config::{Config, ConfigError, DistractorPolicy, QuizConfig, SrsParameters};
use crate::memory::{Certainty, KnowledgeType, LearningItem, ScoreUpdate};
use crate::srs::{estimate, update_score, ProbabilityData, ProbabilityRecord};
use crate::storage::ItemStore;

/// Text an item is displayed as; two answers rendering the same text are
/// graded as the same answer
pub type AnswerRenderer = Box<dyn Fn(&LearningItem) -> String + Send>;

/// How the selected answer relates to the question
enum Verdict {
    Unknown,
    Correct,
    Wrong(LearningItem),
}

/// Spaced-repetition quiz session over one knowledge domain
pub struct QuizEngine<S: ItemStore, R: Rng = ChaCha8Rng> {
    store: S,
    knowledge: KnowledgeType,
    config: QuizConfig,
    params: SrsParameters,
    clock: Box<dyn Clock>,
    rng: R,
    renderer: AnswerRenderer,

    phase: Phase,
    current_question: Option<LearningItem>,
    current_answers: Vec<LearningItem>,
    current_debug_data: Option<ProbabilityData>,
    correct_count: u32,
    question_count: u32,
    history: History,
    recent: RecentQuestions,
}

impl<S: ItemStore> QuizEngine<S> {
    /// Create a session with an entropy-seeded generator and the wall clock
    pub fn new(store: S, knowledge: KnowledgeType, config: Config) -> Self {
        Self::with_rng(store, knowledge, config, ChaCha8Rng::from_entropy())
    }
}

impl<S: ItemStore, R: Rng> QuizEngine<S, R> {
    /// Create a session drawing from `rng`.
    ///
    /// An invalid `config` is logged here; `prepare_new_question` refuses
    /// to run with fewer than two answers.
    pub fn with_rng(store: S, knowledge: KnowledgeType, config: Config, rng: R) -> Self {
        if let Err(e) = config.validate() {
            tracing::error!(%knowledge, "Quiz started with an invalid config: {}", e);
        }
        Self {
            store,
            knowledge,
            config: config.quiz,
            params: config.srs,
            clock: Box::new(SystemClock),
            rng,
            renderer: Box::new(|item: &LearningItem| item.contents.key_text().to_string()),
            phase: Phase::AwaitingQuestion,
            current_question: None,
            current_answers: Vec::new(),
            current_debug_data: None,
            correct_count: 0,
            question_count: 0,
            history: History::new(config.quiz.history_capacity),
            recent: RecentQuestions::new(config.quiz.recent_window),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the text used for answer identity
    pub fn with_renderer(
        mut self,
        renderer: impl Fn(&LearningItem) -> String + Send + 'static,
    ) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn knowledge(&self) -> KnowledgeType {
        self.knowledge
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_question(&self) -> Option<&LearningItem> {
        self.current_question.as_ref()
    }

    /// Answers in display order
    pub fn current_answers(&self) -> &[LearningItem] {
        &self.current_answers
    }

    /// Estimator output of the round that produced the current question
    pub fn current_debug_data(&self) -> Option<&ProbabilityData> {
        self.current_debug_data.as_ref()
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn recent_questions(&self) -> &RecentQuestions {
        &self.recent
    }

    /// Display text of an item
    pub fn render(&self, item: &LearningItem) -> String {
        (self.renderer)(item)
    }

    // ========================================================================
    // QUESTION SELECTION
    // ========================================================================

    /// Pick the next question and build its answer set.
    ///
    /// On error the previous question, if any, is left untouched.
    pub fn prepare_new_question(&mut self) -> Result<()> {
        let required = self.config.answer_count;
        if required < 2 {
            return Err(QuizError::Config(ConfigError::Invalid {
                field: "answerCount",
                reason: format!("{} answers cannot hold a question and a distractor", required),
            }));
        }
        let scores = self.store.enabled_scores(self.knowledge)?;
        if scores.len() < required {
            tracing::error!(
                knowledge = %self.knowledge,
                enabled = scores.len(),
                required,
                "Not enough enabled items for a quiz"
            );
            return Err(QuizError::InsufficientItems {
                enabled: scores.len(),
                required,
            });
        }

        let now = self.clock.now();
        let min_last_asked = self.store.min_last_asked(self.knowledge)?;
        let data = estimate(&scores, min_last_asked, now, &self.params);

        let question_id = self.pick_question(&data)?;
        let question = self.load_item(question_id)?;
        let excluded = self.excluded_part(&question)?;
        let answer_ids = self.build_answer_ids(&question, excluded, &data)?;
        let answers = answer_ids
            .iter()
            .map(|id| self.load_item(*id))
            .collect::<Result<Vec<_>>>()?;
        self.recent.push(question_id);

        tracing::debug!(
            knowledge = %self.knowledge,
            question = question_id,
            weight = data.get(question_id).map_or(0.0, |r| r.final_probability),
            total_weight = data.total_weight(),
            short_coefficient = data.coefficients.short_coefficient,
            long_coefficient = data.coefficients.long_coefficient,
            excluded = ?excluded,
            "Prepared question"
        );

        self.current_question = Some(question);
        self.current_answers = answers;
        self.current_debug_data = Some(data);
        self.phase = Phase::QuestionShown;
        Ok(())
    }

    fn pick_question(&mut self, data: &ProbabilityData) -> Result<u32> {
        let mut pool: Vec<&ProbabilityRecord> = data
            .records
            .iter()
            .filter(|r| !self.recent.contains(r.item_id))
            .collect();
        if pool.is_empty() {
            tracing::warn!(
                knowledge = %self.knowledge,
                window = self.recent.len(),
                "Every candidate was asked recently, ignoring the recent window"
            );
            pool = data.records.iter().collect();
        }

        let weights: Vec<f64> = pool.iter().map(|r| r.final_probability).collect();
        let index = weighted_pick(&mut self.rng, &weights).ok_or(QuizError::InsufficientItems {
            enabled: 0,
            required: self.config.answer_count,
        })?;
        Ok(pool[index].item_id)
    }

    /// Enabled part of the question kanji removed from this round's distractors
    fn excluded_part(&mut self, question: &LearningItem) -> Result<Option<u32>> {
        match self.config.distractor_policy {
            DistractorPolicy::Standard => Ok(None),
            DistractorPolicy::ExcludeOnePart => {
                let mut offerable: Vec<u32> = Vec::new();
                for &id in question.contents.parts() {
                    if id != question.id
                        && !offerable.contains(&id)
                        && self.store.is_item_enabled(self.knowledge, id)?
                    {
                        offerable.push(id);
                    }
                }
                Ok(offerable.choose(&mut self.rng).copied())
            }
        }
    }

    fn build_answer_ids(
        &mut self,
        question: &LearningItem,
        excluded: Option<u32>,
        data: &ProbabilityData,
    ) -> Result<Vec<u32>> {
        let required = self.config.answer_count;
        let distractor_count = required - 1;
        let allowed = |id: u32| id != question.id && Some(id) != excluded;

        let mut similar: Vec<u32> = Vec::new();
        for &id in &question.similar_item_ids {
            if allowed(id)
                && !similar.contains(&id)
                && self.store.is_item_enabled(self.knowledge, id)?
            {
                similar.push(id);
            }
        }

        let mut chosen = if similar.len() >= distractor_count {
            sample_distinct(&mut self.rng, &similar, distractor_count)
        } else {
            similar
        };

        let missing = distractor_count - chosen.len();
        if missing > 0 {
            let fill: Vec<u32> = data
                .item_ids()
                .filter(|id| allowed(*id) && !chosen.contains(id))
                .collect();
            if fill.len() < missing {
                tracing::error!(
                    knowledge = %self.knowledge,
                    question = question.id,
                    available = fill.len() + chosen.len(),
                    needed = distractor_count,
                    "Distractor pool exhausted"
                );
                return Err(QuizError::InsufficientItems {
                    enabled: data.len(),
                    required: required + usize::from(excluded.is_some()),
                });
            }
            chosen.extend(sample_distinct(&mut self.rng, &fill, missing));
        }

        chosen.push(question.id);
        assert_eq!(chosen.len(), required, "answer set size mismatch");
        let unique: HashSet<u32> = chosen.iter().copied().collect();
        assert_eq!(unique.len(), chosen.len(), "duplicate ids in answer set");

        chosen.shuffle(&mut self.rng);
        Ok(chosen)
    }

    fn load_item(&self, id: u32) -> Result<LearningItem> {
        self.store
            .get_item(self.knowledge, id)?
            .ok_or(QuizError::UnknownItem(id))
    }

    // ========================================================================
    // GRADING
    // ========================================================================

    /// Grade the answer shown at `position`, or "don't know" when
    /// `position` is `None` or the certainty is [`Certainty::DontKnow`]
    pub fn select_answer(
        &mut self,
        certainty: Certainty,
        position: Option<usize>,
        listener: &mut dyn AnswerListener,
    ) -> Result<HistoryEntry> {
        let question = self.shown_question()?;

        let verdict = match (certainty, position) {
            (Certainty::DontKnow, _) | (_, None) => Verdict::Unknown,
            (_, Some(position)) => {
                let selected = self.current_answers.get(position).ok_or(QuizError::InvalidPosition {
                    position,
                    len: self.current_answers.len(),
                })?;
                if self.same_answer(&question, selected) {
                    Verdict::Correct
                } else {
                    Verdict::Wrong(selected.clone())
                }
            }
        };

        self.grade(question, certainty, verdict, listener)
    }

    /// Grade without a position: correct unless `wrong_item` names the
    /// item the learner confused the question with
    pub fn mark_answer(
        &mut self,
        certainty: Certainty,
        wrong_item: Option<u32>,
        listener: &mut dyn AnswerListener,
    ) -> Result<HistoryEntry> {
        let question = self.shown_question()?;

        let verdict = match (certainty, wrong_item) {
            (Certainty::DontKnow, _) => Verdict::Unknown,
            (_, None) => Verdict::Correct,
            (_, Some(id)) => {
                let selected = self.load_item(id)?;
                if self.same_answer(&question, &selected) {
                    Verdict::Correct
                } else {
                    Verdict::Wrong(selected)
                }
            }
        };

        self.grade(question, certainty, verdict, listener)
    }

    fn shown_question(&self) -> Result<LearningItem> {
        if self.phase != Phase::QuestionShown {
            return Err(QuizError::NoQuestion);
        }
        self.current_question.clone().ok_or(QuizError::NoQuestion)
    }

    fn same_answer(&self, question: &LearningItem, selected: &LearningItem) -> bool {
        selected.id == question.id || self.render(selected) == self.render(question)
    }

    fn grade(
        &mut self,
        question: LearningItem,
        certainty: Certainty,
        verdict: Verdict,
        listener: &mut dyn AnswerListener,
    ) -> Result<HistoryEntry> {
        let now = self.clock.now();
        let min_last_asked = self.store.min_last_asked(self.knowledge)?;

        // Every update of the round is computed first and written in one step
        let (updates, entry) = match &verdict {
            Verdict::Unknown => (
                vec![self.score_update(question.id, Certainty::DontKnow, min_last_asked, now)?],
                HistoryEntry::Unknown {
                    item_id: question.id,
                },
            ),
            Verdict::Correct => (
                vec![self.score_update(question.id, certainty, min_last_asked, now)?],
                HistoryEntry::Correct {
                    item_id: question.id,
                },
            ),
            Verdict::Wrong(selected) => (
                vec![
                    self.score_update(question.id, Certainty::DontKnow, min_last_asked, now)?,
                    self.score_update(selected.id, Certainty::DontKnow, min_last_asked, now)?,
                ],
                HistoryEntry::Incorrect {
                    correct_id: question.id,
                    wrong_id: selected.id,
                },
            ),
        };
        self.store.apply_score_updates(self.knowledge, &updates)?;

        match &verdict {
            Verdict::Unknown => listener.on_unknown(&question),
            Verdict::Correct => {
                self.correct_count += 1;
                listener.on_good(&question);
            }
            Verdict::Wrong(selected) => listener.on_wrong(&question, selected),
        }

        self.history.push(entry);
        self.question_count += 1;
        self.phase = Phase::Graded;
        Ok(entry)
    }

    /// New scores of `item_id` from its stored ones
    fn score_update(
        &self,
        item_id: u32,
        certainty: Certainty,
        min_last_asked: Option<i64>,
        now: i64,
    ) -> Result<ScoreUpdate> {
        let item = self.load_item(item_id)?;
        let record = item.score_record();
        Ok(update_score(&record, min_last_asked, certainty, now, &self.params))
    }

    // ========================================================================
    // SUSPEND / RESUME
    // ========================================================================

    /// Snapshot of the session as an opaque blob
    pub fn save_state(&self) -> Vec<u8> {
        SessionState {
            question_id: self.current_question.as_ref().map(|q| q.id),
            answer_ids: self.current_answers.iter().map(|a| a.id).collect(),
            correct_count: self.correct_count,
            question_count: self.question_count,
            history: self.history.clone(),
        }
        .encode()
    }

    /// Restore a blob produced by [`QuizEngine::save_state`].
    ///
    /// A restored question is shown again and can be graded. The recent
    /// window and debug data are not part of the blob and start empty.
    pub fn load_state(&mut self, data: &[u8]) -> Result<()> {
        let state = SessionState::decode(data, self.config.history_capacity)?;

        let question = state.question_id.map(|id| self.load_item(id)).transpose()?;
        let answers = state
            .answer_ids
            .iter()
            .map(|id| self.load_item(*id))
            .collect::<Result<Vec<_>>>()?;

        self.phase = if question.is_some() {
            Phase::QuestionShown
        } else {
            Phase::AwaitingQuestion
        };
        self.current_question = question;
        self.current_answers = answers;
        self.current_debug_data = None;
        self.correct_count = state.correct_count;
        self.question_count = state.question_count;
        self.history = state.history;
        self.recent = RecentQuestions::new(self.config.recent_window);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

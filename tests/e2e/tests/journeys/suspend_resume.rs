//! Suspend / resume journeys

use kioku_core::{Certainty, Config, ItemStore, KnowledgeType, ManualClock, Phase, QuizError};
use kioku_e2e_tests::harness::{answer_correctly, answer_wrongly, TestDatabaseManager, NOW};
use kioku_e2e_tests::mocks::TestDataFactory;

fn ids(items: &[kioku_core::LearningItem]) -> Vec<u32> {
    items.iter().map(|i| i.id).collect()
}

#[test]
fn test_resume_after_reopening_database() {
    let mut db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    let clock = ManualClock::new(NOW);

    let (blob, question, answers, history) = {
        let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 10, &clock);
        for round in 0..5 {
            engine.prepare_new_question().unwrap();
            if round % 2 == 0 {
                answer_correctly(&mut engine, Certainty::Sure);
            } else {
                answer_wrongly(&mut engine);
            }
            clock.advance(25);
        }
        engine.prepare_new_question().unwrap();
        (
            engine.save_state(),
            engine.current_question().unwrap().id,
            ids(engine.current_answers()),
            engine.history().clone(),
        )
    };

    db.reopen();
    clock.advance(3_600);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 11, &clock);
    engine.load_state(&blob).unwrap();

    assert_eq!(engine.phase(), Phase::QuestionShown);
    assert_eq!(engine.current_question().unwrap().id, question);
    assert_eq!(ids(engine.current_answers()), answers);
    assert_eq!(engine.history(), &history);
    assert_eq!(engine.correct_count(), 3);
    assert_eq!(engine.question_count(), 5);

    answer_correctly(&mut engine, Certainty::Maybe);
    assert_eq!(engine.correct_count(), 4);
    assert_eq!(engine.question_count(), 6);

    let item = db.store.get_item(KnowledgeType::Kana, question).unwrap().unwrap();
    assert_eq!(item.last_asked, NOW + 5 * 25 + 3_600);
}

#[test]
fn test_resume_fresh_session() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    let clock = ManualClock::new(NOW);

    let blob = db
        .engine(KnowledgeType::Kana, Config::default(), 12, &clock)
        .save_state();

    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 13, &clock);
    engine.load_state(&blob).unwrap();
    assert_eq!(engine.phase(), Phase::AwaitingQuestion);
    assert!(engine.current_question().is_none());
    assert!(matches!(
        engine.mark_answer(Certainty::Sure, None, &mut ()),
        Err(QuizError::NoQuestion)
    ));
}

#[test]
fn test_corrupt_state_leaves_session_untouched() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    let clock = ManualClock::new(NOW);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 14, &clock);
    engine.prepare_new_question().unwrap();
    let question = engine.current_question().unwrap().id;

    let mut blob = engine.save_state();
    blob.push(0xff);
    assert!(matches!(engine.load_state(&blob), Err(QuizError::State(_))));
    assert!(matches!(engine.load_state(&[]), Err(QuizError::State(_))));

    assert_eq!(engine.current_question().unwrap().id, question);
    assert_eq!(engine.phase(), Phase::QuestionShown);
}

#[test]
fn test_full_history_round_trips() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::numbered_kana(24));
    let clock = ManualClock::new(NOW);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 15, &clock);

    for round in 0..45 {
        engine.prepare_new_question().unwrap();
        match round % 3 {
            0 => {
                answer_correctly(&mut engine, Certainty::Sure);
            }
            1 => {
                answer_wrongly(&mut engine);
            }
            _ => {
                engine
                    .select_answer(Certainty::DontKnow, None, &mut ())
                    .unwrap();
            }
        }
        clock.advance(12);
    }
    assert_eq!(engine.history().len(), 40);

    let blob = engine.save_state();
    let mut resumed = db.engine(KnowledgeType::Kana, Config::default(), 16, &clock);
    resumed.load_state(&blob).unwrap();
    assert_eq!(resumed.history(), engine.history());
    assert_eq!(resumed.question_count(), 45);
    assert_eq!(resumed.correct_count(), 15);
    assert_eq!(resumed.save_state(), blob);
}

#[test]
fn test_snapshot_restores_scores() {
    let mut db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    db.take_snapshot(KnowledgeType::Kana);
    let before = db.store.get_stats(KnowledgeType::Kana).unwrap();

    let clock = ManualClock::new(NOW);
    {
        let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 17, &clock);
        for _ in 0..12 {
            engine.prepare_new_question().unwrap();
            answer_correctly(&mut engine, Certainty::Sure);
        }
    }
    assert_ne!(db.store.get_stats(KnowledgeType::Kana).unwrap(), before);

    db.restore_snapshot();
    assert_eq!(db.store.get_stats(KnowledgeType::Kana).unwrap(), before);
    assert!(db.path().exists());
}

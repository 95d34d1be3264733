//! Study session journeys against a real SQLite database

use std::collections::HashSet;

use kioku_core::{
    Certainty, Config, HistoryEntry, ItemStore, KnowledgeType, LearningItem, ManualClock,
    QuizConfig, QuizError,
};
use kioku_e2e_tests::harness::{answer_correctly, answer_wrongly, TestDatabaseManager, NOW};
use kioku_e2e_tests::mocks::TestDataFactory;

#[test]
fn test_first_session_persists_scores() {
    let mut db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    let clock = ManualClock::new(NOW);

    let mut asked = HashSet::new();
    {
        let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 1, &clock);
        for _ in 0..30 {
            engine.prepare_new_question().unwrap();
            asked.insert(engine.current_question().unwrap().id);
            answer_correctly(&mut engine, Certainty::Sure);
            clock.advance(20);
        }
        assert_eq!(engine.question_count(), 30);
        assert_eq!(engine.correct_count(), 30);
        assert_eq!(engine.history().len(), 30);
    }

    db.reopen();
    let stats = db.store.get_stats(KnowledgeType::Kana).unwrap();
    assert_eq!(stats.total_items, 18);
    assert_eq!(stats.never_asked as usize, 18 - asked.len());

    for id in asked {
        let item = db.store.get_item(KnowledgeType::Kana, id).unwrap().unwrap();
        assert!(item.last_asked >= NOW);
        assert!(item.short_score > 0.0);
    }
}

#[test]
fn test_known_items_come_back_with_long_term_growth() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::numbered_kana(6));
    let clock = ManualClock::new(NOW);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 2, &clock);

    for _ in 0..200 {
        if db.store.get_stats(KnowledgeType::Kana).unwrap().short_term_known == 6 {
            break;
        }
        engine.prepare_new_question().unwrap();
        answer_correctly(&mut engine, Certainty::Sure);
        clock.advance(30);
    }
    assert_eq!(db.store.get_stats(KnowledgeType::Kana).unwrap().short_term_known, 6);

    clock.advance(10 * 86_400);
    engine.prepare_new_question().unwrap();
    let question = engine.current_question().unwrap().id;
    let before = db.store.get_item(KnowledgeType::Kana, question).unwrap().unwrap();
    answer_correctly(&mut engine, Certainty::Sure);
    let after = db.store.get_item(KnowledgeType::Kana, question).unwrap().unwrap();

    assert_eq!(after.short_score, 1.0);
    assert!(after.long_score > before.long_score);
    assert!(after.long_score <= 1.0);
}

#[test]
fn test_wrong_answer_penalizes_question_and_distractor() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    let clock = ManualClock::new(NOW);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 3, &clock);

    engine.prepare_new_question().unwrap();
    answer_correctly(&mut engine, Certainty::Sure);
    clock.advance(15);

    engine.prepare_new_question().unwrap();
    let entry = answer_wrongly(&mut engine);
    let HistoryEntry::Incorrect {
        correct_id,
        wrong_id,
    } = entry
    else {
        panic!("expected an incorrect entry, got {:?}", entry);
    };

    for id in [correct_id, wrong_id] {
        let item = db.store.get_item(KnowledgeType::Kana, id).unwrap().unwrap();
        assert_eq!(item.short_score, 0.0);
        assert_eq!(item.last_asked, NOW + 15);
    }
    assert_eq!(engine.correct_count(), 1);
    assert_eq!(engine.question_count(), 2);
}

#[test]
fn test_disabled_items_never_shown() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    db.store
        .set_enabled(KnowledgeType::Kana, &[1, 2, 3, 4, 5, 6], false)
        .unwrap();
    let clock = ManualClock::new(NOW);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 4, &clock);

    for round in 0..60 {
        engine.prepare_new_question().unwrap();
        assert!(engine.current_question().unwrap().id > 6);
        assert!(engine.current_answers().iter().all(|a| a.id > 6));
        if round % 3 == 0 {
            answer_wrongly(&mut engine);
        } else {
            answer_correctly(&mut engine, Certainty::Maybe);
        }
        clock.advance(10);
    }

    for id in 1..=6 {
        let item = db.store.get_item(KnowledgeType::Kana, id).unwrap().unwrap();
        assert_eq!(item.last_asked, 0);
    }
}

#[test]
fn test_composition_quiz_leaves_out_one_part() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kanji_items());
    let clock = ManualClock::new(NOW);
    let config = Config {
        quiz: QuizConfig::composition(),
        ..Config::default()
    };
    let mut engine = db.engine(KnowledgeType::Kanji, config, 5, &clock);

    let mut compound_rounds = 0;
    for _ in 0..80 {
        engine.prepare_new_question().unwrap();
        assert_eq!(engine.current_answers().len(), 9);

        let question = engine.current_question().unwrap().clone();
        let parts = question.contents.parts();
        if !parts.is_empty() {
            compound_rounds += 1;
            let shown = parts
                .iter()
                .filter(|p| engine.current_answers().iter().any(|a| a.id == **p))
                .count();
            assert_eq!(shown, parts.len() - 1, "question {}", question.id);
        }
        answer_correctly(&mut engine, Certainty::Sure);
        clock.advance(10);
    }
    assert!(compound_rounds > 0);
}

#[test]
fn test_too_few_enabled_items() {
    let db = TestDatabaseManager::new_temp();
    db.seed(&TestDataFactory::kana_items());
    db.store.set_all_enabled(KnowledgeType::Kana, false).unwrap();
    db.store.set_enabled(KnowledgeType::Kana, &[1, 2, 3, 4], true).unwrap();
    let clock = ManualClock::new(NOW);
    let mut engine = db.engine(KnowledgeType::Kana, Config::default(), 6, &clock);

    assert!(matches!(
        engine.prepare_new_question(),
        Err(QuizError::InsufficientItems {
            enabled: 4,
            required: 6
        })
    ));
}

#[test]
fn test_import_document_and_reset() {
    let db = TestDatabaseManager::new_temp();
    let json = TestDataFactory::to_import_json(&TestDataFactory::kanji_items());
    let items: Vec<LearningItem> = serde_json::from_str(&json).unwrap();
    assert_eq!(db.store.import_items(&items).unwrap(), 18);

    let clock = ManualClock::new(NOW);
    {
        let mut engine = db.engine(KnowledgeType::Kanji, Config::default(), 7, &clock);
        for _ in 0..10 {
            engine.prepare_new_question().unwrap();
            answer_correctly(&mut engine, Certainty::Sure);
        }
    }
    assert!(db.store.min_last_asked(KnowledgeType::Kanji).unwrap().is_some());

    db.store.reset_scores(KnowledgeType::Kanji).unwrap();
    let stats = db.store.get_stats(KnowledgeType::Kanji).unwrap();
    assert_eq!(stats.never_asked, 18);
    assert_eq!(db.store.min_last_asked(KnowledgeType::Kanji).unwrap(), None);
}

//! Scheduling properties over long runs

use kioku_core::{
    Certainty, Config, ItemStore, KnowledgeType, ManualClock, MemoryStore, QuizEngine, ScoreUpdate,
};
use kioku_e2e_tests::harness::{answer_correctly, answer_wrongly, TestDatabaseManager, NOW};
use kioku_e2e_tests::mocks::TestDataFactory;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Answer according to the round number and return the question id
fn scripted_round<S: ItemStore>(engine: &mut QuizEngine<S>, round: usize) -> u32 {
    engine.prepare_new_question().unwrap();
    let question = engine.current_question().unwrap().id;
    match round % 4 {
        0 | 1 => {
            answer_correctly(engine, Certainty::Sure);
        }
        2 => {
            answer_wrongly(engine);
        }
        _ => {
            engine
                .select_answer(Certainty::DontKnow, None, &mut ())
                .unwrap();
        }
    }
    question
}

#[test]
fn test_memory_and_sqlite_stores_replay_identically() {
    let items = TestDataFactory::kana_items();

    let db = TestDatabaseManager::new_temp();
    db.seed(&items);
    let sqlite_clock = ManualClock::new(NOW);
    let mut sqlite_engine = db.engine(KnowledgeType::Kana, Config::default(), 31, &sqlite_clock);

    let memory = MemoryStore::with_items(items);
    let memory_clock = ManualClock::new(NOW);
    let mut memory_engine = QuizEngine::with_rng(
        &memory,
        KnowledgeType::Kana,
        Config::default(),
        ChaCha8Rng::seed_from_u64(31),
    )
    .with_clock(memory_clock.clone());

    for round in 0..80 {
        let from_sqlite = scripted_round(&mut sqlite_engine, round);
        let from_memory = scripted_round(&mut memory_engine, round);
        assert_eq!(from_sqlite, from_memory, "diverged at round {}", round);
        sqlite_clock.advance(45);
        memory_clock.advance(45);
    }

    assert_eq!(sqlite_engine.save_state(), memory_engine.save_state());
    for item in memory.items(KnowledgeType::Kana).unwrap() {
        let stored = db.store.get_item(KnowledgeType::Kana, item.id).unwrap().unwrap();
        assert_eq!(stored.short_score, item.short_score);
        assert_eq!(stored.long_score, item.long_score);
        assert_eq!(stored.last_asked, item.last_asked);
    }
}

#[test]
fn test_no_repeat_within_window_over_long_run() {
    let store = MemoryStore::with_items(TestDataFactory::numbered_kana(30));
    let clock = ManualClock::new(NOW);
    let mut engine = QuizEngine::with_rng(
        &store,
        KnowledgeType::Kana,
        Config::default(),
        ChaCha8Rng::seed_from_u64(32),
    )
    .with_clock(clock.clone());

    let mut asked: Vec<u32> = Vec::new();
    for round in 0..300 {
        let question = scripted_round(&mut engine, round);
        let start = asked.len().saturating_sub(6);
        assert!(!asked[start..].contains(&question), "round {}", round);
        asked.push(question);
        clock.advance(20);
    }
}

#[test]
fn test_known_items_wait_until_due() {
    let store = MemoryStore::with_items(TestDataFactory::numbered_kana(20));
    let set = |id: u32, long_score: f64, last_asked: i64| {
        store
            .apply_score_update(
                KnowledgeType::Kana,
                &ScoreUpdate {
                    item_id: id,
                    short_score: 1.0,
                    long_score,
                    last_asked,
                    min_last_asked: None,
                },
            )
            .unwrap();
    };

    // Item 1 was learnt 100 days ago and is due; 2..=10 were reviewed
    // yesterday with a perfect long score and are not
    set(1, 1.0, NOW - 100 * 86_400);
    for id in 2..=10 {
        set(id, 1.0, NOW - 86_400);
    }

    let mut engine = QuizEngine::with_rng(
        &store,
        KnowledgeType::Kana,
        Config::default(),
        ChaCha8Rng::seed_from_u64(33),
    )
    .with_clock(ManualClock::new(NOW));

    for _ in 0..200 {
        engine.prepare_new_question().unwrap();
        let question = engine.current_question().unwrap().id;
        assert!(!(2..=10).contains(&question), "item {} asked before due", question);
    }
}

#[test]
fn test_scores_stay_in_unit_interval() {
    let store = MemoryStore::with_items(TestDataFactory::numbered_kana(12));
    let clock = ManualClock::new(NOW);
    let mut engine = QuizEngine::with_rng(
        &store,
        KnowledgeType::Kana,
        Config::default(),
        ChaCha8Rng::seed_from_u64(34),
    )
    .with_clock(clock.clone());
    let mut script = ChaCha8Rng::seed_from_u64(35);

    for _ in 0..500 {
        engine.prepare_new_question().unwrap();
        match script.gen_range(0..5) {
            0 => {
                answer_wrongly(&mut engine);
            }
            1 => {
                engine
                    .select_answer(Certainty::DontKnow, None, &mut ())
                    .unwrap();
            }
            2 => {
                answer_correctly(&mut engine, Certainty::Maybe);
            }
            _ => {
                answer_correctly(&mut engine, Certainty::Sure);
            }
        }
        clock.advance(script.gen_range(1..3 * 86_400));

        for item in store.items(KnowledgeType::Kana).unwrap() {
            assert!((0.0..=1.0).contains(&item.short_score), "{:?}", item);
            assert!((0.0..=1.0).contains(&item.long_score), "{:?}", item);
        }

        let data = engine.current_debug_data().unwrap();
        assert!(data
            .records
            .iter()
            .all(|r| r.final_probability >= 0.0 && r.final_probability.is_finite()));
    }
}

//! Test Data Factory
//!
//! Provides realistic study material:
//! - Hiragana with look-alike relations
//! - Kanji with component parts
//! - Numbered batches for long or large runs

use kioku_core::{ItemContents, LearningItem};

/// Factory for creating test items
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// db.seed(&TestDataFactory::kanji_items());
/// ```
pub struct TestDataFactory;

/// Hiragana, romaji and the ids they are easily confused with
const HIRAGANA: &[(&str, &str, &[u32])] = &[
    ("あ", "a", &[5, 17, 18]),
    ("い", "i", &[10, 16]),
    ("う", "u", &[15]),
    ("え", "e", &[]),
    ("お", "o", &[1, 18]),
    ("か", "ka", &[9]),
    ("き", "ki", &[13]),
    ("く", "ku", &[]),
    ("け", "ke", &[6, 11, 12]),
    ("こ", "ko", &[2]),
    ("は", "ha", &[9, 12]),
    ("ほ", "ho", &[9, 11]),
    ("さ", "sa", &[7, 14]),
    ("ち", "chi", &[13]),
    ("ら", "ra", &[3]),
    ("り", "ri", &[2]),
    ("ぬ", "nu", &[1, 18]),
    ("め", "me", &[1, 5, 17]),
];

/// Kanji, meaning, component ids and similar ids
const KANJI: &[(&str, &str, &[u32], &[u32])] = &[
    ("日", "sun", &[], &[2, 8]),
    ("月", "moon", &[], &[1]),
    ("明", "bright", &[1, 2], &[1, 2]),
    ("木", "tree", &[], &[5, 6, 18]),
    ("林", "grove", &[4], &[4, 6]),
    ("森", "forest", &[4, 5], &[4, 5]),
    ("口", "mouth", &[], &[8]),
    ("田", "rice field", &[], &[1, 7]),
    ("力", "power", &[], &[10]),
    ("男", "man", &[8, 9], &[8, 9]),
    ("女", "woman", &[], &[13]),
    ("子", "child", &[], &[13]),
    ("好", "like", &[11, 12], &[11, 12]),
    ("火", "fire", &[], &[]),
    ("水", "water", &[], &[]),
    ("山", "mountain", &[], &[]),
    ("人", "person", &[], &[18]),
    ("休", "rest", &[17, 4], &[4, 17]),
];

impl TestDataFactory {
    /// Eighteen hiragana with ids 1..=18
    pub fn kana_items() -> Vec<LearningItem> {
        HIRAGANA
            .iter()
            .enumerate()
            .map(|(index, (kana, romaji, similar))| {
                LearningItem::new(
                    index as u32 + 1,
                    ItemContents::Kana {
                        kana: kana.to_string(),
                        romaji: romaji.to_string(),
                    },
                )
                .with_similar(similar.iter().copied())
            })
            .collect()
    }

    /// Eighteen kanji with ids 1..=18, several built from the others
    pub fn kanji_items() -> Vec<LearningItem> {
        KANJI
            .iter()
            .enumerate()
            .map(|(index, (kanji, meaning, parts, similar))| {
                LearningItem::new(
                    index as u32 + 1,
                    ItemContents::Kanji {
                        kanji: kanji.to_string(),
                        on_readings: vec![],
                        kun_readings: vec![],
                        meanings: vec![meaning.to_string()],
                        parts: parts.to_vec(),
                    },
                )
                .with_similar(similar.iter().copied())
            })
            .collect()
    }

    /// `count` synthetic kana items; each is similar to its two neighbours
    pub fn numbered_kana(count: u32) -> Vec<LearningItem> {
        (1..=count)
            .map(|id| {
                LearningItem::new(
                    id,
                    ItemContents::Kana {
                        kana: format!("か{}", id),
                        romaji: format!("ka{}", id),
                    },
                )
                .with_similar(
                    [id.saturating_sub(1), id + 1]
                        .into_iter()
                        .filter(|s| (1..=count).contains(s)),
                )
            })
            .collect()
    }

    /// Items as the JSON document `kioku import` reads
    pub fn to_import_json(items: &[LearningItem]) -> String {
        serde_json::to_string_pretty(items).expect("items serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_relations_point_at_existing_items() {
        for items in [TestDataFactory::kana_items(), TestDataFactory::kanji_items()] {
            let max = items.len() as u32;
            for item in &items {
                assert!(item.similar_item_ids.iter().all(|id| (1..=max).contains(id)));
                assert!(item.contents.parts().iter().all(|id| (1..=max).contains(id)));
                assert!(!item.similar_item_ids.contains(&item.id));
            }
        }
    }

    #[test]
    fn test_import_json_round_trip() {
        let items = TestDataFactory::kanji_items();
        let json = TestDataFactory::to_import_json(&items);
        let back: Vec<LearningItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, items);
    }
}

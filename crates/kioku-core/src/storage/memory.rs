//! In-memory item store

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{ItemStore, Result, StorageError};
use crate::memory::{KnowledgeType, LearningItem, ScoreRecord, ScoreUpdate};

type ItemMap = BTreeMap<(KnowledgeType, u32), LearningItem>;

/// Item store backed by an ordered map.
///
/// Iteration follows `(domain, id)` order, so seeded sessions replay the
/// same way on every run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<ItemMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `items`
    pub fn with_items(items: impl IntoIterator<Item = LearningItem>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, ItemMap>> {
        self.items.lock().map_err(|_| StorageError::Lock("Item map"))
    }

    /// Insert or replace an item, returning the previous version
    pub fn insert(&self, item: LearningItem) -> Option<LearningItem> {
        let key = (item.knowledge_type(), item.id);
        match self.items.lock() {
            Ok(mut items) => items.insert(key, item),
            Err(poisoned) => poisoned.into_inner().insert(key, item),
        }
    }

    /// Enable or disable items, returning how many were found
    pub fn set_enabled(
        &self,
        knowledge: KnowledgeType,
        ids: &[u32],
        enabled: bool,
    ) -> Result<usize> {
        let mut items = self.lock()?;
        let mut changed = 0;
        for id in ids {
            if let Some(item) = items.get_mut(&(knowledge, *id)) {
                item.enabled = enabled;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Every item of a domain, enabled or not
    pub fn items(&self, knowledge: KnowledgeType) -> Result<Vec<LearningItem>> {
        let items = self.lock()?;
        Ok(items
            .range((knowledge, 0)..=(knowledge, u32::MAX))
            .map(|(_, item)| item.clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemStore for MemoryStore {
    fn enabled_scores(&self, knowledge: KnowledgeType) -> Result<Vec<ScoreRecord>> {
        let items = self.lock()?;
        Ok(items
            .range((knowledge, 0)..=(knowledge, u32::MAX))
            .filter(|(_, item)| item.enabled)
            .map(|(_, item)| item.score_record())
            .collect())
    }

    fn get_item(&self, knowledge: KnowledgeType, id: u32) -> Result<Option<LearningItem>> {
        Ok(self.lock()?.get(&(knowledge, id)).cloned())
    }

    fn is_item_enabled(&self, knowledge: KnowledgeType, id: u32) -> Result<bool> {
        Ok(self
            .lock()?
            .get(&(knowledge, id))
            .is_some_and(|item| item.enabled))
    }

    fn apply_score_updates(&self, knowledge: KnowledgeType, updates: &[ScoreUpdate]) -> Result<()> {
        let mut items = self.lock()?;
        if let Some(missing) = updates
            .iter()
            .find(|u| !items.contains_key(&(knowledge, u.item_id)))
        {
            return Err(StorageError::NotFound(format!("{} #{}", knowledge, missing.item_id)));
        }
        for update in updates {
            if let Some(item) = items.get_mut(&(knowledge, update.item_id)) {
                item.short_score = update.short_score;
                item.long_score = update.long_score;
                item.last_asked = update.last_asked;
            }
        }
        Ok(())
    }

    fn min_last_asked(&self, knowledge: KnowledgeType) -> Result<Option<i64>> {
        let items = self.lock()?;
        Ok(items
            .range((knowledge, 0)..=(knowledge, u32::MAX))
            .filter(|(_, item)| item.enabled && item.last_asked != 0)
            .map(|(_, item)| item.last_asked)
            .min())
    }
}

// ============================================================================
// TESTS
// ============================================================================

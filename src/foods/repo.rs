use std::collections::BTreeMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::foods::repo_types::{Food, FoodId};

/// In-process table of food records.
///
/// The record map and the id counter live behind one lock so an id can never
/// be handed out twice, even when handlers run on several worker threads.
/// Records are stored as given; the store knows nothing about the rules.
#[derive(Debug, Default)]
pub struct FoodStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<FoodId, Food>,
    last_id: FoodId,
}

impl FoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next id. Ids start at 1 and are never reused, even if
    /// the reserved id is never inserted.
    pub fn next_id(&self) -> FoodId {
        let mut inner = self.inner.lock();
        inner.last_id += 1;
        inner.last_id
    }

    /// Adds a record under its own id, silently replacing any previous one.
    pub fn insert(&self, food: Food) -> Food {
        let mut inner = self.inner.lock();
        debug!(food_id = food.id, "store insert");
        inner.records.insert(food.id, food.clone());
        food
    }

    /// All records, in ascending id order.
    pub fn get_all(&self) -> Vec<Food> {
        self.inner.lock().records.values().cloned().collect()
    }

    pub fn get_by_id(&self, id: FoodId) -> Option<Food> {
        self.inner.lock().records.get(&id).cloned()
    }

    /// Overwrites the whole record at `id`. Returns `None` if there is none.
    #[allow(dead_code)]
    pub fn replace(&self, id: FoodId, food: Food) -> Option<Food> {
        let mut inner = self.inner.lock();
        let slot = inner.records.get_mut(&id)?;
        *slot = food;
        debug!(food_id = id, "store replace");
        Some(slot.clone())
    }

    /// Builds the replacement from the current record and stores it, all
    /// under one lock. Returns `None` if there is no record at `id`.
    pub fn update_with<F>(&self, id: FoodId, build: F) -> Option<Food>
    where
        F: FnOnce(&Food) -> Food,
    {
        let mut inner = self.inner.lock();
        let slot = inner.records.get_mut(&id)?;
        *slot = build(slot);
        debug!(food_id = id, "store update");
        Some(slot.clone())
    }

    pub fn delete(&self, id: FoodId) -> bool {
        let removed = self.inner.lock().records.remove(&id).is_some();
        debug!(food_id = id, removed, "store delete");
        removed
    }

    #[allow(dead_code)]
    pub fn exists(&self, id: FoodId) -> bool {
        self.inner.lock().records.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Drops every record and rewinds the counter. Test isolation only.
    #[allow(dead_code)]
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.records.clear();
        inner.last_id = 0;
    }
}

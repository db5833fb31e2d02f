//! Read-through cache of daily aggregates.
//!
//! Each key owns a `OnceCell`, so concurrent loads of the same child,
//! category and day share one fetch. A failed load drops its key and the next
//! caller retries. Loaded values stay until [`DayCache::invalidate`] or
//! [`DayCache::clear`]; the owner decides when to evict.

use std::{collections::HashMap, future::Future, sync::Arc};

use tokio::sync::{OnceCell, RwLock};

use crate::{aggregate::DailyAggregate, checkin::Category, child::ChildId, date::DateKey};

type Key = (ChildId, Category, DateKey);
type Slot = Arc<OnceCell<DailyAggregate>>;

#[derive(Debug, Clone, Default)]
pub struct DayCache {
  slots: Arc<RwLock<HashMap<Key, Slot>>>,
}

impl DayCache {
  pub fn new() -> Self { Self::default() }

  pub async fn get(&self, child_id: ChildId, category: Category, date: DateKey) -> Option<DailyAggregate> {
    let slots = self.slots.read().await;
    slots.get(&(child_id, category, date)).and_then(|cell| cell.get().cloned())
  }

  /// Overwrite the cached value for one key.
  pub async fn set(&self, child_id: ChildId, category: Category, date: DateKey, value: DailyAggregate) {
    let cell = Arc::new(OnceCell::new_with(Some(value)));
    self.slots.write().await.insert((child_id, category, date), cell);
  }

  /// Return the cached aggregate, or run `load` to fill it.
  pub async fn get_or_load<F, Fut, E>(
    &self,
    child_id: ChildId,
    category: Category,
    date: DateKey,
    load: F,
  ) -> Result<DailyAggregate, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<DailyAggregate, E>>,
  {
    let cell = self.slot(child_id, category, date).await;
    match cell.get_or_try_init(load).await {
      Ok(value) => Ok(value.clone()),
      Err(e) => {
        self.drop_empty((child_id, category, date), &cell).await;
        Err(e)
      }
    }
  }

  /// Remove `key` if it still maps to `cell` and nothing filled it since.
  async fn drop_empty(&self, key: Key, cell: &Slot) {
    let mut slots = self.slots.write().await;
    if slots.get(&key).is_some_and(|held| Arc::ptr_eq(held, cell) && !held.initialized()) {
      slots.remove(&key);
    }
  }

  async fn slot(&self, child_id: ChildId, category: Category, date: DateKey) -> Slot {
    let key = (child_id, category, date);
    if let Some(cell) = self.slots.read().await.get(&key) {
      return cell.clone();
    }
    self.slots.write().await.entry(key).or_default().clone()
  }

  /// Drop one day for a child across every category, or the whole child when
  /// `date` is `None`.
  pub async fn invalidate(&self, child_id: ChildId, date: Option<DateKey>) {
    let mut slots = self.slots.write().await;
    slots.retain(|(child, _, day), _| *child != child_id || date.is_some_and(|d| d != *day));
  }

  pub async fn clear(&self) { self.slots.write().await.clear(); }

  /// Number of keys holding a value.
  pub async fn len(&self) -> usize {
    self.slots.read().await.values().filter(|cell| cell.initialized()).count()
  }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

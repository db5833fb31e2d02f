//! The analysis entry point: one run per child and reference date.
//!
//! A run builds the window, loads every category's daily aggregates through
//! the cache, runs the four detectors, combines their results and persists
//! what comes out. Only an unknown child, an unusable date or a failing
//! child lookup abort a run. Per-day load failures degrade to empty days and
//! write failures are reported next to the in-memory alerts.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  aggregate::{self, DailyAggregate},
  alert::{CategoryAlert, PersistedAlert},
  cache::DayCache,
  checkin::{Category, CheckIn, NewCheckIn},
  child::ChildId,
  combine::{combine, rank},
  date::{AnalysisWindow, DateKey},
  detect::detect_category,
  lifecycle::AlertLifecycle,
  store::CareStore,
};

/// The result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
  pub child_id:          ChildId,
  pub analysis_date:     DateKey,
  pub window:            AnalysisWindow,
  /// Combiner output, whether or not it was saved.
  pub alerts:            Vec<CategoryAlert>,
  pub saved:             Vec<PersistedAlert>,
  /// The first write failure, if any alert could not be saved.
  pub persistence_error: Option<String>,
}

/// The four aggregate series of one window, index-aligned with its dates.
#[derive(Debug, Clone)]
struct Series {
  meals:  Vec<DailyAggregate>,
  sleep:  Vec<DailyAggregate>,
  poop:   Vec<DailyAggregate>,
  health: Vec<DailyAggregate>,
}

impl Series {
  fn get(&self, category: Category) -> &[DailyAggregate] {
    match category {
      Category::Meals => &self.meals,
      Category::Sleep => &self.sleep,
      Category::Poop => &self.poop,
      Category::Health => &self.health,
    }
  }

  /// Mark stool-free days as tracked when the caregiver logs stools in this
  /// window and logged something else that day.
  fn mark_tracked_stool_days(&mut self) {
    let logging_stools = self
      .poop
      .iter()
      .any(|d| matches!(d, DailyAggregate::Poop(p) if p.count > 0));

    for (i, day) in self.poop.iter_mut().enumerate() {
      let DailyAggregate::Poop(p) = day else { continue };
      let other_activity =
        self.meals[i].has_data() || self.sleep[i].has_data() || self.health[i].has_data();
      p.tracked = p.count > 0 || (logging_stools && other_activity);
    }
  }
}

pub struct Analyzer<S> {
  store:     Arc<S>,
  cache:     DayCache,
  lifecycle: AlertLifecycle<S>,
}

impl<S> Clone for Analyzer<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      cache:     self.cache.clone(),
      lifecycle: self.lifecycle.clone(),
    }
  }
}

impl<S: CareStore> Analyzer<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_cache(store, DayCache::new()) }

  pub fn with_cache(store: Arc<S>, cache: DayCache) -> Self {
    let lifecycle = AlertLifecycle::new(Arc::clone(&store));
    Self { store, cache, lifecycle }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn cache(&self) -> &DayCache { &self.cache }

  pub fn lifecycle(&self) -> &AlertLifecycle<S> { &self.lifecycle }

  /// Validate and persist a check-in, then drop the cached aggregates of
  /// its day.
  pub async fn record_check_in(&self, input: NewCheckIn) -> Result<CheckIn> {
    input.entry.validate()?;
    if self.store.get_child(input.child_id).await.map_err(Error::storage)?.is_none() {
      return Err(Error::ChildNotFound(input.child_id));
    }

    let check_in = self.store.record_check_in(input).await.map_err(Error::storage)?;
    self.cache.invalidate(check_in.child_id, Some(check_in.date_key())).await;
    Ok(check_in)
  }

  /// Run every detector over the seven days ending at `reference` and
  /// persist the combined result.
  pub async fn analyze(&self, child_id: ChildId, reference: &str) -> Result<Analysis> {
    let window = AnalysisWindow::ending_at(reference)?;
    let child = self
      .store
      .get_child(child_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::ChildNotFound(child_id))?;

    let dates = window.dates();
    let (meals, sleep, poop, health) = tokio::join!(
      self.series(child_id, Category::Meals, dates),
      self.series(child_id, Category::Sleep, dates),
      self.series(child_id, Category::Poop, dates),
      self.series(child_id, Category::Health, dates),
    );
    let mut series = Series { meals, sleep, poop, health };
    series.mark_tracked_stool_days();

    let detected: Vec<CategoryAlert> = Category::ALL
      .iter()
      .filter_map(|c| detect_category(*c, series.get(*c), &child.name))
      .collect();
    let alerts = combine(rank(detected));

    debug!(
      child_id,
      analysis_date = %window.end(),
      alerts = alerts.len(),
      "analysis complete"
    );

    let mut saved = Vec::with_capacity(alerts.len());
    let mut persistence_error = None;
    for alert in &alerts {
      match self.lifecycle.create(alert, child_id, &window).await {
        Ok(persisted) => saved.push(persisted),
        Err(e) => {
          warn!(child_id, alert_type = %alert.alert_type, error = %e, "failed to save alert");
          persistence_error.get_or_insert_with(|| e.to_string());
        }
      }
    }

    match self.lifecycle.supersede(child_id, &window, &alerts).await {
      Ok(0) => {}
      Ok(retired) => debug!(child_id, retired, "superseded alerts from an earlier run"),
      Err(e) => {
        warn!(child_id, error = %e, "failed to supersede earlier alerts");
        persistence_error.get_or_insert_with(|| e.to_string());
      }
    }

    Ok(Analysis {
      child_id,
      analysis_date: window.end(),
      window,
      alerts,
      saved,
      persistence_error,
    })
  }

  /// One aggregate per date, in date order.
  async fn series(&self, child_id: ChildId, category: Category, dates: &[DateKey]) -> Vec<DailyAggregate> {
    join_all(dates.iter().map(|date| self.day(child_id, category, *date))).await
  }

  async fn day(&self, child_id: ChildId, category: Category, date: DateKey) -> DailyAggregate {
    let store = &self.store;
    let loaded = self
      .cache
      .get_or_load(child_id, category, date, move || async move {
        let rows = store.check_ins_for_day(child_id, category, date).await?;
        Ok::<_, S::Error>(aggregate::aggregate(category, &rows, date))
      })
      .await;

    loaded.unwrap_or_else(|e| {
      warn!(child_id, %category, %date, error = %e, "day unavailable; treating as empty");
      DailyAggregate::empty(category)
    })
  }
}

//! An in-memory `CareStore` for unit tests, with switches to make it fail.

use std::{
  collections::HashSet,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  alert::{AlertDraft, AlertType, PersistedAlert},
  checkin::{Category, CheckIn, NewCheckIn},
  child::{Child, ChildId, NewChild},
  date::DateKey,
  store::CareStore,
};

#[derive(Debug, thiserror::Error)]
#[error("backend offline: {0}")]
pub struct Offline(pub String);

#[derive(Default)]
struct Inner {
  children:      Vec<Child>,
  check_ins:     Vec<CheckIn>,
  alerts:        Vec<PersistedAlert>,
  failing_dates: HashSet<DateKey>,
  fail_writes:   bool,
}

#[derive(Default)]
pub struct MemoryStore {
  inner:       Mutex<Inner>,
  alert_calls: AtomicUsize,
  day_loads:   AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make every `check_ins_for_day` call for `date` fail.
  pub fn fail_on(&self, date: DateKey) {
    self.lock().failing_dates.insert(date);
  }

  /// Make every alert write fail.
  pub fn fail_alert_writes(&self) { self.lock().fail_writes = true; }

  /// Number of alert operations that reached the store.
  pub fn alert_calls(&self) -> usize { self.alert_calls.load(Ordering::SeqCst) }

  pub fn day_loads(&self) -> usize { self.day_loads.load(Ordering::SeqCst) }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn touch_alerts(&self) { self.alert_calls.fetch_add(1, Ordering::SeqCst); }
}

impl CareStore for MemoryStore {
  type Error = Offline;

  async fn add_child(&self, input: NewChild) -> Result<Child, Offline> {
    let mut inner = self.lock();
    let child = Child {
      child_id:   inner.children.len() as ChildId + 1,
      name:       input.name,
      birth_date: input.birth_date,
      created_at: Utc::now(),
    };
    inner.children.push(child.clone());
    Ok(child)
  }

  async fn get_child(&self, child_id: ChildId) -> Result<Option<Child>, Offline> {
    Ok(self.lock().children.iter().find(|c| c.child_id == child_id).cloned())
  }

  async fn record_check_in(&self, input: NewCheckIn) -> Result<CheckIn, Offline> {
    let check_in = CheckIn {
      check_in_id: Uuid::new_v4(),
      child_id:    input.child_id,
      logged_at:   input.logged_at,
      recorded_at: Utc::now(),
      entry:       input.entry,
    };
    self.lock().check_ins.push(check_in.clone());
    Ok(check_in)
  }

  async fn check_ins_for_day(
    &self,
    child_id: ChildId,
    category: Category,
    date: DateKey,
  ) -> Result<Vec<CheckIn>, Offline> {
    self.day_loads.fetch_add(1, Ordering::SeqCst);
    let inner = self.lock();
    if inner.failing_dates.contains(&date) {
      return Err(Offline(format!("no data for {date}")));
    }
    Ok(
      inner
        .check_ins
        .iter()
        .filter(|c| c.child_id == child_id && c.entry.category() == category && c.date_key() == date)
        .cloned()
        .collect(),
    )
  }

  async fn upsert_alert(&self, draft: AlertDraft) -> Result<PersistedAlert, Offline> {
    self.touch_alerts();
    let mut inner = self.lock();
    if inner.fail_writes {
      return Err(Offline("write rejected".into()));
    }

    let existing = inner.alerts.iter_mut().find(|a| {
      a.child_id == draft.child_id
        && a.alert_type == draft.alert_type
        && a.analysis_date == draft.analysis_date
    });
    if let Some(alert) = existing {
      alert.title = draft.title;
      alert.description = draft.description;
      alert.severity = draft.severity;
      alert.suggestions = draft.suggestions;
      alert.data_period_start = draft.data_period_start;
      alert.data_period_end = draft.data_period_end;
      alert.superseded_at = None;
      return Ok(alert.clone());
    }

    let alert = PersistedAlert {
      alert_id:          Uuid::new_v4(),
      child_id:          draft.child_id,
      alert_type:        draft.alert_type,
      title:             draft.title,
      description:       draft.description,
      severity:          draft.severity,
      suggestions:       draft.suggestions,
      analysis_date:     draft.analysis_date,
      data_period_start: draft.data_period_start,
      data_period_end:   draft.data_period_end,
      is_read:           false,
      read_at:           None,
      created_at:        Utc::now(),
      deleted_at:        None,
      superseded_at:     None,
    };
    inner.alerts.push(alert.clone());
    Ok(alert)
  }

  async fn supersede_alerts(
    &self,
    child_id: ChildId,
    analysis_date: DateKey,
    keep: Vec<AlertType>,
  ) -> Result<u64, Offline> {
    self.touch_alerts();
    let mut inner = self.lock();
    if inner.fail_writes {
      return Err(Offline("write rejected".into()));
    }
    let now = Utc::now();
    let mut changed = 0;
    for alert in inner.alerts.iter_mut().filter(|a| {
      a.child_id == child_id
        && a.analysis_date == analysis_date
        && a.is_live()
        && !keep.contains(&a.alert_type)
    }) {
      alert.superseded_at = Some(now);
      changed += 1;
    }
    Ok(changed)
  }

  async fn list_alerts(&self, child_id: ChildId) -> Result<Vec<PersistedAlert>, Offline> {
    self.touch_alerts();
    Ok(
      self
        .lock()
        .alerts
        .iter()
        .rev()
        .filter(|a| a.child_id == child_id && a.is_live())
        .cloned()
        .collect(),
    )
  }

  async fn unread_count(&self, child_id: ChildId) -> Result<u64, Offline> {
    self.touch_alerts();
    let inner = self.lock();
    Ok(
      inner
        .alerts
        .iter()
        .filter(|a| a.child_id == child_id && a.is_live() && !a.is_read)
        .count() as u64,
    )
  }

  async fn set_read(&self, alert_id: Uuid, is_read: bool) -> Result<Option<PersistedAlert>, Offline> {
    self.touch_alerts();
    let mut inner = self.lock();
    Ok(inner.alerts.iter_mut().find(|a| a.alert_id == alert_id && a.is_live()).map(|a| {
      a.is_read = is_read;
      a.read_at = if is_read { a.read_at.or_else(|| Some(Utc::now())) } else { None };
      a.clone()
    }))
  }

  async fn soft_delete_alert(&self, alert_id: Uuid) -> Result<Option<PersistedAlert>, Offline> {
    self.touch_alerts();
    let mut inner = self.lock();
    Ok(inner.alerts.iter_mut().find(|a| a.alert_id == alert_id).map(|a| {
      a.deleted_at.get_or_insert_with(Utc::now);
      a.clone()
    }))
  }
}

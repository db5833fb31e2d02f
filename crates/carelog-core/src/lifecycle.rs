//! Alert lifecycle: create, list, read/unread, soft delete.
//!
//! Identifiers arrive as strings from the outside world. They are checked
//! here, before the store is touched, so a placeholder such as `"undefined"`
//! never turns into a query.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  alert::{AlertDraft, CategoryAlert, PersistedAlert},
  child::ChildId,
  date::AnalysisWindow,
  store::CareStore,
};

/// Values that front ends send when they have no identifier at all.
const PLACEHOLDER_IDS: &[&str] = &["undefined", "null", "none"];

/// Parse an alert identifier, rejecting empty, placeholder and nil values.
pub fn parse_alert_id(raw: &str) -> Result<Uuid> {
  let trimmed = raw.trim();
  if trimmed.is_empty() || PLACEHOLDER_IDS.contains(&trimmed.to_ascii_lowercase().as_str()) {
    return Err(Error::InvalidIdentifier(raw.to_owned()));
  }
  match Uuid::parse_str(trimmed) {
    Ok(id) if !id.is_nil() => Ok(id),
    _ => Err(Error::InvalidIdentifier(raw.to_owned())),
  }
}

pub struct AlertLifecycle<S> {
  store: Arc<S>,
}

impl<S> Clone for AlertLifecycle<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: CareStore> AlertLifecycle<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Persist one detector result for `child_id`. The data period is taken
  /// from the window; its last day is the analysis date.
  pub async fn create(
    &self,
    alert: &CategoryAlert,
    child_id: ChildId,
    window: &AnalysisWindow,
  ) -> Result<PersistedAlert> {
    let draft = AlertDraft {
      child_id,
      alert_type: alert.alert_type,
      title: alert.title.clone(),
      description: alert.description.clone(),
      severity: alert.severity,
      suggestions: alert.suggestions.clone(),
      analysis_date: window.end(),
      data_period_start: window.start(),
      data_period_end: window.end(),
    };
    self.store.upsert_alert(draft).await.map_err(Error::storage)
  }

  /// Retire what an earlier run on the same window raised but the latest
  /// run, which produced `current`, did not.
  pub async fn supersede(
    &self,
    child_id: ChildId,
    window: &AnalysisWindow,
    current: &[CategoryAlert],
  ) -> Result<u64> {
    let keep = current.iter().map(|a| a.alert_type).collect();
    self
      .store
      .supersede_alerts(child_id, window.end(), keep)
      .await
      .map_err(Error::storage)
  }

  pub async fn timeline(&self, child_id: ChildId) -> Result<Vec<PersistedAlert>> {
    self.require_child(child_id).await?;
    self.store.list_alerts(child_id).await.map_err(Error::storage)
  }

  pub async fn unread_count(&self, child_id: ChildId) -> Result<u64> {
    self.require_child(child_id).await?;
    self.store.unread_count(child_id).await.map_err(Error::storage)
  }

  pub async fn mark_read(&self, alert_id: &str) -> Result<PersistedAlert> {
    self.set_read(alert_id, true).await
  }

  pub async fn mark_unread(&self, alert_id: &str) -> Result<PersistedAlert> {
    self.set_read(alert_id, false).await
  }

  /// Dismissed and superseded alerts are reported as not found.
  pub async fn set_read(&self, alert_id: &str, is_read: bool) -> Result<PersistedAlert> {
    let id = parse_alert_id(alert_id)?;
    self
      .store
      .set_read(id, is_read)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::AlertNotFound(id))
  }

  /// Soft delete. Deleting twice is not an error.
  pub async fn delete(&self, alert_id: &str) -> Result<PersistedAlert> {
    let id = parse_alert_id(alert_id)?;
    self
      .store
      .soft_delete_alert(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::AlertNotFound(id))
  }

  async fn require_child(&self, child_id: ChildId) -> Result<()> {
    match self.store.get_child(child_id).await.map_err(Error::storage)? {
      Some(_) => Ok(()),
      None => Err(Error::ChildNotFound(child_id)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    alert::{AlertType, Severity},
    checkin::Category,
    child::NewChild,
    guidance,
    memory::MemoryStore,
  };

  async fn setup() -> (Arc<MemoryStore>, AlertLifecycle<MemoryStore>, ChildId) {
    let store = Arc::new(MemoryStore::new());
    let child = store
      .add_child(NewChild { name: "Mia".into(), birth_date: None })
      .await
      .unwrap();
    (store.clone(), AlertLifecycle::new(store), child.child_id)
  }

  fn sleep_alert() -> CategoryAlert {
    CategoryAlert::new(
      AlertType::Sleep,
      Severity::Warning,
      "Mia's Sleep Is Shorter Than Usual",
      "Mia slept less than 9 hours on 3 of the last 7 logged days.",
      guidance::category_suggestions(Category::Sleep, Severity::Warning),
    )
  }

  #[test]
  fn placeholder_ids_are_rejected() {
    let nil = Uuid::nil().to_string();
    for raw in ["", "  ", "undefined", "null", "NULL", "not-a-uuid", nil.as_str()] {
      assert!(
        matches!(parse_alert_id(raw), Err(Error::InvalidIdentifier(_))),
        "{raw:?} should be rejected"
      );
    }
    let id = Uuid::new_v4();
    assert_eq!(parse_alert_id(&format!(" {id} ")).unwrap(), id);
  }

  #[tokio::test]
  async fn create_takes_the_period_from_the_window() {
    let (_, lifecycle, child_id) = setup().await;
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    let saved = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap();

    assert_eq!(saved.analysis_date.to_string(), "2025-06-19");
    assert_eq!(saved.data_period_start.to_string(), "2025-06-13");
    assert_eq!(saved.data_period_end.to_string(), "2025-06-19");
    assert!(!saved.is_read);
  }

  #[tokio::test]
  async fn delete_with_empty_id_never_reaches_the_store() {
    let (store, lifecycle, _) = setup().await;
    let err = lifecycle.delete("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier(_)));
    assert_eq!(store.alert_calls(), 0);
  }

  #[tokio::test]
  async fn delete_of_unknown_alert_is_not_found() {
    let (_, lifecycle, _) = setup().await;
    let id = Uuid::new_v4();
    let err = lifecycle.delete(&id.to_string()).await.unwrap_err();
    assert!(matches!(err, Error::AlertNotFound(missing) if missing == id));
  }

  #[tokio::test]
  async fn deleted_alerts_leave_the_timeline() {
    let (_, lifecycle, child_id) = setup().await;
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    let saved = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap();

    let deleted = lifecycle.delete(&saved.alert_id.to_string()).await.unwrap();
    assert!(deleted.is_deleted());
    assert!(lifecycle.timeline(child_id).await.unwrap().is_empty());
    assert_eq!(lifecycle.unread_count(child_id).await.unwrap(), 0);

    // A second delete is accepted and keeps the first stamp.
    let again = lifecycle.delete(&saved.alert_id.to_string()).await.unwrap();
    assert_eq!(again.deleted_at, deleted.deleted_at);
  }

  #[tokio::test]
  async fn mark_read_lowers_unread_count() {
    let (_, lifecycle, child_id) = setup().await;
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    let saved = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap();
    assert_eq!(lifecycle.unread_count(child_id).await.unwrap(), 1);

    let id = saved.alert_id.to_string();
    let read = lifecycle.mark_read(&id).await.unwrap();
    assert!(read.is_read);
    assert!(read.read_at.is_some());
    assert_eq!(lifecycle.unread_count(child_id).await.unwrap(), 0);

    // Idempotent.
    lifecycle.mark_read(&id).await.unwrap();
    assert_eq!(lifecycle.unread_count(child_id).await.unwrap(), 0);

    let unread = lifecycle.mark_unread(&id).await.unwrap();
    assert!(unread.read_at.is_none());
    assert_eq!(lifecycle.unread_count(child_id).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn dismissed_alerts_cannot_change_read_state() {
    let (_, lifecycle, child_id) = setup().await;
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    let saved = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap();
    let id = saved.alert_id.to_string();
    lifecycle.delete(&id).await.unwrap();

    let err = lifecycle.mark_read(&id).await.unwrap_err();
    assert!(matches!(err, Error::AlertNotFound(missing) if missing == saved.alert_id));
    assert!(matches!(lifecycle.mark_unread(&id).await, Err(Error::AlertNotFound(_))));
  }

  #[tokio::test]
  async fn supersede_retires_types_missing_from_the_latest_run() {
    let (_, lifecycle, child_id) = setup().await;
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    let sleep = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap();

    let combined = CategoryAlert::new(
      AlertType::Combined,
      Severity::Error,
      guidance::combined_title(Severity::Error),
      "Several patterns showed up together this week: shortened sleep, reduced appetite.",
      guidance::combined_suggestions(Severity::Error),
    );
    lifecycle.create(&combined, child_id, &window).await.unwrap();

    let retired = lifecycle
      .supersede(child_id, &window, std::slice::from_ref(&combined))
      .await
      .unwrap();
    assert_eq!(retired, 1);

    let timeline = lifecycle.timeline(child_id).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].alert_type, AlertType::Combined);
    assert_eq!(lifecycle.unread_count(child_id).await.unwrap(), 1);
    assert!(matches!(
      lifecycle.mark_read(&sleep.alert_id.to_string()).await,
      Err(Error::AlertNotFound(_))
    ));

    // Raising the type again brings the same row back.
    let again = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap();
    assert_eq!(again.alert_id, sleep.alert_id);
    assert!(again.is_live());
  }

  #[tokio::test]
  async fn unknown_child_has_no_timeline() {
    let (_, lifecycle, _) = setup().await;
    assert!(matches!(lifecycle.timeline(42).await, Err(Error::ChildNotFound(42))));
  }

  #[tokio::test]
  async fn backend_failures_keep_their_message() {
    let (store, lifecycle, child_id) = setup().await;
    store.fail_alert_writes();
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    let err = lifecycle.create(&sleep_alert(), child_id, &window).await.unwrap_err();
    match err {
      Error::Storage { detail, .. } => assert!(detail.contains("write rejected"), "{detail}"),
      other => panic!("unexpected error: {other:?}"),
    }
  }
}

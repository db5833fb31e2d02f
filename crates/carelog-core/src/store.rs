//! The `CareStore` trait: everything the engine needs from persistence.
//!
//! Implemented by storage backends (e.g. `carelog-store-sqlite`). The
//! analyzer, the alert lifecycle and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  alert::{AlertDraft, AlertType, PersistedAlert},
  checkin::{Category, CheckIn, NewCheckIn},
  child::{Child, ChildId, NewChild},
  date::DateKey,
};

/// Abstraction over a carelog storage backend.
///
/// Check-ins are append-only. Alerts are written by upsert and never
/// physically removed; deletion only stamps `deleted_at`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CareStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Children ──────────────────────────────────────────────────────────

  fn add_child(
    &self,
    input: NewChild,
  ) -> impl Future<Output = Result<Child, Self::Error>> + Send + '_;

  /// Returns `None` if no such child exists.
  fn get_child(
    &self,
    child_id: ChildId,
  ) -> impl Future<Output = Result<Option<Child>, Self::Error>> + Send + '_;

  // ── Check-ins ─────────────────────────────────────────────────────────

  /// Persist a check-in. The identifier and `recorded_at` are set by the
  /// store.
  fn record_check_in(
    &self,
    input: NewCheckIn,
  ) -> impl Future<Output = Result<CheckIn, Self::Error>> + Send + '_;

  /// All check-ins of one category whose local date is `date`, oldest first.
  fn check_ins_for_day(
    &self,
    child_id: ChildId,
    category: Category,
    date: DateKey,
  ) -> impl Future<Output = Result<Vec<CheckIn>, Self::Error>> + Send + '_;

  // ── Alerts ────────────────────────────────────────────────────────────

  /// Insert, or update the row already held for
  /// `(child_id, alert_type, analysis_date)`. An update keeps the id,
  /// `created_at`, the read state and any soft deletion, and clears
  /// `superseded_at`.
  fn upsert_alert(
    &self,
    draft: AlertDraft,
  ) -> impl Future<Output = Result<PersistedAlert, Self::Error>> + Send + '_;

  /// Stamp `superseded_at` on the live alerts of `(child_id, analysis_date)`
  /// whose type is not in `keep`. Returns the number of alerts changed.
  fn supersede_alerts(
    &self,
    child_id: ChildId,
    analysis_date: DateKey,
    keep: Vec<AlertType>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Live alerts (neither deleted nor superseded), newest first.
  fn list_alerts(
    &self,
    child_id: ChildId,
  ) -> impl Future<Output = Result<Vec<PersistedAlert>, Self::Error>> + Send + '_;

  /// Live alerts that have not been read.
  fn unread_count(
    &self,
    child_id: ChildId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Set the read flag and stamp (or clear) `read_at`. Returns `None` if
  /// the alert does not exist or is no longer live.
  fn set_read(
    &self,
    alert_id: Uuid,
    is_read: bool,
  ) -> impl Future<Output = Result<Option<PersistedAlert>, Self::Error>> + Send + '_;

  /// Stamp `deleted_at` if it is not already set. Returns `None` if the
  /// alert does not exist.
  fn soft_delete_alert(
    &self,
    alert_id: Uuid,
  ) -> impl Future<Output = Result<Option<PersistedAlert>, Self::Error>> + Send + '_;
}

//! Handlers for `/health-alerts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/health-alerts/timeline/:child_id` | Newest first, deleted excluded |
//! | `GET`    | `/health-alerts/unread-count/:child_id` | `{"child_id":..,"unread_count":..}` |
//! | `PUT`    | `/health-alerts/:id/read` | Body: `{"is_read":true}` |
//! | `DELETE` | `/health-alerts/:id` | Soft delete |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use carelog_core::{Analyzer, alert::PersistedAlert, child::ChildId, store::CareStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /health-alerts/timeline/:child_id`
pub async fn timeline<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(child_id): Path<ChildId>,
) -> Result<Json<Vec<PersistedAlert>>, ApiError>
where
  S: CareStore + 'static,
{
  Ok(Json(analyzer.lifecycle().timeline(child_id).await?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCount {
  pub child_id:     ChildId,
  pub unread_count: u64,
}

/// `GET /health-alerts/unread-count/:child_id`
pub async fn unread_count<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(child_id): Path<ChildId>,
) -> Result<Json<UnreadCount>, ApiError>
where
  S: CareStore + 'static,
{
  let unread_count = analyzer.lifecycle().unread_count(child_id).await?;
  Ok(Json(UnreadCount { child_id, unread_count }))
}

#[derive(Debug, Deserialize)]
pub struct ReadBody {
  #[serde(default = "default_is_read")]
  pub is_read: bool,
}

fn default_is_read() -> bool { true }

/// `PUT /health-alerts/:id/read`. The id stays a string so placeholders are
/// rejected with a 400 rather than a routing error.
pub async fn set_read<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(alert_id): Path<String>,
  Json(body): Json<ReadBody>,
) -> Result<Json<PersistedAlert>, ApiError>
where
  S: CareStore + 'static,
{
  Ok(Json(analyzer.lifecycle().set_read(&alert_id, body.is_read).await?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
  pub message:  String,
  pub alert_id: Uuid,
}

/// `DELETE /health-alerts/:id`
pub async fn delete<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(alert_id): Path<String>,
) -> Result<Json<Deleted>, ApiError>
where
  S: CareStore + 'static,
{
  let alert = analyzer.lifecycle().delete(&alert_id).await?;
  Ok(Json(Deleted { message: "Alert deleted".into(), alert_id: alert.alert_id }))
}

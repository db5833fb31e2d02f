//! Handler for `POST /children/:id/analysis`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use carelog_core::{Analysis, Analyzer, child::ChildId, store::CareStore};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AnalysisBody {
  /// Reference date, `YYYY-MM-DD`; the window ends on this day.
  pub date: String,
}

/// Runs detection over the seven days ending at `date`. A failed save is
/// reported in `persistence_error`; the detected alerts are returned anyway.
pub async fn run<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(child_id): Path<ChildId>,
  Json(body): Json<AnalysisBody>,
) -> Result<Json<Analysis>, ApiError>
where
  S: CareStore + 'static,
{
  Ok(Json(analyzer.analyze(child_id, &body.date).await?))
}

//! Handlers for check-in endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/check-ins` | Body: [`NewCheckIn`]; returns 201 + stored check-in |
//! | `GET`  | `/children/:id/check-ins` | `?date=YYYY-MM-DD` required; optional `kind` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use carelog_core::{
  Analyzer,
  checkin::{Category, CheckIn, NewCheckIn},
  child::ChildId,
  date::DateKey,
  store::CareStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `POST /check-ins`. Recording drops the cached aggregates of that day.
pub async fn create<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Json(body): Json<NewCheckIn>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CareStore + 'static,
{
  let check_in = analyzer.record_check_in(body).await?;
  Ok((StatusCode::CREATED, Json(check_in)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub date: String,
  /// One of `meals`, `sleep`, `poop`, `health`. All four when absent.
  pub kind: Option<Category>,
}

/// `GET /children/:id/check-ins?date=<date>[&kind=<category>]`
pub async fn list<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(child_id): Path<ChildId>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CheckIn>>, ApiError>
where
  S: CareStore + 'static,
{
  let date: DateKey = params.date.parse()?;
  let categories = match params.kind {
    Some(kind) => vec![kind],
    None => Category::ALL.to_vec(),
  };

  let mut check_ins = Vec::new();
  for category in categories {
    let day = analyzer
      .store()
      .check_ins_for_day(child_id, category, date)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    check_ins.extend(day);
  }
  check_ins.sort_by_key(|c| c.logged_at);
  Ok(Json(check_ins))
}

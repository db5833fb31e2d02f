//! Handlers for `/children` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/children` | Body: `{"name":"...","birth_date":"YYYY-MM-DD"}`; returns 201 |
//! | `GET`  | `/children/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use carelog_core::{
  Analyzer,
  child::{Child, ChildId, NewChild},
  store::CareStore,
};

use crate::error::ApiError;

/// `POST /children`
pub async fn create<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Json(body): Json<NewChild>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CareStore + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let child = analyzer
    .store()
    .add_child(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(child)))
}

/// `GET /children/:id`
pub async fn get_one<S>(
  State(analyzer): State<Arc<Analyzer<S>>>,
  Path(id): Path<ChildId>,
) -> Result<Json<Child>, ApiError>
where
  S: CareStore + 'static,
{
  let child = analyzer
    .store()
    .get_child(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("child {id} not found")))?;
  Ok(Json(child))
}

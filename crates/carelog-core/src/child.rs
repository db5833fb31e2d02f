//! Child: the profile every check-in and alert hangs off.
//!
//! Profile management belongs to a collaborator; the engine only needs the
//! identifier and a display name to interpolate into alert copy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Children are identified by the integer key of the profile store.
pub type ChildId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
  pub child_id:   ChildId,
  pub name:       String,
  pub birth_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::CareStore::add_child`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewChild {
  pub name:       String,
  #[serde(default)]
  pub birth_date: Option<NaiveDate>,
}

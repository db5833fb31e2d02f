//! Error types for `carelog-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::child::ChildId;

#[derive(Debug, Error)]
pub enum Error {
  /// The reference date of an analysis could not be turned into a window.
  #[error("invalid analysis date: {0}")]
  InvalidWindowInput(String),

  /// An alert identifier was empty, a placeholder, or not a UUID. Raised
  /// before any store call is made.
  #[error("invalid alert identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("invalid check-in: {0}")]
  InvalidCheckIn(String),

  /// A stored or submitted label did not name a known variant.
  #[error("unrecognised value: {0}")]
  UnknownValue(String),

  #[error("alert not found: {0}")]
  AlertNotFound(Uuid),

  #[error("child not found: {0}")]
  ChildNotFound(ChildId),

  /// The persistence collaborator failed. `detail` keeps the backend's own
  /// message so callers can show it.
  #[error("storage error: {detail}")]
  Storage {
    detail: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error, preserving its message.
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage { detail: err.to_string(), source: Box::new(err) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

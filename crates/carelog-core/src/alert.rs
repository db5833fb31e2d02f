//! Alert types: what the detectors produce and what the store keeps.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, checkin::Category, child::ChildId, date::DateKey};

// ─── Severity ────────────────────────────────────────────────────────────────

/// Ordered `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Warning,
  Error,
}

impl Severity {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Info => "info",
      Self::Warning => "warning",
      Self::Error => "error",
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Severity {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "info" => Ok(Self::Info),
      "warning" => Ok(Self::Warning),
      "error" => Ok(Self::Error),
      other => Err(Error::UnknownValue(format!("unknown severity: {other:?}"))),
    }
  }
}

// ─── Alert type ──────────────────────────────────────────────────────────────

/// Which detector raised an alert, or `Combined` when the combiner merged
/// several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
  Meals,
  Sleep,
  Poop,
  Health,
  Combined,
}

impl AlertType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Meals => "meals",
      Self::Sleep => "sleep",
      Self::Poop => "poop",
      Self::Health => "health",
      Self::Combined => "combined",
    }
  }

  pub fn category(self) -> Option<Category> {
    match self {
      Self::Meals => Some(Category::Meals),
      Self::Sleep => Some(Category::Sleep),
      Self::Poop => Some(Category::Poop),
      Self::Health => Some(Category::Health),
      Self::Combined => None,
    }
  }
}

impl From<Category> for AlertType {
  fn from(c: Category) -> Self {
    match c {
      Category::Meals => Self::Meals,
      Category::Sleep => Self::Sleep,
      Category::Poop => Self::Poop,
      Category::Health => Self::Health,
    }
  }
}

impl fmt::Display for AlertType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for AlertType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "combined" => Ok(Self::Combined),
      other => other.parse::<Category>().map(Self::from),
    }
  }
}

// ─── Category alert ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
  pub id:      u32,
  pub title:   String,
  pub content: String,
}

/// An in-memory detection result, before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAlert {
  /// Stable within one run: `<alert_type>-<severity>`.
  pub id:          String,
  pub alert_type:  AlertType,
  pub title:       String,
  pub description: String,
  pub severity:    Severity,
  pub suggestions: Vec<Suggestion>,
}

impl CategoryAlert {
  pub fn new(
    alert_type: AlertType,
    severity: Severity,
    title: impl Into<String>,
    description: impl Into<String>,
    suggestions: Vec<Suggestion>,
  ) -> Self {
    Self {
      id: format!("{alert_type}-{severity}"),
      alert_type,
      title: title.into(),
      description: description.into(),
      severity,
      suggestions,
    }
  }
}

// ─── Persisted alert ─────────────────────────────────────────────────────────

/// The record the engine writes for one alert. Field names match the
/// `health_alerts` wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDraft {
  pub child_id:          ChildId,
  pub alert_type:        AlertType,
  pub title:             String,
  pub description:       String,
  pub severity:          Severity,
  pub suggestions:       Vec<Suggestion>,
  pub analysis_date:     DateKey,
  pub data_period_start: DateKey,
  pub data_period_end:   DateKey,
}

/// A stored alert with its read/delete lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedAlert {
  pub alert_id:          Uuid,
  pub child_id:          ChildId,
  pub alert_type:        AlertType,
  pub title:             String,
  pub description:       String,
  pub severity:          Severity,
  pub suggestions:       Vec<Suggestion>,
  pub analysis_date:     DateKey,
  pub data_period_start: DateKey,
  pub data_period_end:   DateKey,
  pub is_read:           bool,
  pub read_at:           Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
  /// Set when the caregiver dismisses the alert; the row is kept.
  pub deleted_at:        Option<DateTime<Utc>>,
  /// Set when a later run for the same analysis date no longer raised this
  /// alert type. Cleared again if a run raises it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub superseded_at:     Option<DateTime<Utc>>,
}

impl PersistedAlert {
  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

  /// Neither dismissed nor superseded; shown on the timeline.
  pub fn is_live(&self) -> bool { self.deleted_at.is_none() && self.superseded_at.is_none() }
}

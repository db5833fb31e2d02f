//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Instants are stored as RFC 3339 strings with microsecond precision, so
//! lexical order is chronological order. Calendar dates are `YYYY-MM-DD`.
//! Payloads and suggestion lists are compact JSON. UUIDs are hyphenated
//! lowercase strings.

use carelog_core::{
  alert::{AlertType, PersistedAlert, Severity, Suggestion},
  checkin::{CheckIn, Entry},
  child::{Child, ChildId},
  date::DateKey,
};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Instants ────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  decode_local_dt(s).map(|dt| dt.with_timezone(&Utc))
}

/// Keeps the caregiver's offset.
pub fn encode_local_dt(dt: DateTime<FixedOffset>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, false)
}

pub fn decode_local_dt(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: DateKey) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<DateKey> {
  s.parse().map_err(|_| Error::DateParse(format!("not a date: {s:?}")))
}

fn decode_birth_date(s: &str) -> Result<NaiveDate> {
  decode_date(s).map(DateKey::date)
}

// ─── Labels ──────────────────────────────────────────────────────────────────

pub fn decode_severity(s: &str) -> Result<Severity> {
  s.parse().map_err(|_| Error::Decode { column: "severity", value: s.to_owned() })
}

pub fn decode_alert_type(s: &str) -> Result<AlertType> {
  s.parse().map_err(|_| Error::Decode { column: "alert_type", value: s.to_owned() })
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

pub fn encode_suggestions(s: &[Suggestion]) -> Result<String> { Ok(serde_json::to_string(s)?) }

/// A JSON array of alert type labels, for `json_each` membership tests.
pub fn encode_alert_types(types: &[AlertType]) -> Result<String> {
  let labels: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
  Ok(serde_json::to_string(&labels)?)
}

pub fn decode_suggestions(s: &str) -> Result<Vec<Suggestion>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const CHILD_COLUMNS: &str = "child_id, name, birth_date, created_at";

/// Raw values read directly from a `children` row.
pub struct RawChild {
  pub child_id:   ChildId,
  pub name:       String,
  pub birth_date: Option<String>,
  pub created_at: String,
}

impl RawChild {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      child_id:   row.get(0)?,
      name:       row.get(1)?,
      birth_date: row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_child(self) -> Result<Child> {
    Ok(Child {
      child_id:   self.child_id,
      name:       self.name,
      birth_date: self.birth_date.as_deref().map(decode_birth_date).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const CHECK_IN_COLUMNS: &str =
  "check_in_id, child_id, kind, payload_json, logged_at, recorded_at";

/// Raw values read directly from a `check_ins` row.
pub struct RawCheckIn {
  pub check_in_id:  String,
  pub child_id:     ChildId,
  pub kind:         String,
  pub payload_json: String,
  pub logged_at:    String,
  pub recorded_at:  String,
}

impl RawCheckIn {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      check_in_id:  row.get(0)?,
      child_id:     row.get(1)?,
      kind:         row.get(2)?,
      payload_json: row.get(3)?,
      logged_at:    row.get(4)?,
      recorded_at:  row.get(5)?,
    })
  }

  pub fn into_check_in(self) -> Result<CheckIn> {
    let payload: serde_json::Value = serde_json::from_str(&self.payload_json)?;
    Ok(CheckIn {
      check_in_id: decode_uuid(&self.check_in_id)?,
      child_id:    self.child_id,
      logged_at:   decode_local_dt(&self.logged_at)?,
      recorded_at: decode_dt(&self.recorded_at)?,
      entry:       Entry::from_parts(&self.kind, payload)?,
    })
  }
}

pub const ALERT_COLUMNS: &str = "alert_id, child_id, alert_type, title, description, severity, \
   suggestions_json, analysis_date, data_period_start, data_period_end, is_read, read_at, \
   created_at, deleted_at, superseded_at";

/// Raw values read directly from a `health_alerts` row.
pub struct RawAlert {
  pub alert_id:          String,
  pub child_id:          ChildId,
  pub alert_type:        String,
  pub title:             String,
  pub description:       String,
  pub severity:          String,
  pub suggestions_json:  String,
  pub analysis_date:     String,
  pub data_period_start: String,
  pub data_period_end:   String,
  pub is_read:           bool,
  pub read_at:           Option<String>,
  pub created_at:        String,
  pub deleted_at:        Option<String>,
  pub superseded_at:     Option<String>,
}

impl RawAlert {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      alert_id:          row.get(0)?,
      child_id:          row.get(1)?,
      alert_type:        row.get(2)?,
      title:             row.get(3)?,
      description:       row.get(4)?,
      severity:          row.get(5)?,
      suggestions_json:  row.get(6)?,
      analysis_date:     row.get(7)?,
      data_period_start: row.get(8)?,
      data_period_end:   row.get(9)?,
      is_read:           row.get(10)?,
      read_at:           row.get(11)?,
      created_at:        row.get(12)?,
      deleted_at:        row.get(13)?,
      superseded_at:     row.get(14)?,
    })
  }

  pub fn into_alert(self) -> Result<PersistedAlert> {
    Ok(PersistedAlert {
      alert_id:          decode_uuid(&self.alert_id)?,
      child_id:          self.child_id,
      alert_type:        decode_alert_type(&self.alert_type)?,
      title:             self.title,
      description:       self.description,
      severity:          decode_severity(&self.severity)?,
      suggestions:       decode_suggestions(&self.suggestions_json)?,
      analysis_date:     decode_date(&self.analysis_date)?,
      data_period_start: decode_date(&self.data_period_start)?,
      data_period_end:   decode_date(&self.data_period_end)?,
      is_read:           self.is_read,
      read_at:           self.read_at.as_deref().map(decode_dt).transpose()?,
      created_at:        decode_dt(&self.created_at)?,
      deleted_at:        self.deleted_at.as_deref().map(decode_dt).transpose()?,
      superseded_at:     self.superseded_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

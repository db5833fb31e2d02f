//! Check-in types: the immutable facts a caregiver logs about a child.
//!
//! A check-in is written once and never updated. Every derived number in the
//! system (daily aggregates, pattern alerts) is recomputed from these rows.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, child::ChildId, date::DateKey};

// ─── Category ────────────────────────────────────────────────────────────────

/// The four tracked streams. The lowercase name doubles as the `alert_type`
/// slug of alerts raised for the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Meals,
  Sleep,
  Poop,
  Health,
}

impl Category {
  pub const ALL: [Category; 4] =
    [Category::Meals, Category::Sleep, Category::Poop, Category::Health];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Meals => "meals",
      Self::Sleep => "sleep",
      Self::Poop => "poop",
      Self::Health => "health",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Category {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "meals" => Ok(Self::Meals),
      "sleep" => Ok(Self::Sleep),
      "poop" => Ok(Self::Poop),
      "health" => Ok(Self::Health),
      other => Err(Error::UnknownValue(format!("unknown category: {other:?}"))),
    }
  }
}

// ─── Meal ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
  Breakfast,
  Lunch,
  Dinner,
}

impl MealSlot {
  pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];
}

/// How much of a meal was eaten, in quarter steps: 0, 25, 50, 75 or 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Consumption(u8);

impl Consumption {
  pub const LEVELS: [u8; 5] = [0, 25, 50, 75, 100];

  pub fn percent(self) -> u8 { self.0 }
}

impl TryFrom<u8> for Consumption {
  type Error = Error;

  fn try_from(level: u8) -> Result<Self> {
    if Self::LEVELS.contains(&level) {
      Ok(Self(level))
    } else {
      Err(Error::InvalidCheckIn(format!(
        "consumption level must be one of 0, 25, 50, 75, 100 (got {level})"
      )))
    }
  }
}

impl From<Consumption> for u8 {
  fn from(c: Consumption) -> Self { c.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
  Milk,
  Solid,
  Mixed,
  Others,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
  pub slot:        MealSlot,
  pub consumption: Consumption,
  pub category:    MealCategory,
  #[serde(default)]
  pub note:        Option<String>,
}

// ─── Sleep ───────────────────────────────────────────────────────────────────

/// One sleep session. Times keep the logging device's UTC offset so the start
/// hour reads as local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepEntry {
  pub start_time: DateTime<FixedOffset>,
  pub end_time:   DateTime<FixedOffset>,
  #[serde(default)]
  pub note:       Option<String>,
}

// ─── Poop ────────────────────────────────────────────────────────────────────

/// A bowel movement. Color and texture are free-form labels from the lookup
/// tables; classification happens in [`crate::stool`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoopEntry {
  pub color:   String,
  pub texture: String,
  #[serde(default)]
  pub note:    Option<String>,
}

// ─── Symptom ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEntry {
  pub symptoms: Vec<String>,
  #[serde(default)]
  pub note:     Option<String>,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// The typed payload of a check-in. The variant name is the `kind` column
/// stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Entry {
  Meal(MealEntry),
  Sleep(SleepEntry),
  Poop(PoopEntry),
  Symptom(SymptomEntry),
}

impl Entry {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Meal(_) => "meal",
      Self::Sleep(_) => "sleep",
      Self::Poop(_) => "poop",
      Self::Symptom(_) => "symptom",
    }
  }

  pub fn category(&self) -> Category {
    match self {
      Self::Meal(_) => Category::Meals,
      Self::Sleep(_) => Category::Sleep,
      Self::Poop(_) => Category::Poop,
      Self::Symptom(_) => Category::Health,
    }
  }

  /// Serialise the inner payload (without the kind tag) for the
  /// `payload_json` column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Rebuild from the discriminant and JSON payload stored in the database.
  pub fn from_parts(discriminant: &str, data: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({ "kind": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }

  /// Reject payloads that cannot describe a real event.
  pub fn validate(&self) -> Result<()> {
    match self {
      Self::Sleep(s) if s.end_time < s.start_time => Err(Error::InvalidCheckIn(format!(
        "sleep ends ({}) before it starts ({})",
        s.end_time, s.start_time
      ))),
      Self::Poop(p) if p.color.trim().is_empty() && p.texture.trim().is_empty() => {
        Err(Error::InvalidCheckIn("stool entry needs a color or a texture".into()))
      }
      _ => Ok(()),
    }
  }
}

/// The discriminant a category's check-ins are stored under.
pub fn discriminant_for(category: Category) -> &'static str {
  match category {
    Category::Meals => "meal",
    Category::Sleep => "sleep",
    Category::Poop => "poop",
    Category::Health => "symptom",
  }
}

// ─── CheckIn ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
  pub check_in_id: Uuid,
  pub child_id:    ChildId,
  /// When the event happened, in the caregiver's local offset.
  pub logged_at:   DateTime<FixedOffset>,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at: DateTime<Utc>,
  pub entry:       Entry,
}

impl CheckIn {
  /// The local calendar day this check-in belongs to.
  pub fn date_key(&self) -> DateKey { local_date_key(&self.logged_at) }
}

pub fn local_date_key(at: &DateTime<FixedOffset>) -> DateKey {
  DateKey::new(at.date_naive())
}

/// Input to [`crate::store::CareStore::record_check_in`].
/// `recorded_at` and the identifier are set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCheckIn {
  pub child_id:  ChildId,
  pub logged_at: DateTime<FixedOffset>,
  pub entry:     Entry,
}

impl NewCheckIn {
  pub fn new(child_id: ChildId, logged_at: DateTime<FixedOffset>, entry: Entry) -> Self {
    Self { child_id, logged_at, entry }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(s: &str) -> DateTime<FixedOffset> { DateTime::parse_from_rfc3339(s).unwrap() }

  #[test]
  fn consumption_accepts_only_quarter_steps() {
    assert!(Consumption::try_from(75).is_ok());
    assert!(Consumption::try_from(60).is_err());
    assert!(serde_json::from_str::<Consumption>("101").is_err());
    assert_eq!(serde_json::from_str::<Consumption>("50").unwrap().percent(), 50);
  }

  #[test]
  fn entry_payload_splits_and_rejoins() {
    let entry = Entry::Poop(PoopEntry {
      color:   "brown".into(),
      texture: "soft".into(),
      note:    None,
    });
    let data = entry.to_json().unwrap();
    assert_eq!(data["texture"], "soft");
    let back = Entry::from_parts(entry.discriminant(), data).unwrap();
    assert_eq!(back, entry);
  }

  #[test]
  fn local_date_uses_logged_offset() {
    // 23:30 on the 18th in UTC+8 is still the 18th locally.
    let check_in = CheckIn {
      check_in_id: Uuid::new_v4(),
      child_id:    1,
      logged_at:   at("2025-06-18T23:30:00+08:00"),
      recorded_at: Utc::now(),
      entry:       Entry::Symptom(SymptomEntry { symptoms: vec![], note: None }),
    };
    assert_eq!(check_in.date_key().to_string(), "2025-06-18");
  }

  #[test]
  fn sleep_ending_before_start_is_invalid() {
    let entry = Entry::Sleep(SleepEntry {
      start_time: at("2025-06-18T20:00:00+08:00"),
      end_time:   at("2025-06-18T06:00:00+08:00"),
      note:       None,
    });
    assert!(matches!(entry.validate(), Err(Error::InvalidCheckIn(_))));
  }

  #[test]
  fn category_discriminants_line_up_with_entries() {
    let entry = Entry::Symptom(SymptomEntry { symptoms: vec!["cough".into()], note: None });
    assert_eq!(discriminant_for(entry.category()), entry.discriminant());
    assert_eq!("health".parse::<Category>().unwrap(), Category::Health);
  }
}

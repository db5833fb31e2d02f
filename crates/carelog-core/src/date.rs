//! Calendar date keys and the trailing analysis window.
//!
//! Check-ins are bucketed by a `YYYY-MM-DD` key. The window builder anchors
//! the reference date at noon before doing day arithmetic so a key can never
//! slide into the neighbouring day.

use std::{fmt, str::FromStr};

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Number of days a pattern detector looks back over, including the
/// reference date.
pub const WINDOW_DAYS: usize = 7;

const KEY_FORMAT: &str = "%Y-%m-%d";

// ─── DateKey ─────────────────────────────────────────────────────────────────

/// A calendar date, rendered and parsed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
  pub fn new(date: NaiveDate) -> Self { Self(date) }

  pub fn date(self) -> NaiveDate { self.0 }
}

impl From<NaiveDate> for DateKey {
  fn from(date: NaiveDate) -> Self { Self(date) }
}

impl fmt::Display for DateKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(KEY_FORMAT))
  }
}

impl FromStr for DateKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    NaiveDate::parse_from_str(s.trim(), KEY_FORMAT)
      .map(Self)
      .map_err(|e| Error::InvalidWindowInput(format!("{s:?}: {e}")))
  }
}

impl Serialize for DateKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for DateKey {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Window builder ──────────────────────────────────────────────────────────

/// Build `size` contiguous date keys ending at (and including) `reference`,
/// in ascending order.
pub fn build_window(reference: &str, size: usize) -> Result<Vec<DateKey>> {
  let reference: DateKey = reference.parse()?;
  window_ending_at(reference, size)
}

fn window_ending_at(reference: DateKey, size: usize) -> Result<Vec<DateKey>> {
  if size == 0 {
    return Err(Error::InvalidWindowInput("window size must be at least one day".into()));
  }

  let noon = NaiveTime::from_hms_opt(12, 0, 0)
    .ok_or_else(|| Error::InvalidWindowInput("noon anchor".into()))?;
  let anchor = reference.0.and_time(noon);

  (0..size)
    .rev()
    .map(|back| {
      let back = i64::try_from(back)
        .map_err(|_| Error::InvalidWindowInput(format!("window size {size} too large")))?;
      anchor
        .checked_sub_signed(Duration::days(back))
        .map(|dt| DateKey(dt.date()))
        .ok_or_else(|| Error::InvalidWindowInput(format!("{reference} minus {back} days")))
    })
    .collect()
}

/// The seven-day range a detector run covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
  dates: Vec<DateKey>,
}

impl AnalysisWindow {
  /// The standard [`WINDOW_DAYS`]-long window ending at `reference`.
  pub fn ending_at(reference: &str) -> Result<Self> {
    Ok(Self { dates: build_window(reference, WINDOW_DAYS)? })
  }

  pub fn ending_on(reference: DateKey) -> Result<Self> {
    Ok(Self { dates: window_ending_at(reference, WINDOW_DAYS)? })
  }

  pub fn dates(&self) -> &[DateKey] { &self.dates }

  /// First (oldest) date. The window is never empty.
  pub fn start(&self) -> DateKey { self.dates[0] }

  /// The reference date.
  pub fn end(&self) -> DateKey { self.dates[self.dates.len() - 1] }

  pub fn len(&self) -> usize { self.dates.len() }

  pub fn is_empty(&self) -> bool { self.dates.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn window_is_seven_ascending_contiguous_days() {
    let window = build_window("2025-03-04", 7).unwrap();
    assert_eq!(window.len(), 7);
    assert_eq!(window.first().unwrap().to_string(), "2025-02-26");
    assert_eq!(window.last().unwrap().to_string(), "2025-03-04");
    for pair in window.windows(2) {
      assert_eq!(pair[1].date() - pair[0].date(), Duration::days(1));
    }
  }

  #[test]
  fn window_crosses_year_and_leap_day() {
    let window = build_window("2024-03-02", 7).unwrap();
    let keys: Vec<String> = window.iter().map(ToString::to_string).collect();
    assert_eq!(keys, [
      "2024-02-25", "2024-02-26", "2024-02-27", "2024-02-28",
      "2024-02-29", "2024-03-01", "2024-03-02",
    ]);

    let window = build_window("2025-01-03", 7).unwrap();
    assert_eq!(window[0].to_string(), "2024-12-28");
  }

  #[test]
  fn window_honours_custom_size() {
    let window = build_window("2025-06-10", 3).unwrap();
    assert_eq!(window.len(), 3);
    assert_eq!(window[2].to_string(), "2025-06-10");
  }

  #[test]
  fn zero_sized_window_is_rejected() {
    assert!(matches!(
      build_window("2025-06-10", 0),
      Err(Error::InvalidWindowInput(_))
    ));
  }

  #[test]
  fn unparsable_reference_is_rejected() {
    for bad in ["", "yesterday", "2025-02-30", "2025/02/01"] {
      assert!(
        matches!(build_window(bad, 7), Err(Error::InvalidWindowInput(_))),
        "{bad:?} should be rejected"
      );
    }
  }

  #[test]
  fn analysis_window_reports_period_bounds() {
    let window = AnalysisWindow::ending_at("2025-06-19").unwrap();
    assert_eq!(window.start().to_string(), "2025-06-13");
    assert_eq!(window.end().to_string(), "2025-06-19");
    assert_eq!(window.len(), WINDOW_DAYS);
  }

  #[test]
  fn date_key_serde_uses_plain_string() {
    let key: DateKey = "2025-06-19".parse().unwrap();
    assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-06-19\"");
    let back: DateKey = serde_json::from_str("\"2025-06-19\"").unwrap();
    assert_eq!(back, key);
  }
}

//! Daily aggregates: one bundle of statistics per child, category and day.
//!
//! Aggregates are never stored. Every category has an explicit empty value so
//! that "nothing was logged" stays distinguishable from "zero was logged".

use std::collections::BTreeMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::{
  checkin::{Category, CheckIn, Entry, MealEntry, MealSlot, PoopEntry, SleepEntry, SymptomEntry},
  date::DateKey,
  stool,
};

/// Sessions starting in this hour range (inclusive) count as naps.
const NAP_START_HOURS: std::ops::RangeInclusive<u32> = 12..=18;

const NON_SYMPTOMS: &[&str] = &["none", "no symptoms", "healthy"];

// ─── Meals ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotStats {
  pub count:             u32,
  pub total_consumption: u32,
  pub avg_consumption:   f64,
  pub has_data:          bool,
}

impl SlotStats {
  pub const EMPTY: SlotStats =
    SlotStats { count: 0, total_consumption: 0, avg_consumption: 0.0, has_data: false };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDay {
  /// Always holds all three slots; unlogged slots have `has_data == false`.
  pub statistics_by_slot: BTreeMap<MealSlot, SlotStats>,
}

impl MealDay {
  pub fn empty() -> Self {
    Self {
      statistics_by_slot: MealSlot::ALL.iter().map(|s| (*s, SlotStats::EMPTY)).collect(),
    }
  }

  pub fn has_data(&self) -> bool { self.statistics_by_slot.values().any(|s| s.has_data) }

  pub fn meal_count(&self) -> u32 { self.statistics_by_slot.values().map(|s| s.count).sum() }

  /// Rounded average consumption per slot, for slots that have data.
  pub fn percentages_by_slot(&self) -> BTreeMap<MealSlot, u8> {
    self
      .statistics_by_slot
      .iter()
      .filter(|(_, s)| s.has_data)
      .map(|(slot, s)| (*slot, s.avg_consumption.round().clamp(0.0, 100.0) as u8))
      .collect()
  }

  /// The day's intake, weighting each slot by how many meals it holds.
  /// `None` when nothing was logged.
  pub fn weighted_average(&self) -> Option<f64> {
    let count = self.meal_count();
    if count == 0 {
      return None;
    }
    let weighted: f64 = self
      .statistics_by_slot
      .values()
      .map(|s| s.avg_consumption * f64::from(s.count))
      .sum();
    Some(weighted / f64::from(count))
  }
}

pub fn aggregate_meals(records: &[CheckIn], date: DateKey) -> MealDay {
  let mut day = MealDay::empty();
  for meal in entries_on(records, date, |e| match e {
    Entry::Meal(m) => Some(m),
    _ => None,
  }) {
    let MealEntry { slot, consumption, .. } = meal;
    let stats = day.statistics_by_slot.entry(*slot).or_insert(SlotStats::EMPTY);
    stats.count += 1;
    stats.total_consumption += u32::from(consumption.percent());
    stats.has_data = true;
  }
  for stats in day.statistics_by_slot.values_mut().filter(|s| s.count > 0) {
    stats.avg_consumption = f64::from(stats.total_consumption) / f64::from(stats.count);
  }
  day
}

// ─── Sleep ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepDay {
  pub night_hours:   f64,
  pub nap_hours:     f64,
  pub total_hours:   f64,
  pub session_count: u32,
  /// `session_count - 1`: gaps between logged sessions stand in for wakings.
  /// Naps count as gaps too, so this overstates true night wakings.
  pub wake_count:    u32,
}

impl SleepDay {
  pub const EMPTY: SleepDay = SleepDay {
    night_hours:   0.0,
    nap_hours:     0.0,
    total_hours:   0.0,
    session_count: 0,
    wake_count:    0,
  };

  pub fn has_data(&self) -> bool { self.session_count > 0 }
}

pub fn aggregate_sleep(records: &[CheckIn], date: DateKey) -> SleepDay {
  let mut night = 0.0_f64;
  let mut nap = 0.0_f64;
  let mut sessions = 0_u32;

  for record in records.iter().filter(|r| r.date_key() == date) {
    let Entry::Sleep(SleepEntry { start_time, end_time, .. }) = &record.entry else {
      continue;
    };
    sessions += 1;

    let minutes = (*end_time - *start_time).num_minutes();
    let hours = if minutes < 0 {
      tracing::warn!(
        check_in_id = %record.check_in_id,
        "sleep session ends before it starts; counting zero hours"
      );
      0.0
    } else {
      minutes as f64 / 60.0
    };

    if NAP_START_HOURS.contains(&start_time.hour()) {
      nap += hours;
    } else {
      night += hours;
    }
  }

  SleepDay {
    night_hours:   round_tenth(night),
    nap_hours:     round_tenth(nap),
    total_hours:   round_tenth(night + nap),
    session_count: sessions,
    wake_count:    sessions.saturating_sub(1),
  }
}

fn round_tenth(hours: f64) -> f64 { (hours * 10.0).round() / 10.0 }

// ─── Poop ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoopDay {
  pub count:         u32,
  pub normal_count:  u32,
  pub unusual_count: u32,
  /// Whether this day counts as observed. True whenever a movement was
  /// logged; the analyzer may also set it for stool-free days it knows the
  /// caregiver was tracking, which is how "no movement" becomes visible.
  pub tracked:       bool,
}

impl PoopDay {
  pub const EMPTY: PoopDay =
    PoopDay { count: 0, normal_count: 0, unusual_count: 0, tracked: false };

  pub fn has_data(&self) -> bool { self.tracked || self.count > 0 }
}

pub fn aggregate_poop(records: &[CheckIn], date: DateKey) -> PoopDay {
  let mut day = PoopDay::EMPTY;
  for entry in entries_on(records, date, |e| match e {
    Entry::Poop(p) => Some(p),
    _ => None,
  }) {
    let entry: &PoopEntry = entry;
    day.count += 1;
    if stool::classify_entry(entry).is_normal() {
      day.normal_count += 1;
    } else {
      day.unusual_count += 1;
    }
  }
  day.tracked = day.count > 0;
  day
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeverGrade {
  Low,
  High,
}

/// Headline status of a day, most serious first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
  Healthy,
  HighFever,
  LowFever,
  ColdSymptoms,
  Allergies,
  MildSymptoms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDay {
  pub status:        HealthStatus,
  pub symptoms:      Vec<String>,
  pub symptom_count: u32,
  pub fever:         Option<FeverGrade>,
  /// At least one symptom check-in exists for the day, even a symptom-free
  /// one.
  pub has_data:      bool,
}

impl HealthDay {
  pub fn empty() -> Self {
    Self {
      status:        HealthStatus::Healthy,
      symptoms:      Vec::new(),
      symptom_count: 0,
      fever:         None,
      has_data:      false,
    }
  }

  pub fn has_fever(&self) -> bool { self.fever.is_some() }
}

pub fn aggregate_health(records: &[CheckIn], date: DateKey) -> HealthDay {
  let mut day = HealthDay::empty();
  for entry in entries_on(records, date, |e| match e {
    Entry::Symptom(s) => Some(s),
    _ => None,
  }) {
    let SymptomEntry { symptoms, .. } = entry;
    day.has_data = true;
    day.symptoms.extend(
      symptoms
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && !NON_SYMPTOMS.contains(&s.as_str())),
    );
  }

  day.symptom_count = day.symptoms.len() as u32;
  let any = |needles: &[&str]| day.symptoms.iter().any(|s| needles.iter().any(|n| s.contains(n)));

  day.fever = if any(&["high fever", "critical fever"]) {
    Some(FeverGrade::High)
  } else if any(&["fever"]) {
    Some(FeverGrade::Low)
  } else {
    None
  };

  day.status = match day.fever {
    Some(FeverGrade::High) => HealthStatus::HighFever,
    Some(FeverGrade::Low) => HealthStatus::LowFever,
    None if day.symptom_count == 0 => HealthStatus::Healthy,
    None if any(&["cough", "cold"]) => HealthStatus::ColdSymptoms,
    None if any(&["rash", "allerg"]) => HealthStatus::Allergies,
    None => HealthStatus::MildSymptoms,
  };
  day
}

// ─── DailyAggregate ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum DailyAggregate {
  Meals(MealDay),
  Sleep(SleepDay),
  Poop(PoopDay),
  Health(HealthDay),
}

impl DailyAggregate {
  /// The "nothing logged" value for `category`.
  pub fn empty(category: Category) -> Self {
    match category {
      Category::Meals => Self::Meals(MealDay::empty()),
      Category::Sleep => Self::Sleep(SleepDay::EMPTY),
      Category::Poop => Self::Poop(PoopDay::EMPTY),
      Category::Health => Self::Health(HealthDay::empty()),
    }
  }

  pub fn category(&self) -> Category {
    match self {
      Self::Meals(_) => Category::Meals,
      Self::Sleep(_) => Category::Sleep,
      Self::Poop(_) => Category::Poop,
      Self::Health(_) => Category::Health,
    }
  }

  pub fn has_data(&self) -> bool {
    match self {
      Self::Meals(d) => d.has_data(),
      Self::Sleep(d) => d.has_data(),
      Self::Poop(d) => d.has_data(),
      Self::Health(d) => d.has_data,
    }
  }
}

/// Reduce one day's check-ins for `category`. Records from other days or
/// other categories are ignored.
pub fn aggregate(category: Category, records: &[CheckIn], date: DateKey) -> DailyAggregate {
  match category {
    Category::Meals => DailyAggregate::Meals(aggregate_meals(records, date)),
    Category::Sleep => DailyAggregate::Sleep(aggregate_sleep(records, date)),
    Category::Poop => DailyAggregate::Poop(aggregate_poop(records, date)),
    Category::Health => DailyAggregate::Health(aggregate_health(records, date)),
  }
}

fn entries_on<'a, T, F>(records: &'a [CheckIn], date: DateKey, pick: F) -> impl Iterator<Item = &'a T>
where
  T: 'a,
  F: Fn(&'a Entry) -> Option<&'a T>,
{
  records.iter().filter(move |r| r.date_key() == date).filter_map(move |r| pick(&r.entry))
}

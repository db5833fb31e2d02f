//! Category pattern detectors.
//!
//! Every detector follows the same shape: classify each day of the window,
//! tally the classes over the days that carry data, and map the tally to a
//! tier. Days without data never count toward any threshold.

use serde::{Deserialize, Serialize};

use crate::{
  aggregate::{DailyAggregate, HealthDay, MealDay, PoopDay, SleepDay},
  alert::{AlertType, CategoryAlert, Severity},
  checkin::Category,
  guidance,
};

const MEAL_SEVERE_BELOW: f64 = 70.0;
const MEAL_CONCERNING_BELOW: f64 = 85.0;
const SLEEP_SEVERE_BELOW: f64 = 6.0;
const SLEEP_CONCERNING_BELOW: f64 = 9.0;

const FALLBACK_NAME: &str = "Your child";

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
  NoData,
  Normal,
  Concerning,
  Severe,
}

/// Bucket counts over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
  pub days_with_data: u32,
  pub normal:         u32,
  pub concerning:     u32,
  pub severe:         u32,
}

impl Tally {
  pub fn from_classes(classes: impl IntoIterator<Item = DayClass>) -> Self {
    let mut tally = Self::default();
    for class in classes {
      match class {
        DayClass::NoData => continue,
        DayClass::Normal => tally.normal += 1,
        DayClass::Concerning => tally.concerning += 1,
        DayClass::Severe => tally.severe += 1,
      }
      tally.days_with_data += 1;
    }
    tally
  }

  /// Severe is checked first and wins over moderate.
  pub fn tier(&self) -> Option<Tier> {
    let Self { days_with_data, concerning, severe, .. } = *self;
    if severe >= 2 && days_with_data >= 3 {
      Some(Tier::Severe)
    } else if (concerning >= 3 || (severe >= 1 && concerning >= 2)) && days_with_data >= 4 {
      Some(Tier::Moderate)
    } else {
      None
    }
  }

  /// Days that were not normal.
  pub fn flagged(&self) -> u32 { self.concerning + self.severe }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
  Severe,
  Moderate,
}

impl Tier {
  pub fn severity(self) -> Severity {
    match self {
      Self::Severe => Severity::Error,
      Self::Moderate => Severity::Warning,
    }
  }
}

// ─── Detector trait ──────────────────────────────────────────────────────────

pub trait PatternDetector {
  type Day;

  const CATEGORY: Category;

  fn classify(day: &Self::Day) -> DayClass;

  fn title(tier: Tier, name: &str) -> String;

  fn description(tier: Tier, tally: &Tally, name: &str) -> String;
}

/// Run detector `D` over one window of days.
pub fn detect<D: PatternDetector>(days: &[D::Day], child_name: &str) -> Option<CategoryAlert> {
  let tally = Tally::from_classes(days.iter().map(D::classify));
  let tier = tally.tier()?;
  let severity = tier.severity();

  let name = match child_name.trim() {
    "" => FALLBACK_NAME,
    trimmed => trimmed,
  };

  Some(CategoryAlert::new(
    AlertType::from(D::CATEGORY),
    severity,
    D::title(tier, name),
    D::description(tier, &tally, name),
    guidance::category_suggestions(D::CATEGORY, severity),
  ))
}

/// Dispatch on `category`, picking that category's aggregates out of `days`.
/// Aggregates of any other category are skipped.
pub fn detect_category(
  category: Category,
  days: &[DailyAggregate],
  child_name: &str,
) -> Option<CategoryAlert> {
  match category {
    Category::Meals => detect::<MealPattern>(
      &pick(days, |d| match d {
        DailyAggregate::Meals(m) => Some(m),
        _ => None,
      }),
      child_name,
    ),
    Category::Sleep => detect::<SleepPattern>(
      &pick(days, |d| match d {
        DailyAggregate::Sleep(s) => Some(s),
        _ => None,
      }),
      child_name,
    ),
    Category::Poop => detect::<StoolPattern>(
      &pick(days, |d| match d {
        DailyAggregate::Poop(p) => Some(p),
        _ => None,
      }),
      child_name,
    ),
    Category::Health => detect::<HealthPattern>(
      &pick(days, |d| match d {
        DailyAggregate::Health(h) => Some(h),
        _ => None,
      }),
      child_name,
    ),
  }
}

fn pick<'a, T: Clone + 'a>(
  days: &'a [DailyAggregate],
  f: impl Fn(&'a DailyAggregate) -> Option<&'a T>,
) -> Vec<T> {
  days.iter().filter_map(f).cloned().collect()
}

fn days(n: u32) -> &'static str { if n == 1 { "day" } else { "days" } }

// ─── Meals ───────────────────────────────────────────────────────────────────

pub struct MealPattern;

impl PatternDetector for MealPattern {
  type Day = MealDay;

  const CATEGORY: Category = Category::Meals;

  fn classify(day: &MealDay) -> DayClass {
    match day.weighted_average() {
      None => DayClass::NoData,
      Some(avg) if avg < MEAL_SEVERE_BELOW => DayClass::Severe,
      Some(avg) if avg < MEAL_CONCERNING_BELOW => DayClass::Concerning,
      Some(_) => DayClass::Normal,
    }
  }

  fn title(tier: Tier, name: &str) -> String {
    match tier {
      Tier::Severe => format!("{name}'s Appetite Has Dropped"),
      Tier::Moderate => format!("{name} Is Eating a Little Less"),
    }
  }

  fn description(tier: Tier, tally: &Tally, name: &str) -> String {
    let logged = tally.days_with_data;
    match tier {
      Tier::Severe => format!(
        "{name} finished less than 70% of meals on {} of the last {logged} logged {}.",
        tally.severe,
        days(logged),
      ),
      Tier::Moderate => format!(
        "{name} ate less than usual on {} of the last {logged} logged {}.",
        tally.flagged(),
        days(logged),
      ),
    }
  }
}

// ─── Sleep ───────────────────────────────────────────────────────────────────

pub struct SleepPattern;

impl PatternDetector for SleepPattern {
  type Day = SleepDay;

  const CATEGORY: Category = Category::Sleep;

  fn classify(day: &SleepDay) -> DayClass {
    if !day.has_data() {
      DayClass::NoData
    } else if day.total_hours < SLEEP_SEVERE_BELOW {
      DayClass::Severe
    } else if day.total_hours < SLEEP_CONCERNING_BELOW {
      DayClass::Concerning
    } else {
      DayClass::Normal
    }
  }

  fn title(tier: Tier, name: &str) -> String {
    match tier {
      Tier::Severe => format!("{name} Is Sleeping Much Less"),
      Tier::Moderate => format!("{name}'s Sleep Is Shorter Than Usual"),
    }
  }

  fn description(tier: Tier, tally: &Tally, name: &str) -> String {
    let logged = tally.days_with_data;
    match tier {
      Tier::Severe => format!(
        "{name} slept under 6 hours on {} of the last {logged} logged {}.",
        tally.severe,
        days(logged),
      ),
      Tier::Moderate => format!(
        "{name} slept less than 9 hours on {} of the last {logged} logged {}.",
        tally.flagged(),
        days(logged),
      ),
    }
  }
}

// ─── Poop ────────────────────────────────────────────────────────────────────

pub struct StoolPattern;

impl PatternDetector for StoolPattern {
  type Day = PoopDay;

  const CATEGORY: Category = Category::Poop;

  fn classify(day: &PoopDay) -> DayClass {
    if !day.has_data() {
      DayClass::NoData
    } else if day.count == 0 {
      DayClass::Severe
    } else if day.unusual_count >= 1 {
      DayClass::Concerning
    } else {
      DayClass::Normal
    }
  }

  fn title(tier: Tier, name: &str) -> String {
    match tier {
      Tier::Severe => format!("Few Bowel Movements for {name}"),
      Tier::Moderate => format!("Changes in {name}'s Stools"),
    }
  }

  fn description(tier: Tier, tally: &Tally, name: &str) -> String {
    let logged = tally.days_with_data;
    match tier {
      Tier::Severe => format!(
        "No bowel movement was logged for {name} on {} of the last {logged} tracked {}.",
        tally.severe,
        days(logged),
      ),
      Tier::Moderate => format!(
        "{name} had unusual stools on {} of the last {logged} tracked {}.",
        tally.flagged(),
        days(logged),
      ),
    }
  }
}

// ─── Health ──────────────────────────────────────────────────────────────────

pub struct HealthPattern;

impl PatternDetector for HealthPattern {
  type Day = HealthDay;

  const CATEGORY: Category = Category::Health;

  fn classify(day: &HealthDay) -> DayClass {
    if !day.has_data {
      DayClass::NoData
    } else if day.has_fever() {
      DayClass::Severe
    } else if day.symptom_count > 0 {
      DayClass::Concerning
    } else {
      DayClass::Normal
    }
  }

  fn title(tier: Tier, name: &str) -> String {
    match tier {
      Tier::Severe => format!("Repeated Fever for {name}"),
      Tier::Moderate => format!("{name} Has Ongoing Symptoms"),
    }
  }

  fn description(tier: Tier, tally: &Tally, name: &str) -> String {
    let logged = tally.days_with_data;
    match tier {
      Tier::Severe => format!(
        "A fever was logged for {name} on {} of the last {logged} logged {}.",
        tally.severe,
        days(logged),
      ),
      Tier::Moderate => format!(
        "{name} showed symptoms on {} of the last {logged} logged {}.",
        tally.flagged(),
        days(logged),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    aggregate::{aggregate_meals, fixtures::meal},
    checkin::MealSlot,
    date::build_window,
  };

  fn sleep_day(total_hours: f64) -> SleepDay {
    SleepDay { night_hours: total_hours, total_hours, session_count: 1, ..SleepDay::EMPTY }
  }

  fn poop_day(count: u32, unusual_count: u32, tracked: bool) -> PoopDay {
    PoopDay { count, normal_count: count - unusual_count, unusual_count, tracked }
  }

  fn health_day(symptoms: &[&str], fever: Option<crate::aggregate::FeverGrade>) -> HealthDay {
    HealthDay {
      symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
      symptom_count: symptoms.len() as u32,
      fever,
      has_data: true,
      ..HealthDay::empty()
    }
  }

  #[test]
  fn tier_thresholds() {
    let tally = |days_with_data, concerning, severe| Tally {
      days_with_data,
      normal: days_with_data - concerning - severe,
      concerning,
      severe,
    };
    assert_eq!(tally(3, 0, 2).tier(), Some(Tier::Severe));
    assert_eq!(tally(2, 0, 2).tier(), None);
    assert_eq!(tally(4, 3, 0).tier(), Some(Tier::Moderate));
    assert_eq!(tally(4, 2, 1).tier(), Some(Tier::Moderate));
    assert_eq!(tally(3, 3, 0).tier(), None);
    assert_eq!(tally(7, 2, 0).tier(), None);
    // Severe wins when both hold.
    assert_eq!(tally(7, 3, 2).tier(), Some(Tier::Severe));
  }

  fn lunches(levels: &[u8]) -> MealDay {
    let records: Vec<_> =
      levels.iter().map(|l| meal("2025-06-19", MealSlot::Lunch, *l)).collect();
    aggregate_meals(&records, "2025-06-19".parse().unwrap())
  }

  #[test]
  fn meal_thresholds_are_exclusive_upper_bounds() {
    let at_70 = lunches(&[100, 100, 50, 50, 50]);
    assert_eq!(at_70.weighted_average(), Some(70.0));
    assert_eq!(MealPattern::classify(&at_70), DayClass::Concerning);

    let at_85 = lunches(&[100, 100, 100, 100, 25]);
    assert_eq!(at_85.weighted_average(), Some(85.0));
    assert_eq!(MealPattern::classify(&at_85), DayClass::Normal);

    assert_eq!(MealPattern::classify(&lunches(&[100, 100, 50, 50, 25])), DayClass::Severe);
    assert_eq!(MealPattern::classify(&lunches(&[75, 75, 100])), DayClass::Concerning);
  }

  #[test]
  fn sleep_thresholds_are_exclusive_upper_bounds() {
    assert_eq!(SleepPattern::classify(&sleep_day(5.9)), DayClass::Severe);
    assert_eq!(SleepPattern::classify(&sleep_day(6.0)), DayClass::Concerning);
    assert_eq!(SleepPattern::classify(&sleep_day(8.9)), DayClass::Concerning);
    assert_eq!(SleepPattern::classify(&sleep_day(9.0)), DayClass::Normal);
  }

  #[test]
  fn three_poor_meal_days_with_four_empty_days_is_severe() {
    let window = build_window("2025-06-19", 7).unwrap();
    let records: Vec<_> = window[..3]
      .iter()
      .map(|d| meal(&d.to_string(), MealSlot::Lunch, 50))
      .collect();
    let days: Vec<MealDay> = window.iter().map(|d| aggregate_meals(&records, *d)).collect();

    let classes: Vec<DayClass> = days.iter().map(MealPattern::classify).collect();
    assert_eq!(classes.iter().filter(|c| **c == DayClass::NoData).count(), 4);

    let alert = detect::<MealPattern>(&days, "Mia").unwrap();
    assert_eq!(alert.severity, Severity::Error);
    assert_eq!(alert.alert_type, AlertType::Meals);
    assert_eq!(alert.id, "meals-error");
    assert!(alert.title.contains("Mia"));
    assert!(alert.description.contains("3 of the last 3"), "{}", alert.description);
    assert!((2..=3).contains(&alert.suggestions.len()));
  }

  #[test]
  fn short_sleep_on_three_of_seven_days_is_moderate() {
    let days: Vec<SleepDay> = [7.0, 7.0, 7.0, 9.5, 9.5, 9.5, 9.5].map(sleep_day).to_vec();
    let alert = detect::<SleepPattern>(&days, "Mia").unwrap();
    assert_eq!(alert.severity, Severity::Warning);
    assert!(alert.description.contains("3 of the last 7"));
  }

  #[test]
  fn one_poor_and_one_concerning_day_raise_nothing() {
    let mut days = vec![sleep_day(5.0), sleep_day(8.0)];
    days.extend(std::iter::repeat_n(sleep_day(10.0), 5));
    assert_eq!(detect::<SleepPattern>(&days, "Mia"), None);
  }

  #[test]
  fn days_without_data_never_count() {
    let empty = vec![SleepDay::EMPTY; 7];
    assert_eq!(detect::<SleepPattern>(&empty, "Mia"), None);

    // Two severe days are not enough evidence on their own.
    let mut days = vec![SleepDay::EMPTY; 5];
    days.extend([sleep_day(4.0), sleep_day(4.0)]);
    assert_eq!(detect::<SleepPattern>(&days, "Mia"), None);
  }

  #[test]
  fn stool_classification() {
    assert_eq!(StoolPattern::classify(&PoopDay::EMPTY), DayClass::NoData);
    assert_eq!(StoolPattern::classify(&poop_day(0, 0, true)), DayClass::Severe);
    assert_eq!(StoolPattern::classify(&poop_day(2, 1, true)), DayClass::Concerning);
    assert_eq!(StoolPattern::classify(&poop_day(2, 0, true)), DayClass::Normal);
  }

  #[test]
  fn health_classification() {
    use crate::aggregate::FeverGrade;
    assert_eq!(HealthPattern::classify(&HealthDay::empty()), DayClass::NoData);
    assert_eq!(
      HealthPattern::classify(&health_day(&["fever"], Some(FeverGrade::Low))),
      DayClass::Severe
    );
    assert_eq!(HealthPattern::classify(&health_day(&["cough"], None)), DayClass::Concerning);
    assert_eq!(HealthPattern::classify(&health_day(&[], None)), DayClass::Normal);
  }

  #[test]
  fn blank_name_falls_back() {
    let days = vec![sleep_day(4.0); 3];
    let alert = detect::<SleepPattern>(&days, "  ").unwrap();
    assert!(alert.title.starts_with(FALLBACK_NAME));
  }

  #[test]
  fn detect_category_picks_matching_aggregates() {
    let days: Vec<DailyAggregate> =
      [4.0, 4.0, 4.0].map(|h| DailyAggregate::Sleep(sleep_day(h))).to_vec();
    assert!(detect_category(Category::Sleep, &days, "Mia").is_some());
    assert!(detect_category(Category::Meals, &days, "Mia").is_none());
  }
}

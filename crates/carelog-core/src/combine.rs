//! Merging several category alerts from one analysis run.

use crate::{
  alert::{AlertType, CategoryAlert, Severity},
  guidance,
};

/// Zero or one alert passes through untouched. Two or more collapse into a
/// single `combined` alert whose severity is the highest of its inputs.
pub fn combine(alerts: Vec<CategoryAlert>) -> Vec<CategoryAlert> {
  if alerts.len() < 2 {
    return alerts;
  }

  let severity = if alerts.iter().any(|a| a.severity == Severity::Error) {
    Severity::Error
  } else {
    Severity::Warning
  };

  let descriptors: Vec<&str> = alerts.iter().map(|a| guidance::descriptor(a.alert_type)).collect();
  let description = format!(
    "Several patterns showed up together this week: {}.",
    descriptors.join(", ")
  );

  vec![CategoryAlert::new(
    AlertType::Combined,
    severity,
    guidance::combined_title(severity),
    description,
    guidance::combined_suggestions(severity),
  )]
}

/// Most severe first. The sort is stable, so equal severities keep their
/// detector order.
pub fn rank(mut alerts: Vec<CategoryAlert>) -> Vec<CategoryAlert> {
  alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
  alerts
}

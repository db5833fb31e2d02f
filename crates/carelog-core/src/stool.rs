//! Stool classification.
//!
//! A fixed rule table, checked in order; the first rule that matches decides.
//! Anything the table does not recognise is flagged, since a missed warning
//! costs more than a spurious one for an infant.

use serde::{Deserialize, Serialize};

use crate::checkin::PoopEntry;

const UNUSUAL_COLORS: &[&str] = &["red", "black", "white", "pale", "clay", "green", "gray", "grey"];
const FIRM_TEXTURES: &[&str] = &["hard", "pellets", "lumpy", "cracked"];
const NORMAL_TEXTURES: &[&str] = &["sausage", "smooth", "soft", "formed", "log"];
const LOOSE_TEXTURES: &[&str] = &["mushy", "watery", "liquid", "loose"];

/// Why a movement was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoolConcern {
  Color,
  TooFirm,
  TooLoose,
  Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", content = "concern", rename_all = "snake_case")]
pub enum StoolClass {
  Normal,
  Unusual(StoolConcern),
}

impl StoolClass {
  pub fn is_normal(self) -> bool { matches!(self, Self::Normal) }
}

pub fn classify(color: &str, texture: &str) -> StoolClass {
  let color = color.trim().to_lowercase();
  let texture = texture.trim().to_lowercase();

  if UNUSUAL_COLORS.contains(&color.as_str()) {
    StoolClass::Unusual(StoolConcern::Color)
  } else if FIRM_TEXTURES.contains(&texture.as_str()) {
    StoolClass::Unusual(StoolConcern::TooFirm)
  } else if NORMAL_TEXTURES.contains(&texture.as_str()) {
    StoolClass::Normal
  } else if LOOSE_TEXTURES.contains(&texture.as_str()) {
    StoolClass::Unusual(StoolConcern::TooLoose)
  } else {
    StoolClass::Unusual(StoolConcern::Unrecognized)
  }
}

pub fn classify_entry(entry: &PoopEntry) -> StoolClass { classify(&entry.color, &entry.texture) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn color_rule_wins_over_normal_texture() {
    assert_eq!(classify("green", "smooth"), StoolClass::Unusual(StoolConcern::Color));
  }

  #[test]
  fn textures_map_to_their_bucket() {
    assert_eq!(classify("brown", "pellets"), StoolClass::Unusual(StoolConcern::TooFirm));
    assert_eq!(classify("yellow", "soft"), StoolClass::Normal);
    assert_eq!(classify("brown", "watery"), StoolClass::Unusual(StoolConcern::TooLoose));
  }

  #[test]
  fn firm_rule_is_checked_before_normal_rule() {
    assert!(!classify("brown", "Hard").is_normal());
  }

  #[test]
  fn unknown_combination_fails_safe() {
    assert_eq!(classify("brown", "sticky"), StoolClass::Unusual(StoolConcern::Unrecognized));
    assert_eq!(classify("", ""), StoolClass::Unusual(StoolConcern::Unrecognized));
  }

  #[test]
  fn matching_ignores_case_and_padding() {
    assert_eq!(classify(" Brown ", " SMOOTH"), StoolClass::Normal);
    assert_eq!(classify("BLACK", "formed"), StoolClass::Unusual(StoolConcern::Color));
  }
}

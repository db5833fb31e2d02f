//! Static alert copy: titles, descriptions and suggestion lists.

use crate::{
  alert::{AlertType, Severity, Suggestion},
  checkin::Category,
};

type Entry = (&'static str, &'static str);

const PEDIATRICIAN: Entry = (
  "Contact Your Pediatrician",
  "This pattern has held for several days. Call your pediatrician, describe what you have \
   logged, and ask whether the child should be seen. Bring your check-in history to the visit.",
);

const MEALS: &[Entry] = &[
  (
    "Monitor for Early Signs",
    "Watch for runny nose, cough, increased fussiness or swollen gums. Illness and teething \
     often show up as a drop in appetite before anything else is noticeable.",
  ),
  (
    "Offer Preferred Foods",
    "Offer foods the child usually enjoys, in small and frequent portions. Softer or cooler \
     textures can help if teething or a sore throat is suspected.",
  ),
  (
    "Check for Throat Discomfort",
    "Notice whether swallowing seems painful or whether harder, textured foods are refused \
     while soft ones are accepted.",
  ),
];

const SLEEP: &[Entry] = &[
  (
    "Environmental Check",
    "Check room temperature, light and noise. Small changes such as new sounds or longer \
     evenings can shorten sleep.",
  ),
  (
    "Physical Comfort Assessment",
    "Look for rashes, tight sleepwear or teething pain. Growth spurts can also disturb sleep \
     for a few nights.",
  ),
  (
    "Review Recent Changes",
    "Consider changes to routine, caregivers, nap times or diet, and keep the bedtime routine \
     consistent while sleep settles.",
  ),
];

const POOP: &[Entry] = &[
  (
    "Hydration Monitoring",
    "Offer fluids regularly and watch for fewer wet diapers, a dry mouth or unusual fussiness.",
  ),
  (
    "Dietary Review",
    "Review foods introduced in the past few days and any change in formula, fruit or fibre \
     intake. A short food log helps identify triggers.",
  ),
  (
    "Illness Monitoring",
    "Watch for fever, lower appetite or lower activity alongside stool changes. Red, black \
     or white stools should always be reported to a doctor.",
  ),
];

const HEALTH: &[Entry] = &[
  (
    "Temperature Monitoring",
    "Take and record the temperature every 4 to 6 hours, noting the time and any medication \
     given.",
  ),
  (
    "Comfort and Hydration",
    "Keep the child hydrated, dress them lightly and offer comfort. Watch for signs of \
     dehydration or worsening symptoms.",
  ),
];

const COMBINED_MONITOR: Entry = (
  "Monitor for Illness",
  "Several areas changed at once, which often points to an oncoming illness or teething. \
   Watch for fever, rashes, cough or unusual fussiness.",
);

const COMBINED_COMFORT: Entry = (
  "Maintain Comfort and Routine",
  "Keep meals, naps and bedtime on their usual schedule, offer fluids often, and keep \
   logging so changes are easy to spot.",
);

const COMBINED_WATCH: Entry = (
  "Keep Monitoring",
  "Keep logging over the next few days. If the patterns persist or new symptoms appear, \
   contact your pediatrician.",
);

fn build(entries: &[Entry]) -> Vec<Suggestion> {
  entries
    .iter()
    .zip(1..)
    .map(|((title, content), id)| Suggestion {
      id,
      title: (*title).to_owned(),
      content: (*content).to_owned(),
    })
    .collect()
}

/// Suggestions for a category alert. Severe alerts replace the last entry
/// with a pediatrician referral.
pub fn category_suggestions(category: Category, severity: Severity) -> Vec<Suggestion> {
  let base = match category {
    Category::Meals => MEALS,
    Category::Sleep => SLEEP,
    Category::Poop => POOP,
    Category::Health => HEALTH,
  };

  if severity == Severity::Error {
    let mut entries: Vec<Entry> = base.iter().take(2).copied().collect();
    entries.push(PEDIATRICIAN);
    build(&entries)
  } else {
    build(base)
  }
}

/// The three generic suggestions of a combined alert.
pub fn combined_suggestions(severity: Severity) -> Vec<Suggestion> {
  let last = if severity == Severity::Error { PEDIATRICIAN } else { COMBINED_WATCH };
  build(&[COMBINED_MONITOR, COMBINED_COMFORT, last])
}

/// Short noun phrase naming a category's concern, used in combined alerts.
pub fn descriptor(alert_type: AlertType) -> &'static str {
  match alert_type {
    AlertType::Meals => "reduced appetite",
    AlertType::Sleep => "shortened sleep",
    AlertType::Poop => "stool changes",
    AlertType::Health => "ongoing symptoms",
    AlertType::Combined => "several concerns",
  }
}

pub fn combined_title(severity: Severity) -> &'static str {
  match severity {
    Severity::Error => "Multiple Health Concerns Detected",
    Severity::Warning | Severity::Info => "Multiple Patterns to Watch",
  }
}

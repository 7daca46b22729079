//! Daily progress entries and the cumulative carry-forward rule.
//!
//! Each stored entry already carries its running totals, so deriving the
//! next day's cumulative figures is a point lookup of the latest prior
//! entry plus an addition — never a scan-and-sum over history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Stored entry ────────────────────────────────────────────────────────────

/// One row per `(project, date, section, activity description)`. Mutated
/// only by full replacement; history is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEntry {
  pub project_code:        String,
  pub report_date:         NaiveDate,
  /// Numeric section key, or `0` when no catalog section matched at save
  /// time (catalog linkage is advisory).
  pub section_id:          i64,
  pub description:         String,
  pub planned_today:       f64,
  pub achieved_today:      f64,
  pub planned_cumulative:  f64,
  pub achieved_cumulative: f64,
}

// ─── Submission line ─────────────────────────────────────────────────────────

/// One activity line in a `saveDailyProgress` call.
///
/// Cumulative figures are optional: callers that pre-fetched the baseline
/// send them verbatim; when omitted the store derives them from the latest
/// prior entry for the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLine {
  pub description:         String,
  #[serde(rename = "sectionName", default)]
  pub section_name:        String,
  #[serde(default)]
  pub planned_today:       f64,
  #[serde(default)]
  pub achieved_today:      f64,
  #[serde(default)]
  pub planned_cumulative:  Option<f64>,
  #[serde(default)]
  pub achieved_cumulative: Option<f64>,
}

// ─── Carry-forward ───────────────────────────────────────────────────────────

/// Running totals carried from the latest prior entry of a progress key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeBaseline {
  pub planned_cumulative:  f64,
  pub achieved_cumulative: f64,
}

/// Roll a baseline forward by one day's figures. With no prior entry the
/// cumulative values equal today's values.
pub fn roll_forward(
  prior: Option<CumulativeBaseline>,
  planned_today: f64,
  achieved_today: f64,
) -> CumulativeBaseline {
  let prior = prior.unwrap_or_default();
  CumulativeBaseline {
    planned_cumulative:  prior.planned_cumulative + planned_today,
    achieved_cumulative: prior.achieved_cumulative + achieved_today,
  }
}

/// Map key for per-activity baselines: `"<sectionName>|<description>"`, or
/// the bare description when the section is unknown.
pub fn baseline_key(section_name: &str, description: &str) -> String {
  if section_name.is_empty() {
    description.to_owned()
  } else {
    format!("{section_name}|{description}")
  }
}

/// The four per-day figures of an entry, without its key. Used where
/// progress is reported keyed by activity (report existence checks).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProgressFigures {
  pub planned_today:       f64,
  pub achieved_today:      f64,
  pub planned_cumulative:  f64,
  pub achieved_cumulative: f64,
}

#[cfg(test)]
mod tests {
  use super::{CumulativeBaseline, baseline_key, roll_forward};

  #[test]
  fn first_entry_cumulative_equals_today() {
    let c = roll_forward(None, 12.0, 10.0);
    assert_eq!(c.planned_cumulative, 12.0);
    assert_eq!(c.achieved_cumulative, 10.0);
  }

  #[test]
  fn carry_forward_adds_to_prior() {
    let prior = CumulativeBaseline {
      planned_cumulative:  12.0,
      achieved_cumulative: 10.0,
    };
    let c = roll_forward(Some(prior), 3.0, 5.0);
    assert_eq!(c.planned_cumulative, 15.0);
    assert_eq!(c.achieved_cumulative, 15.0);
  }

  #[test]
  fn key_includes_section_when_known() {
    assert_eq!(baseline_key("Concrete", "Footings"), "Concrete|Footings");
    assert_eq!(baseline_key("", "Footings"), "Footings");
  }
}

//! The consolidated daily report: payload assembly and stored records.
//!
//! A report is one denormalized snapshot per `(project, date)`. The payload
//! is strongly typed where the system reads the data (header fields and the
//! activities table) and passes the purely-display sections (weather,
//! manpower, equipment) through as JSON verbatim. Every field defaults to
//! blank so a payload round-trips regardless of what the submission omitted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  error::require,
  progress::ProgressFigures,
};

fn empty_object() -> serde_json::Value {
  serde_json::Value::Object(serde_json::Map::new())
}

// ─── Activity rows ───────────────────────────────────────────────────────────

/// One activity row of a report: the day's figures joined with catalog
/// metadata. Missing joins leave `section_name`/`unit` blank and
/// `total_qty` zero — catalog metadata is advisory, never required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportActivity {
  pub description:         String,
  #[serde(rename = "sectionName")]
  pub section_name:        String,
  pub unit:                String,
  pub total_qty:           f64,
  pub planned_today:       f64,
  pub achieved_today:      f64,
  pub planned_cumulative:  f64,
  pub achieved_cumulative: f64,
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The full report document: submission input and stored snapshot share
/// this shape. Serialization round-trips every field; omitted fields come
/// back blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPayload {
  pub report_number: String,
  pub project_code:  String,
  pub report_date:   Option<NaiveDate>,
  pub project_name:  String,

  pub prepared_by: String,
  pub checked_by:  String,
  pub approved_by: String,

  pub initiated_by_contractor:    String,
  pub verified_by:                String,
  pub project_manager_contractor: String,
  pub project_manager_client:     String,
  pub target_completion:          String,
  pub client:                     String,
  pub contractor:                 String,
  pub subcontractor_deployed:     String,

  #[serde(default = "empty_object")]
  pub weather:    serde_json::Value,
  pub activities: Vec<ReportActivity>,
  pub manpower:   Vec<serde_json::Value>,
  pub equipment:  Vec<serde_json::Value>,

  #[serde(alias = "additionalNotes")]
  pub remarks:                 String,
  #[serde(alias = "concernAndIncidents")]
  pub concerns:                String,
  pub mitigation:              String,
  pub incidents:               String,
  pub action_avoidance:        String,
  pub critical_issues:         String,
  pub critical_issues_details: Vec<serde_json::Value>,
}

impl Default for ReportPayload {
  fn default() -> Self {
    Self {
      report_number: String::new(),
      project_code: String::new(),
      report_date: None,
      project_name: String::new(),
      prepared_by: String::new(),
      checked_by: String::new(),
      approved_by: String::new(),
      initiated_by_contractor: String::new(),
      verified_by: String::new(),
      project_manager_contractor: String::new(),
      project_manager_client: String::new(),
      target_completion: String::new(),
      client: String::new(),
      contractor: String::new(),
      subcontractor_deployed: String::new(),
      weather: empty_object(),
      activities: Vec::new(),
      manpower: Vec::new(),
      equipment: Vec::new(),
      remarks: String::new(),
      concerns: String::new(),
      mitigation: String::new(),
      incidents: String::new(),
      action_avoidance: String::new(),
      critical_issues: String::new(),
      critical_issues_details: Vec::new(),
    }
  }
}

impl ReportPayload {
  /// Reject a submission that lacks any of the required header fields.
  /// Runs before assembly; a failed validation writes nothing.
  pub fn validate(&self) -> Result<()> {
    require("reportNumber", &self.report_number)?;
    require("projectCode", &self.project_code)?;
    require("projectName", &self.project_name)?;
    if self.report_date.is_none() {
      return Err(crate::Error::MissingField("reportDate"));
    }
    Ok(())
  }
}

/// Assemble the payload to store for a submission.
///
/// `staged` holds the daily-entry rows for the date, already joined with
/// catalog metadata and ordered by `(section name, description)` — when any
/// exist they are authoritative. Otherwise the submission's own activity
/// list is used verbatim (already normalized to blank/zero defaults by
/// deserialization).
pub fn assemble(mut submission: ReportPayload, staged: Vec<ReportActivity>) -> ReportPayload {
  if !staged.is_empty() {
    submission.activities = staged;
  }
  submission
}

// ─── Stored report ───────────────────────────────────────────────────────────

/// A consolidated report as persisted: header columns plus the payload
/// snapshot. Exactly one exists per `(project, date)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReport {
  pub report_number: String,
  pub project_code:  String,
  pub report_date:   NaiveDate,
  pub project_name:  String,
  pub prepared_by:   String,
  pub checked_by:    String,
  pub approved_by:   String,
  pub submitted_at:  DateTime<Utc>,
  pub payload:       ReportPayload,
}

/// Filter for report listings. With both fields unset, everything matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
  pub project_code: Option<String>,
  pub report_date:  Option<NaiveDate>,
}

// ─── Existence check ─────────────────────────────────────────────────────────

/// Answer to "does a report already exist for this project and date?",
/// including any staged per-activity progress for the date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatus {
  pub exists:        bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub report_number: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub submitted_at:  Option<DateTime<Utc>>,
  pub progress_data: BTreeMap<String, ProgressFigures>,
}

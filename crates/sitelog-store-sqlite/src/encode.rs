//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 (`YYYY-MM-DD`), timestamps as RFC 3339
//! strings, and structured payloads as compact JSON. Both formats compare
//! lexicographically in date order, which the strictly-before lookups and
//! retention pruning rely on.

use chrono::{DateTime, NaiveDate, Utc};
use sitelog_core::{
  Error, Result,
  catalog::Project,
  notify::Notification,
  progress::DailyEntry,
  report::{ReportPayload, SubmittedReport},
};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse()
    .map_err(|_| Error::Storage(format!("invalid date in storage: {s:?}")))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| Error::Storage(format!("invalid timestamp in storage: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `projects` row.
pub struct RawProject {
  pub code:               String,
  pub name:               String,
  pub manager:            String,
  pub client_manager:     String,
  pub client:             String,
  pub contractor:         String,
  pub report_id_fragment: String,
  pub target_completion:  Option<String>,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    let target_completion = self
      .target_completion
      .as_deref()
      .filter(|s| !s.is_empty())
      .map(decode_date)
      .transpose()?;

    Ok(Project {
      code:               self.code,
      name:               self.name,
      manager:            self.manager,
      client_manager:     self.client_manager,
      client:             self.client,
      contractor:         self.contractor,
      report_id_fragment: self.report_id_fragment,
      target_completion,
    })
  }
}

/// Raw strings read directly from a `daily_entries` row.
pub struct RawEntry {
  pub project_code:        String,
  pub report_date:         String,
  pub section_id:          i64,
  pub description:         String,
  pub planned_today:       f64,
  pub achieved_today:      f64,
  pub planned_cumulative:  f64,
  pub achieved_cumulative: f64,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<DailyEntry> {
    Ok(DailyEntry {
      project_code:        self.project_code,
      report_date:         decode_date(&self.report_date)?,
      section_id:          self.section_id,
      description:         self.description,
      planned_today:       self.planned_today,
      achieved_today:      self.achieved_today,
      planned_cumulative:  self.planned_cumulative,
      achieved_cumulative: self.achieved_cumulative,
    })
  }
}

/// Raw strings read directly from a `submitted_reports` row.
pub struct RawReport {
  pub report_number: String,
  pub project_code:  String,
  pub report_date:   String,
  pub project_name:  String,
  pub prepared_by:   String,
  pub checked_by:    String,
  pub approved_by:   String,
  pub submitted_at:  String,
  pub report_data:   String,
}

impl RawReport {
  pub fn into_report(self) -> Result<SubmittedReport> {
    let payload: ReportPayload = serde_json::from_str(&self.report_data)?;

    Ok(SubmittedReport {
      report_number: self.report_number,
      project_code:  self.project_code,
      report_date:   decode_date(&self.report_date)?,
      project_name:  self.project_name,
      prepared_by:   self.prepared_by,
      checked_by:    self.checked_by,
      approved_by:   self.approved_by,
      submitted_at:  decode_dt(&self.submitted_at)?,
      payload,
    })
  }
}

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub id:         i64,
  pub message:    String,
  pub created_at: String,
  pub payload:    String,
}

impl RawNotification {
  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      id:         self.id,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
      payload:    serde_json::from_str(&self.payload)?,
    })
  }
}

//! The `ProgressStore` trait.
//!
//! Implemented by storage backends (e.g. `sitelog-store-sqlite`). Higher
//! layers (`sitelog-api`, the server binary) depend on this abstraction,
//! not on any concrete backend.
//!
//! Parameters are taken by value: every backend ships them across a thread
//! boundary anyway, and owned inputs keep the futures `'static`-friendly.
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (tokio with `axum`).
//!
//! Concurrency contract: check-then-act sequences (report upsert, slug
//! uniqueness, prior-cumulative lookup) must be atomic in the backend —
//! a unique constraint plus upsert, or an explicit transaction — never a
//! bare check followed by a separate write.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Result,
  catalog::{Activity, ActivityUpdate, NewActivity, Project, ProjectUpdate, Section},
  ident::SectionRef,
  notify::Notification,
  progress::{CumulativeBaseline, DailyEntry, DailyLine},
  report::{ReportFilter, ReportPayload, ReportStatus, SubmittedReport},
  roster::{Contractor, StaffMember, StaffRole},
};

pub trait ProgressStore: Send + Sync {
  // ── Projects ──────────────────────────────────────────────────────────

  /// Persist a new project. `Conflict` if the code is already taken.
  fn add_project(
    &self,
    project: Project,
  ) -> impl Future<Output = Result<Project>> + Send + '_;

  /// All projects, ordered by code.
  fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>>> + Send + '_;

  /// Retrieve a project by code. Returns `None` if not found.
  fn get_project(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<Project>>> + Send + '_;

  /// Overwrite every mutable field of an existing project.
  fn update_project(
    &self,
    code: String,
    update: ProjectUpdate,
  ) -> impl Future<Output = Result<Project>> + Send + '_;

  /// Delete a project. `Conflict` while dependent sections exist.
  fn delete_project(
    &self,
    code: String,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Sections ──────────────────────────────────────────────────────────

  /// Create a section under a project from its display name. The slug is
  /// derived (lowercase, spaces removed) and the order index assigned;
  /// `Conflict` if either the slug or the name is already in use.
  fn add_section(
    &self,
    project_code: String,
    name: String,
  ) -> impl Future<Output = Result<Section>> + Send + '_;

  /// Sections of a project, ordered by name.
  fn sections_for_project(
    &self,
    project_code: String,
  ) -> impl Future<Output = Result<Vec<Section>>> + Send + '_;

  /// Resolve a dual-mode section reference: slug match first,
  /// unconditionally; numeric-key match as the fallback.
  fn resolve_section(
    &self,
    project_code: String,
    section: SectionRef,
  ) -> impl Future<Output = Result<Option<Section>>> + Send + '_;

  // ── Activities ────────────────────────────────────────────────────────

  /// Create an activity under a section. The section identifier is
  /// resolved leniently (display name, then slug, then numeric key);
  /// `NotFound` if it resolves to nothing, `Conflict` on a duplicate
  /// description within the section.
  fn add_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity>> + Send + '_;

  /// Update the mutable fields of an activity located by project, lenient
  /// section identifier, and exact description.
  fn update_activity(
    &self,
    project_code: String,
    section: String,
    description: String,
    update: ActivityUpdate,
  ) -> impl Future<Output = Result<Activity>> + Send + '_;

  /// Activities of one resolved section, ordered by description.
  /// `NotFound` if the section does not resolve.
  fn activities_for_section(
    &self,
    project_code: String,
    section: SectionRef,
  ) -> impl Future<Output = Result<Vec<Activity>>> + Send + '_;

  /// Every activity of a project, grouped by section slug.
  fn activities_grouped(
    &self,
    project_code: String,
  ) -> impl Future<Output = Result<BTreeMap<String, Vec<Activity>>>> + Send + '_;

  /// Resolve a section reference, then an exact (case-sensitive)
  /// description within it.
  fn resolve_activity(
    &self,
    project_code: String,
    section: SectionRef,
    description: String,
  ) -> impl Future<Output = Result<Option<Activity>>> + Send + '_;

  // ── Daily progress ────────────────────────────────────────────────────

  /// Baselines from the latest entry strictly before `date`, per progress
  /// key, keyed `"<sectionName>|<description>"` (bare description when the
  /// section is unknown).
  fn previous_cumulative(
    &self,
    project_code: String,
    date: NaiveDate,
  ) -> impl Future<Output = Result<BTreeMap<String, CumulativeBaseline>>> + Send + '_;

  /// Cumulative figures for one key on `date`: latest prior entry plus
  /// today's figures; equal to today's figures for a first-ever entry.
  /// The lookup excludes `date` itself, so a same-day correction never
  /// double-counts the row it replaces.
  fn compute_cumulative(
    &self,
    project_code: String,
    date: NaiveDate,
    section: SectionRef,
    description: String,
    planned_today: f64,
    achieved_today: f64,
  ) -> impl Future<Output = Result<CumulativeBaseline>> + Send + '_;

  /// Upsert one row per line for `(project, date)`, in one transaction.
  /// Lines without cumulative figures get them computed; section names
  /// resolve leniently with `0` recorded when nothing matches.
  fn save_daily_progress(
    &self,
    project_code: String,
    date: NaiveDate,
    lines: Vec<DailyLine>,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// All entries staged for `(project, date)`.
  fn entries_for_date(
    &self,
    project_code: String,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DailyEntry>>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Whether a consolidated report (or staged progress) exists for
  /// `(project, date)`, with the staged figures keyed by description.
  fn report_status(
    &self,
    project_code: String,
    date: NaiveDate,
  ) -> impl Future<Output = Result<ReportStatus>> + Send + '_;

  /// Validate, assemble, and store a report. Idempotent per
  /// `(project, date)`: an existing report is overwritten in place (the
  /// report number may change; last write wins). A report number already
  /// held by a different `(project, date)` is a `Conflict` and leaves the
  /// existing report untouched.
  fn submit_report(
    &self,
    submission: ReportPayload,
  ) -> impl Future<Output = Result<SubmittedReport>> + Send + '_;

  /// Stored reports matching the filter, ordered by
  /// `(date descending, report number descending)`.
  fn list_reports(
    &self,
    filter: ReportFilter,
  ) -> impl Future<Output = Result<Vec<SubmittedReport>>> + Send + '_;

  // ── Roster ────────────────────────────────────────────────────────────

  /// Add a staff member to a roster. `Conflict` when the name is already
  /// on that roster, regardless of project scope.
  fn add_staff(
    &self,
    role: StaffRole,
    member: StaffMember,
  ) -> impl Future<Output = Result<StaffMember>> + Send + '_;

  /// Roster listing, ordered by name. With a project code, returns that
  /// project's entries plus global (unscoped) ones.
  fn staff(
    &self,
    role: StaffRole,
    project_code: Option<String>,
  ) -> impl Future<Output = Result<Vec<StaffMember>>> + Send + '_;

  /// Add a contractor. `Conflict` on a duplicate name within the project.
  fn add_contractor(
    &self,
    contractor: Contractor,
  ) -> impl Future<Output = Result<Contractor>> + Send + '_;

  /// Contractor listing, ordered by name; same scoping rule as [`staff`].
  ///
  /// [`staff`]: ProgressStore::staff
  fn contractors(
    &self,
    project_code: Option<String>,
  ) -> impl Future<Output = Result<Vec<Contractor>>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Record a submission event. Prunes expired entries first; the new id
  /// is millisecond-derived and strictly greater than any existing id.
  fn record_notification(
    &self,
    message: String,
    payload: serde_json::Value,
  ) -> impl Future<Output = Result<Notification>> + Send + '_;

  /// Notifications from the last `hours` hours, newest first. Expired
  /// entries are evicted as a side effect of the read.
  fn notifications_since(
    &self,
    hours: i64,
  ) -> impl Future<Output = Result<Vec<Notification>>> + Send + '_;
}

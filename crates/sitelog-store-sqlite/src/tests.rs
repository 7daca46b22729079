//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, Utc};
use sitelog_core::{
  Error,
  catalog::{ActivityUpdate, NewActivity, Project},
  ident::SectionRef,
  progress::DailyLine,
  report::{ReportActivity, ReportFilter, ReportPayload},
  roster::{Contractor, StaffMember, StaffRole},
  store::ProgressStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn project(code: &str) -> Project {
  Project {
    code:               code.into(),
    name:               "5th Evaporator".into(),
    manager:            "B. R. Dash".into(),
    client_manager:     "H. Panigrahi".into(),
    client:             "PPL".into(),
    contractor:         "SIMON India".into(),
    report_id_fragment: code.into(),
    target_completion:  Some(date("2025-11-30")),
  }
}

async fn seeded(code: &str) -> SqliteStore {
  let s = store().await;
  s.add_project(project(code)).await.unwrap();
  s
}

fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

fn line(description: &str, section: &str, planned: f64, achieved: f64) -> DailyLine {
  DailyLine {
    description:         description.into(),
    section_name:        section.into(),
    planned_today:       planned,
    achieved_today:      achieved,
    planned_cumulative:  None,
    achieved_cumulative: None,
  }
}

fn submission(number: &str, code: &str, day: &str) -> ReportPayload {
  ReportPayload {
    report_number: number.into(),
    project_code:  code.into(),
    report_date:   Some(date(day)),
    project_name:  "5th Evaporator".into(),
    ..Default::default()
  }
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_project() {
  let s = store().await;
  s.add_project(project("I-30059")).await.unwrap();

  let fetched = s.get_project("I-30059".into()).await.unwrap().unwrap();
  assert_eq!(fetched.name, "5th Evaporator");
  assert_eq!(fetched.target_completion, Some(date("2025-11-30")));

  assert!(s.get_project("I-99999".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_project_code_conflicts() {
  let s = seeded("I-30059").await;
  let err = s.add_project(project("I-30059")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateProjectCode(_)));
}

#[tokio::test]
async fn update_project_overwrites_fields() {
  let s = seeded("I-30059").await;
  let mut update = sitelog_core::catalog::ProjectUpdate {
    name:               "5th Evaporator".into(),
    manager:            "New Manager".into(),
    client_manager:     "H. Panigrahi".into(),
    client:             "PPL".into(),
    contractor:         "SIMON India".into(),
    report_id_fragment: "I-30059".into(),
    target_completion:  None,
  };
  update.client = "MCFL".into();

  let updated = s.update_project("I-30059".into(), update).await.unwrap();
  assert_eq!(updated.manager, "New Manager");

  let fetched = s.get_project("I-30059".into()).await.unwrap().unwrap();
  assert_eq!(fetched.client, "MCFL");
  assert_eq!(fetched.target_completion, None);
}

#[tokio::test]
async fn delete_project_guarded_by_sections() {
  let s = seeded("I-30059").await;
  s.add_section("I-30059".into(), "Concrete".into())
    .await
    .unwrap();

  let err = s.delete_project("I-30059".into()).await.unwrap_err();
  assert!(matches!(err, Error::ProjectHasSections(_)));

  s.add_project(project("I-2501F001")).await.unwrap();
  s.delete_project("I-2501F001".into()).await.unwrap();
  assert!(s.get_project("I-2501F001".into()).await.unwrap().is_none());
}

// ─── Sections & resolution ───────────────────────────────────────────────────

#[tokio::test]
async fn add_section_derives_slug_and_order() {
  let s = seeded("P").await;
  let first = s.add_section("P".into(), "Structural Steel".into()).await.unwrap();
  assert_eq!(first.slug, "structuralsteel");
  assert_eq!(first.order_index, 1);

  let second = s.add_section("P".into(), "Concrete".into()).await.unwrap();
  assert_eq!(second.order_index, 2);
}

#[tokio::test]
async fn duplicate_section_name_or_slug_conflicts() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Structural Steel".into())
    .await
    .unwrap();

  let err = s
    .add_section("P".into(), "Structural Steel".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateSection { .. }));

  // Different display name, same derived slug.
  let err = s
    .add_section("P".into(), "STRUCTURAL steel".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateSection { .. }));
}

#[tokio::test]
async fn add_section_requires_existing_project() {
  let s = store().await;
  let err = s.add_section("P".into(), "Concrete".into()).await.unwrap_err();
  assert!(matches!(err, Error::ProjectNotFound(_)));
}

#[tokio::test]
async fn resolve_by_slug_and_by_key() {
  let s = seeded("P").await;
  let concrete = s.add_section("P".into(), "Concrete Works".into()).await.unwrap();

  let by_slug = s
    .resolve_section("P".into(), SectionRef::ambiguous("concreteworks"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_slug.section_id, concrete.section_id);

  let by_key = s
    .resolve_section("P".into(), SectionRef::Key(concrete.section_id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_key.name, "Concrete Works");

  assert!(
    s.resolve_section("P".into(), SectionRef::ambiguous("missing"))
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn slug_match_beats_numeric_key() {
  let s = seeded("P").await;
  // Seven sections so section_id 7 exists, then one whose slug is "7".
  for i in 1..=7 {
    s.add_section("P".into(), format!("Section {i}")).await.unwrap();
  }
  let digit_named = s.add_section("P".into(), "7".into()).await.unwrap();
  assert_eq!(digit_named.slug, "7");
  assert_ne!(digit_named.section_id, 7);

  let resolved = s
    .resolve_section("P".into(), SectionRef::ambiguous("7"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(resolved.section_id, digit_named.section_id);

  // An explicit key still reaches the shadowed section.
  let by_key = s
    .resolve_section("P".into(), SectionRef::Key(7))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_key.name, "Section 7");
}

// ─── Activities ──────────────────────────────────────────────────────────────

fn footings(project: &str, section: &str) -> NewActivity {
  NewActivity {
    project_code:      project.into(),
    section:           section.into(),
    description:       "Footings".into(),
    area:              "Area 1".into(),
    unit:              "m3".into(),
    total_qty_planned: 120.0,
  }
}

#[tokio::test]
async fn add_activity_resolves_section_leniently() {
  let s = seeded("P").await;
  let section = s.add_section("P".into(), "Concrete Works".into()).await.unwrap();

  // By display name.
  let a = s.add_activity(footings("P", "Concrete Works")).await.unwrap();
  assert_eq!(a.section_id, section.section_id);
  assert_eq!(a.order_index, 1);

  // By slug.
  let mut by_slug = footings("P", "concreteworks");
  by_slug.description = "Columns".into();
  let b = s.add_activity(by_slug).await.unwrap();
  assert_eq!(b.section_id, section.section_id);
  assert_eq!(b.order_index, 2);
}

#[tokio::test]
async fn duplicate_activity_conflicts() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();
  s.add_activity(footings("P", "Concrete")).await.unwrap();

  let err = s.add_activity(footings("P", "Concrete")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateActivity(_)));
}

#[tokio::test]
async fn add_activity_missing_section_not_found() {
  let s = seeded("P").await;
  let err = s.add_activity(footings("P", "Nowhere")).await.unwrap_err();
  assert!(matches!(err, Error::SectionNotFound { .. }));
}

#[tokio::test]
async fn update_activity_mutates_catalog_fields() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();
  s.add_activity(footings("P", "Concrete")).await.unwrap();

  let updated = s
    .update_activity(
      "P".into(),
      "Concrete".into(),
      "Footings".into(),
      ActivityUpdate {
        area:              "Area 2".into(),
        unit:              "m2".into(),
        total_qty_planned: 300.0,
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.unit, "m2");
  assert_eq!(updated.total_qty_planned, 300.0);

  let err = s
    .update_activity(
      "P".into(),
      "Concrete".into(),
      "No Such Activity".into(),
      ActivityUpdate::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ActivityNotFound { .. }));
}

#[tokio::test]
async fn activities_listed_per_section_and_grouped() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();
  s.add_section("P".into(), "Steel".into()).await.unwrap();
  s.add_activity(footings("P", "Concrete")).await.unwrap();
  let mut beams = footings("P", "Steel");
  beams.description = "Beams".into();
  beams.unit = "t".into();
  s.add_activity(beams).await.unwrap();

  let concrete = s
    .activities_for_section("P".into(), SectionRef::ambiguous("concrete"))
    .await
    .unwrap();
  assert_eq!(concrete.len(), 1);
  assert_eq!(concrete[0].description, "Footings");

  let err = s
    .activities_for_section("P".into(), SectionRef::ambiguous("nope"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SectionNotFound { .. }));

  let grouped = s.activities_grouped("P".into()).await.unwrap();
  assert_eq!(grouped.len(), 2);
  assert_eq!(grouped["concrete"][0].description, "Footings");
  assert_eq!(grouped["steel"][0].description, "Beams");
}

#[tokio::test]
async fn resolve_activity_is_exact_and_case_sensitive() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();
  s.add_activity(footings("P", "Concrete")).await.unwrap();

  let found = s
    .resolve_activity(
      "P".into(),
      SectionRef::ambiguous("concrete"),
      "Footings".into(),
    )
    .await
    .unwrap();
  assert!(found.is_some());

  let miss = s
    .resolve_activity(
      "P".into(),
      SectionRef::ambiguous("concrete"),
      "footings".into(),
    )
    .await
    .unwrap();
  assert!(miss.is_none());
}

// ─── Cumulative carry-forward ────────────────────────────────────────────────

#[tokio::test]
async fn first_entry_cumulative_equals_today() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();

  s.save_daily_progress(
    "P".into(),
    date("2024-01-01"),
    vec![line("Footings", "Concrete", 12.0, 10.0)],
  )
  .await
  .unwrap();

  let entries = s
    .entries_for_date("P".into(), date("2024-01-01"))
    .await
    .unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].planned_cumulative, 12.0);
  assert_eq!(entries[0].achieved_cumulative, 10.0);
}

#[tokio::test]
async fn carry_forward_skips_calendar_gaps() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();

  s.save_daily_progress(
    "P".into(),
    date("2024-01-01"),
    vec![line("Footings", "Concrete", 10.0, 10.0)],
  )
  .await
  .unwrap();

  // No entry on 2024-01-02; the 01-01 row is still the baseline.
  s.save_daily_progress(
    "P".into(),
    date("2024-01-03"),
    vec![line("Footings", "Concrete", 5.0, 5.0)],
  )
  .await
  .unwrap();

  let entries = s
    .entries_for_date("P".into(), date("2024-01-03"))
    .await
    .unwrap();
  assert_eq!(entries[0].achieved_cumulative, 15.0);
}

#[tokio::test]
async fn same_day_resubmission_excludes_itself() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();

  s.save_daily_progress(
    "P".into(),
    date("2024-01-01"),
    vec![line("Footings", "Concrete", 10.0, 10.0)],
  )
  .await
  .unwrap();
  s.save_daily_progress(
    "P".into(),
    date("2024-01-03"),
    vec![line("Footings", "Concrete", 5.0, 5.0)],
  )
  .await
  .unwrap();

  // Correction for 01-03 recomputes from the 01-01 baseline, not from the
  // row it replaces.
  s.save_daily_progress(
    "P".into(),
    date("2024-01-03"),
    vec![line("Footings", "Concrete", 7.0, 7.0)],
  )
  .await
  .unwrap();

  let entries = s
    .entries_for_date("P".into(), date("2024-01-03"))
    .await
    .unwrap();
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].achieved_cumulative, 17.0);
}

#[tokio::test]
async fn client_supplied_cumulative_is_trusted() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();

  let mut l = line("Footings", "Concrete", 5.0, 5.0);
  l.planned_cumulative = Some(100.0);
  l.achieved_cumulative = Some(90.0);
  s.save_daily_progress("P".into(), date("2024-01-05"), vec![l])
    .await
    .unwrap();

  let entries = s
    .entries_for_date("P".into(), date("2024-01-05"))
    .await
    .unwrap();
  assert_eq!(entries[0].planned_cumulative, 100.0);
  assert_eq!(entries[0].achieved_cumulative, 90.0);
}

#[tokio::test]
async fn compute_cumulative_point_lookup() {
  let s = seeded("P").await;
  let section = s.add_section("P".into(), "Concrete".into()).await.unwrap();

  s.save_daily_progress(
    "P".into(),
    date("2024-01-01"),
    vec![line("Footings", "Concrete", 10.0, 8.0)],
  )
  .await
  .unwrap();

  let rolled = s
    .compute_cumulative(
      "P".into(),
      date("2024-01-03"),
      SectionRef::Key(section.section_id),
      "Footings".into(),
      5.0,
      4.0,
    )
    .await
    .unwrap();
  assert_eq!(rolled.planned_cumulative, 15.0);
  assert_eq!(rolled.achieved_cumulative, 12.0);

  // First-ever key: cumulative equals today.
  let first = s
    .compute_cumulative(
      "P".into(),
      date("2024-01-03"),
      SectionRef::Key(section.section_id),
      "Columns".into(),
      3.0,
      2.0,
    )
    .await
    .unwrap();
  assert_eq!(first.planned_cumulative, 3.0);
  assert_eq!(first.achieved_cumulative, 2.0);
}

#[tokio::test]
async fn previous_cumulative_maps_latest_prior_entries() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();

  s.save_daily_progress(
    "P".into(),
    date("2024-01-01"),
    vec![
      line("Footings", "Concrete", 10.0, 8.0),
      line("Grading", "", 4.0, 4.0),
    ],
  )
  .await
  .unwrap();
  s.save_daily_progress(
    "P".into(),
    date("2024-01-02"),
    vec![line("Footings", "Concrete", 5.0, 5.0)],
  )
  .await
  .unwrap();

  let baselines = s
    .previous_cumulative("P".into(), date("2024-01-03"))
    .await
    .unwrap();

  // Latest prior entry per key; sectionless keys are the bare description.
  assert_eq!(baselines["Concrete|Footings"].achieved_cumulative, 13.0);
  assert_eq!(baselines["Grading"].achieved_cumulative, 4.0);

  // Strictly-before: nothing precedes the first date.
  let none = s
    .previous_cumulative("P".into(), date("2024-01-01"))
    .await
    .unwrap();
  assert!(none.is_empty());
}

#[tokio::test]
async fn save_rejects_blank_description_without_writing() {
  let s = seeded("P").await;
  let err = s
    .save_daily_progress(
      "P".into(),
      date("2024-01-01"),
      vec![line("", "Concrete", 1.0, 1.0)],
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingField(_)));

  let entries = s
    .entries_for_date("P".into(), date("2024-01-01"))
    .await
    .unwrap();
  assert!(entries.is_empty());
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_report_joins_staged_entries_with_catalog() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();
  s.add_activity(footings("P", "Concrete")).await.unwrap();

  s.save_daily_progress(
    "P".into(),
    date("2024-01-03"),
    vec![
      line("Footings", "Concrete", 10.0, 8.0),
      line("Unlisted Task", "", 2.0, 2.0),
    ],
  )
  .await
  .unwrap();

  let stored = s
    .submit_report(submission("R-001", "P", "2024-01-03"))
    .await
    .unwrap();

  let rows = &stored.payload.activities;
  assert_eq!(rows.len(), 2);
  // Ordered by (section name, description); the sectionless row sorts first.
  assert_eq!(rows[0].description, "Unlisted Task");
  assert_eq!(rows[0].section_name, "");
  assert_eq!(rows[0].unit, "");
  assert_eq!(rows[0].total_qty, 0.0);
  assert_eq!(rows[1].description, "Footings");
  assert_eq!(rows[1].section_name, "Concrete");
  assert_eq!(rows[1].unit, "m3");
  assert_eq!(rows[1].total_qty, 120.0);
  assert_eq!(rows[1].achieved_today, 8.0);
}

#[tokio::test]
async fn submit_report_falls_back_to_submitted_activities() {
  let s = seeded("P").await;

  let mut sub = submission("R-001", "P", "2024-01-03");
  sub.activities = vec![ReportActivity {
    description:    "Footings".into(),
    achieved_today: 4.0,
    ..Default::default()
  }];
  let stored = s.submit_report(sub).await.unwrap();

  assert_eq!(stored.payload.activities.len(), 1);
  assert_eq!(stored.payload.activities[0].description, "Footings");
  assert_eq!(stored.payload.activities[0].planned_cumulative, 0.0);
  assert_eq!(stored.payload.activities[0].section_name, "");
}

#[tokio::test]
async fn resubmission_updates_in_place_and_may_change_number() {
  let s = seeded("P").await;
  s.submit_report(submission("R-001", "P", "2024-01-03"))
    .await
    .unwrap();

  // Same (project, date), new number: update, not insert, and no
  // conflict against the row being replaced.
  let second = s
    .submit_report(submission("R-002", "P", "2024-01-03"))
    .await
    .unwrap();
  assert_eq!(second.report_number, "R-002");

  let all = s.list_reports(ReportFilter::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].report_number, "R-002");
}

#[tokio::test]
async fn report_number_collision_across_dates_rejected() {
  let s = seeded("P").await;
  s.submit_report(submission("R-001", "P", "2024-01-01"))
    .await
    .unwrap();

  let err = s
    .submit_report(submission("R-001", "P", "2024-01-02"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateReportNumber(_)));

  // The original report is unaffected and no second report appeared.
  let status = s
    .report_status("P".into(), date("2024-01-01"))
    .await
    .unwrap();
  assert_eq!(status.report_number.as_deref(), Some("R-001"));
  let all = s.list_reports(ReportFilter::default()).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn submit_report_validates_required_fields() {
  let s = seeded("P").await;

  let mut sub = submission("", "P", "2024-01-03");
  sub.report_number = "  ".into();
  let err = s.submit_report(sub).await.unwrap_err();
  assert!(matches!(err, Error::MissingField("reportNumber")));

  let mut sub = submission("R-001", "P", "2024-01-03");
  sub.project_name = String::new();
  let err = s.submit_report(sub).await.unwrap_err();
  assert!(matches!(err, Error::MissingField("projectName")));

  assert!(s.list_reports(ReportFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn report_status_reflects_staged_progress_without_report() {
  let s = seeded("P").await;
  s.add_section("P".into(), "Concrete".into()).await.unwrap();
  s.save_daily_progress(
    "P".into(),
    date("2024-01-03"),
    vec![line("Footings", "Concrete", 10.0, 8.0)],
  )
  .await
  .unwrap();

  let status = s
    .report_status("P".into(), date("2024-01-03"))
    .await
    .unwrap();
  assert!(status.exists);
  assert!(status.report_number.is_none());
  assert_eq!(status.progress_data["Footings"].achieved_today, 8.0);

  let clean = s
    .report_status("P".into(), date("2024-01-04"))
    .await
    .unwrap();
  assert!(!clean.exists);
}

#[tokio::test]
async fn report_payload_round_trips_through_storage() {
  let s = seeded("P").await;

  let mut sub = submission("R-001", "P", "2024-01-03");
  sub.prepared_by = "Saravanakumar B".into();
  sub.weather = serde_json::json!({ "am": "clear", "pm": "rain" });
  sub.manpower = vec![serde_json::json!({ "designation": "Mason", "count": 6 })];
  sub.remarks = "night pour scheduled".into();
  s.submit_report(sub.clone()).await.unwrap();

  let all = s
    .list_reports(ReportFilter {
      project_code: Some("P".into()),
      report_date:  Some(date("2024-01-03")),
    })
    .await
    .unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].prepared_by, "Saravanakumar B");
  assert_eq!(all[0].payload.weather, sub.weather);
  assert_eq!(all[0].payload.manpower, sub.manpower);
  assert_eq!(all[0].payload.remarks, "night pour scheduled");
}

#[tokio::test]
async fn list_reports_filters_and_orders_newest_first() {
  let s = seeded("P").await;
  s.add_project(project("Q")).await.unwrap();
  s.submit_report(submission("R-001", "P", "2024-01-01"))
    .await
    .unwrap();
  s.submit_report(submission("R-002", "P", "2024-01-02"))
    .await
    .unwrap();
  s.submit_report(submission("R-003", "Q", "2024-01-01"))
    .await
    .unwrap();

  let for_p = s
    .list_reports(ReportFilter {
      project_code: Some("P".into()),
      report_date:  None,
    })
    .await
    .unwrap();
  assert_eq!(for_p.len(), 2);
  assert_eq!(for_p[0].report_number, "R-002");
  assert_eq!(for_p[1].report_number, "R-001");

  let jan_first = s
    .list_reports(ReportFilter {
      project_code: None,
      report_date:  Some(date("2024-01-01")),
    })
    .await
    .unwrap();
  assert_eq!(jan_first.len(), 2);
}

// ─── Roster ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn staff_names_globally_unique_per_roster() {
  let s = seeded("P").await;
  let member = StaffMember {
    name:         "Saravanakumar B".into(),
    designation:  "Senior Engineer QA/QC".into(),
    project_code: Some("P".into()),
  };
  s.add_staff(StaffRole::ReportPreparer, member.clone())
    .await
    .unwrap();

  // Same name, different project: still a conflict on this roster.
  let mut other_scope = member.clone();
  other_scope.project_code = None;
  let err = s
    .add_staff(StaffRole::ReportPreparer, other_scope)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateStaffName { .. }));

  // The other roster is independent.
  s.add_staff(StaffRole::SiteManager, member).await.unwrap();
}

#[tokio::test]
async fn staff_listing_includes_global_entries() {
  let s = seeded("P").await;
  s.add_project(project("Q")).await.unwrap();
  s.add_staff(
    StaffRole::SiteManager,
    StaffMember {
      name:         "Project Scoped".into(),
      designation:  "Site Manager".into(),
      project_code: Some("P".into()),
    },
  )
  .await
  .unwrap();
  s.add_staff(
    StaffRole::SiteManager,
    StaffMember {
      name:         "Global".into(),
      designation:  "Site Manager".into(),
      project_code: None,
    },
  )
  .await
  .unwrap();

  let for_p = s
    .staff(StaffRole::SiteManager, Some("P".into()))
    .await
    .unwrap();
  assert_eq!(for_p.len(), 2);

  let for_q = s
    .staff(StaffRole::SiteManager, Some("Q".into()))
    .await
    .unwrap();
  assert_eq!(for_q.len(), 1);
  assert_eq!(for_q[0].name, "Global");
}

#[tokio::test]
async fn contractors_unique_per_project() {
  let s = seeded("P").await;
  s.add_project(project("Q")).await.unwrap();
  let firm = Contractor {
    name:            "SIMON India".into(),
    project_code:    Some("P".into()),
    contact_person:  "Front Office".into(),
    contact_details: "simon@example.com".into(),
  };
  s.add_contractor(firm.clone()).await.unwrap();

  let err = s.add_contractor(firm.clone()).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateContractor(_)));

  // Same firm under a different project is fine.
  let mut elsewhere = firm;
  elsewhere.project_code = Some("Q".into());
  s.add_contractor(elsewhere).await.unwrap();
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_list_newest_first() {
  let s = store().await;
  let first = s
    .record_notification("first".into(), serde_json::json!({}))
    .await
    .unwrap();
  let second = s
    .record_notification("second".into(), serde_json::json!({ "n": 2 }))
    .await
    .unwrap();
  assert!(second.id > first.id);

  let listed = s.notifications_since(48).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].message, "second");
  assert_eq!(listed[1].message, "first");
}

#[tokio::test]
async fn notifications_pruned_by_retention_window() {
  let s = store().await;
  let stale = s
    .record_notification("stale".into(), serde_json::json!({}))
    .await
    .unwrap();
  s.record_notification("fresh".into(), serde_json::json!({}))
    .await
    .unwrap();

  // Backdate the first notification to 49 hours ago.
  let old_created = (Utc::now() - Duration::hours(49)).to_rfc3339();
  let stale_id = stale.id;
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE notifications SET created_at = ?1 WHERE id = ?2",
        rusqlite::params![old_created, stale_id],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  // A wider window still sees it; the 48-hour window evicts it for good.
  let wide = s.notifications_since(72).await.unwrap();
  assert_eq!(wide.len(), 2);

  let narrow = s.notifications_since(48).await.unwrap();
  assert_eq!(narrow.len(), 1);
  assert_eq!(narrow[0].message, "fresh");

  // Eviction was a side effect of the read, not a filter.
  let after = s.notifications_since(72).await.unwrap();
  assert_eq!(after.len(), 1);
}

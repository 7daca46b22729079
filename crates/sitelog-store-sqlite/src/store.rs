//! [`SqliteStore`] — the SQLite implementation of [`ProgressStore`].
//!
//! Closures handed to `conn.call` return plain data or outcome markers;
//! classification into domain errors happens outside the database thread.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, params};

use sitelog_core::{
  Error, Result,
  catalog::{
    Activity, ActivityUpdate, NewActivity, Project, ProjectUpdate, Section,
    derive_slug,
  },
  error::require,
  ident::SectionRef,
  notify::{DEFAULT_RETENTION_HOURS, Notification},
  progress::{
    CumulativeBaseline, DailyEntry, DailyLine, ProgressFigures, baseline_key,
    roll_forward,
  },
  report::{
    self, ReportActivity, ReportFilter, ReportPayload, ReportStatus,
    SubmittedReport,
  },
  roster::{Contractor, StaffMember, StaffRole},
  store::ProgressStore,
};

use crate::{
  encode::{
    RawEntry, RawNotification, RawProject, RawReport, decode_dt, encode_date,
    encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sitelog progress store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await.map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(db_err)
  }
}

fn db_err(e: tokio_rusqlite::Error) -> Error { Error::Storage(e.to_string()) }

// ─── Row helpers ─────────────────────────────────────────────────────────────

const SECTION_COLS: &str =
  "section_id, project_code, slug, name, area, unit, total_qty_planned, \
   order_index";

fn section_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Section> {
  Ok(Section {
    section_id:        row.get(0)?,
    project_code:      row.get(1)?,
    slug:              row.get(2)?,
    name:              row.get(3)?,
    area:              row.get(4)?,
    unit:              row.get(5)?,
    total_qty_planned: row.get(6)?,
    order_index:       row.get(7)?,
  })
}

const ACTIVITY_COLS: &str =
  "activity_id, project_code, section_id, description, area, unit, \
   total_qty_planned, order_index";

fn activity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
  Ok(Activity {
    activity_id:       row.get(0)?,
    project_code:      row.get(1)?,
    section_id:        row.get(2)?,
    description:       row.get(3)?,
    area:              row.get(4)?,
    unit:              row.get(5)?,
    total_qty_planned: row.get(6)?,
    order_index:       row.get(7)?,
  })
}

const PROJECT_COLS: &str =
  "code, name, manager, client_manager, client, contractor, \
   report_id_fragment, target_completion";

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProject> {
  Ok(RawProject {
    code:               row.get(0)?,
    name:               row.get(1)?,
    manager:            row.get(2)?,
    client_manager:     row.get(3)?,
    client:             row.get(4)?,
    contractor:         row.get(5)?,
    report_id_fragment: row.get(6)?,
    target_completion:  row.get(7)?,
  })
}

const REPORT_COLS: &str =
  "report_number, project_code, report_date, project_name, prepared_by, \
   checked_by, approved_by, submitted_at, report_data";

fn report_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReport> {
  Ok(RawReport {
    report_number: row.get(0)?,
    project_code:  row.get(1)?,
    report_date:   row.get(2)?,
    project_name:  row.get(3)?,
    prepared_by:   row.get(4)?,
    checked_by:    row.get(5)?,
    approved_by:   row.get(6)?,
    submitted_at:  row.get(7)?,
    report_data:   row.get(8)?,
  })
}

// ─── Shared lookups (run on the database thread) ─────────────────────────────

fn project_exists(
  conn: &rusqlite::Connection,
  code: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM projects WHERE code = ?1",
        params![code],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn section_by_slug(
  conn: &rusqlite::Connection,
  project: &str,
  slug: &str,
) -> rusqlite::Result<Option<Section>> {
  conn
    .query_row(
      &format!(
        "SELECT {SECTION_COLS} FROM sections \
         WHERE project_code = ?1 AND slug = ?2"
      ),
      params![project, slug],
      section_from_row,
    )
    .optional()
}

fn section_by_key(
  conn: &rusqlite::Connection,
  project: &str,
  key: i64,
) -> rusqlite::Result<Option<Section>> {
  conn
    .query_row(
      &format!(
        "SELECT {SECTION_COLS} FROM sections \
         WHERE project_code = ?1 AND section_id = ?2"
      ),
      params![project, key],
      section_from_row,
    )
    .optional()
}

fn section_by_name(
  conn: &rusqlite::Connection,
  project: &str,
  name: &str,
) -> rusqlite::Result<Option<Section>> {
  conn
    .query_row(
      &format!(
        "SELECT {SECTION_COLS} FROM sections \
         WHERE project_code = ?1 AND name = ?2"
      ),
      params![project, name],
      section_from_row,
    )
    .optional()
}

/// Dual-mode resolution: slug match first, unconditionally; numeric key as
/// the fallback. A slug that happens to be all digits therefore shadows a
/// section whose numeric id spells the same digits.
fn resolve_section_row(
  conn: &rusqlite::Connection,
  project: &str,
  section: &SectionRef,
) -> rusqlite::Result<Option<Section>> {
  if let Some(slug) = section.as_slug()
    && let Some(found) = section_by_slug(conn, project, slug)?
  {
    return Ok(Some(found));
  }
  if let Some(key) = section.as_key() {
    return section_by_key(conn, project, key);
  }
  Ok(None)
}

/// Display-name match first (data-entry UIs send the name they show), then
/// the dual-mode slug/key resolution.
fn lenient_section_row(
  conn: &rusqlite::Connection,
  project: &str,
  raw: &str,
) -> rusqlite::Result<Option<Section>> {
  if let Some(found) = section_by_name(conn, project, raw)? {
    return Ok(Some(found));
  }
  resolve_section_row(conn, project, &SectionRef::ambiguous(raw))
}

/// The latest entry for a progress key strictly before `before_date`.
/// The strict `<` is what keeps a same-day correction from counting the
/// row it is about to replace.
fn prior_baseline(
  conn: &rusqlite::Connection,
  project: &str,
  section_id: i64,
  description: &str,
  before_date: &str,
) -> rusqlite::Result<Option<CumulativeBaseline>> {
  conn
    .query_row(
      "SELECT planned_cumulative, achieved_cumulative FROM daily_entries \
       WHERE project_code = ?1 AND section_id = ?2 AND description = ?3 \
         AND report_date < ?4 \
       ORDER BY report_date DESC LIMIT 1",
      params![project, section_id, description, before_date],
      |row| {
        Ok(CumulativeBaseline {
          planned_cumulative:  row.get(0)?,
          achieved_cumulative: row.get(1)?,
        })
      },
    )
    .optional()
}

/// Daily entries for a date joined with catalog metadata, ordered by
/// `(section name, description)`. Missing joins come back blank/zero.
fn staged_rows(
  conn: &rusqlite::Connection,
  project: &str,
  date: &str,
) -> rusqlite::Result<Vec<ReportActivity>> {
  let mut stmt = conn.prepare(
    "SELECT de.description,
            COALESCE(s.name, '')             AS section_name,
            COALESCE(a.unit, '')             AS unit,
            COALESCE(a.total_qty_planned, 0) AS total_qty,
            de.planned_today, de.achieved_today,
            de.planned_cumulative, de.achieved_cumulative
     FROM daily_entries de
     LEFT JOIN sections s   ON s.section_id = de.section_id
     LEFT JOIN activities a ON a.project_code = de.project_code
                           AND a.section_id   = de.section_id
                           AND a.description  = de.description
     WHERE de.project_code = ?1 AND de.report_date = ?2
     ORDER BY section_name, de.description",
  )?;

  let rows = stmt
    .query_map(params![project, date], |row| {
      Ok(ReportActivity {
        description:         row.get(0)?,
        section_name:        row.get(1)?,
        unit:                row.get(2)?,
        total_qty:           row.get(3)?,
        planned_today:       row.get(4)?,
        achieved_today:      row.get(5)?,
        planned_cumulative:  row.get(6)?,
        achieved_cumulative: row.get(7)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(rows)
}

fn staff_table(role: StaffRole) -> &'static str {
  match role {
    StaffRole::ReportPreparer => "report_preparers",
    StaffRole::SiteManager => "site_managers",
  }
}

// ─── Outcome markers ─────────────────────────────────────────────────────────

/// Returned out of `conn.call` closures so uniqueness and missing-row
/// outcomes can be classified into domain errors on the caller side.
enum Outcome<T> {
  Ok(T),
  NoProject,
  NoSection,
  NoActivity,
  Duplicate,
}

enum SubmitOutcome {
  Saved(ReportPayload),
  DuplicateNumber,
}

// ─── ProgressStore impl ──────────────────────────────────────────────────────

impl ProgressStore for SqliteStore {
  // ── Projects ──────────────────────────────────────────────────────────────

  async fn add_project(&self, project: Project) -> Result<Project> {
    require("code", &project.code)?;
    require("name", &project.name)?;

    let p = project.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        if project_exists(conn, &p.code)? {
          return Ok(Outcome::Duplicate);
        }
        conn.execute(
          &format!(
            "INSERT INTO projects ({PROJECT_COLS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          params![
            p.code,
            p.name,
            p.manager,
            p.client_manager,
            p.client,
            p.contractor,
            p.report_id_fragment,
            p.target_completion.map(encode_date),
          ],
        )?;
        Ok(Outcome::Ok(()))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(()) => Ok(project),
      _ => Err(Error::DuplicateProjectCode(project.code)),
    }
  }

  async fn list_projects(&self) -> Result<Vec<Project>> {
    let raws: Vec<RawProject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROJECT_COLS} FROM projects ORDER BY code"
        ))?;
        let rows = stmt
          .query_map([], project_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn get_project(&self, code: String) -> Result<Option<Project>> {
    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROJECT_COLS} FROM projects WHERE code = ?1"),
              params![code],
              project_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn update_project(
    &self,
    code: String,
    update: ProjectUpdate,
  ) -> Result<Project> {
    require("code", &code)?;
    require("name", &update.name)?;

    let (c, u) = (code.clone(), update.clone());
    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE projects \
           SET name = ?2, manager = ?3, client_manager = ?4, client = ?5, \
               contractor = ?6, report_id_fragment = ?7, \
               target_completion = ?8 \
           WHERE code = ?1",
          params![
            c,
            u.name,
            u.manager,
            u.client_manager,
            u.client,
            u.contractor,
            u.report_id_fragment,
            u.target_completion.map(encode_date),
          ],
        )?)
      })
      .await
      .map_err(db_err)?;

    if changed == 0 {
      return Err(Error::ProjectNotFound(code));
    }

    Ok(Project {
      code,
      name: update.name,
      manager: update.manager,
      client_manager: update.client_manager,
      client: update.client,
      contractor: update.contractor,
      report_id_fragment: update.report_id_fragment,
      target_completion: update.target_completion,
    })
  }

  async fn delete_project(&self, code: String) -> Result<()> {
    let c = code.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let dependants: i64 = tx.query_row(
          "SELECT COUNT(*) FROM sections WHERE project_code = ?1",
          params![c],
          |row| row.get(0),
        )?;
        if dependants > 0 {
          return Ok(Outcome::Duplicate);
        }
        let deleted =
          tx.execute("DELETE FROM projects WHERE code = ?1", params![c])?;
        tx.commit()?;
        if deleted == 0 {
          return Ok(Outcome::NoProject);
        }
        Ok(Outcome::Ok(()))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(()) => Ok(()),
      Outcome::NoProject => Err(Error::ProjectNotFound(code)),
      _ => Err(Error::ProjectHasSections(code)),
    }
  }

  // ── Sections ──────────────────────────────────────────────────────────────

  async fn add_section(
    &self,
    project_code: String,
    name: String,
  ) -> Result<Section> {
    require("projectCode", &project_code)?;
    require("sectionName", &name)?;
    let slug = derive_slug(&name);

    let (pc, nm, sl) = (project_code.clone(), name.clone(), slug);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !project_exists(&tx, &pc)? {
          return Ok(Outcome::NoProject);
        }

        let taken: Option<i64> = tx
          .query_row(
            "SELECT section_id FROM sections \
             WHERE project_code = ?1 AND (slug = ?2 OR name = ?3)",
            params![pc, sl, nm],
            |row| row.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(Outcome::Duplicate);
        }

        let next_order: i64 = tx.query_row(
          "SELECT COALESCE(MAX(order_index), 0) + 1 FROM sections \
           WHERE project_code = ?1",
          params![pc],
          |row| row.get(0),
        )?;

        tx.execute(
          "INSERT INTO sections (project_code, slug, name, order_index) \
           VALUES (?1, ?2, ?3, ?4)",
          params![pc, sl, nm, next_order],
        )?;
        let section_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Outcome::Ok(Section {
          section_id,
          project_code: pc,
          slug: sl,
          name: nm,
          area: String::new(),
          unit: String::new(),
          total_qty_planned: 0.0,
          order_index: next_order,
        }))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(section) => Ok(section),
      Outcome::NoProject => Err(Error::ProjectNotFound(project_code)),
      _ => Err(Error::DuplicateSection {
        project: project_code,
        name,
      }),
    }
  }

  async fn sections_for_project(
    &self,
    project_code: String,
  ) -> Result<Vec<Section>> {
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SECTION_COLS} FROM sections \
           WHERE project_code = ?1 ORDER BY name"
        ))?;
        let rows = stmt
          .query_map(params![project_code], section_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)
  }

  async fn resolve_section(
    &self,
    project_code: String,
    section: SectionRef,
  ) -> Result<Option<Section>> {
    self
      .conn
      .call(move |conn| Ok(resolve_section_row(conn, &project_code, &section)?))
      .await
      .map_err(db_err)
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn add_activity(&self, input: NewActivity) -> Result<Activity> {
    require("projectCode", &input.project_code)?;
    require("section", &input.section)?;
    require("activityDescription", &input.description)?;

    let a = input.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let section = match lenient_section_row(&tx, &a.project_code, &a.section)? {
          Some(s) => s,
          None => return Ok(Outcome::NoSection),
        };

        let taken: Option<i64> = tx
          .query_row(
            "SELECT activity_id FROM activities \
             WHERE project_code = ?1 AND section_id = ?2 AND description = ?3",
            params![a.project_code, section.section_id, a.description],
            |row| row.get(0),
          )
          .optional()?;
        if taken.is_some() {
          return Ok(Outcome::Duplicate);
        }

        let next_order: i64 = tx.query_row(
          "SELECT COALESCE(MAX(order_index), 0) + 1 FROM activities \
           WHERE section_id = ?1",
          params![section.section_id],
          |row| row.get(0),
        )?;

        tx.execute(
          "INSERT INTO activities \
             (project_code, section_id, description, area, unit, \
              total_qty_planned, order_index) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            a.project_code,
            section.section_id,
            a.description,
            a.area,
            a.unit,
            a.total_qty_planned,
            next_order
          ],
        )?;
        let activity_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Outcome::Ok(Activity {
          activity_id,
          project_code: a.project_code,
          section_id: section.section_id,
          description: a.description,
          area: a.area,
          unit: a.unit,
          total_qty_planned: a.total_qty_planned,
          order_index: next_order,
        }))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(activity) => Ok(activity),
      Outcome::NoSection => Err(Error::SectionNotFound {
        project:    input.project_code,
        identifier: input.section,
      }),
      _ => Err(Error::DuplicateActivity(input.description)),
    }
  }

  async fn update_activity(
    &self,
    project_code: String,
    section: String,
    description: String,
    update: ActivityUpdate,
  ) -> Result<Activity> {
    require("projectCode", &project_code)?;
    require("section", &section)?;
    require("activityDescription", &description)?;

    let (pc, sec, desc, upd) = (
      project_code.clone(),
      section.clone(),
      description.clone(),
      update,
    );
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let section_row = match lenient_section_row(&tx, &pc, &sec)? {
          Some(s) => s,
          None => return Ok(Outcome::NoSection),
        };

        let existing: Option<Activity> = tx
          .query_row(
            &format!(
              "SELECT {ACTIVITY_COLS} FROM activities \
               WHERE project_code = ?1 AND section_id = ?2 \
                 AND description = ?3"
            ),
            params![pc, section_row.section_id, desc],
            activity_from_row,
          )
          .optional()?;
        let mut activity = match existing {
          Some(a) => a,
          None => return Ok(Outcome::NoActivity),
        };

        tx.execute(
          "UPDATE activities \
           SET area = ?2, unit = ?3, total_qty_planned = ?4 \
           WHERE activity_id = ?1",
          params![
            activity.activity_id,
            upd.area,
            upd.unit,
            upd.total_qty_planned
          ],
        )?;
        tx.commit()?;

        activity.area = upd.area;
        activity.unit = upd.unit;
        activity.total_qty_planned = upd.total_qty_planned;
        Ok(Outcome::Ok(activity))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(activity) => Ok(activity),
      Outcome::NoSection => Err(Error::SectionNotFound {
        project:    project_code,
        identifier: section,
      }),
      _ => Err(Error::ActivityNotFound {
        project: project_code,
        section,
        description,
      }),
    }
  }

  async fn activities_for_section(
    &self,
    project_code: String,
    section: SectionRef,
  ) -> Result<Vec<Activity>> {
    let (pc, sec) = (project_code.clone(), section.clone());
    let outcome = self
      .conn
      .call(move |conn| {
        let section_row = match resolve_section_row(conn, &pc, &sec)? {
          Some(s) => s,
          None => return Ok(Outcome::NoSection),
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT {ACTIVITY_COLS} FROM activities \
           WHERE project_code = ?1 AND section_id = ?2 \
           ORDER BY description"
        ))?;
        let rows = stmt
          .query_map(params![pc, section_row.section_id], activity_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Outcome::Ok(rows))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(rows) => Ok(rows),
      _ => Err(Error::SectionNotFound {
        project:    project_code,
        identifier: section.to_string(),
      }),
    }
  }

  async fn activities_grouped(
    &self,
    project_code: String,
  ) -> Result<BTreeMap<String, Vec<Activity>>> {
    let rows: Vec<(String, Activity)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.slug, a.activity_id, a.project_code, a.section_id, \
                  a.description, a.area, a.unit, a.total_qty_planned, \
                  a.order_index \
           FROM activities a \
           JOIN sections s ON s.section_id = a.section_id \
           WHERE a.project_code = ?1 \
           ORDER BY s.slug, a.description",
        )?;
        let rows = stmt
          .query_map(params![project_code], |row| {
            Ok((
              row.get::<_, String>(0)?,
              Activity {
                activity_id:       row.get(1)?,
                project_code:      row.get(2)?,
                section_id:        row.get(3)?,
                description:       row.get(4)?,
                area:              row.get(5)?,
                unit:              row.get(6)?,
                total_qty_planned: row.get(7)?,
                order_index:       row.get(8)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    let mut grouped: BTreeMap<String, Vec<Activity>> = BTreeMap::new();
    for (slug, activity) in rows {
      grouped.entry(slug).or_default().push(activity);
    }
    Ok(grouped)
  }

  async fn resolve_activity(
    &self,
    project_code: String,
    section: SectionRef,
    description: String,
  ) -> Result<Option<Activity>> {
    self
      .conn
      .call(move |conn| {
        let section_row =
          match resolve_section_row(conn, &project_code, &section)? {
            Some(s) => s,
            None => return Ok(None),
          };
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ACTIVITY_COLS} FROM activities \
                 WHERE project_code = ?1 AND section_id = ?2 \
                   AND description = ?3"
              ),
              params![project_code, section_row.section_id, description],
              activity_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)
  }

  // ── Daily progress ────────────────────────────────────────────────────────

  async fn previous_cumulative(
    &self,
    project_code: String,
    date: NaiveDate,
  ) -> Result<BTreeMap<String, CumulativeBaseline>> {
    let date_str = encode_date(date);
    let rows: Vec<(Option<String>, String, f64, f64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.name, de.description, \
                  de.planned_cumulative, de.achieved_cumulative \
           FROM daily_entries de \
           LEFT JOIN sections s ON s.section_id = de.section_id \
           WHERE de.project_code = ?1 \
             AND de.report_date = ( \
               SELECT MAX(report_date) FROM daily_entries d2 \
               WHERE d2.project_code = de.project_code \
                 AND d2.section_id   = de.section_id \
                 AND d2.description  = de.description \
                 AND d2.report_date  < ?2 \
             )",
        )?;
        let rows = stmt
          .query_map(params![project_code, date_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    let mut baselines = BTreeMap::new();
    for (section_name, description, planned, achieved) in rows {
      baselines.insert(
        baseline_key(section_name.as_deref().unwrap_or(""), &description),
        CumulativeBaseline {
          planned_cumulative:  planned,
          achieved_cumulative: achieved,
        },
      );
    }
    Ok(baselines)
  }

  async fn compute_cumulative(
    &self,
    project_code: String,
    date: NaiveDate,
    section: SectionRef,
    description: String,
    planned_today: f64,
    achieved_today: f64,
  ) -> Result<CumulativeBaseline> {
    let date_str = encode_date(date);
    let prior: Option<CumulativeBaseline> = self
      .conn
      .call(move |conn| {
        let section_id = resolve_section_row(conn, &project_code, &section)?
          .map(|s| s.section_id)
          .unwrap_or(0);
        Ok(prior_baseline(
          conn,
          &project_code,
          section_id,
          &description,
          &date_str,
        )?)
      })
      .await
      .map_err(db_err)?;

    Ok(roll_forward(prior, planned_today, achieved_today))
  }

  async fn save_daily_progress(
    &self,
    project_code: String,
    date: NaiveDate,
    lines: Vec<DailyLine>,
  ) -> Result<()> {
    require("projectCode", &project_code)?;
    for line in &lines {
      require("description", &line.description)?;
    }

    let date_str = encode_date(date);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for line in &lines {
          let section_id = if line.section_name.is_empty() {
            0
          } else {
            lenient_section_row(&tx, &project_code, &line.section_name)?
              .map(|s| s.section_id)
              .unwrap_or(0)
          };

          let computed = match (line.planned_cumulative, line.achieved_cumulative)
          {
            (Some(p), Some(a)) => CumulativeBaseline {
              planned_cumulative:  p,
              achieved_cumulative: a,
            },
            _ => {
              let prior = prior_baseline(
                &tx,
                &project_code,
                section_id,
                &line.description,
                &date_str,
              )?;
              let rolled =
                roll_forward(prior, line.planned_today, line.achieved_today);
              CumulativeBaseline {
                planned_cumulative:  line
                  .planned_cumulative
                  .unwrap_or(rolled.planned_cumulative),
                achieved_cumulative: line
                  .achieved_cumulative
                  .unwrap_or(rolled.achieved_cumulative),
              }
            }
          };

          tx.execute(
            "INSERT INTO daily_entries \
               (project_code, report_date, section_id, description, \
                planned_today, achieved_today, \
                planned_cumulative, achieved_cumulative) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT (project_code, report_date, section_id, description) \
             DO UPDATE SET \
               planned_today       = excluded.planned_today, \
               achieved_today      = excluded.achieved_today, \
               planned_cumulative  = excluded.planned_cumulative, \
               achieved_cumulative = excluded.achieved_cumulative",
            params![
              project_code,
              date_str,
              section_id,
              line.description,
              line.planned_today,
              line.achieved_today,
              computed.planned_cumulative,
              computed.achieved_cumulative,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(db_err)
  }

  async fn entries_for_date(
    &self,
    project_code: String,
    date: NaiveDate,
  ) -> Result<Vec<DailyEntry>> {
    let date_str = encode_date(date);
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT project_code, report_date, section_id, description, \
                  planned_today, achieved_today, \
                  planned_cumulative, achieved_cumulative \
           FROM daily_entries \
           WHERE project_code = ?1 AND report_date = ?2 \
           ORDER BY section_id, description",
        )?;
        let rows = stmt
          .query_map(params![project_code, date_str], |row| {
            Ok(RawEntry {
              project_code:        row.get(0)?,
              report_date:         row.get(1)?,
              section_id:          row.get(2)?,
              description:         row.get(3)?,
              planned_today:       row.get(4)?,
              achieved_today:      row.get(5)?,
              planned_cumulative:  row.get(6)?,
              achieved_cumulative: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn report_status(
    &self,
    project_code: String,
    date: NaiveDate,
  ) -> Result<ReportStatus> {
    let date_str = encode_date(date);
    let (header, figures): (
      Option<(String, String)>,
      Vec<(String, ProgressFigures)>,
    ) = self
      .conn
      .call(move |conn| {
        let header = conn
          .query_row(
            "SELECT report_number, submitted_at FROM submitted_reports \
             WHERE project_code = ?1 AND report_date = ?2",
            params![project_code, date_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;

        let mut stmt = conn.prepare(
          "SELECT description, planned_today, achieved_today, \
                  planned_cumulative, achieved_cumulative \
           FROM daily_entries \
           WHERE project_code = ?1 AND report_date = ?2",
        )?;
        let figures = stmt
          .query_map(params![project_code, date_str], |row| {
            Ok((
              row.get::<_, String>(0)?,
              ProgressFigures {
                planned_today:       row.get(1)?,
                achieved_today:      row.get(2)?,
                planned_cumulative:  row.get(3)?,
                achieved_cumulative: row.get(4)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((header, figures))
      })
      .await
      .map_err(db_err)?;

    let exists = header.is_some() || !figures.is_empty();
    let (report_number, submitted_at) = match header {
      Some((number, at)) => (Some(number), Some(decode_dt(&at)?)),
      None => (None, None),
    };

    Ok(ReportStatus {
      exists,
      report_number,
      submitted_at,
      progress_data: figures.into_iter().collect(),
    })
  }

  async fn submit_report(
    &self,
    submission: ReportPayload,
  ) -> Result<SubmittedReport> {
    submission.validate()?;
    let date = submission
      .report_date
      .ok_or(Error::MissingField("reportDate"))?;
    let date_key = encode_date(date);
    let number = submission.report_number.clone();
    let submitted_at = Utc::now();
    let submitted_at_str = encode_dt(submitted_at);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let staged = staged_rows(&tx, &submission.project_code, &date_key)?;
        let payload = report::assemble(submission, staged);
        let payload_json = serde_json::to_string(&payload)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        // A report number held by a different (project, date) is a
        // conflict; the same pair is this report being resubmitted.
        let holder: Option<(String, String)> = tx
          .query_row(
            "SELECT project_code, report_date FROM submitted_reports \
             WHERE report_number = ?1",
            params![payload.report_number],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;
        if let Some((held_project, held_date)) = holder
          && (held_project != payload.project_code || held_date != date_key)
        {
          return Ok(SubmitOutcome::DuplicateNumber);
        }

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM submitted_reports \
             WHERE project_code = ?1 AND report_date = ?2",
            params![payload.project_code, date_key],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          tx.execute(
            "UPDATE submitted_reports \
             SET report_number = ?3, project_name = ?4, prepared_by = ?5, \
                 checked_by = ?6, approved_by = ?7, submitted_at = ?8, \
                 report_data = ?9 \
             WHERE project_code = ?1 AND report_date = ?2",
            params![
              payload.project_code,
              date_key,
              payload.report_number,
              payload.project_name,
              payload.prepared_by,
              payload.checked_by,
              payload.approved_by,
              submitted_at_str,
              payload_json,
            ],
          )?;
        } else {
          tx.execute(
            &format!(
              "INSERT INTO submitted_reports ({REPORT_COLS}) \
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
              payload.report_number,
              payload.project_code,
              date_key,
              payload.project_name,
              payload.prepared_by,
              payload.checked_by,
              payload.approved_by,
              submitted_at_str,
              payload_json,
            ],
          )?;
        }
        tx.commit()?;
        Ok(SubmitOutcome::Saved(payload))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      SubmitOutcome::Saved(payload) => Ok(SubmittedReport {
        report_number: payload.report_number.clone(),
        project_code: payload.project_code.clone(),
        report_date: date,
        project_name: payload.project_name.clone(),
        prepared_by: payload.prepared_by.clone(),
        checked_by: payload.checked_by.clone(),
        approved_by: payload.approved_by.clone(),
        submitted_at,
        payload,
      }),
      SubmitOutcome::DuplicateNumber => Err(Error::DuplicateReportNumber(number)),
    }
  }

  async fn list_reports(
    &self,
    filter: ReportFilter,
  ) -> Result<Vec<SubmittedReport>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = Vec::new();
        let mut bound: Vec<String> = Vec::new();
        if let Some(project) = filter.project_code {
          conds.push("project_code = ?");
          bound.push(project);
        }
        if let Some(date) = filter.report_date {
          conds.push("report_date = ?");
          bound.push(encode_date(date));
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {REPORT_COLS} FROM submitted_reports {where_clause} \
           ORDER BY report_date DESC, report_number DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(bound), report_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawReport::into_report).collect()
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  async fn add_staff(
    &self,
    role: StaffRole,
    member: StaffMember,
  ) -> Result<StaffMember> {
    require("name", &member.name)?;
    let table = staff_table(role);

    let m = member.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: bool = tx
          .query_row(
            &format!("SELECT 1 FROM {table} WHERE name = ?1"),
            params![m.name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Outcome::Duplicate);
        }
        tx.execute(
          &format!(
            "INSERT INTO {table} (name, designation, project_code) \
             VALUES (?1, ?2, ?3)"
          ),
          params![m.name, m.designation, m.project_code],
        )?;
        tx.commit()?;
        Ok(Outcome::Ok(()))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(()) => Ok(member),
      _ => Err(Error::DuplicateStaffName {
        role: role.label(),
        name: member.name,
      }),
    }
  }

  async fn staff(
    &self,
    role: StaffRole,
    project_code: Option<String>,
  ) -> Result<Vec<StaffMember>> {
    let table = staff_table(role);
    self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| {
          Ok(StaffMember {
            name:         row.get(0)?,
            designation:  row.get(1)?,
            project_code: row.get(2)?,
          })
        };
        let rows = if let Some(project) = project_code {
          let mut stmt = conn.prepare(&format!(
            "SELECT name, designation, project_code FROM {table} \
             WHERE project_code = ?1 OR project_code IS NULL \
             ORDER BY name"
          ))?;
          stmt
            .query_map(params![project], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT name, designation, project_code FROM {table} ORDER BY name"
          ))?;
          stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await
      .map_err(db_err)
  }

  async fn add_contractor(&self, contractor: Contractor) -> Result<Contractor> {
    require("contractorName", &contractor.name)?;

    let c = contractor.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: bool = tx
          .query_row(
            "SELECT 1 FROM contractors \
             WHERE name = ?1 AND project_code IS ?2",
            params![c.name, c.project_code],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Outcome::Duplicate);
        }
        tx.execute(
          "INSERT INTO contractors \
             (name, project_code, contact_person, contact_details) \
           VALUES (?1, ?2, ?3, ?4)",
          params![c.name, c.project_code, c.contact_person, c.contact_details],
        )?;
        tx.commit()?;
        Ok(Outcome::Ok(()))
      })
      .await
      .map_err(db_err)?;

    match outcome {
      Outcome::Ok(()) => Ok(contractor),
      _ => Err(Error::DuplicateContractor(contractor.name)),
    }
  }

  async fn contractors(
    &self,
    project_code: Option<String>,
  ) -> Result<Vec<Contractor>> {
    self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| {
          Ok(Contractor {
            name:            row.get(0)?,
            project_code:    row.get(1)?,
            contact_person:  row.get(2)?,
            contact_details: row.get(3)?,
          })
        };
        let rows = if let Some(project) = project_code {
          let mut stmt = conn.prepare(
            "SELECT name, project_code, contact_person, contact_details \
             FROM contractors \
             WHERE project_code = ?1 OR project_code IS NULL \
             ORDER BY name",
          )?;
          stmt
            .query_map(params![project], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT name, project_code, contact_person, contact_details \
             FROM contractors ORDER BY name",
          )?;
          stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await
      .map_err(db_err)
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn record_notification(
    &self,
    message: String,
    payload: serde_json::Value,
  ) -> Result<Notification> {
    require("message", &message)?;

    let now = Utc::now();
    let created_at_str = encode_dt(now);
    let cutoff = encode_dt(now - Duration::hours(DEFAULT_RETENTION_HOURS));
    let now_ms = now.timestamp_millis();
    let payload_json = payload.to_string();

    let msg = message.clone();
    let id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM notifications WHERE created_at < ?1",
          params![cutoff],
        )?;

        // Millisecond-derived, bumped past the last id so same-millisecond
        // writes stay strictly monotonic.
        let last: Option<i64> = tx
          .query_row("SELECT MAX(id) FROM notifications", [], |row| row.get(0))
          .optional()?
          .flatten();
        let id = last.map_or(now_ms, |l| now_ms.max(l + 1));

        tx.execute(
          "INSERT INTO notifications (id, message, created_at, payload) \
           VALUES (?1, ?2, ?3, ?4)",
          params![id, msg, created_at_str, payload_json],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await
      .map_err(db_err)?;

    Ok(Notification {
      id,
      message,
      created_at: now,
      payload,
    })
  }

  async fn notifications_since(&self, hours: i64) -> Result<Vec<Notification>> {
    let cutoff = encode_dt(Utc::now() - Duration::hours(hours));
    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM notifications WHERE created_at < ?1",
          params![cutoff],
        )?;
        let mut stmt = tx.prepare(
          "SELECT id, message, created_at, payload FROM notifications \
           ORDER BY id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawNotification {
              id:         row.get(0)?,
              message:    row.get(1)?,
              created_at: row.get(2)?,
              payload:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);
        tx.commit()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }
}

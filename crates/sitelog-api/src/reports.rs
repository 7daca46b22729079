//! Handlers for report endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/status` | `?project_code&date`; existence + staged figures |
//! | `POST` | `/reports` | Body: [`ReportPayload`]; idempotent per (project, date) |
//! | `GET`  | `/reports` | Optional `project_code` and `date` filters |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sitelog_core::{
  report::{ReportFilter, ReportPayload, ReportStatus, SubmittedReport},
  store::ProgressStore,
};

use crate::error::ApiError;

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusParams {
  pub project_code: String,
  pub date:         NaiveDate,
}

/// `GET /reports/status?project_code=<code>&date=<YYYY-MM-DD>`
pub async fn status<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatusParams>,
) -> Result<Json<ReportStatus>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(
    store.report_status(params.project_code, params.date).await?,
  ))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// `POST /reports` — returns 201 + the stored [`SubmittedReport`].
///
/// Resubmitting for the same `(project, date)` overwrites the stored
/// report; a report number held by a different `(project, date)` is a 409.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ReportPayload>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let report = store.submit_report(body).await?;

  // Best-effort notification; a recording failure never fails the
  // submission that already committed.
  let message = format!(
    "Report {} submitted for project {} on {}",
    report.report_number, report.project_code, report.report_date
  );
  let payload = json!({
    "reportNumber": report.report_number,
    "projectCode":  report.project_code,
    "reportDate":   report.report_date,
    "projectName":  report.project_name,
  });
  if let Err(e) = store.record_notification(message, payload).await {
    tracing::warn!("failed to record submission notification: {e}");
  }

  Ok((StatusCode::CREATED, Json(report)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub project_code: Option<String>,
  pub date:         Option<NaiveDate>,
}

/// `GET /reports[?project_code=<code>][&date=<YYYY-MM-DD>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SubmittedReport>>, ApiError>
where
  S: ProgressStore,
{
  let filter = ReportFilter {
    project_code: params.project_code,
    report_date:  params.date,
  };
  Ok(Json(store.list_reports(filter).await?))
}

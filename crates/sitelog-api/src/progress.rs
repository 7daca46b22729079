//! Handlers for daily-progress endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/progress/previous` | `?project_code&date`; baselines from the latest entries strictly before `date` |
//! | `POST` | `/progress` | Body: [`SaveProgressBody`]; upserts one row per line |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sitelog_core::{
  progress::{CumulativeBaseline, DailyLine},
  store::ProgressStore,
};

use crate::error::ApiError;

// ─── Previous cumulative ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PreviousParams {
  pub project_code: String,
  pub date:         NaiveDate,
}

/// `GET /progress/previous?project_code=<code>&date=<YYYY-MM-DD>`
///
/// Keys are `"<sectionName>|<description>"`, or the bare description when
/// the entry has no catalog section.
pub async fn previous<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<PreviousParams>,
) -> Result<Json<BTreeMap<String, CumulativeBaseline>>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(
    store
      .previous_cumulative(params.project_code, params.date)
      .await?,
  ))
}

// ─── Save ─────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /progress`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressBody {
  pub project_code: String,
  pub report_date:  NaiveDate,
  pub activities:   Vec<DailyLine>,
}

/// `POST /progress` — upserts every line for `(project, date)` in one
/// transaction. Lines without cumulative figures get them computed from
/// the latest prior entry.
pub async fn save<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SaveProgressBody>,
) -> Result<StatusCode, ApiError>
where
  S: ProgressStore,
{
  store
    .save_daily_progress(body.project_code, body.report_date, body.activities)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

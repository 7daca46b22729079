//! Handlers for roster endpoints: report preparers, site managers,
//! contractors.
//!
//! Listings take an optional `project_code` and include global (unscoped)
//! entries alongside the project's own.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use sitelog_core::{
  roster::{Contractor, StaffMember, StaffRole},
  store::ProgressStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ScopeParams {
  pub project_code: Option<String>,
}

async fn list_staff<S>(
  store: Arc<S>,
  role: StaffRole,
  params: ScopeParams,
) -> Result<Json<Vec<StaffMember>>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(store.staff(role, params.project_code).await?))
}

async fn create_staff<S>(
  store: Arc<S>,
  role: StaffRole,
  member: StaffMember,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let member = store.add_staff(role, member).await?;
  Ok((StatusCode::CREATED, Json(member)))
}

// ─── Report preparers ─────────────────────────────────────────────────────────

/// `GET /report-preparers[?project_code=<code>]`
pub async fn list_preparers<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Vec<StaffMember>>, ApiError>
where
  S: ProgressStore,
{
  list_staff(store, StaffRole::ReportPreparer, params).await
}

/// `POST /report-preparers` — 409 when the name is already on the roster.
pub async fn create_preparer<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<StaffMember>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  create_staff(store, StaffRole::ReportPreparer, body).await
}

// ─── Site managers ────────────────────────────────────────────────────────────

/// `GET /site-managers[?project_code=<code>]`
pub async fn list_site_managers<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Vec<StaffMember>>, ApiError>
where
  S: ProgressStore,
{
  list_staff(store, StaffRole::SiteManager, params).await
}

/// `POST /site-managers` — 409 when the name is already on the roster.
pub async fn create_site_manager<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<StaffMember>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  create_staff(store, StaffRole::SiteManager, body).await
}

// ─── Contractors ──────────────────────────────────────────────────────────────

/// `GET /contractors[?project_code=<code>]`
pub async fn list_contractors<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Vec<Contractor>>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(store.contractors(params.project_code).await?))
}

/// `POST /contractors` — 409 on a duplicate name within the project.
pub async fn create_contractor<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Contractor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let contractor = store.add_contractor(body).await?;
  Ok((StatusCode::CREATED, Json(contractor)))
}

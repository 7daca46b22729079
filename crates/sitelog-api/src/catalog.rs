//! Handlers for the catalog endpoints: projects, sections, activities.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/projects` | All projects, ordered by code |
//! | `POST`   | `/projects` | Body: [`Project`]; 409 on duplicate code |
//! | `PUT`    | `/projects/:code` | Body: [`ProjectUpdate`] |
//! | `DELETE` | `/projects/:code` | 409 while sections exist |
//! | `GET`    | `/sections` | `?project_code` required |
//! | `POST`   | `/sections` | Body: [`NewSectionBody`]; slug auto-derived |
//! | `GET`    | `/activities` | `?project_code` required; optional `section` (slug or key); grouped by slug without it |
//! | `POST`   | `/activities` | Body: [`NewActivity`] |
//! | `PUT`    | `/activities` | Body: [`UpdateActivityBody`] |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sitelog_core::{
  catalog::{Activity, ActivityUpdate, NewActivity, Project, ProjectUpdate, Section},
  ident::SectionRef,
  store::ProgressStore,
};

use crate::error::ApiError;

// ─── Projects ─────────────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list_projects<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(store.list_projects().await?))
}

/// `POST /projects` — returns 201 + the stored [`Project`].
pub async fn create_project<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Project>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let project = store.add_project(body).await?;
  Ok((StatusCode::CREATED, Json(project)))
}

/// `PUT /projects/:code`
pub async fn update_project<S>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
  Json(body): Json<ProjectUpdate>,
) -> Result<Json<Project>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(store.update_project(code, body).await?))
}

/// `DELETE /projects/:code`
pub async fn delete_project<S>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ProgressStore,
{
  store.delete_project(code).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SectionsParams {
  pub project_code: String,
}

/// `GET /sections?project_code=<code>`
pub async fn sections<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SectionsParams>,
) -> Result<Json<Vec<Section>>, ApiError>
where
  S: ProgressStore,
{
  Ok(Json(store.sections_for_project(params.project_code).await?))
}

/// JSON body accepted by `POST /sections`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSectionBody {
  pub project_code: String,
  pub section_name: String,
}

/// `POST /sections` — returns 201 + the new [`Section`] with its derived
/// slug and assigned order index.
pub async fn create_section<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSectionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let section = store
    .add_section(body.project_code, body.section_name)
    .await?;
  Ok((StatusCode::CREATED, Json(section)))
}

// ─── Activities ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ActivitiesParams {
  pub project_code: String,
  /// Section slug or numeric key. Without it, all of the project's
  /// activities are returned grouped by section slug.
  pub section:      Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActivitiesResponse {
  ForSection(Vec<Activity>),
  Grouped(BTreeMap<String, Vec<Activity>>),
}

/// `GET /activities?project_code=<code>[&section=<slug-or-key>]`
pub async fn activities<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ActivitiesParams>,
) -> Result<Json<ActivitiesResponse>, ApiError>
where
  S: ProgressStore,
{
  let response = match params.section {
    Some(section) => ActivitiesResponse::ForSection(
      store
        .activities_for_section(params.project_code, SectionRef::ambiguous(section))
        .await?,
    ),
    None => {
      ActivitiesResponse::Grouped(store.activities_grouped(params.project_code).await?)
    }
  };
  Ok(Json(response))
}

/// `POST /activities` — returns 201 + the stored [`Activity`].
pub async fn create_activity<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewActivity>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let activity = store.add_activity(body).await?;
  Ok((StatusCode::CREATED, Json(activity)))
}

/// JSON body accepted by `PUT /activities`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityBody {
  pub project_code:      String,
  pub section:           String,
  pub description:       String,
  #[serde(default)]
  pub area:              String,
  #[serde(default)]
  pub unit:              String,
  #[serde(default)]
  pub total_qty_planned: f64,
}

/// `PUT /activities`
pub async fn update_activity<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<UpdateActivityBody>,
) -> Result<Json<Activity>, ApiError>
where
  S: ProgressStore,
{
  let update = ActivityUpdate {
    area:              body.area,
    unit:              body.unit,
    total_qty_planned: body.total_qty_planned,
  };
  let activity = store
    .update_activity(body.project_code, body.section, body.description, update)
    .await?;
  Ok(Json(activity))
}

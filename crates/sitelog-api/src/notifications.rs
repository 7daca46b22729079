//! Handler for `GET /notifications`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sitelog_core::{
  notify::{DEFAULT_RETENTION_HOURS, Notification},
  store::ProgressStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Retention window in hours; defaults to 48.
  pub hours: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
  pub notifications: Vec<Notification>,
  pub count:         usize,
}

/// `GET /notifications[?hours=<n>]` — newest first. Expired entries are
/// evicted as a side effect of the read.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<NotificationsResponse>, ApiError>
where
  S: ProgressStore,
{
  let hours = params.hours.unwrap_or(DEFAULT_RETENTION_HOURS).max(0);
  let notifications = store.notifications_since(hours).await?;
  let count = notifications.len();
  Ok(Json(NotificationsResponse {
    notifications,
    count,
  }))
}

//! JSON REST API for sitelog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sitelog_core::store::ProgressStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sitelog_api::api_router(store.clone()))
//! ```

pub mod catalog;
pub mod error;
pub mod notifications;
pub mod progress;
pub mod reports;
pub mod roster;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use sitelog_core::store::ProgressStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ProgressStore + 'static,
{
  Router::new()
    // Catalog
    .route(
      "/projects",
      get(catalog::list_projects::<S>).post(catalog::create_project::<S>),
    )
    .route(
      "/projects/{code}",
      put(catalog::update_project::<S>).delete(catalog::delete_project::<S>),
    )
    .route(
      "/sections",
      get(catalog::sections::<S>).post(catalog::create_section::<S>),
    )
    .route(
      "/activities",
      get(catalog::activities::<S>)
        .post(catalog::create_activity::<S>)
        .put(catalog::update_activity::<S>),
    )
    // Daily progress
    .route("/progress/previous", get(progress::previous::<S>))
    .route("/progress", post(progress::save::<S>))
    // Reports
    .route("/reports/status", get(reports::status::<S>))
    .route("/reports", get(reports::list::<S>).post(reports::submit::<S>))
    // Roster
    .route(
      "/report-preparers",
      get(roster::list_preparers::<S>).post(roster::create_preparer::<S>),
    )
    .route(
      "/site-managers",
      get(roster::list_site_managers::<S>).post(roster::create_site_manager::<S>),
    )
    .route(
      "/contractors",
      get(roster::list_contractors::<S>).post(roster::create_contractor::<S>),
    )
    // Notifications
    .route("/notifications", get(notifications::list::<S>))
    .with_state(store)
}

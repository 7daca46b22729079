//! Catalog reference data: projects, sections, and activities.
//!
//! Projects are identified by a stable external `code`. Sections carry a
//! numeric surrogate key (the only thing later rows reference) plus a
//! human-derived slug; activities hang off a section by that numeric key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Project ─────────────────────────────────────────────────────────────────

/// A top-level construction engagement. Identity is `code`; all other
/// fields are mutable through administrative operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub code:               String,
  pub name:               String,
  pub manager:            String,
  pub client_manager:     String,
  pub client:             String,
  pub contractor:         String,
  pub report_id_fragment: String,
  pub target_completion:  Option<NaiveDate>,
}

/// The mutable portion of a [`Project`]; everything but `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
  pub name:               String,
  pub manager:            String,
  pub client_manager:     String,
  pub client:             String,
  pub contractor:         String,
  pub report_id_fragment: String,
  pub target_completion:  Option<NaiveDate>,
}

// ─── Section ─────────────────────────────────────────────────────────────────

/// A work-breakdown grouping within a project.
///
/// `section_id` is the stable foreign-key target; `slug` is derived from the
/// display name at creation and never changes once rows reference the
/// section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
  pub section_id:        i64,
  pub project_code:      String,
  pub slug:              String,
  pub name:              String,
  pub area:              String,
  pub unit:              String,
  pub total_qty_planned: f64,
  pub order_index:       i64,
}

/// Derive a section slug from its display name: lowercase, spaces removed.
pub fn derive_slug(name: &str) -> String {
  name.replace(' ', "").to_lowercase()
}

// ─── Activity ────────────────────────────────────────────────────────────────

/// A measurable task within a section, with a unit of measure and a planned
/// total quantity. `(project, section, description)` is unique; description
/// matching is exact and case-sensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub activity_id:       i64,
  pub project_code:      String,
  pub section_id:        i64,
  pub description:       String,
  pub area:              String,
  pub unit:              String,
  pub total_qty_planned: f64,
  pub order_index:       i64,
}

/// Input to [`crate::store::ProgressStore::add_activity`]. The section is
/// given as a raw identifier (display name, slug, or numeric key) and
/// resolved by the store; `order_index` is assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
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

/// The mutable portion of an [`Activity`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
  #[serde(default)]
  pub area:              String,
  #[serde(default)]
  pub unit:              String,
  #[serde(default)]
  pub total_qty_planned: f64,
}

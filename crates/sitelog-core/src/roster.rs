//! Roster records: the people and firms a report can name.
//!
//! Preparers and site managers share one shape and differ only in which
//! roster they belong to; contractors carry contact details instead of a
//! designation. Roster entries may be scoped to a project or left global
//! (no project code), in which case they appear in every project's listing.

use serde::{Deserialize, Serialize};

/// Which staff roster a [`StaffMember`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
  ReportPreparer,
  SiteManager,
}

impl StaffRole {
  /// Human-readable role name, used in conflict messages.
  pub fn label(self) -> &'static str {
    match self {
      Self::ReportPreparer => "report preparer",
      Self::SiteManager => "site manager",
    }
  }
}

/// A person on one of the staff rosters. Names are globally unique within
/// a roster, independent of project scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
  pub name:         String,
  #[serde(default)]
  pub designation:  String,
  #[serde(default)]
  pub project_code: Option<String>,
}

/// A contracting firm. Unique per `(project, name)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contractor {
  pub name:            String,
  #[serde(default)]
  pub project_code:    Option<String>,
  #[serde(default)]
  pub contact_person:  String,
  #[serde(default)]
  pub contact_details: String,
}

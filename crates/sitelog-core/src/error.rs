//! Error types for `sitelog-core`.
//!
//! One enum covers the whole taxonomy: validation failures, missing
//! references, uniqueness conflicts, and backend failures. [`Error::kind`]
//! gives transport layers a coarse classification so they never have to
//! match individual variants to pick a response status.

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A required field was absent or empty. Nothing was written.
  Validation,
  /// A referenced project, section, or activity does not exist.
  NotFound,
  /// A uniqueness constraint was violated. Callers may treat this as
  /// "already exists, use the existing record".
  Conflict,
  /// The underlying persistence layer failed.
  Storage,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("project not found: {0}")]
  ProjectNotFound(String),

  #[error("section {identifier:?} not found for project {project}")]
  SectionNotFound { project: String, identifier: String },

  #[error(
    "activity {description:?} not found in section {section:?} for project {project}"
  )]
  ActivityNotFound {
    project:     String,
    section:     String,
    description: String,
  },

  #[error("project code already exists: {0}")]
  DuplicateProjectCode(String),

  #[error("section already exists for project {project}: {name}")]
  DuplicateSection { project: String, name: String },

  #[error("activity already exists in this section: {0}")]
  DuplicateActivity(String),

  #[error("report number already exists: {0}")]
  DuplicateReportNumber(String),

  #[error("{role} name must be unique: {name}")]
  DuplicateStaffName { role: &'static str, name: String },

  #[error("contractor already exists for this project: {0}")]
  DuplicateContractor(String),

  #[error("project {0} still has sections; delete them first")]
  ProjectHasSections(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(String),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::MissingField(_) => ErrorKind::Validation,
      Self::ProjectNotFound(_)
      | Self::SectionNotFound { .. }
      | Self::ActivityNotFound { .. } => ErrorKind::NotFound,
      Self::DuplicateProjectCode(_)
      | Self::DuplicateSection { .. }
      | Self::DuplicateActivity(_)
      | Self::DuplicateReportNumber(_)
      | Self::DuplicateStaffName { .. }
      | Self::DuplicateContractor(_)
      | Self::ProjectHasSections(_) => ErrorKind::Conflict,
      Self::Serialization(_) | Self::Storage(_) => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject empty (or whitespace-only) required string fields before any write.
pub fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(())
}

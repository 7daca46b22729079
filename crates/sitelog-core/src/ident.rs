//! Section identifiers — the dual-mode reference a client may hold.
//!
//! The submission APIs accept either a stable numeric key (administrative
//! UIs) or a human-derived slug (data-entry UIs) for the same logical
//! section. Callers are not required to know which form they hold, so the
//! reference is a tagged union rather than a loosely-coerced string.

use std::fmt;

/// A reference to a section within a project.
///
/// Resolution order is fixed: a slug match always takes priority over a
/// numeric-key match, even when the identifier looks like both (a slug that
/// is all digits). [`Ambiguous`](SectionRef::Ambiguous) is the form used for
/// raw client input; the other two are for callers that know what they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionRef {
  Key(i64),
  Slug(String),
  Ambiguous(String),
}

impl SectionRef {
  /// Wrap a raw client-supplied identifier whose form is unknown.
  pub fn ambiguous(raw: impl Into<String>) -> Self {
    Self::Ambiguous(raw.into())
  }

  /// The slug to try first, if this reference can be read as one.
  pub fn as_slug(&self) -> Option<&str> {
    match self {
      Self::Slug(s) | Self::Ambiguous(s) => Some(s),
      Self::Key(_) => None,
    }
  }

  /// The numeric key to fall back to, if this reference can be read as one.
  pub fn as_key(&self) -> Option<i64> {
    match self {
      Self::Key(k) => Some(*k),
      Self::Ambiguous(s) => s.trim().parse().ok(),
      Self::Slug(_) => None,
    }
  }
}

impl fmt::Display for SectionRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Key(k) => write!(f, "{k}"),
      Self::Slug(s) | Self::Ambiguous(s) => f.write_str(s),
    }
  }
}

impl From<i64> for SectionRef {
  fn from(key: i64) -> Self { Self::Key(key) }
}

impl From<&str> for SectionRef {
  fn from(raw: &str) -> Self { Self::Ambiguous(raw.to_owned()) }
}

impl From<String> for SectionRef {
  fn from(raw: String) -> Self { Self::Ambiguous(raw) }
}

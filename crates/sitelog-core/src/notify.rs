//! Ephemeral submission notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours a notification stays visible when the caller does not say.
pub const DEFAULT_RETENTION_HOURS: i64 = 48;

/// An event recorded on successful report submission and evicted once it
/// falls outside the rolling retention window.
///
/// `id` is derived from the creation timestamp in milliseconds and is
/// strictly monotonic, so ordering by id is creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub id:         i64,
  pub message:    String,
  pub created_at: DateTime<Utc>,
  pub payload:    serde_json::Value,
}

//! Subjects and subscriptions.
//!
//! A subject is identified by the free-text query a subscriber typed when
//! following it. Resolution to a provider-side entity happens anew on every
//! poll cycle and is never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subscriber following a subject query. The pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  /// Opaque identifier supplied by the surrounding application.
  pub subscriber_id: String,
  pub subject_query: String,
  pub created_at:    DateTime<Utc>,
}

/// The canonical provider entity a subject query resolved to this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSubject {
  pub provider_id:          u64,
  pub name:                 String,
  /// Disambiguation metadata, e.g. `"Acting"` or `"Directing"`.
  pub known_for_department: Option<String>,
  pub popularity:           Option<f64>,
  pub profile_path:         Option<String>,
}

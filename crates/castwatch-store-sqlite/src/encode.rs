//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, release dates as `YYYY-MM-DD`,
//! and media kinds as their lowercase `strum` tag.

use castwatch_core::{
  release::{MediaKind, SeenKey, SeenRelease},
  subject::Subscription,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// The two columns that make up a seen key.
pub struct RawSeenKey {
  pub media_kind: String,
  pub work_id:    String,
}

impl RawSeenKey {
  pub fn into_seen_key(self) -> Result<SeenKey> {
    Ok(SeenKey::new(MediaKind::from_tag(&self.media_kind)?, &self.work_id))
  }
}

/// Raw strings read directly from a `seen_releases` row.
pub struct RawSeenRelease {
  pub subject_query: String,
  pub work_id:       String,
  pub media_kind:    String,
  pub title:         String,
  pub release_date:  String,
  pub recorded_at:   String,
}

impl RawSeenRelease {
  pub fn into_seen_release(self) -> Result<SeenRelease> {
    Ok(SeenRelease {
      subject_query: self.subject_query,
      work_id:       self.work_id,
      kind:          MediaKind::from_tag(&self.media_kind)?,
      title:         self.title,
      release_date:  decode_date(&self.release_date)?,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub subscriber_id: String,
  pub subject_query: String,
  pub created_at:    String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      subscriber_id: self.subscriber_id,
      subject_query: self.subject_query,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

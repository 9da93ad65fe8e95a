//! [`SqliteStore`], the SQLite implementation of [`ReleaseStore`] and
//! [`SubscriptionStore`].

use std::{
  collections::{BTreeMap, HashSet},
  path::Path,
};

use castwatch_core::{
  release::{Release, SeenKey, SeenRelease},
  store::{ReleaseStore, SubscriptionStore},
  subject::Subscription,
};
use chrono::Utc;

use crate::{
  Result,
  encode::{RawSeenKey, RawSeenRelease, RawSubscription, encode_date, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Release and subscription stores backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ReleaseStore impl ───────────────────────────────────────────────────────

impl ReleaseStore for SqliteStore {
  type Error = crate::Error;

  async fn list_seen_keys(&self, subject_query: &str) -> Result<HashSet<SeenKey>> {
    let query = subject_query.to_owned();

    let raws: Vec<RawSeenKey> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT media_kind, work_id FROM seen_releases WHERE subject_query = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![query], |row| {
            Ok(RawSeenKey {
              media_kind: row.get(0)?,
              work_id:    row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSeenKey::into_seen_key).collect()
  }

  async fn record_release(&self, subject_query: &str, release: &Release) -> Result<bool> {
    let query            = subject_query.to_owned();
    let work_id          = release.work_id.clone();
    let kind_str         = release.kind.as_ref().to_owned();
    let title            = release.title.clone();
    let release_date_str = encode_date(release.release_date);
    let recorded_at_str  = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO seen_releases (
             subject_query, work_id, media_kind, title, release_date, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (subject_query, work_id) DO NOTHING",
          rusqlite::params![
            query,
            work_id,
            kind_str,
            title,
            release_date_str,
            recorded_at_str,
          ],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn list_releases(&self, subject_query: &str) -> Result<Vec<SeenRelease>> {
    let query = subject_query.to_owned();

    let raws: Vec<RawSeenRelease> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_query, work_id, media_kind, title, release_date, recorded_at
           FROM seen_releases
           WHERE subject_query = ?1
           ORDER BY release_date DESC, work_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![query], |row| {
            Ok(RawSeenRelease {
              subject_query: row.get(0)?,
              work_id:       row.get(1)?,
              media_kind:    row.get(2)?,
              title:         row.get(3)?,
              release_date:  row.get(4)?,
              recorded_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSeenRelease::into_seen_release).collect()
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = crate::Error;

  async fn follow(&self, subscriber_id: &str, subject_query: &str) -> Result<bool> {
    let subscriber = subscriber_id.to_owned();
    let query      = subject_query.to_owned();
    let at_str     = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO subscriptions (subscriber_id, subject_query, created_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (subscriber_id, subject_query) DO NOTHING",
          rusqlite::params![subscriber, query, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn subjects_with_subscribers(&self) -> Result<BTreeMap<String, Vec<String>>> {
    let pairs: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_query, subscriber_id
           FROM subscriptions
           ORDER BY subject_query, subscriber_id",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // Rows arrive sorted, so each subscriber list is already in order.
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (query, subscriber) in pairs {
      map.entry(query).or_default().push(subscriber);
    }
    Ok(map)
  }

  async fn follows_for(&self, subscriber_id: &str) -> Result<Vec<Subscription>> {
    let subscriber = subscriber_id.to_owned();

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subscriber_id, subject_query, created_at
           FROM subscriptions
           WHERE subscriber_id = ?1
           ORDER BY subject_query",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![subscriber], |row| {
            Ok(RawSubscription {
              subscriber_id: row.get(0)?,
              subject_query: row.get(1)?,
              created_at:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }
}

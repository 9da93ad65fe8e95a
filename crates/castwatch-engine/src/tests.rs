//! Engine cycles against fake providers and sinks, with the SQLite store
//! running in memory.

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  sync::{Arc, Mutex},
  time::Duration,
};

use castwatch_core::{
  notify::NotificationSink,
  provider::MetadataProvider,
  release::{MediaKind, Release, SeenKey, SeenRelease},
  store::{ReleaseStore, SubscriptionStore},
  subject::{ResolvedSubject, Subscription},
};
use castwatch_store_sqlite::SqliteStore;
use chrono::NaiveDate;
use tokio::sync::watch;

use crate::{CycleError, Engine, EngineConfig, Scheduler};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FakeError(String);

#[derive(Clone)]
enum Behavior {
  Resolves(u64),
  Missing,
  Fails,
  Hangs,
}

#[derive(Default)]
struct FakeProvider {
  behaviors: HashMap<String, Behavior>,
  releases:  Mutex<HashMap<u64, Vec<Release>>>,
  resolved:  Mutex<Vec<String>>,
}

impl FakeProvider {
  fn with(mut self, query: &str, behavior: Behavior) -> Self {
    self.behaviors.insert(query.to_string(), behavior);
    self
  }

  fn set_releases(&self, provider_id: u64, releases: Vec<Release>) {
    self.releases.lock().unwrap().insert(provider_id, releases);
  }

  fn resolved(&self) -> Vec<String> { self.resolved.lock().unwrap().clone() }
}

impl MetadataProvider for FakeProvider {
  type Error = FakeError;

  async fn resolve_subject(
    &self,
    query: &str,
  ) -> Result<Option<ResolvedSubject>, FakeError> {
    self.resolved.lock().unwrap().push(query.to_string());
    let behavior = self.behaviors.get(query).cloned().unwrap_or(Behavior::Missing);
    match behavior {
      Behavior::Resolves(id) => Ok(Some(ResolvedSubject {
        provider_id:          id,
        name:                 query.to_string(),
        known_for_department: Some("Acting".into()),
        popularity:           None,
        profile_path:         None,
      })),
      Behavior::Missing => Ok(None),
      Behavior::Fails => Err(FakeError("provider returned 503".into())),
      Behavior::Hangs => std::future::pending().await,
    }
  }

  async fn fetch_known_releases(
    &self,
    subject: &ResolvedSubject,
  ) -> Result<Vec<Release>, FakeError> {
    Ok(
      self
        .releases
        .lock()
        .unwrap()
        .get(&subject.provider_id)
        .cloned()
        .unwrap_or_default(),
    )
  }
}

/// Records every delivery attempt as `(subscriber, subject, seen key)`.
#[derive(Default)]
struct RecordingSink {
  failing:  HashSet<String>,
  attempts: Mutex<Vec<(String, String, String)>>,
}

impl RecordingSink {
  fn failing_for(subscriber: &str) -> Self {
    Self {
      failing: HashSet::from([subscriber.to_string()]),
      ..Default::default()
    }
  }

  fn attempts(&self) -> Vec<(String, String, String)> {
    self.attempts.lock().unwrap().clone()
  }
}

impl NotificationSink for RecordingSink {
  type Error = FakeError;

  async fn notify(
    &self,
    subscriber_id: &str,
    subject_query: &str,
    release: &Release,
  ) -> Result<(), FakeError> {
    self.attempts.lock().unwrap().push((
      subscriber_id.to_string(),
      subject_query.to_string(),
      release.seen_key().to_string(),
    ));
    if self.failing.contains(subscriber_id) {
      return Err(FakeError("mailbox full".into()));
    }
    Ok(())
  }
}

/// A fixed subject map, including subjects nobody follows.
struct StaticSubscriptions(BTreeMap<String, Vec<String>>);

impl SubscriptionStore for StaticSubscriptions {
  type Error = FakeError;

  async fn follow(&self, _: &str, _: &str) -> Result<bool, FakeError> { Ok(false) }

  async fn subjects_with_subscribers(
    &self,
  ) -> Result<BTreeMap<String, Vec<String>>, FakeError> {
    Ok(self.0.clone())
  }

  async fn follows_for(&self, _: &str) -> Result<Vec<Subscription>, FakeError> { Ok(vec![]) }
}

struct FailingSubscriptions;

impl SubscriptionStore for FailingSubscriptions {
  type Error = FakeError;

  async fn follow(&self, _: &str, _: &str) -> Result<bool, FakeError> {
    Err(FakeError("database is locked".into()))
  }

  async fn subjects_with_subscribers(
    &self,
  ) -> Result<BTreeMap<String, Vec<String>>, FakeError> {
    Err(FakeError("database is locked".into()))
  }

  async fn follows_for(&self, _: &str) -> Result<Vec<Subscription>, FakeError> {
    Err(FakeError("database is locked".into()))
  }
}

/// Delegates to SQLite but fails every read for one subject.
struct FailingReleases {
  inner:   SqliteStore,
  failing: String,
}

impl ReleaseStore for FailingReleases {
  type Error = FakeError;

  async fn list_seen_keys(&self, subject_query: &str) -> Result<HashSet<SeenKey>, FakeError> {
    if subject_query == self.failing {
      return Err(FakeError("disk I/O error".into()));
    }
    self
      .inner
      .list_seen_keys(subject_query)
      .await
      .map_err(|e| FakeError(e.to_string()))
  }

  async fn record_release(
    &self,
    subject_query: &str,
    release: &Release,
  ) -> Result<bool, FakeError> {
    self
      .inner
      .record_release(subject_query, release)
      .await
      .map_err(|e| FakeError(e.to_string()))
  }

  async fn list_releases(&self, subject_query: &str) -> Result<Vec<SeenRelease>, FakeError> {
    self
      .inner
      .list_releases(subject_query)
      .await
      .map_err(|e| FakeError(e.to_string()))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

fn release(kind: MediaKind, id: &str, title: &str) -> Release {
  Release {
    work_id:      id.into(),
    kind,
    title:        title.into(),
    release_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
  }
}

fn engine<S, R>(
  provider: &Arc<FakeProvider>,
  subscriptions: Arc<S>,
  releases: Arc<R>,
  sink: &Arc<RecordingSink>,
) -> Engine<FakeProvider, S, R, RecordingSink>
where
  S: SubscriptionStore,
  R: ReleaseStore,
{
  Engine::new(
    provider.clone(),
    subscriptions,
    releases,
    sink.clone(),
    EngineConfig::default(),
  )
}

fn attempt(subscriber: &str, subject: &str, key: &str) -> (String, String, String) {
  (subscriber.into(), subject.into(), key.into())
}

// ─── Diff and notify ─────────────────────────────────────────────────────────

#[tokio::test]
async fn new_release_is_announced_exactly_once() {
  let db = store().await;
  db.follow("u1", "Tom Hanks").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  provider.set_releases(31, vec![release(MediaKind::Movie, "100", "Movie A")]);
  let sink = Arc::new(RecordingSink::default());
  let engine = engine(&provider, db.clone(), db.clone(), &sink);

  let first = engine.run_cycle().await.unwrap();
  assert_eq!(first.subjects, 1);
  assert_eq!(first.releases_recorded, 1);
  assert_eq!(first.notifications_sent, 1);
  assert_eq!(sink.attempts(), [attempt("u1", "Tom Hanks", "movie:100")]);

  let rows = db.list_releases("Tom Hanks").await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].title, "Movie A");

  let second = engine.run_cycle().await.unwrap();
  assert_eq!(second.releases_recorded, 0);
  assert_eq!(second.notifications_sent, 0);
  assert_eq!(sink.attempts().len(), 1);

  provider.set_releases(31, vec![
    release(MediaKind::Movie, "101", "Movie B"),
    release(MediaKind::Movie, "100", "Movie A"),
  ]);
  let third = engine.run_cycle().await.unwrap();
  assert_eq!(third.notifications_sent, 1);
  assert_eq!(sink.attempts()[1], attempt("u1", "Tom Hanks", "movie:101"));
}

#[tokio::test]
async fn notifications_follow_release_then_subscriber_order() {
  let db = store().await;
  db.follow("u2", "Tom Hanks").await.unwrap();
  db.follow("u1", "Tom Hanks").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  provider.set_releases(31, vec![
    release(MediaKind::Movie, "100", "Movie A"),
    release(MediaKind::Show, "200", "Show B"),
  ]);
  let sink = Arc::new(RecordingSink::default());

  let report = engine(&provider, db.clone(), db.clone(), &sink)
    .run_cycle()
    .await
    .unwrap();

  assert_eq!(report.notifications_sent, 4);
  assert_eq!(sink.attempts(), [
    attempt("u1", "Tom Hanks", "movie:100"),
    attempt("u2", "Tom Hanks", "movie:100"),
    attempt("u1", "Tom Hanks", "show:200"),
    attempt("u2", "Tom Hanks", "show:200"),
  ]);
}

#[tokio::test]
async fn subject_without_releases_writes_nothing() {
  let db = store().await;
  db.follow("u1", "Tom Hanks").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  let sink = Arc::new(RecordingSink::default());

  let report = engine(&provider, db.clone(), db.clone(), &sink)
    .run_cycle()
    .await
    .unwrap();

  assert_eq!(report.subjects, 1);
  assert_eq!(report.failed, 0);
  assert!(db.list_releases("Tom Hanks").await.unwrap().is_empty());
  assert!(sink.attempts().is_empty());
}

#[tokio::test]
async fn colliding_work_id_is_never_announced() {
  let db = store().await;
  db.follow("u1", "Tom Hanks").await.unwrap();
  db.record_release("Tom Hanks", &release(MediaKind::Movie, "1", "Movie"))
    .await
    .unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  provider.set_releases(31, vec![release(MediaKind::Show, "1", "Show")]);
  let sink = Arc::new(RecordingSink::default());
  let engine = engine(&provider, db.clone(), db.clone(), &sink);

  for _ in 0..2 {
    let report = engine.run_cycle().await.unwrap();
    assert_eq!(report.releases_recorded, 0);
    assert_eq!(report.notifications_sent, 0);
  }
  assert!(sink.attempts().is_empty());
}

// ─── Failure isolation ───────────────────────────────────────────────────────

#[tokio::test]
async fn provider_failure_is_isolated_to_its_subject() {
  let db = store().await;
  db.follow("u1", "Broken").await.unwrap();
  db.follow("u1", "Tom Hanks").await.unwrap();

  let provider = Arc::new(
    FakeProvider::default()
      .with("Broken", Behavior::Fails)
      .with("Tom Hanks", Behavior::Resolves(31)),
  );
  provider.set_releases(31, vec![release(MediaKind::Movie, "100", "Movie A")]);
  let sink = Arc::new(RecordingSink::default());

  let report = engine(&provider, db.clone(), db.clone(), &sink)
    .run_cycle()
    .await
    .unwrap();

  assert_eq!(report.subjects, 2);
  assert_eq!(report.failed, 1);
  assert_eq!(report.notifications_sent, 1);
  assert_eq!(sink.attempts(), [attempt("u1", "Tom Hanks", "movie:100")]);
}

#[tokio::test]
async fn unresolved_subject_is_skipped() {
  let db = store().await;
  db.follow("u1", "Nobody").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Nobody", Behavior::Missing));
  let sink = Arc::new(RecordingSink::default());

  let report = engine(&provider, db.clone(), db.clone(), &sink)
    .run_cycle()
    .await
    .unwrap();

  assert_eq!(report.not_found, 1);
  assert_eq!(report.failed, 0);
  assert!(db.list_releases("Nobody").await.unwrap().is_empty());
  assert!(sink.attempts().is_empty());
}

#[tokio::test]
async fn subjects_without_subscribers_are_not_resolved() {
  let subscriptions = Arc::new(StaticSubscriptions(BTreeMap::from([
    ("Ghost".to_string(), vec![]),
    ("Tom Hanks".to_string(), vec!["u1".to_string()]),
  ])));
  let provider = Arc::new(
    FakeProvider::default()
      .with("Ghost", Behavior::Resolves(1))
      .with("Tom Hanks", Behavior::Resolves(31)),
  );
  let sink = Arc::new(RecordingSink::default());

  let report = engine(&provider, subscriptions, store().await, &sink)
    .run_cycle()
    .await
    .unwrap();

  assert_eq!(report.skipped_no_subscribers, 1);
  assert_eq!(report.subjects, 1);
  assert_eq!(provider.resolved(), ["Tom Hanks"]);
}

#[tokio::test]
async fn subscription_failure_aborts_the_cycle() {
  let provider = Arc::new(FakeProvider::default());
  let sink = Arc::new(RecordingSink::default());

  let err = engine(&provider, Arc::new(FailingSubscriptions), store().await, &sink)
    .run_cycle()
    .await
    .unwrap_err();

  assert!(matches!(err, CycleError::Subscriptions(_)));
  assert!(provider.resolved().is_empty());
}

#[tokio::test]
async fn release_store_failure_is_isolated_to_its_subject() {
  let db = store().await;
  db.follow("u1", "Broken").await.unwrap();
  db.follow("u1", "Tom Hanks").await.unwrap();

  let releases = Arc::new(FailingReleases {
    inner:   SqliteStore::open_in_memory().await.unwrap(),
    failing: "Broken".into(),
  });
  let provider = Arc::new(
    FakeProvider::default()
      .with("Broken", Behavior::Resolves(7))
      .with("Tom Hanks", Behavior::Resolves(31)),
  );
  provider.set_releases(7, vec![release(MediaKind::Movie, "70", "Lost")]);
  provider.set_releases(31, vec![release(MediaKind::Movie, "100", "Movie A")]);
  let sink = Arc::new(RecordingSink::default());

  let report = engine(&provider, db, releases, &sink)
    .run_cycle()
    .await
    .unwrap();

  assert_eq!(report.failed, 1);
  assert_eq!(report.notifications_sent, 1);
  assert_eq!(sink.attempts(), [attempt("u1", "Tom Hanks", "movie:100")]);
}

#[tokio::test]
async fn failed_notification_is_not_retried() {
  let db = store().await;
  db.follow("u1", "Tom Hanks").await.unwrap();
  db.follow("u2", "Tom Hanks").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  provider.set_releases(31, vec![release(MediaKind::Movie, "100", "Movie A")]);
  let sink = Arc::new(RecordingSink::failing_for("u2"));
  let engine = engine(&provider, db.clone(), db.clone(), &sink);

  let first = engine.run_cycle().await.unwrap();
  assert_eq!(first.failed, 0);
  assert_eq!(first.releases_recorded, 1);
  assert_eq!(first.notifications_sent, 1);
  assert_eq!(first.notifications_failed, 1);

  let second = engine.run_cycle().await.unwrap();
  assert_eq!(second.notifications_failed, 0);
  assert_eq!(sink.attempts(), [
    attempt("u1", "Tom Hanks", "movie:100"),
    attempt("u2", "Tom Hanks", "movie:100"),
  ]);
}

#[tokio::test(start_paused = true)]
async fn hung_provider_times_out_without_blocking_others() {
  let subscriptions = Arc::new(StaticSubscriptions(BTreeMap::from([
    ("Slow".to_string(), vec!["u1".to_string()]),
    ("Tom Hanks".to_string(), vec!["u1".to_string()]),
  ])));
  let provider = Arc::new(
    FakeProvider::default()
      .with("Slow", Behavior::Hangs)
      .with("Tom Hanks", Behavior::Resolves(31)),
  );
  provider.set_releases(31, vec![release(MediaKind::Movie, "100", "Movie A")]);
  let sink = Arc::new(RecordingSink::default());

  let engine = Engine::new(
    provider.clone(),
    subscriptions,
    store().await,
    sink.clone(),
    EngineConfig { subject_timeout: Duration::from_secs(5), ..Default::default() },
  );
  let report = engine.run_cycle().await.unwrap();

  assert_eq!(report.failed, 1);
  assert_eq!(report.notifications_sent, 1);
}

// ─── Shutdown ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stop_request_skips_unstarted_subjects() {
  let db = store().await;
  db.follow("u1", "Meryl Streep").await.unwrap();
  db.follow("u1", "Tom Hanks").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  let sink = Arc::new(RecordingSink::default());
  let (_tx, stop) = watch::channel(true);

  let report = engine(&provider, db.clone(), db, &sink)
    .run_cycle_until(&stop)
    .await
    .unwrap();

  assert_eq!(report.skipped_shutdown, 2);
  assert_eq!(report.subjects, 0);
  assert!(provider.resolved().is_empty());
}

#[tokio::test]
async fn scheduled_engine_announces_on_its_first_run() {
  let db = store().await;
  db.follow("u1", "Tom Hanks").await.unwrap();

  let provider = Arc::new(FakeProvider::default().with("Tom Hanks", Behavior::Resolves(31)));
  provider.set_releases(31, vec![release(MediaKind::Movie, "100", "Movie A")]);
  let sink = Arc::new(RecordingSink::default());
  let engine = Arc::new(engine(&provider, db.clone(), db.clone(), &sink));

  let handle = Scheduler::new(engine, Duration::from_secs(3600)).spawn();
  tokio::time::timeout(Duration::from_secs(5), async {
    while sink.attempts().is_empty() {
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .expect("first cycle should notify without waiting for the interval");
  handle.shutdown().await;

  assert_eq!(sink.attempts(), [attempt("u1", "Tom Hanks", "movie:100")]);
  assert_eq!(provider.resolved(), ["Tom Hanks"]);
  assert_eq!(db.list_releases("Tom Hanks").await.unwrap().len(), 1);
}

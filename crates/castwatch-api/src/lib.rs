//! JSON REST API for castwatch.
//!
//! Exposes an axum [`Router`] backed by any
//! [`castwatch_core::store::SubscriptionStore`] and
//! [`castwatch_core::provider::MetadataProvider`]. There is no auth: the
//! subscriber id is whatever the caller supplies.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(castwatch_api::api_router(ApiState::new(store, provider)))
//! ```

pub mod actors;
pub mod error;
pub mod follows;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use castwatch_core::{provider::MetadataProvider, store::SubscriptionStore};
use serde_json::{Value, json};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, P> {
  pub store:    Arc<S>,
  pub provider: Arc<P>,
}

impl<S, P> ApiState<S, P> {
  pub fn new(store: Arc<S>, provider: Arc<P>) -> Self { Self { store, provider } }
}

// Manual impl: neither `S` nor `P` needs to be `Clone`.
impl<S, P> Clone for ApiState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      provider: self.provider.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested or merged into any parent router
/// regardless of its own state type.
pub fn api_router<S, P>(state: ApiState<S, P>) -> Router<()>
where
  S: SubscriptionStore + 'static,
  P: MetadataProvider + 'static,
{
  Router::new()
    // Follows
    .route("/follow", post(follows::create::<S, P>))
    .route("/follows/{subscriber_id}", get(follows::list::<S, P>))
    // Actors
    .route("/actors/search", get(actors::search::<S, P>))
    // Health
    .route("/health", get(health))
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

//! Handlers for follow endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/follow` | Body: `{"subscriber_id":"u1","subject_query":"Tom Hanks"}` |
//! | `GET`  | `/follows/:subscriber_id` | Subscriptions, sorted by subject query |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use castwatch_core::{
  provider::MetadataProvider,
  store::SubscriptionStore,
  subject::Subscription,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// Missing fields deserialize as empty and are rejected with 400.
#[derive(Debug, Deserialize)]
pub struct FollowBody {
  #[serde(default)]
  pub subscriber_id: String,
  #[serde(default)]
  pub subject_query: String,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
  pub subscriber_id: String,
  pub subject_query: String,
  /// `false` when the subscriber already followed this query.
  pub created:       bool,
}

/// `POST /follow`: 201 for a new follow, 200 if it already existed.
pub async fn create<S, P>(
  State(state): State<ApiState<S, P>>,
  Json(body): Json<FollowBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
  P: MetadataProvider,
{
  let subscriber_id = body.subscriber_id.trim();
  let subject_query = body.subject_query.trim();
  if subscriber_id.is_empty() || subject_query.is_empty() {
    return Err(ApiError::BadRequest(
      "subscriber_id and subject_query are required".into(),
    ));
  }

  let created = state
    .store
    .follow(subscriber_id, subject_query)
    .await
    .map_err(ApiError::store)?;

  if created {
    tracing::info!(subscriber = subscriber_id, subject = subject_query, "follow added");
  }
  let status = if created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(FollowResponse {
    subscriber_id: subscriber_id.to_owned(),
    subject_query: subject_query.to_owned(),
    created,
  })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /follows/:subscriber_id`
pub async fn list<S, P>(
  State(state): State<ApiState<S, P>>,
  Path(subscriber_id): Path<String>,
) -> Result<Json<Vec<Subscription>>, ApiError>
where
  S: SubscriptionStore,
  P: MetadataProvider,
{
  let follows = state
    .store
    .follows_for(&subscriber_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(follows))
}

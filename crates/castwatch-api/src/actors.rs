//! Handler for `GET /actors/search`.
//!
//! Resolves the query to the provider's top match and returns that person's
//! filmography, split into movies and shows, newest first.

use axum::{
  Json,
  extract::{Query, State},
};
use castwatch_core::{
  provider::{Filmography, MetadataProvider},
  release::Release,
  store::SubscriptionStore,
  subject::ResolvedSubject,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActorFilmography {
  pub actor:        ResolvedSubject,
  pub total_movies: usize,
  pub total_shows:  usize,
  pub movies:       Vec<Release>,
  pub shows:        Vec<Release>,
}

/// `GET /actors/search?query=<name>`
pub async fn search<S, P>(
  State(state): State<ApiState<S, P>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<ActorFilmography>, ApiError>
where
  S: SubscriptionStore,
  P: MetadataProvider,
{
  let query = params.query.as_deref().map(str::trim).unwrap_or_default();
  if query.is_empty() {
    return Err(ApiError::BadRequest("query parameter is required".into()));
  }

  let actor = state
    .provider
    .resolve_subject(query)
    .await
    .map_err(ApiError::provider)?
    .ok_or_else(|| ApiError::NotFound(format!("no actor found matching {query:?}")))?;

  let releases = state
    .provider
    .fetch_known_releases(&actor)
    .await
    .map_err(ApiError::provider)?;
  let Filmography { movies, shows } = Filmography::from_releases(releases);

  Ok(Json(ActorFilmography {
    actor,
    total_movies: movies.len(),
    total_shows: shows.len(),
    movies,
    shows,
  }))
}

//! TMDB client for castwatch.
//!
//! Implements [`castwatch_core::provider::MetadataProvider`] on top of the
//! `/search/person` and `/discover/{movie,tv}` endpoints.

mod client;
mod discover;
mod provider;

pub mod error;
pub mod models;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MAX_PAGES, TmdbClient, TmdbConfig};
pub use error::{Error, Result};

//! Core types and trait definitions for castwatch.
//!
//! No HTTP and no SQL here. The trait methods return `Send` futures, so
//! implementors write plain `async fn` and callers can drive them from
//! spawned tasks.

pub mod error;
pub mod notify;
pub mod provider;
pub mod release;
pub mod store;
pub mod subject;

pub use error::{Error, Result};

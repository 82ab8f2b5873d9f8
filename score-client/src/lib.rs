//! Score API client
//!
//! Thin JSON-over-HTTP helpers for the user/score backend. HTTP error
//! statuses are returned as data; only transport and decoding failures
//! surface as [`ClientError`].

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Client error types
pub mod error;

/// Untyped `get` / `post` helpers
pub mod request;

/// Typed access to the score backend
pub mod score_api;

/// Configuration types
pub mod types;

pub use error::ClientError;
pub use request::{get, post, ApiResponse, HttpClient};
pub use score_api::{Reply, ScoreApi, ScoreApiClient};

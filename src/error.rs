use thiserror::Error;

use crate::community::CommunityError;

/// Errors surfaced to callers.
///
/// Only input that cannot be interpreted at all ends up here. Recoverable
/// problems (dangling edges, missing filter fields, degenerate ranges) are
/// logged and handled in place.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("community detection failed: {0}")]
    Community(#[from] CommunityError),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the library seams (source, store, chunking).
//! Application glue (config, transcript, main) uses `anyhow` instead.

use thiserror::Error;

/// Failure to reach the paginated chat source. Terminates a polling session.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("no active live chat for video {0}")]
    NoLiveChat(String),

    #[error("source http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("source payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of the optional external store. Always absorbed by the caller.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("store http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("store response missing field `{0}`")]
    MissingField(&'static str),

    #[error("store write timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk size must be greater than zero")]
    ZeroSize,
}

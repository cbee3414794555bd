use thiserror::Error;

use crate::domain::comics::{MAX_PANELS, MAX_PROMPT_CHARS, MIN_PANELS};

/// Reasons an inbound comic request is rejected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("prompt must be a non-empty string")]
    EmptyPrompt,
    #[error("prompt is {length} characters long; the maximum is {max}", max = MAX_PROMPT_CHARS)]
    PromptTooLong { length: usize },
    #[error("grid_type must be 0, 1 or 2, got {0}")]
    InvalidGridType(i64),
    #[error("num_panels must be between {min} and {max}, got {0}", min = MIN_PANELS, max = MAX_PANELS)]
    InvalidPanelCount(i64),
    #[error("invalid request body: {0}")]
    MalformedBody(String),
}

/// Failures talking to the image-generation provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("image provider request failed: {0}")]
    Transport(String),
    #[error("image provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("image provider response could not be parsed: {0}")]
    InvalidResponse(String),
    #[error("image provider returned no artifacts")]
    NoArtifacts,
    #[error("image provider failed to render the artifact")]
    ArtifactFailed,
}

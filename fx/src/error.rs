//! Fetch and store error types.

use thiserror::Error;

use crate::payload::ResourceKey;

/// Errors a snapshot source can fail with.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure talking to the provider.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Provider returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// Provider body could not be decoded.
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Source produced a payload for a different resource.
    #[error("Expected {expected} payload, got {actual}")]
    UnexpectedPayload {
        expected: ResourceKey,
        actual: ResourceKey,
    },

    /// Fetch task ended without producing an outcome.
    #[error("Fetch task for {resource} failed: {reason}")]
    TaskFailed { resource: ResourceKey, reason: String },

    /// Result arrived after the store stopped accepting writes for this load.
    #[error("Result for {0} arrived after the load was closed")]
    Superseded(ResourceKey),

    /// Provider-specific failure.
    #[error("Rate provider error: {0}")]
    Provider(String),
}

impl FetchError {
    /// Get error code for logs and diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Http(_) => "HTTP_ERROR",
            FetchError::Status { .. } => "PROVIDER_STATUS",
            FetchError::Decode(_) => "DECODE_ERROR",
            FetchError::UnexpectedPayload { .. } => "UNEXPECTED_PAYLOAD",
            FetchError::TaskFailed { .. } => "TASK_FAILED",
            FetchError::Superseded(_) => "SUPERSEDED",
            FetchError::Provider(_) => "PROVIDER_ERROR",
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors returned by snapshot store reads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store has not been marked ready yet.
    #[error("Data store not initialized yet")]
    NotReady,

    /// Store is ready but holds nothing under the key.
    #[error("Resource type not found: {0}")]
    NotFound(ResourceKey),

    /// Stored payload is not of the requested type.
    #[error("Resource {key} does not hold a {expected} payload")]
    TypeMismatch {
        key: ResourceKey,
        expected: &'static str,
    },
}

impl StoreError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::NotReady => "NOT_READY",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::TypeMismatch { .. } => "TYPE_MISMATCH",
        }
    }
}

/// Result type for store reads.
pub type StoreResult<T> = Result<T, StoreError>;

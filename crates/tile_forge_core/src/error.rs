//! Error types for map construction and draft decoding

use thiserror::Error;

/// Errors raised by the boundary operations of the core (create and decode).
///
/// Tool operations never produce these; out-of-range coordinates are ignored
/// or clamped instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Map width or height was not positive
    #[error("Invalid map dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    /// Draft payload is unusable as a whole
    #[error("{0}")]
    MalformedDraft(String),
}

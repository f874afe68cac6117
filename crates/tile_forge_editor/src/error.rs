//! Error types for editor boundary operations

use thiserror::Error;
use tile_forge_core::MapError;
use uuid::Uuid;

/// Failure reported by a draft-storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("Draft not found: {0}")]
    NotFound(Uuid),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Could not determine storage directory")]
    NoStorageDir,
    /// Any other message returned by a remote store
    #[error("{0}")]
    Remote(String),
}

/// Errors surfaced by [`MapEditorSession`](crate::MapEditorSession) boundary calls.
///
/// Every one of these is also written to the session status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Missing tileset texture: {0}")]
    MissingTilesetData(String),
    #[error("Save draft first before publishing.")]
    NotSaved,
}

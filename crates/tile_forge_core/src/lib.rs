//! Core data structures for tile_forge
//!
//! This crate provides the fundamental types for representing an editable tile map:
//! - `GridLayerStore` - The three named tile layers (ground, decor, collision)
//! - `TileGrid` - A single bounded grid of tile indices
//! - `MarkerSet` - NPC and monster spawn markers with toggle semantics
//! - `MapDraft` - The versioned draft/runtime payload shared with storage and play-test hosts
//!
//! Nothing in here renders or persists anything; hosts read these types to do so.

mod draft;
mod error;
mod layer;
mod marker;

pub use draft::{
    DecodedDraft, DraftDefaults, DraftLayers, DraftSpawns, MapDraft, DRAFT_VERSION,
};
pub use error::MapError;
pub use layer::{
    tile_origin, GridLayerStore, LayerName, TileGrid, TileId, EMPTY_TILE,
    MAX_LAYER_CELLS,
};
pub use marker::{Marker, MarkerKind, MarkerSet};

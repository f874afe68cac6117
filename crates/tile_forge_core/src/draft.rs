//! Draft/runtime payload - the map format shared with storage and play-test hosts
//!
//! The payload is the sole contract with collaborators outside the editor:
//!
//! ```json
//! {
//!   "version": 1, "tileSize": 32, "width": 80, "height": 45,
//!   "tilesetKey": "terrain_tiles_v2.1",
//!   "layers": { "ground": [[-1, ...], ...], "decor": [...], "collision": [...] },
//!   "spawns": { "npcs": [{ "x": 3, "y": 2 }], "monsters": [] }
//! }
//! ```
//!
//! Decoding is lenient: stored drafts may predate the current editor or be
//! hand-edited, so missing or misshapen layers are replaced rather than rejected.

use crate::{GridLayerStore, LayerName, MapError, Marker, MarkerKind, MarkerSet, TileGrid, TileId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current payload format version
pub const DRAFT_VERSION: u32 = 1;

/// Layer grids as `height` rows of `width` cells
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftLayers {
    pub ground: Vec<Vec<TileId>>,
    pub decor: Vec<Vec<TileId>>,
    pub collision: Vec<Vec<TileId>>,
}

/// Spawn markers by kind
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftSpawns {
    pub npcs: Vec<Marker>,
    pub monsters: Vec<Marker>,
}

/// The versioned map payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::asset::Asset, bevy::reflect::TypePath))]
#[serde(rename_all = "camelCase")]
pub struct MapDraft {
    pub version: u32,
    pub tile_size: u32,
    pub width: u32,
    pub height: u32,
    pub tileset_key: String,
    pub layers: DraftLayers,
    pub spawns: DraftSpawns,
}

impl MapDraft {
    /// Build a payload from live editor state
    pub fn from_parts(
        tile_size: u32,
        tileset_key: impl Into<String>,
        layers: &GridLayerStore,
        markers: &MarkerSet,
    ) -> Self {
        Self {
            version: DRAFT_VERSION,
            tile_size,
            width: layers.width(),
            height: layers.height(),
            tileset_key: tileset_key.into(),
            layers: DraftLayers {
                ground: layers.layer(LayerName::Ground).rows(),
                decor: layers.layer(LayerName::Decor).rows(),
                collision: layers.layer(LayerName::Collision).rows(),
            },
            spawns: DraftSpawns {
                npcs: markers.list(MarkerKind::Npc).to_vec(),
                monsters: markers.list(MarkerKind::Monster).to_vec(),
            },
        }
    }

    /// Serialize into a JSON value for a storage collaborator
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a stored payload into editor state.
    ///
    /// - missing or zero width/height fall back to `defaults`; negative values fail
    /// - more than [`crate::MAX_LAYER_CELLS`] cells per layer fails with [`MapError::InvalidDimensions`]
    /// - a payload without a `layers` object fails with [`MapError::MalformedDraft`]
    /// - each missing or misshapen layer becomes an empty layer and is reported
    pub fn decode(value: &Value, defaults: &DraftDefaults) -> Result<DecodedDraft, MapError> {
        let obj = value
            .as_object()
            .ok_or_else(|| MapError::MalformedDraft("Draft payload is not an object".into()))?;

        let raw_width = raw_dimension(obj.get("width"));
        let raw_height = raw_dimension(obj.get("height"));
        let width = resolve_dimension(raw_width, defaults.width);
        let height = resolve_dimension(raw_height, defaults.height);
        let (Some(width), Some(height)) = (width, height) else {
            return Err(MapError::InvalidDimensions {
                width: raw_width.unwrap_or(defaults.width as i64),
                height: raw_height.unwrap_or(defaults.height as i64),
            });
        };

        let layers = obj
            .get("layers")
            .and_then(Value::as_object)
            .ok_or_else(|| MapError::MalformedDraft("Draft payload missing layers".into()))?;

        let grids = LayerName::ALL.map(|name| {
            layers
                .get(name.as_str())
                .and_then(|v| Vec::<Vec<TileId>>::deserialize(v).ok())
                .and_then(|rows| TileGrid::from_rows(&rows, width, height))
        });
        let (layers, substituted) = GridLayerStore::from_layers(width, height, grids)?;

        let spawns = obj.get("spawns");
        let spawn_list = |kind: MarkerKind| -> Vec<Marker> {
            spawns
                .and_then(|s| s.get(kind.collection_name()))
                .and_then(|v| Vec::<Marker>::deserialize(v).ok())
                .unwrap_or_default()
        };
        let markers = MarkerSet::from_lists(
            &spawn_list(MarkerKind::Npc),
            &spawn_list(MarkerKind::Monster),
        );

        let tile_size = obj
            .get("tileSize")
            .and_then(Value::as_u64)
            .filter(|size| *size > 0)
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(defaults.tile_size);

        let tileset_key = obj
            .get("tilesetKey")
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .unwrap_or(defaults.tileset_key.as_str())
            .to_string();

        Ok(DecodedDraft {
            tile_size,
            tileset_key,
            layers,
            markers,
            substituted,
        })
    }
}

fn raw_dimension(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64)
}

/// Missing or zero means "use the default"; negative or oversized is invalid
fn resolve_dimension(raw: Option<i64>, default: u32) -> Option<u32> {
    match raw {
        None | Some(0) => Some(default),
        Some(v) => u32::try_from(v).ok(),
    }
}

/// Fallbacks used when a stored payload omits a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftDefaults {
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub tileset_key: String,
}

/// Editor state recovered from a payload
#[derive(Debug, Clone)]
pub struct DecodedDraft {
    pub tile_size: u32,
    pub tileset_key: String,
    pub layers: GridLayerStore,
    pub markers: MarkerSet,
    /// Layers that were missing or misshapen and were replaced by empty ones
    pub substituted: Vec<LayerName>,
}

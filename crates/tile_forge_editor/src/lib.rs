//! tile_forge_editor - tile map editing engine
//!
//! Owns the logical state of a map under construction and everything needed
//! to edit it interactively:
//!
//! - **Tools** - paint, erase, two-click rectangle, flood fill, NPC and monster spawns
//! - **Layers** - ground, decor and collision grids
//! - **History** - snapshot undo/redo, one entry per discrete edit
//! - **Camera** - pan, zoom-to-cursor and screen/world/tile conversion
//! - **Palette** - tileset atlases with transparent cells filtered out
//! - **Drafts** - save, load, list and publish through a [`DraftStore`]
//!
//! Rendering is left to the host, which reads
//! [`MapEditorSession::layers`] and [`MapEditorSession::markers`] and redraws
//! what [`MapEditorSession::take_dirty_layers`] reports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use tile_forge_editor::MapEditorPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(MapEditorPlugin::new().with_map_size(64, 48))
//!         .run();
//! }
//! ```
//!
//! Sessions do not need Bevy's app loop; any host can construct a
//! [`MapEditorSession`] and call it directly.

pub mod atlas;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod paint;
pub mod session;
pub mod storage;
pub mod viewport;

use bevy::prelude::*;

pub use atlas::{ImageDimensions, TilesetAtlas, TilesetImage, TilesetInfo};
pub use config::{ConfigError, EditorConfig, DEFAULT_TILESETS};
pub use error::{EditorError, PersistenceError};
pub use history::{EditHistory, EditSnapshot};
pub use input::{EditorInputPlugin, InputCapture};
pub use paint::{apply_rect, flood_fill, PaintEngine, Tool, ToolOutcome};
pub use session::{DraftMetadata, EditorAction, MapEditorSession, ToolState};
pub use storage::{
    DraftRecord, DraftStore, DraftSummary, FileDraftStore, MemoryDraftStore, PublishRequest,
    PublishedMap, SaveDraftRequest,
};
pub use viewport::ViewportController;

pub use tile_forge_core::{
    tile_origin, GridLayerStore, LayerName, MapDraft, MapError, Marker, MarkerKind, MarkerSet,
    TileId, EMPTY_TILE,
};

/// Inserts a [`MapEditorSession`] resource and the input systems that drive it
#[derive(Default)]
pub struct MapEditorPlugin {
    /// Configuration to start from. If None, loads the user config file.
    pub config: Option<EditorConfig>,
    /// Initial map size in tiles. If None, uses the configured default.
    pub map_size: Option<(u32, u32)>,
    /// Leave out the mouse/keyboard systems (default: false)
    pub skip_input: bool,
}

impl MapEditorPlugin {
    /// Create the plugin with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this configuration instead of the user config file
    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the size of the initial map in tiles
    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_size = Some((width, height));
        self
    }

    /// Leave input handling to the host
    pub fn without_input(mut self) -> Self {
        self.skip_input = true;
        self
    }
}

impl Plugin for MapEditorPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone().unwrap_or_else(EditorConfig::load);
        let (width, height) = self
            .map_size
            .unwrap_or((config.default_width, config.default_height));

        let session = match MapEditorSession::with_dimensions(config, width, height) {
            Ok(session) => session,
            Err(e) => {
                bevy::log::error!("MapEditorPlugin: could not create map: {}", e);
                return;
            }
        };
        bevy::log::info!("MapEditorPlugin: editing a {}x{} map", width, height);

        app.insert_resource(session);
        if !self.skip_input {
            app.add_plugins(EditorInputPlugin);
        }
    }
}

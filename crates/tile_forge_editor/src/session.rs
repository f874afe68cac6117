//! The editing session: selection state, strokes, camera, history and drafts
//!
//! Hosts drive a [`MapEditorSession`] with synchronous calls from their input
//! loop. Every edit changes the session immediately; storage round-trips are
//! split into request and completion halves so they can run elsewhere.

use std::collections::HashMap;

use bevy::log::{debug, info, warn};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use tile_forge_core::{GridLayerStore, LayerName, MapDraft, MarkerSet, TileId};
use uuid::Uuid;

use crate::atlas::{TilesetAtlas, TilesetImage, TilesetInfo};
use crate::config::EditorConfig;
use crate::error::{EditorError, PersistenceError};
use crate::history::{EditHistory, EditSnapshot};
use crate::paint::{PaintEngine, Tool, ToolOutcome};
use crate::storage::{
    DraftRecord, DraftStore, DraftSummary, PublishRequest, PublishedMap, SaveDraftRequest,
};
use crate::viewport::ViewportController;

/// Viewport size assumed until the host reports a real one
pub const DEFAULT_VIEWPORT_SIZE: Vec2 = Vec2::new(1280.0, 720.0);

/// Name used when saving a draft without one
pub const UNTITLED_DRAFT_NAME: &str = "Untitled Draft";

/// Name suggested when publishing a draft without one
pub const DEFAULT_PUBLISH_NAME: &str = "Contributor Map";

/// Discrete intents a host can bind to keys or buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Undo,
    Redo,
    SelectLayer(LayerName),
    SelectTool(Tool),
    /// Zoom in around the viewport centre
    ZoomIn,
    /// Zoom out around the viewport centre
    ZoomOut,
    NextTileset,
    PreviousTileset,
}

/// Tool selection: idle, or waiting for a rectangle's second corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    Idle,
    RectPending { x: i32, y: i32 },
}

/// Form metadata saved alongside the map payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftMetadata {
    pub name: String,
    pub description: String,
    pub biome: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct Stroke {
    /// The stroke's first change already pushed a history entry
    recorded: bool,
    /// Cells changed since that entry was pushed
    pending: bool,
}

/// One map under construction
#[derive(Resource)]
pub struct MapEditorSession {
    config: EditorConfig,
    tile_size: u32,
    draft_id: Option<Uuid>,
    metadata: DraftMetadata,
    tool: Tool,
    layer: LayerName,
    selected_tile: TileId,
    tileset_key: String,
    layers: GridLayerStore,
    markers: MarkerSet,
    history: EditHistory,
    viewport: ViewportController,
    engine: PaintEngine,
    atlas: TilesetAtlas,
    tileset_images: HashMap<String, Box<dyn TilesetImage>>,
    palette: Option<TilesetInfo>,
    stroke: Option<Stroke>,
    pan_anchor: Option<Vec2>,
    status: String,
}

impl MapEditorSession {
    /// Start a session on an empty map of the configured default size
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        let (width, height) = (config.default_width, config.default_height);
        Self::with_dimensions(config, width, height)
    }

    /// Start a session on an empty `width` x `height` map
    pub fn with_dimensions(
        config: EditorConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, EditorError> {
        let layers = GridLayerStore::create(width, height)?;
        let viewport = ViewportController::new(&config, DEFAULT_VIEWPORT_SIZE, width, height);

        let mut session = Self {
            tile_size: config.tile_size,
            draft_id: None,
            metadata: DraftMetadata::default(),
            tool: Tool::Paint,
            layer: LayerName::Ground,
            selected_tile: 0,
            tileset_key: config.default_tileset.clone(),
            layers,
            markers: MarkerSet::new(),
            history: EditHistory::new(config.max_history),
            viewport,
            engine: PaintEngine::new(),
            atlas: TilesetAtlas::from_config(&config),
            tileset_images: HashMap::new(),
            palette: None,
            stroke: None,
            pan_anchor: None,
            status: String::new(),
            config,
        };
        session.record("init");
        Ok(session)
    }

    /// Replace the map with a fresh empty one. The draft id is cleared and
    /// history restarts.
    pub fn create_map(&mut self, width: u32, height: u32) -> Result<(), EditorError> {
        let layers = GridLayerStore::create(width, height)?;
        self.draft_id = None;
        self.metadata = DraftMetadata::default();
        self.tile_size = self.config.tile_size;
        self.install(layers, MarkerSet::new());
        self.refresh_palette();
        self.record("init");
        self.set_status(format!("New map {}x{}", width, height));
        Ok(())
    }

    /// Swap in new map contents, rebuilding viewport and history
    fn install(&mut self, layers: GridLayerStore, markers: MarkerSet) {
        let viewport_size = self.viewport.viewport_size();
        let viewport_config = EditorConfig {
            tile_size: self.tile_size,
            ..self.config.clone()
        };
        self.viewport =
            ViewportController::new(&viewport_config, viewport_size, layers.width(), layers.height());
        self.layers = layers;
        self.layers.mark_all_dirty();
        self.markers = markers;
        self.markers.mark_dirty();
        self.history = EditHistory::new(self.config.max_history);
        self.engine.cancel_rect();
        self.stroke = None;
        self.pan_anchor = None;
    }

    // Accessors

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn draft_id(&self) -> Option<Uuid> {
        self.draft_id
    }

    pub fn metadata(&self) -> &DraftMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: DraftMetadata) {
        self.metadata = metadata;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn layer(&self) -> LayerName {
        self.layer
    }

    pub fn selected_tile(&self) -> TileId {
        self.selected_tile
    }

    pub fn tileset_key(&self) -> &str {
        &self.tileset_key
    }

    pub fn layers(&self) -> &GridLayerStore {
        &self.layers
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// Palette of the active tileset, once its image is registered
    pub fn palette(&self) -> Option<&TilesetInfo> {
        self.palette.as_ref()
    }

    /// Last status message for the host UI
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn tool_state(&self) -> ToolState {
        match self.engine.rect_anchor() {
            Some((x, y)) => ToolState::RectPending { x, y },
            None => ToolState::Idle,
        }
    }

    /// Layers changed since the last call, for the renderer
    pub fn take_dirty_layers(&mut self) -> Vec<LayerName> {
        self.layers.take_dirty()
    }

    /// Whether markers changed since the last call
    pub fn take_markers_dirty(&mut self) -> bool {
        self.markers.take_dirty()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        info!("{}", self.status);
    }

    fn set_failure(&mut self, message: String) {
        warn!("{}", message);
        self.status = message;
    }

    // Selection

    /// Switch tool. A pending rectangle anchor is discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        self.engine.cancel_rect();
        self.tool = tool;
    }

    /// Switch the active layer. A pending rectangle anchor is discarded.
    pub fn set_layer(&mut self, layer: LayerName) {
        self.engine.cancel_rect();
        self.layer = layer;
    }

    /// Choose the brush tile. Returns false if the tile is not in the palette.
    pub fn select_tile(&mut self, tile: TileId) -> bool {
        let allowed = tile >= 0 && self.palette.as_ref().map_or(true, |p| p.is_visible(tile));
        if allowed {
            self.selected_tile = tile;
        }
        allowed
    }

    // Strokes

    /// Tile under a viewport point
    pub fn tile_at_screen(&self, screen: Vec2) -> (i32, i32) {
        self.viewport.screen_to_tile(screen)
    }

    /// Pointer pressed on a tile
    pub fn begin_stroke(&mut self, tile: (i32, i32)) -> ToolOutcome {
        self.stroke = Some(Stroke::default());
        let outcome = self.apply_tool_at_tile(tile, true);
        match outcome {
            ToolOutcome::Changed { record: true } => {
                self.record(self.tool.label());
                if let Some(stroke) = self.stroke.as_mut() {
                    stroke.recorded = true;
                }
            }
            ToolOutcome::RectAnchored { x, y } => {
                self.set_status(format!("Rect start: ({}, {}). Click second point.", x, y));
            }
            _ => {}
        }
        outcome
    }

    /// Pointer dragged onto a tile while pressed
    pub fn continue_stroke(&mut self, tile: (i32, i32)) -> ToolOutcome {
        if self.stroke.is_none() {
            return ToolOutcome::Ignored;
        }
        let outcome = self.apply_tool_at_tile(tile, false);
        if let (ToolOutcome::Changed { .. }, Some(stroke)) = (outcome, self.stroke.as_mut()) {
            stroke.pending = true;
        }
        outcome
    }

    /// Pointer released. The stroke's history entry is brought up to date
    /// with every cell it changed.
    pub fn end_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        if !stroke.pending {
            return;
        }
        if stroke.recorded {
            self.history.amend_current(self.snapshot());
        } else {
            self.record(self.tool.label());
        }
    }

    /// Apply the active tool at a tile without any history bookkeeping
    pub fn apply_tool_at_tile(&mut self, tile: (i32, i32), is_stroke_start: bool) -> ToolOutcome {
        let brush = self.tool.brush(self.selected_tile);
        self.engine.apply_tool(
            &mut self.layers,
            &mut self.markers,
            self.tool,
            self.layer,
            tile,
            brush,
            is_stroke_start,
        )
    }

    // Camera

    pub fn begin_pan(&mut self, screen: Vec2) {
        self.pan_anchor = Some(screen);
    }

    /// Drag the map with the pointer: the world point under the cursor follows it
    pub fn drag_pan(&mut self, screen: Vec2) {
        if let Some(previous) = self.pan_anchor.replace(screen) {
            self.viewport.pan(previous - screen);
        }
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Wheel input at a viewport point, in pixels; positive zooms out
    pub fn wheel(&mut self, screen: Vec2, delta: f32) {
        self.viewport.zoom_by_wheel(screen, delta);
    }

    pub fn resize_viewport(&mut self, size: Vec2) {
        if size != self.viewport.viewport_size() {
            self.viewport.resize(size);
        }
    }

    // Actions

    pub fn apply_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }
            EditorAction::SelectLayer(layer) => self.set_layer(layer),
            EditorAction::SelectTool(tool) => self.set_tool(tool),
            EditorAction::ZoomIn | EditorAction::ZoomOut => {
                let step = self.config.key_zoom_step;
                let delta = if action == EditorAction::ZoomIn { -step } else { step };
                let centre = self.viewport.viewport_size() / 2.0;
                self.viewport.zoom_by_wheel(centre, delta);
            }
            EditorAction::NextTileset => {
                self.switch_tileset(1).ok();
            }
            EditorAction::PreviousTileset => {
                self.switch_tileset(-1).ok();
            }
        }
    }

    // History

    fn snapshot(&self) -> EditSnapshot {
        EditSnapshot {
            draft_id: self.draft_id,
            tileset_key: self.tileset_key.clone(),
            active_layer: self.layer,
            selected_tile: self.selected_tile,
            layers: self.layers.clone(),
            markers: self.markers.clone(),
        }
    }

    fn record(&mut self, reason: &str) {
        self.history.push(self.snapshot());
        debug!(
            "History push ({}): {}/{}",
            reason,
            self.history.index().map_or(0, |i| i + 1),
            self.history.len()
        );
    }

    /// Step back one snapshot. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.stroke = None;
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Step forward one snapshot. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.stroke = None;
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: EditSnapshot) {
        let tileset_changed = snapshot.tileset_key != self.tileset_key;
        let selected_tile = snapshot.selected_tile;

        self.draft_id = snapshot.draft_id;
        self.tileset_key = snapshot.tileset_key;
        self.layer = snapshot.active_layer;
        self.selected_tile = snapshot.selected_tile;
        self.layers = snapshot.layers;
        self.layers.mark_all_dirty();
        self.markers = snapshot.markers;
        self.markers.mark_dirty();
        self.engine.cancel_rect();

        if tileset_changed {
            self.rebuild_palette().ok();
            // Selection is restored as recorded, not reconciled
            self.selected_tile = selected_tile;
        }

        self.set_status(format!(
            "Restored snapshot ({}/{})",
            self.history.index().map_or(0, |i| i + 1),
            self.history.len()
        ));
    }

    // Tilesets

    /// Provide pixel access for a tileset. Replaces any earlier image for the key.
    pub fn register_tileset_image(&mut self, key: impl Into<String>, image: impl TilesetImage + 'static) {
        let key = key.into();
        self.atlas.invalidate(&key);
        let is_active = key == self.tileset_key;
        self.tileset_images.insert(key, Box::new(image));
        if is_active {
            self.rebuild_palette().ok();
        }
    }

    /// Recompute the palette for the active tileset.
    ///
    /// Without a registered image the palette is cleared and every tile is selectable.
    pub fn rebuild_palette(&mut self) -> Result<(), EditorError> {
        let Some(image) = self.tileset_images.get(&self.tileset_key) else {
            self.palette = None;
            let err = EditorError::MissingTilesetData(self.tileset_key.clone());
            self.set_failure(err.to_string());
            return Err(err);
        };
        let info = self
            .atlas
            .resolve_cached(&self.tileset_key, &**image, self.tile_size)
            .clone();
        self.selected_tile = info.reconcile_selection(self.selected_tile);
        self.palette = Some(info);
        Ok(())
    }

    /// Rebuild the palette after the map or tile size changed, without
    /// reporting a missing image
    fn refresh_palette(&mut self) {
        if self.tileset_images.contains_key(&self.tileset_key) {
            self.rebuild_palette().ok();
        } else {
            self.palette = None;
        }
    }

    /// Make `key` the active tileset and record the change
    pub fn set_tileset(&mut self, key: impl Into<String>) -> Result<(), EditorError> {
        self.tileset_key = key.into();
        self.layers.mark_all_dirty();
        let palette = self.rebuild_palette();
        self.record("tileset");
        palette
    }

    /// Move `delta` places through the configured tileset list, wrapping
    pub fn switch_tileset(&mut self, delta: i32) -> Result<(), EditorError> {
        let count = self.config.tilesets.len() as i64;
        if count == 0 {
            return Ok(());
        }
        let current = self
            .config
            .tilesets
            .iter()
            .position(|key| *key == self.tileset_key)
            .map_or(-1, |i| i as i64);
        let next = (current + delta as i64).rem_euclid(count) as usize;
        let key = self.config.tilesets[next].clone();
        self.set_tileset(key)
    }

    // Drafts

    /// The runtime payload for the current map
    pub fn build_payload(&self) -> MapDraft {
        MapDraft::from_parts(self.tile_size, self.tileset_key.clone(), &self.layers, &self.markers)
    }

    /// Payload for a play-test host, without a storage round-trip
    pub fn play_test_payload(&self) -> MapDraft {
        self.build_payload()
    }

    /// Build the request for saving the current map
    pub fn save_request(&mut self) -> Result<SaveDraftRequest, EditorError> {
        let map_data = match self.build_payload().to_value() {
            Ok(value) => value,
            Err(e) => {
                let err = PersistenceError::Serialize(e.to_string());
                self.set_failure(format!("Save failed: {}", err));
                return Err(err.into());
            }
        };
        let name = self.metadata.name.trim();
        Ok(SaveDraftRequest {
            draft_id: self.draft_id,
            name: if name.is_empty() { UNTITLED_DRAFT_NAME } else { name }.to_string(),
            description: self.metadata.description.trim().to_string(),
            biome: self.metadata.biome.trim().to_string(),
            difficulty: self.metadata.difficulty.trim().to_string(),
            map_data,
        })
    }

    /// Apply the store's answer to a save request
    pub fn complete_save(
        &mut self,
        result: Result<DraftRecord, PersistenceError>,
    ) -> Result<Uuid, EditorError> {
        match result {
            Ok(record) => {
                self.draft_id = Some(record.draft_id);
                self.set_status(format!("Draft saved: {}", record.draft_id));
                self.record("save");
                Ok(record.draft_id)
            }
            Err(e) => {
                self.set_failure(format!("Save failed: {}", e));
                Err(e.into())
            }
        }
    }

    pub fn save(&mut self, store: &mut dyn DraftStore) -> Result<Uuid, EditorError> {
        let request = self.save_request()?;
        let result = store.save(&request);
        self.complete_save(result)
    }

    /// Apply a loaded draft. Replaces the map, markers, camera and history
    /// regardless of edits made since the load was requested.
    pub fn complete_load(
        &mut self,
        result: Result<DraftRecord, PersistenceError>,
    ) -> Result<(), EditorError> {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                self.set_failure(format!("Load failed: {}", e));
                return Err(e.into());
            }
        };

        let decoded = match MapDraft::decode(&record.map_data, &self.config.draft_defaults()) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.set_failure(format!("Load failed: {}", e));
                return Err(e.into());
            }
        };

        for layer in &decoded.substituted {
            warn!(
                "Draft {} has no usable {} layer; using an empty one",
                record.draft_id, layer
            );
        }

        self.draft_id = Some(record.draft_id);
        self.metadata = DraftMetadata {
            name: record.name.clone(),
            description: record.description,
            biome: record.biome,
            difficulty: record.difficulty,
        };
        self.tile_size = decoded.tile_size;
        self.tileset_key = decoded.tileset_key;
        self.install(decoded.layers, decoded.markers);
        self.refresh_palette();

        let label = if record.name.is_empty() {
            record.draft_id.to_string()
        } else {
            record.name
        };
        self.set_status(format!("Loaded draft: {}", label));
        self.record("load");
        Ok(())
    }

    pub fn load(&mut self, store: &dyn DraftStore, draft_id: Uuid) -> Result<(), EditorError> {
        let result = store.load(draft_id);
        self.complete_load(result)
    }

    /// Build the request for publishing the saved draft
    pub fn publish_request(&mut self) -> Result<(Uuid, PublishRequest), EditorError> {
        let Some(draft_id) = self.draft_id else {
            let err = EditorError::NotSaved;
            self.set_failure(err.to_string());
            return Err(err);
        };
        let name = self.metadata.name.trim();
        Ok((
            draft_id,
            PublishRequest {
                name: if name.is_empty() { DEFAULT_PUBLISH_NAME } else { name }.to_string(),
                description: self.metadata.description.trim().to_string(),
            },
        ))
    }

    pub fn complete_publish(
        &mut self,
        result: Result<PublishedMap, PersistenceError>,
    ) -> Result<Uuid, EditorError> {
        match result {
            Ok(published) => {
                self.set_status(format!("Published map: {}", published.map_id));
                Ok(published.map_id)
            }
            Err(e) => {
                self.set_failure(format!("Publish failed: {}", e));
                Err(e.into())
            }
        }
    }

    pub fn publish(&mut self, store: &mut dyn DraftStore) -> Result<Uuid, EditorError> {
        let (draft_id, request) = self.publish_request()?;
        let result = store.publish(draft_id, &request);
        self.complete_publish(result)
    }

    /// Drafts available to load, newest first
    pub fn list_drafts(&mut self, store: &dyn DraftStore) -> Result<Vec<DraftSummary>, EditorError> {
        store.list().map_err(|e| {
            self.set_failure(format!("Failed to load drafts: {}", e));
            e.into()
        })
    }
}

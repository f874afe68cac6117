//! Editing tools - paint, erase, rectangle, flood fill and spawn markers
//!
//! Tools are total over their inputs: coordinates outside the grid are
//! ignored (paint, erase, markers) or clamped (rect, fill) and never fail.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tile_forge_core::{GridLayerStore, LayerName, MarkerKind, MarkerSet, TileId, EMPTY_TILE};

/// The active editing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Paint,
    Erase,
    Rect,
    Fill,
    NpcSpawn,
    MonsterSpawn,
}

impl Tool {
    /// Tools in toolbar order
    pub const ALL: [Tool; 6] = [
        Tool::Paint,
        Tool::Erase,
        Tool::Fill,
        Tool::Rect,
        Tool::NpcSpawn,
        Tool::MonsterSpawn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Paint => "Paint",
            Tool::Erase => "Erase",
            Tool::Rect => "Rect",
            Tool::Fill => "Fill",
            Tool::NpcSpawn => "NPC",
            Tool::MonsterSpawn => "Monster",
        }
    }

    /// The marker kind toggled by a spawn tool
    pub fn marker_kind(&self) -> Option<MarkerKind> {
        match self {
            Tool::NpcSpawn => Some(MarkerKind::Npc),
            Tool::MonsterSpawn => Some(MarkerKind::Monster),
            _ => None,
        }
    }

    /// Value this tool writes given the selected tile
    pub fn brush(&self, selected_tile: TileId) -> TileId {
        match self {
            Tool::Erase => EMPTY_TILE,
            _ => selected_tile,
        }
    }

    /// Returns true if this tool keeps applying while the pointer drags
    pub fn is_continuous(&self) -> bool {
        matches!(self, Tool::Paint | Tool::Erase)
    }
}

/// What a tool application did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Nothing changed
    Ignored,
    /// First rectangle corner recorded; waiting for the second click
    RectAnchored { x: i32, y: i32 },
    /// Grid or markers changed. `record` is set when this call completes a
    /// discrete edit that deserves its own history entry.
    Changed { record: bool },
}

/// Applies tools to the layer store and marker set.
///
/// The only state carried between calls is the pending rectangle anchor.
#[derive(Debug, Clone, Default)]
pub struct PaintEngine {
    rect_anchor: Option<(i32, i32)>,
}

impl PaintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor of a rectangle waiting for its second click
    pub fn rect_anchor(&self) -> Option<(i32, i32)> {
        self.rect_anchor
    }

    /// Discard a pending rectangle anchor
    pub fn cancel_rect(&mut self) {
        self.rect_anchor = None;
    }

    /// Apply `tool` at tile `pos`.
    ///
    /// `brush` is the value written by tile tools (a tile index or
    /// [`EMPTY_TILE`]). `is_stroke_start` is true for the pointer press and
    /// false for drag continuations; only paint and erase act on the latter.
    pub fn apply_tool(
        &mut self,
        layers: &mut GridLayerStore,
        markers: &mut MarkerSet,
        tool: Tool,
        layer: LayerName,
        pos: (i32, i32),
        brush: TileId,
        is_stroke_start: bool,
    ) -> ToolOutcome {
        let (x, y) = pos;
        match tool {
            Tool::Paint | Tool::Erase => {
                if layers.set(layer, x, y, brush) {
                    ToolOutcome::Changed {
                        record: is_stroke_start,
                    }
                } else {
                    ToolOutcome::Ignored
                }
            }
            Tool::Rect => {
                if !is_stroke_start {
                    return ToolOutcome::Ignored;
                }
                match self.rect_anchor.take() {
                    None => {
                        self.rect_anchor = Some(pos);
                        ToolOutcome::RectAnchored { x, y }
                    }
                    Some(anchor) => {
                        if layers.clamp_rect(anchor, pos).is_none() {
                            return ToolOutcome::Ignored;
                        }
                        apply_rect(layers, layer, anchor, pos, brush);
                        ToolOutcome::Changed { record: true }
                    }
                }
            }
            Tool::Fill => {
                if !is_stroke_start || flood_fill(layers, layer, pos, brush) == 0 {
                    return ToolOutcome::Ignored;
                }
                ToolOutcome::Changed { record: true }
            }
            Tool::NpcSpawn | Tool::MonsterSpawn => {
                if !is_stroke_start || !layers.in_bounds(x, y) {
                    return ToolOutcome::Ignored;
                }
                if let Some(kind) = tool.marker_kind() {
                    markers.toggle(kind, x, y);
                }
                ToolOutcome::Changed { record: true }
            }
        }
    }
}

/// Fill the inclusive rectangle spanned by two corners, in either order,
/// clamped to the grid. Returns the number of cells changed.
pub fn apply_rect(
    layers: &mut GridLayerStore,
    layer: LayerName,
    a: (i32, i32),
    b: (i32, i32),
    tile: TileId,
) -> usize {
    layers.fill_rect(layer, a, b, tile)
}

/// 4-connected breadth-first flood fill.
///
/// Every cell reachable from `start` through cells equal to the start value is
/// set to `replacement`. Returns the number of cells changed; zero when the
/// start is outside the grid or already holds `replacement`.
pub fn flood_fill(
    layers: &mut GridLayerStore,
    layer: LayerName,
    start: (i32, i32),
    replacement: TileId,
) -> usize {
    let Some(target) = layers.get(layer, start.0, start.1) else {
        return 0;
    };
    if target == replacement {
        return 0;
    }

    let mut queue = VecDeque::from([start]);
    let mut seen = HashSet::from([start]);
    let mut filled = 0;

    while let Some((x, y)) = queue.pop_front() {
        if layers.get(layer, x, y) != Some(target) {
            continue;
        }
        layers.set(layer, x, y, replacement);
        filled += 1;

        for next in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if layers.in_bounds(next.0, next.1) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(width: u32, height: u32) -> GridLayerStore {
        GridLayerStore::create(width, height).unwrap()
    }

    #[test]
    fn test_flood_fill_around_island() {
        let mut layers = store(3, 3);
        layers.set(LayerName::Ground, 1, 1, 5);

        let filled = flood_fill(&mut layers, LayerName::Ground, (0, 0), 9);

        assert_eq!(filled, 8);
        assert_eq!(layers.get(LayerName::Ground, 1, 1), Some(5));
        let nines = layers
            .layer(LayerName::Ground)
            .cells()
            .iter()
            .filter(|t| **t == 9)
            .count();
        assert_eq!(nines, 8);
    }

    #[test]
    fn test_flood_fill_same_value_is_noop() {
        let mut layers = store(4, 4);
        layers.take_dirty();
        let before = layers.clone();

        assert_eq!(flood_fill(&mut layers, LayerName::Decor, (2, 2), EMPTY_TILE), 0);
        assert_eq!(layers, before);
        assert!(layers.take_dirty().is_empty());
    }

    #[test]
    fn test_flood_fill_respects_walls() {
        // Vertical wall at x = 2 splits the grid
        let mut layers = store(5, 3);
        for y in 0..3 {
            layers.set(LayerName::Ground, 2, y, 1);
        }

        let filled = flood_fill(&mut layers, LayerName::Ground, (0, 0), 7);

        assert_eq!(filled, 6);
        assert_eq!(layers.get(LayerName::Ground, 3, 0), Some(EMPTY_TILE));
        assert_eq!(layers.get(LayerName::Ground, 1, 2), Some(7));
    }

    #[test]
    fn test_flood_fill_diagonal_is_not_connected() {
        let mut layers = store(2, 2);
        layers.set(LayerName::Ground, 1, 0, 3);
        layers.set(LayerName::Ground, 0, 1, 3);

        assert_eq!(flood_fill(&mut layers, LayerName::Ground, (0, 0), 4), 1);
        assert_eq!(layers.get(LayerName::Ground, 1, 1), Some(EMPTY_TILE));
    }

    #[test]
    fn test_flood_fill_outside_grid() {
        let mut layers = store(2, 2);
        assert_eq!(flood_fill(&mut layers, LayerName::Ground, (5, 0), 4), 0);
    }

    #[test]
    fn test_flood_fill_large_grid_terminates() {
        let mut layers = store(200, 150);
        assert_eq!(
            flood_fill(&mut layers, LayerName::Collision, (199, 149), 2),
            200 * 150
        );
    }

    #[test]
    fn test_rect_order_independence() {
        let mut a = store(6, 6);
        let mut b = store(6, 6);

        apply_rect(&mut a, LayerName::Ground, (4, 4), (1, 1), 3);
        apply_rect(&mut b, LayerName::Ground, (1, 1), (4, 4), 3);

        assert_eq!(a, b);
        assert_eq!(
            a.layer(LayerName::Ground)
                .cells()
                .iter()
                .filter(|t| **t == 3)
                .count(),
            16
        );
        assert_eq!(a.get(LayerName::Ground, 0, 0), Some(EMPTY_TILE));
        assert_eq!(a.get(LayerName::Ground, 5, 5), Some(EMPTY_TILE));
    }

    #[test]
    fn test_rect_tool_two_clicks() {
        let mut engine = PaintEngine::new();
        let mut layers = store(5, 5);
        let mut markers = MarkerSet::new();

        let first = engine.apply_tool(
            &mut layers,
            &mut markers,
            Tool::Rect,
            LayerName::Decor,
            (3, 3),
            2,
            true,
        );
        assert_eq!(first, ToolOutcome::RectAnchored { x: 3, y: 3 });
        assert_eq!(engine.rect_anchor(), Some((3, 3)));
        assert_eq!(layers.get(LayerName::Decor, 3, 3), Some(EMPTY_TILE));

        // Drag continuation does not complete the rectangle
        let drag = engine.apply_tool(
            &mut layers,
            &mut markers,
            Tool::Rect,
            LayerName::Decor,
            (0, 0),
            2,
            false,
        );
        assert_eq!(drag, ToolOutcome::Ignored);

        let second = engine.apply_tool(
            &mut layers,
            &mut markers,
            Tool::Rect,
            LayerName::Decor,
            (1, 2),
            2,
            true,
        );
        assert_eq!(second, ToolOutcome::Changed { record: true });
        assert_eq!(engine.rect_anchor(), None);
        assert_eq!(layers.get(LayerName::Decor, 2, 3), Some(2));
        assert_eq!(layers.get(LayerName::Decor, 0, 2), Some(EMPTY_TILE));
    }

    #[test]
    fn test_rect_clamps_outside_corner() {
        let mut engine = PaintEngine::new();
        let mut layers = store(3, 3);
        let mut markers = MarkerSet::new();

        engine.apply_tool(&mut layers, &mut markers, Tool::Rect, LayerName::Ground, (-4, 1), 6, true);
        let outcome =
            engine.apply_tool(&mut layers, &mut markers, Tool::Rect, LayerName::Ground, (1, 9), 6, true);

        assert_eq!(outcome, ToolOutcome::Changed { record: true });
        assert_eq!(layers.get(LayerName::Ground, 0, 2), Some(6));
        assert_eq!(layers.get(LayerName::Ground, 2, 2), Some(EMPTY_TILE));
    }

    #[test]
    fn test_paint_records_only_stroke_start() {
        let mut engine = PaintEngine::new();
        let mut layers = store(3, 3);
        let mut markers = MarkerSet::new();

        let start =
            engine.apply_tool(&mut layers, &mut markers, Tool::Paint, LayerName::Ground, (0, 0), 1, true);
        let drag =
            engine.apply_tool(&mut layers, &mut markers, Tool::Paint, LayerName::Ground, (1, 0), 1, false);
        let repeat =
            engine.apply_tool(&mut layers, &mut markers, Tool::Paint, LayerName::Ground, (1, 0), 1, false);
        let outside =
            engine.apply_tool(&mut layers, &mut markers, Tool::Paint, LayerName::Ground, (3, 0), 1, true);

        assert_eq!(start, ToolOutcome::Changed { record: true });
        assert_eq!(drag, ToolOutcome::Changed { record: false });
        assert_eq!(repeat, ToolOutcome::Ignored);
        assert_eq!(outside, ToolOutcome::Ignored);
    }

    #[test]
    fn test_erase_writes_empty() {
        let mut engine = PaintEngine::new();
        let mut layers = store(2, 2);
        let mut markers = MarkerSet::new();
        layers.set(LayerName::Collision, 1, 1, 4);

        let brush = Tool::Erase.brush(4);
        engine.apply_tool(&mut layers, &mut markers, Tool::Erase, LayerName::Collision, (1, 1), brush, true);

        assert_eq!(layers.get(LayerName::Collision, 1, 1), Some(EMPTY_TILE));
    }

    #[test]
    fn test_marker_tools_toggle() {
        let mut engine = PaintEngine::new();
        let mut layers = store(4, 4);
        let mut markers = MarkerSet::new();

        engine.apply_tool(&mut layers, &mut markers, Tool::NpcSpawn, LayerName::Ground, (3, 2), 0, true);
        assert!(markers.contains(MarkerKind::Npc, 3, 2));

        let outside =
            engine.apply_tool(&mut layers, &mut markers, Tool::MonsterSpawn, LayerName::Ground, (4, 0), 0, true);
        assert_eq!(outside, ToolOutcome::Ignored);

        engine.apply_tool(&mut layers, &mut markers, Tool::NpcSpawn, LayerName::Ground, (3, 2), 0, true);
        assert!(markers.is_empty());
    }
}

//! Tile layers: bounded grids of tile indices, one per named layer

use crate::MapError;
use serde::{Deserialize, Serialize};

/// A tileset-local tile index, or [`EMPTY_TILE`]
pub type TileId = i32;

/// Sentinel value for an empty cell
pub const EMPTY_TILE: TileId = -1;

/// Largest number of cells a single layer may hold (4096x4096)
pub const MAX_LAYER_CELLS: u64 = 4096 * 4096;

/// World-space top-left corner of a tile cell
#[inline]
pub fn tile_origin(x: u32, y: u32, tile_size: u32) -> (f32, f32) {
    ((x * tile_size) as f32, (y * tile_size) as f32)
}

/// The three named layers composing a map, in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerName {
    #[default]
    Ground,
    Decor,
    Collision,
}

impl LayerName {
    /// All layers in draw order
    pub const ALL: [LayerName; 3] = [LayerName::Ground, LayerName::Decor, LayerName::Collision];

    /// Position of this layer in draw order
    pub fn index(self) -> usize {
        match self {
            LayerName::Ground => 0,
            LayerName::Decor => 1,
            LayerName::Collision => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayerName::Ground => "ground",
            LayerName::Decor => "decor",
            LayerName::Collision => "collision",
        }
    }
}

impl std::fmt::Display for LayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rectangular, row-major grid of tile indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<TileId>,
}

impl TileGrid {
    /// Create a grid with every cell set to [`EMPTY_TILE`]
    pub fn new(width: u32, height: u32) -> Result<Self, MapError> {
        check_dimensions(width, height)?;
        Ok(Self::empty(width, height))
    }

    fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY_TILE; width as usize * height as usize],
        }
    }

    /// Build a grid from `height` rows of `width` cells.
    /// Returns None if the rows do not have exactly that shape.
    pub fn from_rows(rows: &[Vec<TileId>], width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || rows.len() != height as usize {
            return None;
        }
        if rows.iter().any(|row| row.len() != width as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check whether a (possibly negative) tile coordinate lies inside the grid
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Get the tile at a position, or None if out of range
    pub fn get(&self, x: i32, y: i32) -> Option<TileId> {
        self.cell_index(x, y).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell. Out-of-range writes are ignored.
    /// Returns true if the cell value changed.
    pub fn set(&mut self, x: i32, y: i32, tile: TileId) -> bool {
        let Some(idx) = self.cell_index(x, y) else {
            return false;
        };
        if self.cells[idx] == tile {
            return false;
        }
        self.cells[idx] = tile;
        true
    }

    /// Raw row-major cell data
    pub fn cells(&self) -> &[TileId] {
        &self.cells
    }

    /// Cells as `height` rows of `width` values (the payload layout)
    pub fn rows(&self) -> Vec<Vec<TileId>> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Iterate over non-empty cells as (x, y, tile)
    pub fn occupied(&self) -> impl Iterator<Item = (u32, u32, TileId)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile != EMPTY_TILE)
            .map(move |(idx, tile)| ((idx % width) as u32, (idx / width) as u32, *tile))
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), MapError> {
    if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_LAYER_CELLS {
        return Err(MapError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }
    Ok(())
}

/// Owner of the ground, decor and collision grids of one map.
///
/// All three grids always share the store's dimensions. Writes mark the
/// affected layer dirty so a renderer can redraw only what changed.
#[derive(Debug, Clone)]
pub struct GridLayerStore {
    width: u32,
    height: u32,
    layers: [TileGrid; 3],
    dirty: [bool; 3],
}

impl GridLayerStore {
    /// Create three empty layers of the given size
    pub fn create(width: u32, height: u32) -> Result<Self, MapError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            layers: [
                TileGrid::empty(width, height),
                TileGrid::empty(width, height),
                TileGrid::empty(width, height),
            ],
            dirty: [true; 3],
        })
    }

    /// Assemble a store from existing grids, replacing any grid whose size
    /// does not match with an empty one. Returns the replaced layers.
    pub fn from_layers(
        width: u32,
        height: u32,
        mut grids: [Option<TileGrid>; 3],
    ) -> Result<(Self, Vec<LayerName>), MapError> {
        let mut store = Self::create(width, height)?;
        let mut substituted = Vec::new();
        for name in LayerName::ALL {
            match grids[name.index()].take() {
                Some(grid) if grid.width == width && grid.height == height => {
                    store.layers[name.index()] = grid;
                }
                _ => substituted.push(name),
            }
        }
        Ok((store, substituted))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.layers[0].in_bounds(x, y)
    }

    /// Borrow a whole layer grid
    pub fn layer(&self, layer: LayerName) -> &TileGrid {
        &self.layers[layer.index()]
    }

    /// Get tile at position for a layer, or None if out of range
    pub fn get(&self, layer: LayerName, x: i32, y: i32) -> Option<TileId> {
        self.layers[layer.index()].get(x, y)
    }

    /// Set tile at position for a layer. Out-of-range writes are ignored.
    /// Returns true if the cell changed.
    pub fn set(&mut self, layer: LayerName, x: i32, y: i32, tile: TileId) -> bool {
        let changed = self.layers[layer.index()].set(x, y, tile);
        if changed {
            self.dirty[layer.index()] = true;
        }
        changed
    }

    /// Fill the inclusive rectangle spanned by two corners, clamped to the grid.
    /// Corner order does not matter. Returns the number of cells changed.
    pub fn fill_rect(
        &mut self,
        layer: LayerName,
        a: (i32, i32),
        b: (i32, i32),
        tile: TileId,
    ) -> usize {
        let Some((min_x, min_y, max_x, max_y)) = self.clamp_rect(a, b) else {
            return 0;
        };
        let mut changed = 0;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if self.set(layer, x, y, tile) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Normalize two corners into (min_x, min_y, max_x, max_y) inside the grid.
    /// Returns None if the rectangle lies entirely outside.
    pub fn clamp_rect(&self, a: (i32, i32), b: (i32, i32)) -> Option<(i32, i32, i32, i32)> {
        let min_x = a.0.min(b.0).max(0);
        let max_x = a.0.max(b.0).min(self.width as i32 - 1);
        let min_y = a.1.min(b.1).max(0);
        let max_y = a.1.max(b.1).min(self.height as i32 - 1);
        (min_x <= max_x && min_y <= max_y).then_some((min_x, min_y, max_x, max_y))
    }

    /// Mark every layer dirty (after a wholesale restore)
    pub fn mark_all_dirty(&mut self) {
        self.dirty = [true; 3];
    }

    /// Whether a layer changed since the last [`take_dirty`](Self::take_dirty)
    pub fn is_dirty(&self, layer: LayerName) -> bool {
        self.dirty[layer.index()]
    }

    /// Return the layers changed since the last call and clear their flags
    pub fn take_dirty(&mut self) -> Vec<LayerName> {
        let dirty = LayerName::ALL
            .into_iter()
            .filter(|name| self.dirty[name.index()])
            .collect();
        self.dirty = [false; 3];
        dirty
    }
}

impl PartialEq for GridLayerStore {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.layers == other.layers
    }
}

impl Eq for GridLayerStore {}

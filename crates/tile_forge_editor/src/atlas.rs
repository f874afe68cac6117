//! Tileset atlas resolution - which cells of a tileset image belong in the palette
//!
//! Sprite sheets are often padded with fully transparent cells. Each cell is
//! sampled at a small grid of interior points; only cells with at least one
//! sufficiently opaque sample are offered in the palette.

use image::{DynamicImage, GenericImageView, ImageBuffer, RgbaImage};
use std::collections::HashMap;
use tile_forge_core::TileId;

use crate::config::EditorConfig;

/// Pixel access supplied by the host's graphics layer
pub trait TilesetImage: Send + Sync {
    /// Image size in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Alpha of the pixel at (x, y), or None if pixel data cannot be read
    fn alpha_at(&self, x: u32, y: u32) -> Option<u8>;
}

impl TilesetImage for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        self.get_pixel_checked(x, y).map(|pixel| pixel.0[3])
    }
}

impl TilesetImage for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        let (width, height) = GenericImageView::dimensions(self);
        (x < width && y < height).then(|| self.get_pixel(x, y).0[3])
    }
}

/// An image whose size is known but whose pixels cannot be sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl TilesetImage for ImageDimensions {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn alpha_at(&self, _x: u32, _y: u32) -> Option<u8> {
        None
    }
}

/// Derived layout of a tileset image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetInfo {
    pub columns: u32,
    pub rows: u32,
    pub tile_size: u32,
    /// Palette entries in row-major order
    pub visible: Vec<TileId>,
}

impl TilesetInfo {
    /// Layout with every cell visible (used when pixels cannot be sampled)
    pub fn all_visible(columns: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            columns,
            rows,
            tile_size,
            visible: (0..(columns * rows) as TileId).collect(),
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn is_visible(&self, tile: TileId) -> bool {
        self.visible.contains(&tile)
    }

    /// Keep the selected tile if it is still in the palette, otherwise fall
    /// back to the first visible tile
    pub fn reconcile_selection(&self, selected: TileId) -> TileId {
        if self.is_visible(selected) {
            selected
        } else {
            self.visible.first().copied().unwrap_or(0)
        }
    }

    /// Pixel rectangle (x, y, w, h) of a tile in the source image.
    /// Indices beyond the atlas are clamped to the last cell.
    pub fn source_rect(&self, tile: TileId) -> (u32, u32, u32, u32) {
        let max = self.tile_count().saturating_sub(1);
        let index = (tile.max(0) as u32).min(max);
        (
            (index % self.columns) * self.tile_size,
            (index / self.columns) * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }
}

/// Resolves and caches [`TilesetInfo`] per tileset key and tile size
#[derive(Debug, Clone)]
pub struct TilesetAtlas {
    alpha_threshold: u8,
    samples_per_axis: u32,
    cache: HashMap<(String, u32), TilesetInfo>,
}

impl Default for TilesetAtlas {
    fn default() -> Self {
        Self::new(8, 4)
    }
}

impl TilesetAtlas {
    pub fn new(alpha_threshold: u8, samples_per_axis: u32) -> Self {
        Self {
            alpha_threshold,
            samples_per_axis: samples_per_axis.max(1),
            cache: HashMap::new(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.alpha_threshold, config.samples_per_axis)
    }

    /// Interior sample offsets within a cell, evenly spaced and inset from the edges
    fn sample_offsets(&self, tile_size: u32) -> Vec<u32> {
        let n = self.samples_per_axis;
        (0..n).map(|i| (2 * i + 1) * tile_size / (2 * n)).collect()
    }

    /// Compute the layout and visible cells of a tileset image
    pub fn resolve(&self, image: &dyn TilesetImage, tile_size: u32) -> TilesetInfo {
        let tile_size = tile_size.max(1);
        let (width, height) = image.dimensions();
        let columns = (width / tile_size).max(1);
        let rows = (height / tile_size).max(1);
        let offsets = self.sample_offsets(tile_size);

        let mut visible = Vec::new();
        for row in 0..rows {
            for col in 0..columns {
                match self.cell_visible(image, col, row, tile_size, &offsets) {
                    Some(true) => visible.push((row * columns + col) as TileId),
                    Some(false) => {}
                    // Pixel data unavailable: degrade to a full palette
                    None => return TilesetInfo::all_visible(columns, rows, tile_size),
                }
            }
        }

        if visible.is_empty() {
            return TilesetInfo::all_visible(columns, rows, tile_size);
        }

        TilesetInfo {
            columns,
            rows,
            tile_size,
            visible,
        }
    }

    fn cell_visible(
        &self,
        image: &dyn TilesetImage,
        col: u32,
        row: u32,
        tile_size: u32,
        offsets: &[u32],
    ) -> Option<bool> {
        let (width, height) = image.dimensions();
        for sy in offsets {
            for sx in offsets {
                let px = col * tile_size + sx;
                let py = row * tile_size + sy;
                if px >= width || py >= height {
                    continue;
                }
                if image.alpha_at(px, py)? > self.alpha_threshold {
                    return Some(true);
                }
            }
        }
        Some(false)
    }

    /// Resolve a tileset, reusing the cached result for its key at this tile size
    pub fn resolve_cached(
        &mut self,
        key: &str,
        image: &dyn TilesetImage,
        tile_size: u32,
    ) -> &TilesetInfo {
        let cache_key = (key.to_string(), tile_size);
        if !self.cache.contains_key(&cache_key) {
            let info = self.resolve(image, tile_size);
            self.cache.insert(cache_key.clone(), info);
        }
        &self.cache[&cache_key]
    }

    pub fn cached(&self, key: &str, tile_size: u32) -> Option<&TilesetInfo> {
        self.cache.get(&(key.to_string(), tile_size))
    }

    /// Drop every cached layout for a key (e.g. after its image was replaced)
    pub fn invalidate(&mut self, key: &str) {
        self.cache.retain(|(cached_key, _), _| cached_key != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 6x2 cells of 16px, fully transparent
    fn blank_sheet() -> RgbaImage {
        RgbaImage::new(96, 32)
    }

    #[test]
    fn test_sample_offsets_are_inset() {
        let atlas = TilesetAtlas::new(8, 4);
        assert_eq!(atlas.sample_offsets(32), vec![4, 12, 20, 28]);
        assert_eq!(atlas.sample_offsets(16), vec![2, 6, 10, 14]);
    }

    #[test]
    fn test_transparent_cells_are_excluded() {
        let mut image = blank_sheet();
        image.put_pixel(2, 2, Rgba([255, 0, 0, 255]));
        // Any single opaque sample point makes tile 5 visible
        image.put_pixel(5 * 16 + 14, 10, Rgba([0, 0, 0, 200]));

        let info = TilesetAtlas::default().resolve(&image, 16);

        assert_eq!((info.columns, info.rows), (6, 2));
        assert!(!info.visible.contains(&4));
        assert!(info.visible.contains(&5));
        assert_eq!(info.visible, vec![0, 5]);
    }

    #[test]
    fn test_alpha_threshold() {
        let mut image = blank_sheet();
        image.put_pixel(2, 2, Rgba([0, 0, 0, 8]));
        image.put_pixel(16 + 2, 2, Rgba([0, 0, 0, 9]));

        let info = TilesetAtlas::default().resolve(&image, 16);
        assert_eq!(info.visible, vec![1]);
    }

    #[test]
    fn test_unsampled_pixels_are_ignored() {
        // Opaque pixel between sample points is never sampled
        let mut image = blank_sheet();
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(16 + 6, 6, Rgba([0, 0, 0, 255]));

        let info = TilesetAtlas::default().resolve(&image, 16);
        assert_eq!(info.visible, vec![1]);
    }

    #[test]
    fn test_fully_transparent_falls_back_to_all() {
        let info = TilesetAtlas::default().resolve(&blank_sheet(), 16);
        assert_eq!(info.visible.len(), 12);
    }

    #[test]
    fn test_unreadable_pixels_fall_back_to_all() {
        let image = ImageDimensions {
            width: 64,
            height: 40,
        };
        let info = TilesetAtlas::default().resolve(&image, 32);
        assert_eq!((info.columns, info.rows), (2, 1));
        assert_eq!(info.visible, vec![0, 1]);
    }

    #[test]
    fn test_dynamic_image() {
        let mut rgba = blank_sheet();
        rgba.put_pixel(16 * 3 + 2, 16 + 2, Rgba([1, 1, 1, 255]));
        let image = DynamicImage::ImageRgba8(rgba);

        let info = TilesetAtlas::default().resolve(&image, 16);
        assert_eq!(info.visible, vec![9]);
    }

    #[test]
    fn test_reconcile_selection() {
        let info = TilesetInfo {
            columns: 4,
            rows: 1,
            tile_size: 16,
            visible: vec![1, 3],
        };
        assert_eq!(info.reconcile_selection(3), 3);
        assert_eq!(info.reconcile_selection(2), 1);
        assert_eq!(info.source_rect(3), (48, 0, 16, 16));
        assert_eq!(info.source_rect(99), (48, 0, 16, 16));
    }

    #[test]
    fn test_cache_per_key() {
        let mut atlas = TilesetAtlas::default();
        let mut image = blank_sheet();
        image.put_pixel(2, 2, Rgba([0, 0, 0, 255]));

        assert_eq!(atlas.resolve_cached("sheet", &image, 16).visible, vec![0]);

        // Cached result is reused even if the image changes
        image.put_pixel(18, 2, Rgba([0, 0, 0, 255]));
        assert_eq!(atlas.resolve_cached("sheet", &image, 16).visible, vec![0]);

        atlas.invalidate("sheet");
        assert_eq!(
            atlas.resolve_cached("sheet", &image, 16).visible,
            vec![0, 1]
        );
    }

    #[test]
    fn test_cache_per_tile_size() {
        let mut atlas = TilesetAtlas::default();
        let image = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));

        let coarse = atlas.resolve_cached("sheet", &image, 32).clone();
        assert_eq!((coarse.columns, coarse.visible.len()), (2, 4));

        let fine = atlas.resolve_cached("sheet", &image, 16).clone();
        assert_eq!((fine.columns, fine.visible.len()), (4, 16));
        assert_eq!(atlas.cached("sheet", 32), Some(&coarse));

        atlas.invalidate("sheet");
        assert!(atlas.cached("sheet", 32).is_none());
        assert!(atlas.cached("sheet", 16).is_none());
    }
}

//! Camera pan/zoom and screen, world and tile coordinate conversions
//!
//! Screen space is viewport pixels with the origin at the top-left. World
//! space is map pixels (`tile * tile_size`). `scroll` is the world position
//! shown at the top-left corner of the viewport.

use bevy::math::{Rect, URect, Vec2};

use crate::config::EditorConfig;

/// Pan/zoom state for one map view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    scroll: Vec2,
    zoom: f32,
    viewport_size: Vec2,
    world_size: Vec2,
    tile_size: u32,
    min_zoom: f32,
    max_zoom: f32,
    wheel_zoom_factor: f32,
}

impl ViewportController {
    /// Create a viewport over a `map_width` x `map_height` tile map
    pub fn new(config: &EditorConfig, viewport_size: Vec2, map_width: u32, map_height: u32) -> Self {
        let tile_size = config.tile_size.max(1);
        let mut viewport = Self {
            scroll: Vec2::ZERO,
            zoom: config.initial_zoom.clamp(config.min_zoom, config.max_zoom),
            viewport_size: viewport_size.max(Vec2::ZERO),
            world_size: Vec2::ZERO,
            tile_size,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            wheel_zoom_factor: config.wheel_zoom_factor,
        };
        viewport.set_map_size(map_width, map_height);
        viewport
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    /// Map extent in world pixels
    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// World position under a screen point
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.scroll + screen / self.zoom
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.scroll) * self.zoom
    }

    /// Tile under a screen point. May be outside the map.
    pub fn screen_to_tile(&self, screen: Vec2) -> (i32, i32) {
        let tile = (self.screen_to_world(screen) / self.tile_size as f32).floor();
        (tile.x as i32, tile.y as i32)
    }

    /// Change zoom by `delta_zoom` while keeping the world point under
    /// `screen` fixed on screen
    pub fn zoom_at(&mut self, screen: Vec2, delta_zoom: f32) {
        if !delta_zoom.is_finite() {
            return;
        }
        let before = self.screen_to_world(screen);
        self.zoom = (self.zoom + delta_zoom).clamp(self.min_zoom, self.max_zoom);
        let after = self.screen_to_world(screen);
        self.scroll += before - after;
        self.clamp_scroll();
    }

    /// Zoom from a wheel delta in pixels. Positive deltas (scrolling down) zoom out.
    pub fn zoom_by_wheel(&mut self, screen: Vec2, wheel_delta: f32) {
        self.zoom_at(screen, -wheel_delta * self.wheel_zoom_factor);
    }

    /// Move the camera by a screen-space delta
    pub fn pan(&mut self, delta_screen: Vec2) {
        if !delta_screen.is_finite() {
            return;
        }
        self.scroll += delta_screen / self.zoom;
        self.clamp_scroll();
    }

    /// Track a new viewport size (window resize)
    pub fn resize(&mut self, viewport_size: Vec2) {
        self.viewport_size = viewport_size.max(Vec2::ZERO);
        self.clamp_scroll();
    }

    /// Track a new map size (create or load)
    pub fn set_map_size(&mut self, map_width: u32, map_height: u32) {
        self.world_size = Vec2::new(map_width as f32, map_height as f32) * self.tile_size as f32;
        self.clamp_scroll();
    }

    /// Back to the top-left corner at `zoom`
    pub fn reset(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.scroll = Vec2::ZERO;
    }

    /// Largest scroll that keeps the view inside the map
    pub fn max_scroll(&self) -> Vec2 {
        (self.world_size - self.viewport_size / self.zoom).max(Vec2::ZERO)
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.clamp(Vec2::ZERO, self.max_scroll());
    }

    /// Visible part of the map in world pixels
    pub fn visible_world_rect(&self) -> Rect {
        let view = Rect::from_corners(self.scroll, self.scroll + self.viewport_size / self.zoom);
        view.intersect(Rect::from_corners(Vec2::ZERO, self.world_size))
    }

    /// Tiles touched by the visible rectangle, `max` exclusive
    pub fn visible_tile_range(&self) -> URect {
        let rect = self.visible_world_rect();
        let tile = self.tile_size as f32;
        let grid = (self.world_size / tile).as_uvec2();
        let min = (rect.min / tile).floor().as_uvec2().min(grid);
        let max = (rect.max / tile).ceil().as_uvec2().min(grid);
        URect::from_corners(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(map_width: u32, map_height: u32) -> ViewportController {
        ViewportController::new(
            &EditorConfig::default(),
            Vec2::new(800.0, 600.0),
            map_width,
            map_height,
        )
    }

    fn assert_in_bounds(viewport: &ViewportController) {
        let scroll = viewport.scroll();
        let max = viewport.world_size() - viewport.viewport_size() / viewport.zoom();
        assert!(scroll.x >= 0.0 && scroll.y >= 0.0, "negative scroll {scroll}");
        assert!(
            scroll.x <= max.x.max(0.0) + 1e-3 && scroll.y <= max.y.max(0.0) + 1e-3,
            "scroll {scroll} beyond {max}"
        );
    }

    #[test]
    fn test_screen_to_world_and_tile() {
        let mut view = viewport(100, 100);
        view.pan(Vec2::new(64.0, 32.0));

        assert_eq!(view.screen_to_world(Vec2::new(10.0, 20.0)), Vec2::new(74.0, 52.0));
        assert_eq!(view.screen_to_tile(Vec2::new(10.0, 20.0)), (2, 1));
        assert_eq!(view.world_to_screen(Vec2::new(74.0, 52.0)), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_zoom_keeps_cursor_point() {
        let mut view = viewport(100, 100);
        view.pan(Vec2::new(400.0, 400.0));
        let cursor = Vec2::new(200.0, 150.0);
        let before = view.screen_to_world(cursor);

        view.zoom_at(cursor, 0.5);

        assert_eq!(view.zoom(), 1.5);
        let after = view.screen_to_world(cursor);
        assert!((after - before).length() < 1e-3, "{before} -> {after}");
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = viewport(100, 100);
        view.zoom_at(Vec2::ZERO, 10.0);
        assert_eq!(view.zoom(), 2.2);
        view.zoom_at(Vec2::ZERO, -10.0);
        assert_eq!(view.zoom(), 0.5);
    }

    #[test]
    fn test_wheel_down_zooms_out() {
        let mut view = viewport(100, 100);
        view.zoom_by_wheel(Vec2::ZERO, 100.0);
        assert!((view.zoom() - 0.88).abs() < 1e-4);
        view.zoom_by_wheel(Vec2::ZERO, -200.0);
        assert!((view.zoom() - 1.12).abs() < 1e-4);
    }

    #[test]
    fn test_pan_scales_with_zoom() {
        let mut view = viewport(100, 100);
        view.zoom_at(Vec2::ZERO, 1.0);
        view.pan(Vec2::new(100.0, 50.0));
        assert_eq!(view.scroll(), Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_scroll_stays_in_bounds() {
        let mut view = viewport(40, 30);
        let cursor = Vec2::new(700.0, 500.0);
        let steps: [(Vec2, f32); 8] = [
            (Vec2::new(-500.0, -500.0), 0.0),
            (Vec2::new(5000.0, 9000.0), 0.0),
            (Vec2::ZERO, -0.4),
            (Vec2::new(3000.0, 3000.0), 0.0),
            (Vec2::ZERO, 1.5),
            (Vec2::new(-12.0, 7.0), -0.3),
            (Vec2::new(10_000.0, -10_000.0), 0.9),
            (Vec2::ZERO, -2.0),
        ];

        for (delta, zoom) in steps {
            view.pan(delta);
            assert_in_bounds(&view);
            view.zoom_at(cursor, zoom);
            assert_in_bounds(&view);
            view.resize(Vec2::new(1280.0, 720.0));
            assert_in_bounds(&view);
        }
    }

    #[test]
    fn test_map_smaller_than_viewport_pins_scroll() {
        let mut view = viewport(4, 4);
        view.pan(Vec2::new(300.0, 300.0));
        assert_eq!(view.scroll(), Vec2::ZERO);
        assert_eq!(view.max_scroll(), Vec2::ZERO);
    }

    #[test]
    fn test_visible_ranges() {
        let mut view = viewport(100, 100);
        view.pan(Vec2::new(48.0, 0.0));

        let rect = view.visible_world_rect();
        assert_eq!(rect.min, Vec2::new(48.0, 0.0));
        assert_eq!(rect.max, Vec2::new(848.0, 600.0));

        let tiles = view.visible_tile_range();
        assert_eq!(tiles.min.to_array(), [1, 0]);
        assert_eq!(tiles.max.to_array(), [27, 19]);
    }

    #[test]
    fn test_visible_range_limited_to_map() {
        let view = viewport(10, 5);
        let tiles = view.visible_tile_range();
        assert_eq!(tiles.max.to_array(), [10, 5]);
        assert_eq!(view.visible_world_rect().max, Vec2::new(320.0, 160.0));
    }
}

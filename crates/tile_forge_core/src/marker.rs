//! Spawn markers placed on the tile grid

use serde::{Deserialize, Serialize};

/// The kind of spawn a marker represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Npc,
    Monster,
}

impl MarkerKind {
    /// Collection name used in the draft payload (`spawns.npcs`, `spawns.monsters`)
    pub fn collection_name(self) -> &'static str {
        match self {
            MarkerKind::Npc => "npcs",
            MarkerKind::Monster => "monsters",
        }
    }
}

/// A spawn point in tile units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    pub x: i32,
    pub y: i32,
}

impl Marker {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space centre of the marker's cell, where the glyph is drawn
    pub fn world_center(&self, tile_size: u32) -> (f32, f32) {
        let half = tile_size as f32 / 2.0;
        (
            self.x as f32 * tile_size as f32 + half,
            self.y as f32 * tile_size as f32 + half,
        )
    }
}

/// NPC and monster spawn markers.
///
/// Within one kind coordinates are unique; markers keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    npcs: Vec<Marker>,
    monsters: Vec<Marker>,
    dirty: bool,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from loaded lists, collapsing duplicate coordinates
    pub fn from_lists(npcs: &[Marker], monsters: &[Marker]) -> Self {
        let mut set = Self::new();
        for marker in npcs {
            set.insert(MarkerKind::Npc, *marker);
        }
        for marker in monsters {
            set.insert(MarkerKind::Monster, *marker);
        }
        set.dirty = true;
        set
    }

    fn markers(&self, kind: MarkerKind) -> &Vec<Marker> {
        match kind {
            MarkerKind::Npc => &self.npcs,
            MarkerKind::Monster => &self.monsters,
        }
    }

    fn markers_mut(&mut self, kind: MarkerKind) -> &mut Vec<Marker> {
        match kind {
            MarkerKind::Npc => &mut self.npcs,
            MarkerKind::Monster => &mut self.monsters,
        }
    }

    fn insert(&mut self, kind: MarkerKind, marker: Marker) {
        let list = self.markers_mut(kind);
        if !list.contains(&marker) {
            list.push(marker);
        }
    }

    /// Remove the marker at (x, y) if present, otherwise add one.
    /// Returns true if a marker now exists at that position.
    pub fn toggle(&mut self, kind: MarkerKind, x: i32, y: i32) -> bool {
        let marker = Marker::new(x, y);
        let list = self.markers_mut(kind);
        let added = match list.iter().position(|m| *m == marker) {
            Some(pos) => {
                list.remove(pos);
                false
            }
            None => {
                list.push(marker);
                true
            }
        };
        self.dirty = true;
        added
    }

    /// Markers of one kind in insertion order
    pub fn list(&self, kind: MarkerKind) -> &[Marker] {
        self.markers(kind)
    }

    pub fn contains(&self, kind: MarkerKind, x: i32, y: i32) -> bool {
        self.markers(kind).contains(&Marker::new(x, y))
    }

    pub fn len(&self) -> usize {
        self.npcs.len() + self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty() && self.monsters.is_empty()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether markers changed since the last call; clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl PartialEq for MarkerSet {
    fn eq(&self, other: &Self) -> bool {
        self.npcs == other.npcs && self.monsters == other.monsters
    }
}

impl Eq for MarkerSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        let mut markers = MarkerSet::new();
        markers.toggle(MarkerKind::Monster, 1, 1);
        let original = markers.clone();

        assert!(markers.toggle(MarkerKind::Npc, 3, 2));
        assert!(markers.contains(MarkerKind::Npc, 3, 2));
        assert!(!markers.toggle(MarkerKind::Npc, 3, 2));
        assert_eq!(markers, original);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut markers = MarkerSet::new();
        markers.toggle(MarkerKind::Npc, 0, 0);
        markers.toggle(MarkerKind::Monster, 0, 0);

        assert_eq!(markers.list(MarkerKind::Npc), &[Marker::new(0, 0)]);
        assert_eq!(markers.list(MarkerKind::Monster), &[Marker::new(0, 0)]);
        assert_eq!(markers.len(), 2);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut markers = MarkerSet::new();
        markers.toggle(MarkerKind::Npc, 5, 5);
        markers.toggle(MarkerKind::Npc, 1, 1);
        markers.toggle(MarkerKind::Npc, 3, 3);
        markers.toggle(MarkerKind::Npc, 1, 1);

        assert_eq!(
            markers.list(MarkerKind::Npc),
            &[Marker::new(5, 5), Marker::new(3, 3)]
        );
    }

    #[test]
    fn test_from_lists_collapses_duplicates() {
        let npcs = [Marker::new(2, 2), Marker::new(2, 2), Marker::new(4, 1)];
        let markers = MarkerSet::from_lists(&npcs, &[]);

        assert_eq!(markers.list(MarkerKind::Npc).len(), 2);
        assert!(markers.list(MarkerKind::Monster).is_empty());
    }

    #[test]
    fn test_dirty_flag() {
        let mut markers = MarkerSet::new();
        assert!(!markers.take_dirty());
        markers.toggle(MarkerKind::Npc, 0, 0);
        assert!(markers.take_dirty());
        assert!(!markers.take_dirty());
    }

    #[test]
    fn test_world_center() {
        assert_eq!(Marker::new(1, 2).world_center(32), (48.0, 80.0));
    }
}

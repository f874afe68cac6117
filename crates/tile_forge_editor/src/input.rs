//! Bevy input systems that drive the [`MapEditorSession`]
//!
//! Left button paints with the active tool, right or middle button drags the
//! camera, the wheel zooms at the cursor. Keyboard shortcuts map to
//! [`EditorAction`]s.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use tile_forge_core::LayerName;

use crate::session::{EditorAction, MapEditorSession};

/// Wheel pixels per scroll line
const LINE_SCROLL_PIXELS: f32 = 100.0;

/// Lets the host claim input while the pointer or focus is on its own UI
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct InputCapture {
    /// Pointer is over host UI; map clicks and wheel are ignored
    pub pointer: bool,
    /// Host UI has keyboard focus; shortcuts are ignored
    pub keyboard: bool,
}

pub struct EditorInputPlugin;

impl Plugin for EditorInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputCapture>().add_systems(
            Update,
            (
                sync_viewport_size,
                handle_keyboard_shortcuts,
                handle_pointer_input,
                handle_zoom_input,
            )
                .chain(),
        );
    }
}

fn sync_viewport_size(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut session: ResMut<MapEditorSession>,
) {
    let Ok(window) = windows.single() else { return };
    session.resize_viewport(Vec2::new(window.resolution.width(), window.resolution.height()));
}

/// Map held keys to an action
pub fn shortcut_action(keyboard: &ButtonInput<KeyCode>) -> Option<EditorAction> {
    let ctrl = keyboard.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    if ctrl {
        // Ctrl+Shift+Z or Ctrl+Y - Redo
        if (keyboard.just_pressed(KeyCode::KeyZ) && shift) || keyboard.just_pressed(KeyCode::KeyY) {
            return Some(EditorAction::Redo);
        }
        if keyboard.just_pressed(KeyCode::KeyZ) {
            return Some(EditorAction::Undo);
        }
        return None;
    }

    if keyboard.just_pressed(KeyCode::Digit1) {
        Some(EditorAction::SelectLayer(LayerName::Ground))
    } else if keyboard.just_pressed(KeyCode::Digit2) {
        Some(EditorAction::SelectLayer(LayerName::Decor))
    } else if keyboard.just_pressed(KeyCode::Digit3) {
        Some(EditorAction::SelectLayer(LayerName::Collision))
    } else if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        Some(EditorAction::ZoomIn)
    } else if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        Some(EditorAction::ZoomOut)
    } else {
        None
    }
}

fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    capture: Res<InputCapture>,
    mut session: ResMut<MapEditorSession>,
) {
    if capture.keyboard {
        return;
    }
    if let Some(action) = shortcut_action(&keyboard) {
        session.apply_action(action);
    }
}

fn handle_pointer_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    capture: Res<InputCapture>,
    mut session: ResMut<MapEditorSession>,
    mut last_tile: Local<Option<(i32, i32)>>,
) {
    let Ok(window) = windows.single() else { return };

    let Some(cursor) = window.cursor_position() else {
        // Pointer left the window: finish whatever was in progress
        session.end_stroke();
        session.end_pan();
        *last_tile = None;
        return;
    };

    // Camera drag
    if mouse_buttons.any_just_pressed([MouseButton::Right, MouseButton::Middle]) && !capture.pointer {
        session.begin_pan(cursor);
    } else if mouse_buttons.any_pressed([MouseButton::Right, MouseButton::Middle]) {
        session.drag_pan(cursor);
    } else if session.is_panning() {
        session.end_pan();
    }

    // Tool stroke. A stroke that started on the map may finish over host UI.
    let tile = session.tile_at_screen(cursor);
    if mouse_buttons.just_pressed(MouseButton::Left) {
        if !capture.pointer {
            session.begin_stroke(tile);
            *last_tile = Some(tile);
        }
    } else if mouse_buttons.pressed(MouseButton::Left) {
        if last_tile.is_some() && *last_tile != Some(tile) {
            session.continue_stroke(tile);
            *last_tile = Some(tile);
        }
    } else if last_tile.take().is_some() {
        session.end_stroke();
    }
}

#[allow(deprecated)] // EventReader is deprecated but still works in Bevy 0.17
fn handle_zoom_input(
    mut scroll_events: bevy::ecs::event::EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    capture: Res<InputCapture>,
    mut session: ResMut<MapEditorSession>,
) {
    let Ok(window) = windows.single() else { return };
    let cursor = window.cursor_position();

    for event in scroll_events.read() {
        let Some(cursor) = cursor else { continue };
        if capture.pointer {
            continue;
        }
        let pixels = match event.unit {
            MouseScrollUnit::Line => event.y * LINE_SCROLL_PIXELS,
            MouseScrollUnit::Pixel => event.y,
        };
        // Wheel up reports positive y; the session zooms out on positive deltas
        session.wheel(cursor, -pixels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(held: &[KeyCode], pressed: KeyCode) -> ButtonInput<KeyCode> {
        let mut input = ButtonInput::default();
        for key in held {
            input.press(*key);
        }
        input.clear();
        input.press(pressed);
        input
    }

    #[test]
    fn test_undo_redo_shortcuts() {
        assert_eq!(
            shortcut_action(&keys(&[KeyCode::ControlLeft], KeyCode::KeyZ)),
            Some(EditorAction::Undo)
        );
        assert_eq!(
            shortcut_action(&keys(&[KeyCode::SuperLeft], KeyCode::KeyY)),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            shortcut_action(&keys(&[KeyCode::ControlRight, KeyCode::ShiftLeft], KeyCode::KeyZ)),
            Some(EditorAction::Redo)
        );
        assert_eq!(shortcut_action(&keys(&[], KeyCode::KeyZ)), None);
    }

    #[test]
    fn test_layer_and_zoom_shortcuts() {
        assert_eq!(
            shortcut_action(&keys(&[], KeyCode::Digit2)),
            Some(EditorAction::SelectLayer(LayerName::Decor))
        );
        assert_eq!(
            shortcut_action(&keys(&[], KeyCode::Equal)),
            Some(EditorAction::ZoomIn)
        );
        assert_eq!(
            shortcut_action(&keys(&[], KeyCode::Minus)),
            Some(EditorAction::ZoomOut)
        );
        // Ctrl+1 is left to the host
        assert_eq!(shortcut_action(&keys(&[KeyCode::ControlLeft], KeyCode::Digit1)), None);
    }
}

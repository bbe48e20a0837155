//! Keyboard and mouse input gathering.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bevy::resources::FrameInput;
use crate::input::NamedButton;
use crate::material::SurfaceMaterial;

/// Shortcut keys of the control panel.
const SHORTCUTS: [(KeyCode, NamedButton); 16] = [
    (KeyCode::KeyP, NamedButton::Play),
    (KeyCode::KeyE, NamedButton::Edit),
    (KeyCode::KeyB, NamedButton::AddBox),
    (KeyCode::KeyN, NamedButton::AddCollectible),
    (KeyCode::Digit1, NamedButton::Translate),
    (KeyCode::Digit2, NamedButton::Rotate),
    (KeyCode::Digit3, NamedButton::Scale),
    (KeyCode::KeyQ, NamedButton::ToggleSpace),
    (KeyCode::KeyC, NamedButton::Clone),
    (KeyCode::Delete, NamedButton::Delete),
    (KeyCode::KeyF, NamedButton::Recenter),
    (KeyCode::F5, NamedButton::QuickSave),
    (KeyCode::F9, NamedButton::QuickLoad),
    (KeyCode::KeyR, NamedButton::Restart),
    (KeyCode::Digit4, NamedButton::Material(SurfaceMaterial::Slippery)),
    (KeyCode::Digit5, NamedButton::Material(SurfaceMaterial::Bouncy)),
];

/// Movement axis from WASD and the arrow keys, `y` forward.
pub fn movement_axis(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    axis.normalize_or_zero()
}

/// Buttons whose shortcut key went down this frame.
pub fn shortcut_buttons(keyboard: &ButtonInput<KeyCode>) -> Vec<NamedButton> {
    let mut buttons: Vec<NamedButton> = SHORTCUTS
        .iter()
        .filter(|(key, _)| keyboard.just_pressed(*key))
        .map(|(_, button)| *button)
        .collect();
    // Digit0 resets the material to normal
    if keyboard.just_pressed(KeyCode::Digit0) {
        buttons.push(NamedButton::Material(SurfaceMaterial::Normal));
    }
    buttons
}

/// Converts a cursor position in window pixels (origin top-left) into
/// normalized device coordinates.
pub fn pointer_ndc(cursor: Vec2, size: Vec2) -> Option<Vec2> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / size.x * 2.0 - 1.0,
        1.0 - cursor.y / size.y * 2.0,
    ))
}

/// System collecting this frame's input into [`FrameInput`].
pub fn gather_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut input: ResMut<FrameInput>,
) {
    input.movement = movement_axis(&keyboard);
    input.jump_held = keyboard.pressed(KeyCode::Space);
    input.clicked = mouse_button.just_pressed(MouseButton::Left);
    input.buttons = shortcut_buttons(&keyboard);

    input.pointer = windows.single().ok().and_then(|window| {
        let cursor = window.cursor_position()?;
        pointer_ndc(cursor, window.size())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_axis() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyW);
        keyboard.press(KeyCode::ArrowRight);
        let axis = movement_axis(&keyboard);
        assert!((axis - Vec2::new(1.0, 1.0).normalize()).length() < 1e-6);

        keyboard.press(KeyCode::KeyS);
        assert_eq!(movement_axis(&keyboard), Vec2::X);
    }

    #[test]
    fn test_shortcut_buttons() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyE);
        keyboard.press(KeyCode::F5);
        keyboard.press(KeyCode::Digit0);

        let buttons = shortcut_buttons(&keyboard);
        assert_eq!(
            buttons,
            vec![
                NamedButton::Edit,
                NamedButton::QuickSave,
                NamedButton::Material(SurfaceMaterial::Normal)
            ]
        );

        keyboard.clear();
        assert!(shortcut_buttons(&keyboard).is_empty());
    }

    #[test]
    fn test_pointer_ndc() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_ndc(Vec2::new(400.0, 300.0), size), Some(Vec2::ZERO));
        assert_eq!(pointer_ndc(Vec2::ZERO, size), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(pointer_ndc(Vec2::ZERO, Vec2::ZERO), None);
    }
}

// src/gui/events.rs - Translate minifb input into session events

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window};

use crate::errors::Result;
use crate::events::{KeyCode, PointerButton, PointerEvent};
use crate::mode::Mode;
use super::state::GuiState;

fn key_code(key: Key) -> Option<KeyCode> {
    let code = match key {
        Key::Space => KeyCode::Space,
        Key::Enter => KeyCode::Enter,
        Key::Escape => KeyCode::Escape,
        Key::Tab => KeyCode::Tab,
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::PageUp => KeyCode::PageUp,
        Key::PageDown => KeyCode::PageDown,
        Key::F1 => KeyCode::F(1),
        Key::F2 => KeyCode::F(2),
        Key::F3 => KeyCode::F(3),
        Key::F4 => KeyCode::F(4),
        Key::Equal | Key::NumPadPlus => KeyCode::Char('+'),
        Key::Minus | Key::NumPadMinus => KeyCode::Char('-'),
        Key::A => KeyCode::Char('a'),
        Key::C => KeyCode::Char('c'),
        Key::D => KeyCode::Char('d'),
        Key::E => KeyCode::Char('e'),
        Key::J => KeyCode::Char('j'),
        Key::K => KeyCode::Char('k'),
        Key::L => KeyCode::Char('l'),
        Key::P => KeyCode::Char('p'),
        Key::R => KeyCode::Char('r'),
        Key::S => KeyCode::Char('s'),
        Key::T => KeyCode::Char('t'),
        Key::U => KeyCode::Char('u'),
        Key::W => KeyCode::Char('w'),
        Key::Y => KeyCode::Char('y'),
        _ => return None,
    };
    Some(code)
}

/// Dispatch one frame of input. Returns false when the user asked to quit.
pub fn handle_events(window: &mut Window, state: &mut GuiState) -> Result<bool> {
    if let Some((x, y)) = window.get_mouse_pos(MouseMode::Clamp) {
        if (x, y) != (state.mouse_x, state.mouse_y) {
            state.mouse_x = x;
            state.mouse_y = y;
            let (ix, iy) = state.to_image_coords(x, y);
            state.session.handle_pointer(PointerEvent::moved(ix, iy));
        }
    }
    let (ix, iy) = state.to_image_coords(state.mouse_x, state.mouse_y);

    for (button, pointer, was_down) in [
        (MouseButton::Left, PointerButton::Left, state.left_down),
        (MouseButton::Right, PointerButton::Right, state.right_down),
    ] {
        let down = window.get_mouse_down(button);
        if down && !was_down {
            state.session.handle_pointer(PointerEvent::press(pointer, ix, iy));
        } else if !down && was_down {
            state.session.handle_pointer(PointerEvent::release(pointer, ix, iy));
        }
        match pointer {
            PointerButton::Left => state.left_down = down,
            PointerButton::Right => state.right_down = down,
        }
    }

    if let Some((_, scroll_y)) = window.get_scroll_wheel() {
        if scroll_y != 0.0 {
            let delta = if scroll_y > 0.0 { 1 } else { -1 };
            state.session.handle_pointer(PointerEvent::wheel(delta, ix, iy));
        }
    }

    // View toggle that only concerns this window
    if window.is_key_pressed(Key::M, KeyRepeat::No) {
        state.show_masked_median = !state.show_masked_median;
    }

    let page_count_before = state.session.images().page_count();
    let dims_before = state.session.images().working_dimensions();

    for key in window.get_keys_pressed(KeyRepeat::Yes) {
        if key == Key::Escape && state.session.mode() != Mode::Threshold {
            return Ok(false);
        }
        if let Some(code) = key_code(key) {
            state.session.handle_key(code);
        }
    }

    if state.session.images().page_count() != page_count_before
        || state.session.images().working_dimensions() != dims_before
    {
        state.update_layout();
        state.preview = None;
    }

    Ok(true)
}

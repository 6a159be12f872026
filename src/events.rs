// src/events.rs - Toolkit-independent input events and the default key map

use crate::mode::Mode;
use crate::parameters::ParamField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press(PointerButton),
    Release(PointerButton),
    Move,
    /// Positive scrolls up
    Wheel(i32),
}

/// A pointer event in working-image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    pub fn press(button: PointerButton, x: i32, y: i32) -> Self {
        Self { kind: PointerKind::Press(button), x, y }
    }

    pub fn release(button: PointerButton, x: i32, y: i32) -> Self {
        Self { kind: PointerKind::Release(button), x, y }
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self { kind: PointerKind::Move, x, y }
    }

    pub fn wheel(delta: i32, x: i32, y: i32) -> Self {
        Self { kind: PointerKind::Wheel(delta), x, y }
    }
}

/// Keys the session understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Space,
    Enter,
    Escape,
    Tab,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    /// Function keys F1..F12
    F(u8),
}

/// Everything a key (or a UI widget) can ask the session to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetMode(Mode),
    Advance,
    CancelThreshold,
    Undo,
    Redo,
    Reset,
    Erode,
    Dilate,
    ToggleCursorShape,
    PrevPage,
    NextPage,
    ThresholdMin(i32),
    ThresholdMax(i32),
    MedianSamples(i32),
    /// Select which parameter field the up/down keys edit
    SelectField(ParamField),
    NextField,
    /// Nudge the selected parameter field by a slider step
    NudgeField(i32),
    ToggleApplySame,
    CopyParamsToAll,
    SaveMask,
    LoadMask,
    SaveParams,
    LoadParams,
    SavePages,
}

/// Resolve a key press in the given mode.
///
/// `a`/`d` navigate pages while adjusting; elsewhere `d` dilates and `e` erodes.
pub fn default_binding(key: KeyCode, mode: Mode) -> Option<Command> {
    use KeyCode::*;
    let command = match (key, mode) {
        (Space, _) | (Enter, _) => Command::Advance,
        (Escape, Mode::Threshold) => Command::CancelThreshold,
        (F(1), _) => Command::SetMode(Mode::Select),
        (F(2), _) => Command::SetMode(Mode::Threshold),
        (F(3), _) => Command::SetMode(Mode::Draw),
        (F(4), _) => Command::SetMode(Mode::Adjust),
        (Char('u'), _) => Command::Undo,
        (Char('y'), _) => Command::Redo,
        (Char('r'), _) => Command::Reset,
        (Char('c'), _) => Command::ToggleCursorShape,

        (Char('a'), Mode::Adjust) | (Left, _) => Command::PrevPage,
        (Char('d'), Mode::Adjust) | (Right, _) => Command::NextPage,
        (Char('t'), Mode::Adjust) => Command::ToggleApplySame,
        (Char('p'), Mode::Adjust) => Command::CopyParamsToAll,
        (Tab, Mode::Adjust) => Command::NextField,
        (Up, Mode::Adjust) => Command::NudgeField(1),
        (Down, Mode::Adjust) => Command::NudgeField(-1),

        (Char('e'), _) => Command::Erode,
        (Char('d'), _) => Command::Dilate,

        (Up, Mode::Threshold) => Command::ThresholdMin(1),
        (Down, Mode::Threshold) => Command::ThresholdMin(-1),
        (PageUp, Mode::Threshold) => Command::ThresholdMax(1),
        (PageDown, Mode::Threshold) => Command::ThresholdMax(-1),

        (Char('+'), _) | (Char('='), _) => Command::MedianSamples(1),
        (Char('-'), _) => Command::MedianSamples(-1),

        (Char('s'), _) => Command::SaveMask,
        (Char('l'), _) => Command::LoadMask,
        (Char('j'), _) => Command::SaveParams,
        (Char('k'), _) => Command::LoadParams,
        (Char('w'), _) => Command::SavePages,
        _ => return None,
    };
    Some(command)
}

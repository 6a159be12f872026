// src/mode.rs - Editing mode state machine

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WatermarkError};

/// Editing modes of a masking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Freehand polygon selection into the temporary layer
    Select,
    /// Intersect the temporary layer with a threshold on the median image
    Threshold,
    /// Brush drawing / erasing
    Draw,
    /// Tune per-page removal parameters; leaving it runs the removal
    Adjust,
}

/// Which layers erode/dilate act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphologyTarget {
    /// Only the uncommitted threshold result
    ThresholdResult,
    /// The committed and temporary layers together
    CommittedAndTemp,
}

impl MorphologyTarget {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Threshold => MorphologyTarget::ThresholdResult,
            Mode::Select | Mode::Draw | Mode::Adjust => MorphologyTarget::CommittedAndTemp,
        }
    }
}

/// A completed mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStateMachine {
    mode: Mode,
}

impl ModeStateMachine {
    pub fn new() -> Self {
        Self { mode: Mode::Select }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Allowed edges of the editing cycle
    pub fn can_transition(from: Mode, to: Mode) -> bool {
        use Mode::*;
        matches!(
            (from, to),
            (Select, Threshold)
                | (Select, Draw)
                | (Select, Adjust)
                | (Threshold, Select)
                | (Draw, Threshold)
                | (Draw, Adjust)
                | (Draw, Select)
                | (Adjust, Select)
        )
    }

    /// Where the "advance" command leads from each mode
    pub fn advance_target(mode: Mode) -> Mode {
        match mode {
            Mode::Select | Mode::Draw => Mode::Threshold,
            Mode::Threshold | Mode::Adjust => Mode::Select,
        }
    }

    pub fn transition(&mut self, to: Mode) -> Result<Transition> {
        let from = self.mode;
        if !Self::can_transition(from, to) {
            return Err(WatermarkError::InvalidTransition { from, to });
        }
        self.mode = to;
        log::info!("Mode changed: {:?} -> {:?}", from, to);
        Ok(Transition { from, to })
    }

}

impl Default for ModeStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_select() {
        assert_eq!(ModeStateMachine::new().mode(), Mode::Select);
    }

    #[test]
    fn every_mode_is_reachable_and_left() {
        use Mode::*;
        for mode in [Select, Threshold, Draw, Adjust] {
            let entered = [Select, Threshold, Draw, Adjust]
                .iter()
                .any(|&m| ModeStateMachine::can_transition(m, mode));
            let left = [Select, Threshold, Draw, Adjust]
                .iter()
                .any(|&m| ModeStateMachine::can_transition(mode, m));
            assert!(entered && left, "{:?}", mode);
        }
    }

    #[test]
    fn adjust_only_exits_to_select() {
        let mut machine = ModeStateMachine::new();
        machine.transition(Mode::Adjust).unwrap();
        assert!(machine.transition(Mode::Draw).is_err());
        assert!(machine.transition(Mode::Threshold).is_err());
        assert_eq!(machine.mode(), Mode::Adjust);
        machine.transition(Mode::Select).unwrap();
    }

    #[test]
    fn morphology_target_depends_on_mode() {
        assert_eq!(MorphologyTarget::for_mode(Mode::Threshold), MorphologyTarget::ThresholdResult);
        assert_eq!(MorphologyTarget::for_mode(Mode::Draw), MorphologyTarget::CommittedAndTemp);
        assert_eq!(MorphologyTarget::for_mode(Mode::Select), MorphologyTarget::CommittedAndTemp);
    }
}

//! State enums shared by the legs and the gait engine.
use core::fmt::{self, Display, Formatter};

/// Whether the gait advances leg phases at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GaitState {
    #[default]
    Stopped,
    Moving,
}

/// Two-phase open/close sequencing of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegState {
    Opening,
    Closing,
    #[default]
    Moving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationDirection {
    #[default]
    Forward,
    Backward,
}

impl TranslationDirection {
    pub fn sign(self) -> f32 {
        match self {
            TranslationDirection::Forward => 1.0,
            TranslationDirection::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnDirection {
    #[default]
    None,
    Left,
    Right,
    InPlaceLeft,
    InPlaceRight,
}

impl Display for GaitState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GaitState::Stopped => f.write_str("stopped"),
            GaitState::Moving => f.write_str("moving"),
        }
    }
}

impl Display for TurnDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TurnDirection::None => f.write_str("straight"),
            TurnDirection::Left => f.write_str("left"),
            TurnDirection::Right => f.write_str("right"),
            TurnDirection::InPlaceLeft => f.write_str("in place left"),
            TurnDirection::InPlaceRight => f.write_str("in place right"),
        }
    }
}

//! Remote control command word.
//!
//! Every datagram is two bit-mask bytes:
//!
//! | byte | bit | meaning |
//! |---|---|---|
//! | 0 | 7-6 | unused |
//! | 0 | 5 | turn in place left |
//! | 0 | 4 | turn in place right |
//! | 0 | 3 | pan camera right |
//! | 0 | 2 | pan camera left |
//! | 0 | 1 | forward |
//! | 0 | 0 | backward |
//! | 1 | 7-6 | `11` open pebble, `10` close pebble |
//! | 1 | 5 | incline down |
//! | 1 | 4 | incline up |
//! | 1 | 3 | stride height down |
//! | 1 | 2 | stride height up |
//! | 1 | 1 | stride length down |
//! | 1 | 0 | stride length up |
//!
//! Unknown combinations are never an error, unmatched bits are ignored.
use super::state::{TranslationDirection, TurnDirection};
use crate::config::COMMAND_SIZE;

mod motion {
    pub const IN_PLACE_LEFT: u8 = 1 << 5;
    pub const IN_PLACE_RIGHT: u8 = 1 << 4;
    pub const PAN_RIGHT: u8 = 1 << 3;
    pub const PAN_LEFT: u8 = 1 << 2;
    pub const FORWARD: u8 = 1 << 1;
    pub const BACKWARD: u8 = 1 << 0;
}

mod shape {
    pub const PEBBLE_MASK: u8 = 0b1100_0000;
    pub const PEBBLE_OPEN: u8 = 0b1100_0000;
    pub const PEBBLE_CLOSE: u8 = 0b1000_0000;
    pub const INCLINE_DOWN: u8 = 1 << 5;
    pub const INCLINE_UP: u8 = 1 << 4;
    pub const HEIGHT_DOWN: u8 = 1 << 3;
    pub const HEIGHT_UP: u8 = 1 << 2;
    pub const LENGTH_DOWN: u8 = 1 << 1;
    pub const LENGTH_UP: u8 = 1 << 0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PebbleCommand {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Command {
    /// Overrides every other field when set.
    pub pebble: Option<PebbleCommand>,
    pub translation: Option<TranslationDirection>,
    pub turn: TurnDirection,
    pub pan_left: bool,
    pub pan_right: bool,
    pub stride_length: Option<Adjustment>,
    pub stride_height: Option<Adjustment>,
    pub incline: Option<Adjustment>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseCommandError;

impl core::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "command datagram shorter than {} bytes", COMMAND_SIZE)
    }
}

impl Command {
    /// What a missed datagram is treated as: no motion, so the gait winds down.
    pub const IDLE: Command = Command {
        pebble: None,
        translation: None,
        turn: TurnDirection::None,
        pan_left: false,
        pan_right: false,
        stride_length: None,
        stride_height: None,
        incline: None,
    };

    /// True if the command asks the legs to cycle this tick.
    pub fn is_locomotion(&self) -> bool {
        self.translation.is_some()
            || matches!(
                self.turn,
                TurnDirection::InPlaceLeft | TurnDirection::InPlaceRight
            )
    }
}

impl From<[u8; COMMAND_SIZE]> for Command {
    fn from([motion_byte, shape_byte]: [u8; COMMAND_SIZE]) -> Self {
        let pebble = match shape_byte & shape::PEBBLE_MASK {
            shape::PEBBLE_OPEN => Some(PebbleCommand::Open),
            shape::PEBBLE_CLOSE => Some(PebbleCommand::Close),
            _ => None,
        };
        if pebble.is_some() {
            return Command {
                pebble,
                ..Command::IDLE
            };
        }

        let translation = if motion_byte & motion::FORWARD != 0 {
            Some(TranslationDirection::Forward)
        } else if motion_byte & motion::BACKWARD != 0 {
            Some(TranslationDirection::Backward)
        } else {
            None
        };

        let turn = if motion_byte & motion::IN_PLACE_LEFT != 0 {
            TurnDirection::InPlaceLeft
        } else if motion_byte & motion::IN_PLACE_RIGHT != 0 {
            TurnDirection::InPlaceRight
        } else {
            TurnDirection::None
        };

        Command {
            pebble: None,
            translation,
            turn,
            pan_left: motion_byte & motion::PAN_LEFT != 0,
            pan_right: motion_byte & motion::PAN_RIGHT != 0,
            stride_length: adjustment(shape_byte, shape::LENGTH_UP, shape::LENGTH_DOWN),
            stride_height: adjustment(shape_byte, shape::HEIGHT_UP, shape::HEIGHT_DOWN),
            incline: adjustment(shape_byte, shape::INCLINE_UP, shape::INCLINE_DOWN),
        }
    }
}

impl TryFrom<&[u8]> for Command {
    type Error = ParseCommandError;

    /// Decodes the first two bytes of a datagram, trailing bytes are ignored.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value {
            [motion_byte, shape_byte, ..] => Ok(Command::from([*motion_byte, *shape_byte])),
            _ => Err(ParseCommandError),
        }
    }
}

fn adjustment(byte: u8, increase: u8, decrease: u8) -> Option<Adjustment> {
    if byte & increase != 0 {
        Some(Adjustment::Increase)
    } else if byte & decrease != 0 {
        Some(Adjustment::Decrease)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_only() {
        let command = Command::from([0b0000_0010, 0]);
        assert_eq!(command.translation, Some(TranslationDirection::Forward));
        assert_eq!(command.turn, TurnDirection::None);
        assert_eq!(command.stride_length, None);
        assert_eq!(command.stride_height, None);
        assert_eq!(command.incline, None);
        assert!(command.is_locomotion());
    }

    #[test]
    fn forward_wins_over_backward() {
        let command = Command::from([0b0000_0011, 0]);
        assert_eq!(command.translation, Some(TranslationDirection::Forward));
        let command = Command::from([0b0000_0001, 0]);
        assert_eq!(command.translation, Some(TranslationDirection::Backward));
    }

    #[test]
    fn turns() {
        assert_eq!(
            Command::from([0b0010_0000, 0]).turn,
            TurnDirection::InPlaceLeft
        );
        assert_eq!(
            Command::from([0b0001_0000, 0]).turn,
            TurnDirection::InPlaceRight
        );
        assert!(Command::from([0b0001_0000, 0]).is_locomotion());
    }

    #[test]
    fn high_motion_bits_do_not_steer() {
        let command = Command::from([0b1100_0010, 0]);
        assert_eq!(command.turn, TurnDirection::None);
        assert_eq!(command.translation, Some(TranslationDirection::Forward));
        assert!(!command.pan_left && !command.pan_right);

        let command = Command::from([0b1000_0000, 0]);
        assert_eq!(command, Command::IDLE);
        assert!(!command.is_locomotion());
    }

    #[test]
    fn camera_bits() {
        let command = Command::from([0b0000_1000, 0]);
        assert!(command.pan_right && !command.pan_left);
        let command = Command::from([0b0000_0100, 0]);
        assert!(command.pan_left && !command.pan_right);
        assert!(!command.is_locomotion());
    }

    #[test]
    fn pebble_overrides_everything() {
        let open = Command::from([0b0011_1111, 0b1111_1111]);
        assert_eq!(open.pebble, Some(PebbleCommand::Open));
        assert_eq!(open.translation, None);
        assert_eq!(open.stride_length, None);
        assert!(!open.pan_left);

        let close = Command::from([0b0000_0010, 0b1000_0001]);
        assert_eq!(close.pebble, Some(PebbleCommand::Close));
        assert_eq!(close.translation, None);
    }

    #[test]
    fn bit_six_alone_is_not_a_pebble_command() {
        let command = Command::from([0, 0b0100_0001]);
        assert_eq!(command.pebble, None);
        assert_eq!(command.stride_length, Some(Adjustment::Increase));
    }

    #[test]
    fn adjustments_prefer_increase() {
        let command = Command::from([0, 0b0011_1110]);
        assert_eq!(command.stride_length, Some(Adjustment::Decrease));
        assert_eq!(command.stride_height, Some(Adjustment::Increase));
        assert_eq!(command.incline, Some(Adjustment::Increase));

        let command = Command::from([0, 0b0010_1000]);
        assert_eq!(command.stride_height, Some(Adjustment::Decrease));
        assert_eq!(command.incline, Some(Adjustment::Decrease));
    }

    #[test]
    fn parses_datagrams() {
        assert_eq!(
            Command::try_from(&[0b0000_0010u8, 0, 0xFF][..]),
            Ok(Command::from([0b0000_0010, 0]))
        );
        assert_eq!(Command::try_from(&[0b0000_0010u8][..]), Err(ParseCommandError));
        assert_eq!(Command::try_from(&[0u8; 0][..]), Err(ParseCommandError));
    }

    #[test]
    fn zero_is_idle() {
        assert_eq!(Command::from([0, 0]), Command::IDLE);
        assert_eq!(Command::default(), Command::IDLE);
    }
}

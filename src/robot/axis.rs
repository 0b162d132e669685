//! Axis enumeration and display helpers.
//!
//! Each leg has a single servo per axis: the swing axis moves the foot along
//! the stride, the lift axis raises it off the ground.
use core::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Swing = 0,
    Lift = 1,
}

impl Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Axis::Swing => f.write_str("swing"),
            Axis::Lift => f.write_str("lift"),
        }
    }
}

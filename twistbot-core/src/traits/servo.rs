//! Servo output trait

use crate::motion::{Actuator, AxisPosition, JawPosition};

/// One of the two servos on an actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Servo {
    /// Rotates the whole gripper
    Axis,
    /// Opens and closes the gripper
    Jaw,
}

/// A physical motion between two discrete stops
///
/// The previous stop is carried along so a driver can shape the motion,
/// e.g. ease a jaw open from a tight grip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    Axis { from: AxisPosition, to: AxisPosition },
    Jaw { from: JawPosition, to: JawPosition },
}

impl Motion {
    /// Servo this motion drives
    pub fn servo(&self) -> Servo {
        match self {
            Motion::Axis { .. } => Servo::Axis,
            Motion::Jaw { .. } => Servo::Jaw,
        }
    }
}

/// Trait for the physical servo outputs of both actuators
///
/// Implementations translate a discrete stop into a pulse on the right
/// controller channel. The call returns once the command has been written;
/// waiting for the servo to settle is the caller's job.
pub trait ServoOutput {
    /// Error type for a rejected command
    type Error: core::fmt::Debug;

    /// Drive one servo of `actuator` through `motion`
    fn drive(&mut self, actuator: Actuator, motion: Motion) -> Result<(), Self::Error>;
}

impl<T: ServoOutput + ?Sized> ServoOutput for &mut T {
    type Error = T::Error;

    fn drive(&mut self, actuator: Actuator, motion: Motion) -> Result<(), Self::Error> {
        T::drive(self, actuator, motion)
    }
}

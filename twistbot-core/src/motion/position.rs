//! Actuator position model
//!
//! Tracks the committed discrete stop of every servo and forwards only
//! real changes to the hardware, waiting for the servo to settle after
//! each one.

use embedded_hal::delay::DelayNs;

use crate::error::PlanError;
use crate::traits::{Motion, ServoOutput};

/// Actuator identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Actuator {
    Left,
    Right,
}

impl Actuator {
    /// Both actuators
    pub const ALL: [Actuator; 2] = [Actuator::Left, Actuator::Right];

    /// The opposed actuator
    pub fn other(self) -> Self {
        match self {
            Actuator::Left => Actuator::Right,
            Actuator::Right => Actuator::Left,
        }
    }
}

/// Discrete axis stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisPosition {
    /// -90°
    Ccw,
    /// 0°
    #[default]
    Center,
    /// +90°
    Cw,
}

impl AxisPosition {
    /// Convert an angle in degrees; only the three stops are accepted
    pub fn from_degrees(degrees: i16) -> Result<Self, PlanError> {
        match degrees {
            -90 => Ok(AxisPosition::Ccw),
            0 => Ok(AxisPosition::Center),
            90 => Ok(AxisPosition::Cw),
            _ => Err(PlanError::OutOfRangeAxis),
        }
    }

    /// Angle of this stop in degrees
    pub fn degrees(self) -> i16 {
        match self {
            AxisPosition::Ccw => -90,
            AxisPosition::Center => 0,
            AxisPosition::Cw => 90,
        }
    }
}

/// Discrete jaw stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JawPosition {
    /// Clear of the puzzle
    #[default]
    Open,
    /// Wide enough to insert or remove the puzzle
    Load,
    /// Gripping
    Closed,
}

/// Physical rotation of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sweep {
    /// Quarter turn toward -90°
    Ccw,
    /// Half turn between the end stops
    Half,
    /// Quarter turn toward +90°
    Cw,
}

impl Sweep {
    /// Sweep for a quarter-step count: 1 = Ccw, 2 = Half, 3 = Cw
    ///
    /// Used both for reorientation deltas and for move turn counts.
    pub fn from_steps(steps: u8) -> Option<Self> {
        match steps {
            1 => Some(Sweep::Ccw),
            2 => Some(Sweep::Half),
            3 => Some(Sweep::Cw),
            _ => None,
        }
    }

    /// Quarter-step count of this sweep
    pub fn steps(self) -> u8 {
        match self {
            Sweep::Ccw => 1,
            Sweep::Half => 2,
            Sweep::Cw => 3,
        }
    }
}

/// Committed stop of one actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorState {
    pub axis: AxisPosition,
    pub jaw: JawPosition,
}

impl ActuatorState {
    pub const fn new(axis: AxisPosition, jaw: JawPosition) -> Self {
        Self { axis, jaw }
    }

    /// Check if the jaw is gripping
    pub fn is_closed(&self) -> bool {
        self.jaw == JawPosition::Closed
    }
}

/// Target stop for one servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Primitive {
    Axis(AxisPosition),
    Jaw(JawPosition),
}

/// A primitive actuator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub actuator: Actuator,
    pub primitive: Primitive,
}

impl Command {
    /// Command an axis stop
    pub fn axis(actuator: Actuator, position: AxisPosition) -> Self {
        Self {
            actuator,
            primitive: Primitive::Axis(position),
        }
    }

    /// Command a jaw stop
    pub fn jaw(actuator: Actuator, position: JawPosition) -> Self {
        Self {
            actuator,
            primitive: Primitive::Jaw(position),
        }
    }

    /// Check if this command changes nothing for `state`
    pub fn is_noop(&self, state: &ActuatorState) -> bool {
        match self.primitive {
            Primitive::Axis(p) => state.axis == p,
            Primitive::Jaw(p) => state.jaw == p,
        }
    }

    /// Apply this command to a recorded state
    pub fn apply_to(&self, state: &mut ActuatorState) {
        match self.primitive {
            Primitive::Axis(p) => state.axis = p,
            Primitive::Jaw(p) => state.jaw = p,
        }
    }
}

/// Committed positions of both actuators
///
/// The model is the only writer of actuator state. Every physical command
/// is followed by a blocking settle delay.
pub struct PositionModel<S, D> {
    output: S,
    delay: D,
    settle_ms: u32,
    left: ActuatorState,
    right: ActuatorState,
    issued: u32,
}

impl<S: ServoOutput, D: DelayNs> PositionModel<S, D> {
    /// Create a model with both actuators at the initial stops
    pub fn new(output: S, delay: D, settle_ms: u32) -> Self {
        Self::with_states(
            output,
            delay,
            settle_ms,
            ActuatorState::default(),
            ActuatorState::default(),
        )
    }

    /// Create a model whose actuators are already at known stops
    pub fn with_states(
        output: S,
        delay: D,
        settle_ms: u32,
        left: ActuatorState,
        right: ActuatorState,
    ) -> Self {
        Self {
            output,
            delay,
            settle_ms,
            left,
            right,
            issued: 0,
        }
    }

    /// Recorded state of an actuator
    pub fn state(&self, actuator: Actuator) -> ActuatorState {
        match actuator {
            Actuator::Left => self.left,
            Actuator::Right => self.right,
        }
    }

    /// Number of physical commands issued since construction
    pub fn issued(&self) -> u32 {
        self.issued
    }

    /// Settle delay after each command in milliseconds
    pub fn settle_ms(&self) -> u32 {
        self.settle_ms
    }

    /// Move an axis to `target`
    ///
    /// Returns whether a physical command was issued.
    pub fn set_axis(
        &mut self,
        actuator: Actuator,
        target: AxisPosition,
    ) -> Result<bool, PlanError> {
        self.apply(Command::axis(actuator, target))
    }

    /// Move a jaw to `target`
    ///
    /// Returns whether a physical command was issued.
    pub fn set_jaw(&mut self, actuator: Actuator, target: JawPosition) -> Result<bool, PlanError> {
        self.apply(Command::jaw(actuator, target))
    }

    /// Issue a primitive command unless it is a no-op
    pub fn apply(&mut self, command: Command) -> Result<bool, PlanError> {
        let state = self.state(command.actuator);
        if command.is_noop(&state) {
            return Ok(false);
        }

        let motion = match command.primitive {
            Primitive::Axis(to) => Motion::Axis {
                from: state.axis,
                to,
            },
            Primitive::Jaw(to) => Motion::Jaw { from: state.jaw, to },
        };

        self.output
            .drive(command.actuator, motion)
            .map_err(|_| PlanError::HardwareFault)?;

        command.apply_to(self.state_mut(command.actuator));
        self.issued += 1;
        self.delay.delay_ms(self.settle_ms);
        Ok(true)
    }

    /// Direct access to the servo output, bypassing position tracking
    pub fn output_mut(&mut self) -> &mut S {
        &mut self.output
    }

    fn state_mut(&mut self, actuator: Actuator) -> &mut ActuatorState {
        match actuator {
            Actuator::Left => &mut self.left,
            Actuator::Right => &mut self.right,
        }
    }
}

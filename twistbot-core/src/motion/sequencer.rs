//! Motion sequencing
//!
//! Expands planning decisions into ordered primitive commands that respect
//! the axis travel range and the gripper handoff rules, then issues them
//! through the position model with abort polling between commands.
//!
//! Expansion runs against a simulated copy of both actuator states, so
//! commands that would not change anything are never emitted.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::error::PlanError;
use crate::traits::{AbortSource, ServoOutput};

use super::planner::{Reorientation, Twist};
use super::position::{
    Actuator, ActuatorState, AxisPosition, Command, JawPosition, PositionModel, Sweep,
};

/// Capacity of one expanded plan
///
/// The longest expansion (a reorientation needing both a centering and
/// a staging of the carrier) is 11 commands.
pub const MAX_STEPS: usize = 12;

/// One command of an expanded plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Step {
    pub command: Command,
    /// This sweep turns the whole puzzle
    pub carries: bool,
}

/// Ordered commands for one reorientation, twist or handling motion
pub type Steps = Vec<Step, MAX_STEPS>;

/// Stop reached by sweeping from `from`
///
/// Returns `None` when the sweep would leave the ±90° travel range.
pub fn landing(from: AxisPosition, sweep: Sweep) -> Option<AxisPosition> {
    use AxisPosition::*;

    match (from, sweep) {
        (Ccw, Sweep::Ccw) => None,
        (Ccw, Sweep::Half) => Some(Cw),
        (Ccw, Sweep::Cw) => Some(Center),
        (Center, Sweep::Ccw) => Some(Ccw),
        (Center, Sweep::Half) => None,
        (Center, Sweep::Cw) => Some(Cw),
        (Cw, Sweep::Ccw) => Some(Center),
        (Cw, Sweep::Half) => Some(Ccw),
        (Cw, Sweep::Cw) => None,
    }
}

/// Stop to reposition to before a sweep that cannot land
pub fn staging(sweep: Sweep) -> AxisPosition {
    match sweep {
        Sweep::Ccw | Sweep::Cw => AxisPosition::Center,
        Sweep::Half => AxisPosition::Ccw,
    }
}

/// Builder that simulates the actuators while emitting steps
struct Expansion {
    left: ActuatorState,
    right: ActuatorState,
    steps: Steps,
}

impl Expansion {
    fn new(left: ActuatorState, right: ActuatorState) -> Self {
        Self {
            left,
            right,
            steps: Vec::new(),
        }
    }

    fn state(&self, actuator: Actuator) -> ActuatorState {
        match actuator {
            Actuator::Left => self.left,
            Actuator::Right => self.right,
        }
    }

    fn emit(&mut self, command: Command, carries: bool) -> Result<(), PlanError> {
        let state = match command.actuator {
            Actuator::Left => &mut self.left,
            Actuator::Right => &mut self.right,
        };
        if command.is_noop(state) {
            return Ok(());
        }
        command.apply_to(state);

        // Every expansion below fits MAX_STEPS
        let pushed = self.steps.push(Step { command, carries });
        debug_assert!(pushed.is_ok(), "step list overflow");
        pushed.map_err(|_| PlanError::OutOfRangeAxis)
    }

    fn jaw(&mut self, actuator: Actuator, position: JawPosition) -> Result<(), PlanError> {
        self.emit(Command::jaw(actuator, position), false)
    }

    fn axis(&mut self, actuator: Actuator, position: AxisPosition) -> Result<(), PlanError> {
        self.emit(Command::axis(actuator, position), false)
    }

    fn landable(&self, actuator: Actuator, sweep: Sweep) -> bool {
        landing(self.state(actuator).axis, sweep).is_some()
    }

    /// Sweep from the simulated stop; fails if the sweep cannot land
    fn sweep_to(
        &mut self,
        actuator: Actuator,
        sweep: Sweep,
        carries: bool,
    ) -> Result<(), PlanError> {
        let target =
            landing(self.state(actuator).axis, sweep).ok_or(PlanError::OutOfRangeAxis)?;
        self.emit(Command::axis(actuator, target), carries)
    }

    fn grip(&mut self, first: Actuator) -> Result<(), PlanError> {
        self.jaw(first, JawPosition::Closed)?;
        self.jaw(first.other(), JawPosition::Closed)
    }

    fn finish(self) -> Steps {
        self.steps
    }
}

/// Expand a reorientation
///
/// The carrier ends closed at the landing stop, the opposed actuator
/// ends closed at Center.
pub fn expand_reorientation(
    left: ActuatorState,
    right: ActuatorState,
    plan: &Reorientation,
) -> Result<Steps, PlanError> {
    let carrier = plan.carrier;
    let other = carrier.other();
    let mut x = Expansion::new(left, right);

    x.grip(other)?;

    if x.state(other).axis != AxisPosition::Center {
        x.jaw(other, JawPosition::Open)?;
        x.axis(other, AxisPosition::Center)?;
    }

    if !x.landable(carrier, plan.sweep) {
        x.jaw(other, JawPosition::Closed)?;
        x.jaw(carrier, JawPosition::Open)?;
        x.axis(carrier, staging(plan.sweep))?;
        x.jaw(carrier, JawPosition::Closed)?;
    }

    // Never sweep the puzzle against a closed opposed jaw
    x.jaw(other, JawPosition::Open)?;
    x.sweep_to(carrier, plan.sweep, true)?;
    x.jaw(other, JawPosition::Closed)?;

    Ok(x.finish())
}

/// Expand a layer twist
pub fn expand_twist(
    left: ActuatorState,
    right: ActuatorState,
    plan: &Twist,
) -> Result<Steps, PlanError> {
    let actor = plan.actuator;
    let other = actor.other();
    let mut x = Expansion::new(left, right);

    x.grip(other)?;

    if x.state(other).axis != AxisPosition::Center {
        x.jaw(other, JawPosition::Open)?;
        x.axis(other, AxisPosition::Center)?;
        x.jaw(other, JawPosition::Closed)?;
    }

    if !x.landable(actor, plan.sweep) {
        x.jaw(actor, JawPosition::Open)?;
        x.axis(actor, staging(plan.sweep))?;
        x.jaw(actor, JawPosition::Closed)?;
    }

    x.sweep_to(actor, plan.sweep, false)?;

    Ok(x.finish())
}

/// Expand the return to the loading position
///
/// Off-center axes are re-centered with their jaw open, then both jaws
/// go to Load.
pub fn expand_load(left: ActuatorState, right: ActuatorState) -> Result<Steps, PlanError> {
    let mut x = Expansion::new(left, right);

    for actuator in Actuator::ALL {
        if x.state(actuator).axis != AxisPosition::Center {
            x.jaw(actuator, JawPosition::Open)?;
            x.axis(actuator, AxisPosition::Center)?;
        }
    }
    for actuator in Actuator::ALL {
        x.jaw(actuator, JawPosition::Load)?;
    }

    Ok(x.finish())
}

/// Expand gripping the puzzle with both jaws
pub fn expand_grip(left: ActuatorState, right: ActuatorState) -> Result<Steps, PlanError> {
    let mut x = Expansion::new(left, right);
    x.grip(Actuator::Left)?;
    Ok(x.finish())
}

/// Expand releasing the puzzle
///
/// Each off-center actuator lets go, centers and grips again so the
/// puzzle is always held by at least one jaw; then both jaws go to Load.
pub fn expand_release(left: ActuatorState, right: ActuatorState) -> Result<Steps, PlanError> {
    let mut x = Expansion::new(left, right);

    for actuator in Actuator::ALL {
        if x.state(actuator).axis != AxisPosition::Center {
            x.jaw(actuator, JawPosition::Open)?;
            x.axis(actuator, AxisPosition::Center)?;
            x.jaw(actuator, JawPosition::Closed)?;
        }
    }
    for actuator in Actuator::ALL {
        x.jaw(actuator, JawPosition::Load)?;
    }

    Ok(x.finish())
}

/// Issue expanded steps in order
///
/// The abort source is polled before every command; on abort nothing is
/// rolled back. `on_carry` runs right after each puzzle-carrying step.
pub fn execute<S, D, A, F>(
    model: &mut PositionModel<S, D>,
    steps: &[Step],
    abort: &mut A,
    mut on_carry: F,
) -> Result<(), PlanError>
where
    S: ServoOutput,
    D: DelayNs,
    A: AbortSource + ?Sized,
    F: FnMut(),
{
    for step in steps {
        if abort.abort_requested() {
            return Err(PlanError::PlanAborted);
        }
        model.apply(step.command)?;
        if step.carries {
            on_carry();
        }
    }
    Ok(())
}

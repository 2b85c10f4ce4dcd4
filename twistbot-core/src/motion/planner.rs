//! Reorientation planning
//!
//! Decides, for each move, which actuator twists the layer and whether
//! the puzzle must first be turned in the grippers to bring the face
//! under that actuator.

use crate::cube::{CanonicalFace, Move};
use crate::error::PlanError;

use super::position::{Actuator, Sweep};
use super::tracker::Tracker;

/// Whole-puzzle rotation performed before a twist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reorientation {
    /// Actuator that holds the puzzle and sweeps
    pub carrier: Actuator,
    /// Physical sweep of the carrier
    pub sweep: Sweep,
    /// Cycle steps the opposed actuator's face advances by
    pub delta: u8,
}

impl Reorientation {
    /// Actuator whose held face changes
    pub fn target(&self) -> Actuator {
        self.carrier.other()
    }
}

/// Layer twist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Twist {
    pub actuator: Actuator,
    pub sweep: Sweep,
}

/// Planning decision for one move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovePlan {
    pub reorientation: Option<Reorientation>,
    pub twist: Twist,
}

/// Fixed division of twist duties between the actuators
///
/// The dedicated actuator twists the faces of one opposite pair; the
/// other actuator twists the remaining four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Partition {
    pub dedicated: Actuator,
    pub pair: CanonicalFace,
}

impl Default for Partition {
    fn default() -> Self {
        Self {
            dedicated: Actuator::Left,
            pair: CanonicalFace::Up,
        }
    }
}

impl Partition {
    /// Check if `face` belongs to the dedicated pair
    pub fn in_pair(&self, face: CanonicalFace) -> bool {
        face == self.pair || face == self.pair.opposite()
    }

    /// Actuator that twists `face`
    pub fn responsible(&self, face: CanonicalFace) -> Actuator {
        if self.in_pair(face) {
            self.dedicated
        } else {
            self.dedicated.other()
        }
    }

    /// Plan one move against the current assignment
    ///
    /// Returns [`PlanError::UnreachableFace`] if the face is not on the
    /// cycle around the carrier's held face, which only happens from an
    /// assignment that breaks the partition.
    pub fn plan(&self, mv: Move, tracker: &Tracker) -> Result<MovePlan, PlanError> {
        let actuator = self.responsible(mv.face);
        let sweep = Sweep::from_steps(mv.turns).ok_or(PlanError::OutOfRangeAxis)?;

        let reorientation = if tracker.current(actuator) == mv.face {
            None
        } else {
            let carrier = actuator.other();
            let axis = tracker.current(carrier);
            let unreachable = PlanError::UnreachableFace(mv.face);

            let to = axis.cycle_index(mv.face).ok_or(unreachable)?;
            let from = axis
                .cycle_index(tracker.current(actuator))
                .ok_or(unreachable)?;
            let delta = (to + 4 - from) % 4;

            Some(Reorientation {
                carrier,
                sweep: Sweep::from_steps(delta).ok_or(unreachable)?,
                delta,
            })
        };

        Ok(MovePlan {
            reorientation,
            twist: Twist { actuator, sweep },
        })
    }
}

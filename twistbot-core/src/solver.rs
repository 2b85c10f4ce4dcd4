//! Solve pipeline
//!
//! Owns the position model, face tracker and partition for one run and
//! drives them move by move.

use embedded_hal::delay::DelayNs;

use crate::cube::{Move, MoveSequence};
use crate::error::PlanError;
use crate::motion::sequencer::{self, Steps};
use crate::motion::{
    Actuator, ActuatorState, FaceAssignment, Partition, PositionModel, Tracker,
};
use crate::traits::{AbortSource, NeverAbort, ServoOutput};

/// Snapshot of the planning state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub faces: FaceAssignment,
    pub left: ActuatorState,
    pub right: ActuatorState,
}

/// Planner, sequencer and position model for one robot
pub struct Solver<S, D> {
    model: PositionModel<S, D>,
    tracker: Tracker,
    partition: Partition,
}

impl<S: ServoOutput, D: DelayNs> Solver<S, D> {
    /// Create a solver at the initial face assignment
    pub fn new(model: PositionModel<S, D>) -> Self {
        Self::with_tracker(model, Tracker::new())
    }

    /// Create a solver with a known face assignment
    pub fn with_tracker(model: PositionModel<S, D>, tracker: Tracker) -> Self {
        Self {
            model,
            tracker,
            partition: Partition::default(),
        }
    }

    /// Execute a sequence of moves
    ///
    /// Stops at the first error. On abort the puzzle is left where the
    /// last issued command put it.
    pub fn solve<A>(&mut self, moves: &[Move], abort: &mut A) -> Result<(), PlanError>
    where
        A: AbortSource + ?Sized,
    {
        for &mv in moves {
            self.execute_move(mv, abort)?;
        }
        Ok(())
    }

    /// Parse and execute a solution string (`"U2 R1 F3 3"`)
    pub fn solve_str<A>(&mut self, input: &str, abort: &mut A) -> Result<(), PlanError>
    where
        A: AbortSource + ?Sized,
    {
        let moves = MoveSequence::parse(input)?;
        self.solve(moves.as_slice(), abort)
    }

    fn execute_move<A>(&mut self, mv: Move, abort: &mut A) -> Result<(), PlanError>
    where
        A: AbortSource + ?Sized,
    {
        let plan = self.partition.plan(mv, &self.tracker)?;

        if let Some(reorientation) = plan.reorientation {
            let steps = sequencer::expand_reorientation(
                self.model.state(Actuator::Left),
                self.model.state(Actuator::Right),
                &reorientation,
            )?;
            let tracker = &mut self.tracker;
            sequencer::execute(&mut self.model, &steps, abort, || {
                tracker.rotate(reorientation.target(), reorientation.delta);
            })?;
        }

        let steps = sequencer::expand_twist(
            self.model.state(Actuator::Left),
            self.model.state(Actuator::Right),
            &plan.twist,
        )?;
        sequencer::execute(&mut self.model, &steps, abort, || {})
    }

    /// Current assignment and actuator stops
    pub fn status(&self) -> Status {
        Status {
            faces: self.tracker.assignment(),
            left: self.model.state(Actuator::Left),
            right: self.model.state(Actuator::Right),
        }
    }

    /// Center both axes and open the jaws to the loading width
    pub fn load(&mut self) -> Result<(), PlanError> {
        let steps = sequencer::expand_load(
            self.model.state(Actuator::Left),
            self.model.state(Actuator::Right),
        )?;
        self.run(&steps)
    }

    /// Close both jaws on the puzzle
    pub fn grip(&mut self) -> Result<(), PlanError> {
        let steps = sequencer::expand_grip(
            self.model.state(Actuator::Left),
            self.model.state(Actuator::Right),
        )?;
        self.run(&steps)
    }

    /// Return both axes to center and open the jaws to the loading width
    /// without dropping the puzzle
    pub fn release(&mut self) -> Result<(), PlanError> {
        let steps = sequencer::expand_release(
            self.model.state(Actuator::Left),
            self.model.state(Actuator::Right),
        )?;
        self.run(&steps)
    }

    /// Start a new run with the puzzle at the initial assignment
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Position model, e.g. for raw servo access while tuning
    pub fn model_mut(&mut self) -> &mut PositionModel<S, D> {
        &mut self.model
    }

    fn run(&mut self, steps: &Steps) -> Result<(), PlanError> {
        sequencer::execute(&mut self.model, steps, &mut NeverAbort, || {})
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use heapless::Vec;

    use super::*;
    use crate::cube::CanonicalFace;
    use crate::motion::{AxisPosition, JawPosition};
    use crate::traits::Motion;

    struct Recorder<'a> {
        log: Vec<(Actuator, Motion), 64>,
        issued: &'a Cell<u32>,
    }

    impl<'a> Recorder<'a> {
        fn new(issued: &'a Cell<u32>) -> Self {
            Self {
                log: Vec::new(),
                issued,
            }
        }
    }

    impl ServoOutput for Recorder<'_> {
        type Error = ();

        fn drive(&mut self, actuator: Actuator, motion: Motion) -> Result<(), ()> {
            self.issued.set(self.issued.get() + 1);
            self.log.push((actuator, motion)).map_err(|_| ())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Requests an abort once `limit` commands have been issued
    struct AbortAt<'a> {
        issued: &'a Cell<u32>,
        limit: u32,
    }

    impl AbortSource for AbortAt<'_> {
        fn abort_requested(&mut self) -> bool {
            self.issued.get() >= self.limit
        }
    }

    fn gripped() -> ActuatorState {
        ActuatorState::new(AxisPosition::Center, JawPosition::Closed)
    }

    fn solver(
        issued: &Cell<u32>,
        left: ActuatorState,
        right: ActuatorState,
    ) -> Solver<Recorder<'_>, NoDelay> {
        Solver::new(PositionModel::with_states(
            Recorder::new(issued),
            NoDelay,
            1000,
            left,
            right,
        ))
    }

    fn axis(to: AxisPosition, from: AxisPosition) -> Motion {
        Motion::Axis { from, to }
    }

    #[test]
    fn test_single_direct_twist() {
        let issued = Cell::new(0);
        let mut s = solver(&issued, gripped(), gripped());

        s.solve_str("F1 9", &mut NeverAbort).unwrap();

        let log = &s.model_mut().output_mut().log;
        assert_eq!(log.len(), 1);
        assert_eq!(
            log[0],
            (Actuator::Right, axis(AxisPosition::Ccw, AxisPosition::Center))
        );
        assert_eq!(s.status().faces, FaceAssignment::default());
    }

    #[test]
    fn test_reorientation_then_twist() {
        let issued = Cell::new(0);
        let mut s = solver(&issued, gripped(), gripped());

        s.solve_str("U2 R1 2", &mut NeverAbort).unwrap();

        let status = s.status();
        assert_eq!(status.faces.left, CanonicalFace::Up);
        assert_eq!(status.faces.right, CanonicalFace::Right);

        let log = s.model_mut().output_mut().log.clone();
        let expected = [
            // U2: half twist on Left needs staging to -90°
            (Actuator::Left, Motion::Jaw { from: JawPosition::Closed, to: JawPosition::Open }),
            (Actuator::Left, axis(AxisPosition::Ccw, AxisPosition::Center)),
            (Actuator::Left, Motion::Jaw { from: JawPosition::Open, to: JawPosition::Closed }),
            (Actuator::Left, axis(AxisPosition::Cw, AxisPosition::Ccw)),
            // R1: Left carries one step (from +90° it lands at Center)
            (Actuator::Right, Motion::Jaw { from: JawPosition::Closed, to: JawPosition::Open }),
            (Actuator::Left, axis(AxisPosition::Center, AxisPosition::Cw)),
            (Actuator::Right, Motion::Jaw { from: JawPosition::Open, to: JawPosition::Closed }),
            (Actuator::Right, axis(AxisPosition::Ccw, AxisPosition::Center)),
        ];
        assert_eq!(log.as_slice(), &expected);
    }

    #[test]
    fn test_count_only_issues_nothing() {
        let issued = Cell::new(0);
        let mut s = solver(&issued, ActuatorState::default(), ActuatorState::default());

        assert_eq!(s.solve_str("9", &mut NeverAbort), Ok(()));
        assert_eq!(issued.get(), 0);
        assert_eq!(s.status().left, ActuatorState::default());
    }

    #[test]
    fn test_abort_mid_reorientation() {
        let issued = Cell::new(0);
        let mut s = solver(
            &issued,
            ActuatorState::new(AxisPosition::Ccw, JawPosition::Closed),
            gripped(),
        );
        let mut abort = AbortAt {
            issued: &issued,
            limit: 1,
        };

        assert_eq!(s.solve_str("R1 1", &mut abort), Err(PlanError::PlanAborted));
        assert_eq!(issued.get(), 1);
        assert_eq!(s.status().faces.right, CanonicalFace::Front);
        assert_eq!(
            s.model_mut().output_mut().log[0],
            (Actuator::Left, Motion::Jaw { from: JawPosition::Closed, to: JawPosition::Open })
        );
    }

    #[test]
    fn test_parse_error_issues_nothing() {
        let issued = Cell::new(0);
        let mut s = solver(&issued, gripped(), gripped());

        assert_eq!(
            s.solve_str("U2 X1 2", &mut NeverAbort),
            Err(PlanError::Parse(crate::cube::MoveParseError::InvalidFace('X')))
        );
        assert_eq!(issued.get(), 0);
    }

    #[test]
    fn test_down_face_brought_to_left() {
        let issued = Cell::new(0);
        let mut s = solver(&issued, gripped(), gripped());

        s.solve_str("D3 1", &mut NeverAbort).unwrap();

        let status = s.status();
        assert_eq!(status.faces.left, CanonicalFace::Down);
        assert_eq!(status.faces.right, CanonicalFace::Front);
        assert_eq!(status.left.axis, AxisPosition::Cw);
    }

    #[test]
    fn test_release_and_reload() {
        let issued = Cell::new(0);
        let mut s = solver(&issued, gripped(), gripped());

        s.solve_str("F1 R3 U2 3", &mut NeverAbort).unwrap();
        s.release().unwrap();
        let status = s.status();
        for state in [status.left, status.right] {
            assert_eq!(state, ActuatorState::new(AxisPosition::Center, JawPosition::Load));
        }

        s.reset();
        s.grip().unwrap();
        assert_eq!(s.status().faces, FaceAssignment::default());
        assert_eq!(s.status().left, gripped());
        assert_eq!(s.status().right, gripped());

        s.load().unwrap();
        assert_eq!(s.status().right.jaw, JawPosition::Load);
    }
}

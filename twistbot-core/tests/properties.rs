//! Property tests for face tracking and the solve pipeline

use embedded_hal::delay::DelayNs;
use proptest::prelude::*;

use twistbot_core::cube::{CanonicalFace, Move};
use twistbot_core::motion::{
    landing, Actuator, AxisPosition, FaceAssignment, JawPosition, Partition, PositionModel,
    Sweep, Tracker,
};
use twistbot_core::traits::{Motion, NeverAbort, ServoOutput};
use twistbot_core::Solver;

#[derive(Default)]
struct Recorder {
    log: Vec<(Actuator, Motion)>,
}

impl ServoOutput for Recorder {
    type Error = ();

    fn drive(&mut self, actuator: Actuator, motion: Motion) -> Result<(), ()> {
        self.log.push((actuator, motion));
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn actuator() -> impl Strategy<Value = Actuator> {
    prop_oneof![Just(Actuator::Left), Just(Actuator::Right)]
}

fn assignment() -> impl Strategy<Value = FaceAssignment> {
    let faces = CanonicalFace::ALL;
    (0..6usize, 0..4usize).prop_map(move |(held, step)| {
        let left = faces[held];
        FaceAssignment {
            left,
            right: left.cycle()[step],
        }
    })
}

fn moves() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec(
        (0..6usize, 1..=3u8).prop_map(|(face, turns)| {
            Move::new(CanonicalFace::ALL[face], turns).unwrap()
        }),
        0..40,
    )
}

fn solver() -> Solver<Recorder, NoDelay> {
    Solver::new(PositionModel::new(Recorder::default(), NoDelay, 0))
}

proptest! {
    #[test]
    fn rotations_compose(faces in assignment(), a in actuator(), d1 in 0..8u8, d2 in 0..8u8) {
        let mut stepwise = Tracker::with_assignment(faces).unwrap();
        stepwise.rotate(a, d1);
        stepwise.rotate(a, d2);

        let mut combined = Tracker::with_assignment(faces).unwrap();
        combined.rotate(a, (d1 + d2) % 4);

        prop_assert_eq!(stepwise.assignment(), combined.assignment());
        prop_assert_eq!(stepwise.current(a.other()), faces.get(a.other()));
    }

    #[test]
    fn every_move_twists_the_right_face(moves in moves()) {
        let partition = Partition::default();
        let mut solver = solver();

        for mv in &moves {
            let before = solver.model_mut().output_mut().log.len();
            solver.solve(&[*mv], &mut NeverAbort).unwrap();

            let actor = partition.responsible(mv.face);
            prop_assert_eq!(solver.status().faces.get(actor), mv.face);

            // The layer twist is the last command of every move
            let log = &solver.model_mut().output_mut().log;
            prop_assert!(log.len() > before);
            let (last_actuator, last_motion) = log[log.len() - 1];
            prop_assert_eq!(last_actuator, actor);

            // It sweeps the layer by exactly the move's quarter turns
            let sweep = Sweep::from_steps(mv.turns).unwrap();
            match last_motion {
                Motion::Axis { from, to } => {
                    prop_assert_eq!(landing(from, sweep), Some(to));
                }
                Motion::Jaw { .. } => {
                    prop_assert!(false, "move ended on a jaw command");
                }
            }
        }
    }

    #[test]
    fn sweeps_stay_in_range_and_never_fight(moves in moves()) {
        let mut solver = solver();
        solver.grip().unwrap();
        solver.solve(&moves, &mut NeverAbort).unwrap();
        solver.release().unwrap();

        let mut jaws = [JawPosition::Open; 2];
        let mut axes = [AxisPosition::Center; 2];
        let mut twists = 0;
        let index = |a: Actuator| a as usize;

        for &(a, motion) in &solver.model_mut().output_mut().log {
            match motion {
                Motion::Jaw { from, to } => {
                    prop_assert_eq!(from, jaws[index(a)]);
                    jaws[index(a)] = to;
                }
                Motion::Axis { from, to } => {
                    prop_assert_eq!(from, axes[index(a)]);
                    prop_assert_ne!(from, to);
                    let own = jaws[index(a)] == JawPosition::Closed;
                    let opposed = jaws[index(a.other())] == JawPosition::Closed;
                    // Something always holds the puzzle while an axis turns
                    prop_assert!(own || opposed);
                    if own && opposed {
                        twists += 1;
                    }
                    axes[index(a)] = to;
                }
            }
        }

        prop_assert_eq!(twists, moves.len());
        prop_assert_eq!(axes, [AxisPosition::Center; 2]);
        prop_assert_eq!(jaws, [JawPosition::Load; 2]);
    }
}

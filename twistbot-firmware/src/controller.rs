//! Run controller
//!
//! Turns button presses, host move strings and motion results into state
//! machine events, and decides which motion the gripper core runs next.

use heapless::String;

use twistbot_core::config::{ServoCalibration, TuningSession, TuningUpdate};
use twistbot_core::state::{Button, ErrorKind, Event, Menu, MenuEntry, State};
use twistbot_core::PlanError;

/// Longest accepted solve string (64 moves plus the trailing count)
pub const MOVE_STRING_LEN: usize = 256;

/// Solve string as received from the host
pub type MoveString = String<MOVE_STRING_LEN>;

/// Work for the motion core
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionRequest {
    /// Start a new run: center both axes, jaws to loading width
    Load,
    /// Close both jaws on the inserted puzzle
    Grip,
    /// Execute a solve string
    Solve(MoveString),
    /// Return to loading width without dropping the puzzle
    Release,
    /// Drive a controller channel directly (tuning)
    Tune { port: u8, pulse: u16 },
    /// Switch to a new calibration
    SetCalibration(ServoCalibration),
}

impl MotionRequest {
    /// Check if the motion core reports a result for this request
    pub fn has_result(&self) -> bool {
        matches!(
            self,
            MotionRequest::Load
                | MotionRequest::Grip
                | MotionRequest::Solve(_)
                | MotionRequest::Release
        )
    }
}

/// Outcome of a motion request
pub type MotionResult = Result<(), PlanError>;

/// What the controller task should do next
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Queue work on the motion core
    Motion(MotionRequest),
    /// Stop the running plan at the next command boundary
    Abort,
    /// Persist the calibration and hand it to the motion core
    Save(ServoCalibration),
}

/// Controller state
pub struct Controller {
    state: State,
    menu: Menu,
    calibration: Option<ServoCalibration>,
    tuning: Option<TuningSession>,
    /// A motion request with a pending result is outstanding
    busy: bool,
    /// Load motion finished, waiting for the user to insert the puzzle
    loaded: bool,
}

impl Controller {
    /// Create a controller; `calibration` is `None` when none could be loaded
    pub fn new(calibration: Option<ServoCalibration>) -> Self {
        Self {
            state: State::Boot,
            menu: Menu::new(),
            calibration,
            tuning: None,
            busy: false,
            loaded: false,
        }
    }

    /// Complete boot, or enter the error state for a boot fault
    pub fn boot(&mut self, fault: Option<ErrorKind>) {
        let fault = fault.or_else(|| {
            self.calibration
                .is_none()
                .then_some(ErrorKind::MissingCalibration)
        });

        match fault {
            Some(kind) => self.transition(Event::ErrorDetected(kind)),
            None => self.transition(Event::BootComplete),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    /// Tuning session while calibrating
    pub fn tuning(&self) -> Option<&TuningSession> {
        self.tuning.as_ref()
    }

    /// Handle a debounced button press
    pub fn on_button(&mut self, button: Button) -> Option<Command> {
        match self.state {
            State::Idle => {
                let entry = self.menu.press(button)?;
                self.start(entry)
            }
            State::Loading if !self.busy && self.loaded => match button {
                Button::Enter => self.motion(MotionRequest::Grip),
                Button::Up | Button::Down => self.abort_to_release(),
            },
            State::AwaitingMoves => self.abort_to_release(),
            State::Solving => Some(Command::Abort),
            State::Complete if button == Button::Enter => {
                self.transition(Event::UserConfirm);
                None
            }
            State::Calibrating => self.tune(button),
            State::Error(_) if button == Button::Enter && !self.busy => {
                self.transition(Event::AcknowledgeError);
                None
            }
            _ => None,
        }
    }

    /// Handle a solve string from the host
    pub fn on_moves(&mut self, moves: MoveString) -> Option<Command> {
        if self.state != State::AwaitingMoves {
            return None;
        }
        self.transition(Event::MovesReceived);
        self.motion(MotionRequest::Solve(moves))
    }

    /// Handle the result of the outstanding motion request
    pub fn on_motion_result(&mut self, result: MotionResult) -> Option<Command> {
        self.busy = false;

        if let Err(e) = result {
            if !e.is_abort() {
                let kind = e.error_kind().unwrap_or(ErrorKind::PlanFault);
                let held = self.state == State::Solving;
                self.loaded = false;
                self.transition(Event::ErrorDetected(kind));

                // Let go of the puzzle unless the servos themselves failed
                if held && kind != ErrorKind::HardwareFault {
                    return self.motion(MotionRequest::Release);
                }
                return None;
            }
        }

        match self.state {
            State::Loading if !self.loaded => {
                self.loaded = true;
                None
            }
            State::Loading => {
                self.loaded = false;
                self.transition(Event::PuzzleLoaded);
                None
            }
            State::Solving => {
                let event = match result {
                    Ok(()) => Event::SolveFinished,
                    Err(_) => Event::Abort,
                };
                self.transition(event);
                self.motion(MotionRequest::Release)
            }
            State::Releasing => {
                self.transition(Event::Released);
                None
            }
            _ => None,
        }
    }

    /// Handle completion of a calibration save
    pub fn on_saved(&mut self, ok: bool) {
        if !ok {
            self.transition(Event::ErrorDetected(ErrorKind::StorageError));
        }
    }

    fn start(&mut self, entry: MenuEntry) -> Option<Command> {
        if entry != MenuEntry::Calibrate && self.calibration.is_none() {
            self.transition(Event::ErrorDetected(ErrorKind::MissingCalibration));
            return None;
        }

        self.transition(entry.event());
        match entry {
            MenuEntry::Solve => {
                self.loaded = false;
                self.motion(MotionRequest::Load)
            }
            MenuEntry::Release => self.motion(MotionRequest::Release),
            MenuEntry::Calibrate => {
                let session = TuningSession::new(self.calibration.clone().unwrap_or_default());
                let update = session.update();
                self.tuning = Some(session);
                self.apply_tuning(update)
            }
        }
    }

    fn tune(&mut self, button: Button) -> Option<Command> {
        let update = self.tuning.as_mut()?.press(button);
        self.apply_tuning(update)
    }

    fn apply_tuning(&mut self, update: TuningUpdate) -> Option<Command> {
        match update {
            TuningUpdate::Drive { port, pulse, .. } => {
                Some(Command::Motion(MotionRequest::Tune { port, pulse }))
            }
            TuningUpdate::Finished => {
                let calibration = self.tuning.take()?.finish();
                self.calibration = Some(calibration.clone());
                self.transition(Event::CalibrationSaved);
                Some(Command::Save(calibration))
            }
        }
    }

    fn abort_to_release(&mut self) -> Option<Command> {
        self.loaded = false;
        self.transition(Event::Abort);
        self.motion(MotionRequest::Release)
    }

    fn motion(&mut self, request: MotionRequest) -> Option<Command> {
        self.busy = request.has_result();
        Some(Command::Motion(request))
    }

    fn transition(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> Controller {
        let mut ctrl = Controller::new(Some(ServoCalibration::new()));
        ctrl.boot(None);
        ctrl
    }

    fn moves(text: &str) -> MoveString {
        let mut s = MoveString::new();
        s.push_str(text).unwrap();
        s
    }

    #[test]
    fn test_boot_without_calibration() {
        let mut ctrl = Controller::new(None);
        ctrl.boot(None);
        assert_eq!(ctrl.state(), State::Error(ErrorKind::MissingCalibration));

        ctrl.on_button(Button::Enter);
        assert_eq!(ctrl.state(), State::Idle);

        // Solving needs a calibration
        assert_eq!(ctrl.on_button(Button::Enter), None);
        assert_eq!(ctrl.state(), State::Error(ErrorKind::MissingCalibration));
    }

    #[test]
    fn test_boot_fault() {
        let mut ctrl = Controller::new(Some(ServoCalibration::new()));
        ctrl.boot(Some(ErrorKind::HardwareFault));
        assert_eq!(ctrl.state(), State::Error(ErrorKind::HardwareFault));
    }

    #[test]
    fn test_solve_run() {
        let mut ctrl = idle();

        assert_eq!(
            ctrl.on_button(Button::Enter),
            Some(Command::Motion(MotionRequest::Load))
        );
        assert_eq!(ctrl.state(), State::Loading);

        // Buttons are ignored until the jaws reach loading width
        assert_eq!(ctrl.on_button(Button::Enter), None);
        assert_eq!(ctrl.on_motion_result(Ok(())), None);

        assert_eq!(
            ctrl.on_button(Button::Enter),
            Some(Command::Motion(MotionRequest::Grip))
        );
        ctrl.on_motion_result(Ok(()));
        assert_eq!(ctrl.state(), State::AwaitingMoves);

        assert_eq!(
            ctrl.on_moves(moves("R1 U2 2")),
            Some(Command::Motion(MotionRequest::Solve(moves("R1 U2 2"))))
        );
        assert_eq!(ctrl.state(), State::Solving);

        assert_eq!(
            ctrl.on_motion_result(Ok(())),
            Some(Command::Motion(MotionRequest::Release))
        );
        assert_eq!(ctrl.state(), State::Releasing);

        ctrl.on_motion_result(Ok(()));
        assert_eq!(ctrl.state(), State::Complete);

        ctrl.on_button(Button::Enter);
        assert_eq!(ctrl.state(), State::Idle);
    }

    #[test]
    fn test_abort_while_solving() {
        let mut ctrl = idle();
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));
        ctrl.on_moves(moves("F1 1"));

        assert_eq!(ctrl.on_button(Button::Up), Some(Command::Abort));
        assert_eq!(ctrl.state(), State::Solving);

        assert_eq!(
            ctrl.on_motion_result(Err(PlanError::PlanAborted)),
            Some(Command::Motion(MotionRequest::Release))
        );
        assert_eq!(ctrl.state(), State::Releasing);
    }

    #[test]
    fn test_abort_while_loading() {
        let mut ctrl = idle();
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));

        assert_eq!(
            ctrl.on_button(Button::Down),
            Some(Command::Motion(MotionRequest::Release))
        );
        assert_eq!(ctrl.state(), State::Releasing);
    }

    #[test]
    fn test_moves_outside_run_are_ignored() {
        let mut ctrl = idle();
        assert_eq!(ctrl.on_moves(moves("U1 1")), None);
        assert_eq!(ctrl.state(), State::Idle);
    }

    #[test]
    fn test_plan_failure() {
        let mut ctrl = idle();
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));
        ctrl.on_moves(moves("X1 1"));

        let command = ctrl.on_motion_result(Err(PlanError::Parse(
            twistbot_core::cube::MoveParseError::InvalidFace('X'),
        )));
        assert_eq!(command, Some(Command::Motion(MotionRequest::Release)));
        assert_eq!(ctrl.state(), State::Error(ErrorKind::InvalidMoves));

        // Acknowledging waits for the release to finish
        assert_eq!(ctrl.on_button(Button::Enter), None);
        assert_eq!(ctrl.state(), State::Error(ErrorKind::InvalidMoves));

        assert_eq!(ctrl.on_motion_result(Ok(())), None);
        assert_eq!(ctrl.state(), State::Error(ErrorKind::InvalidMoves));
        ctrl.on_button(Button::Enter);
        assert_eq!(ctrl.state(), State::Idle);
    }

    #[test]
    fn test_hardware_fault_during_solve_keeps_servos_still() {
        let mut ctrl = idle();
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));
        ctrl.on_button(Button::Enter);
        ctrl.on_motion_result(Ok(()));
        ctrl.on_moves(moves("U1 1"));

        assert_eq!(ctrl.on_motion_result(Err(PlanError::HardwareFault)), None);
        assert_eq!(ctrl.state(), State::Error(ErrorKind::HardwareFault));
        ctrl.on_button(Button::Enter);
        assert_eq!(ctrl.state(), State::Idle);
    }

    #[test]
    fn test_calibration_session() {
        let mut ctrl = idle();
        ctrl.on_button(Button::Down);
        ctrl.on_button(Button::Down);

        let first = ctrl.on_button(Button::Enter);
        assert_eq!(ctrl.state(), State::Calibrating);
        assert!(matches!(
            first,
            Some(Command::Motion(MotionRequest::Tune { port: 1, .. }))
        ));

        assert!(matches!(
            ctrl.on_button(Button::Up),
            Some(Command::Motion(MotionRequest::Tune { port: 1, pulse: 308 }))
        ));

        let mut last = None;
        for _ in 0..12 {
            last = ctrl.on_button(Button::Enter);
        }
        let cal = match last {
            Some(Command::Save(cal)) => cal,
            other => panic!("expected save, got {:?}", other),
        };
        assert_eq!(cal.right.axis.ccw, 308);
        assert!(cal.verify_crc());
        assert_eq!(ctrl.state(), State::Idle);

        ctrl.on_saved(false);
        assert_eq!(ctrl.state(), State::Error(ErrorKind::StorageError));
    }
}

//! Interactive servo tuning
//!
//! Walks through every stop pulse in turn. Up/Down nudge the pulse and the
//! servo follows live; Enter accepts the value and moves on.

use crate::state::Button;

use super::calibration::{CalibrationEntry, ServoCalibration, STOP_ENTRIES};
use super::types::TUNING_STEP;
use crate::motion::Actuator;
use crate::traits::Servo;

/// What the caller should do after a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningUpdate {
    /// Write `pulse` to controller channel `port`
    Drive {
        entry: CalibrationEntry,
        port: u8,
        pulse: u16,
    },
    /// All stops accepted
    Finished,
}

/// Tuning session over a working copy of the calibration
#[derive(Debug, Clone)]
pub struct TuningSession {
    calibration: ServoCalibration,
    index: usize,
}

impl TuningSession {
    /// Start tuning from an existing calibration
    pub fn new(calibration: ServoCalibration) -> Self {
        Self {
            calibration,
            index: 0,
        }
    }

    /// Stop currently being tuned
    pub fn current(&self) -> Option<CalibrationEntry> {
        STOP_ENTRIES.get(self.index).copied()
    }

    /// Check if every stop has been accepted
    pub fn is_finished(&self) -> bool {
        self.index >= STOP_ENTRIES.len()
    }

    /// Output for the current stop (used when entering the session)
    pub fn update(&self) -> TuningUpdate {
        let Some(entry) = self.current() else {
            return TuningUpdate::Finished;
        };

        let (actuator, servo) = match entry {
            CalibrationEntry::AxisStop(a, _) => (a, Servo::Axis),
            CalibrationEntry::JawStop(a, _) => (a, Servo::Jaw),
            other => {
                debug_assert!(false, "{:?} is not a stop pulse", other);
                return TuningUpdate::Finished;
            }
        };

        TuningUpdate::Drive {
            entry,
            port: self.calibration.port(actuator, servo),
            pulse: self.calibration.get(entry),
        }
    }

    /// Handle a button press
    pub fn press(&mut self, button: Button) -> TuningUpdate {
        let Some(entry) = self.current() else {
            return TuningUpdate::Finished;
        };
        let pulse = self.calibration.get(entry);

        match button {
            Button::Up => {
                self.calibration.set(entry, pulse.saturating_add(TUNING_STEP));
            }
            Button::Down => {
                self.calibration.set(entry, pulse.saturating_sub(TUNING_STEP));
            }
            Button::Enter => self.index += 1,
        }

        self.update()
    }

    /// Working copy of the calibration
    pub fn calibration(&self) -> &ServoCalibration {
        &self.calibration
    }

    /// End the session and return the calibration to persist
    pub fn finish(mut self) -> ServoCalibration {
        self.calibration.update_crc();
        self.calibration
    }
}

//! Planning and execution errors

use crate::config::{CalibrationEntry, CalibrationError, TUNE_FILE_ENTRIES};
use crate::cube::{CanonicalFace, MoveParseError};
use crate::state::ErrorKind;

/// Errors surfaced by the solve pipeline
///
/// Every failure is returned to the caller; recovery (releasing the
/// puzzle, notifying the user) is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// An axis target outside the legal stops, or a sweep that cannot land
    OutOfRangeAxis,
    /// A required calibration entry is absent
    MissingCalibration(CalibrationEntry),
    /// Abort was requested between primitive commands
    PlanAborted,
    /// A primitive command could not be issued
    HardwareFault,
    /// The responsible actuator cannot be brought onto this face
    UnreachableFace(CanonicalFace),
    /// The move string was malformed
    Parse(MoveParseError),
}

impl PlanError {
    /// Check if this is a user-requested stop rather than a fault
    pub fn is_abort(&self) -> bool {
        matches!(self, PlanError::PlanAborted)
    }

    /// Map a fatal error onto the run state machine's error kinds
    ///
    /// Returns `None` for an abort.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            PlanError::PlanAborted => None,
            PlanError::MissingCalibration(_) => Some(ErrorKind::MissingCalibration),
            PlanError::HardwareFault => Some(ErrorKind::HardwareFault),
            PlanError::OutOfRangeAxis | PlanError::UnreachableFace(_) => {
                Some(ErrorKind::PlanFault)
            }
            PlanError::Parse(_) => Some(ErrorKind::InvalidMoves),
        }
    }
}

impl From<MoveParseError> for PlanError {
    fn from(e: MoveParseError) -> Self {
        PlanError::Parse(e)
    }
}

/// A rejected tune file names the entry it could not supply
impl From<CalibrationError> for PlanError {
    fn from(e: CalibrationError) -> Self {
        let entry = match e {
            CalibrationError::Missing(entry) => entry,
            CalibrationError::InvalidValue { line } => TUNE_FILE_ENTRIES
                .get(usize::from(line).saturating_sub(1))
                .copied()
                .unwrap_or(CalibrationEntry::PwmFrequency),
        };
        PlanError::MissingCalibration(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServoCalibration;
    use crate::motion::{Actuator, AxisPosition};

    #[test]
    fn test_abort_is_not_an_error_kind() {
        assert!(PlanError::PlanAborted.is_abort());
        assert_eq!(PlanError::PlanAborted.error_kind(), None);
    }

    #[test]
    fn test_fatal_error_kinds() {
        assert_eq!(
            PlanError::HardwareFault.error_kind(),
            Some(ErrorKind::HardwareFault)
        );
        assert_eq!(
            PlanError::OutOfRangeAxis.error_kind(),
            Some(ErrorKind::PlanFault)
        );
        assert_eq!(
            PlanError::UnreachableFace(CanonicalFace::Up).error_kind(),
            Some(ErrorKind::PlanFault)
        );
        assert_eq!(
            PlanError::from(MoveParseError::TooManyMoves).error_kind(),
            Some(ErrorKind::InvalidMoves)
        );
        assert!(!PlanError::HardwareFault.is_abort());
    }

    #[test]
    fn test_truncated_tune_file_is_missing_calibration() {
        // Stops end after the right axis' first entry
        let text = "50\n102\n512\n0\n1\n2\n3\n150\n";
        let err = PlanError::from(ServoCalibration::parse_tune_file(text).unwrap_err());

        assert_eq!(
            err,
            PlanError::MissingCalibration(CalibrationEntry::AxisStop(
                Actuator::Right,
                AxisPosition::Center
            ))
        );
        assert_eq!(err.error_kind(), Some(ErrorKind::MissingCalibration));
    }

    #[test]
    fn test_invalid_tune_value_names_its_entry() {
        let err = PlanError::from(CalibrationError::InvalidValue { line: 1 });
        assert_eq!(
            err,
            PlanError::MissingCalibration(CalibrationEntry::PwmFrequency)
        );
        assert!(!err.is_abort());
    }
}

//! Servo calibration data
//!
//! Pulse counts for every discrete stop, the controller channel of each
//! servo, and the PWM setup. Stored in flash as postcard binary data and
//! exchanged with the host as a line-based tune file.

use core::fmt::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::{Actuator, AxisPosition, JawPosition, Primitive};
use crate::traits::Servo;

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x5345_5256; // "SERV"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Number of output channels on the PWM controller
pub const PWM_CHANNELS: u8 = 16;

/// Stop pulses and channel for an axis servo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisCalibration {
    /// Controller channel
    pub port: u8,
    /// Pulse at -90°
    pub ccw: u16,
    /// Pulse at 0°
    pub center: u16,
    /// Pulse at +90°
    pub cw: u16,
}

/// Stop pulses and channel for a jaw servo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JawCalibration {
    /// Controller channel
    pub port: u8,
    pub closed: u16,
    pub open: u16,
    pub load: u16,
}

/// Calibration for one actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorCalibration {
    pub axis: AxisCalibration,
    pub jaw: JawCalibration,
}

/// A single value in the calibration set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationEntry {
    PwmFrequency,
    PulseMin,
    PulseMax,
    Port(Actuator, Servo),
    AxisStop(Actuator, AxisPosition),
    JawStop(Actuator, JawPosition),
}

impl CalibrationEntry {
    /// Short description, used as the tune-file comment
    pub fn label(&self) -> &'static str {
        use Actuator::{Left, Right};
        use CalibrationEntry::*;

        match *self {
            PwmFrequency => "PWM frequency",
            PulseMin => "PWM minimum",
            PulseMax => "PWM maximum",
            Port(Right, Servo::Jaw) => "right jaw port",
            Port(Right, Servo::Axis) => "right axis port",
            Port(Left, Servo::Jaw) => "left jaw port",
            Port(Left, Servo::Axis) => "left axis port",
            AxisStop(Right, AxisPosition::Ccw) => "right axis -90",
            AxisStop(Right, AxisPosition::Center) => "right axis 0",
            AxisStop(Right, AxisPosition::Cw) => "right axis +90",
            AxisStop(Left, AxisPosition::Ccw) => "left axis -90",
            AxisStop(Left, AxisPosition::Center) => "left axis 0",
            AxisStop(Left, AxisPosition::Cw) => "left axis +90",
            JawStop(Right, JawPosition::Closed) => "right jaw closed",
            JawStop(Right, JawPosition::Open) => "right jaw open",
            JawStop(Right, JawPosition::Load) => "right jaw load",
            JawStop(Left, JawPosition::Closed) => "left jaw closed",
            JawStop(Left, JawPosition::Open) => "left jaw open",
            JawStop(Left, JawPosition::Load) => "left jaw load",
        }
    }

    /// Check if this entry is a servo stop pulse
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            CalibrationEntry::AxisStop(..) | CalibrationEntry::JawStop(..)
        )
    }
}

/// Stop pulses in tuning order
pub const STOP_ENTRIES: [CalibrationEntry; 12] = {
    use Actuator::{Left, Right};
    use CalibrationEntry::{AxisStop, JawStop};

    [
        AxisStop(Right, AxisPosition::Ccw),
        AxisStop(Right, AxisPosition::Center),
        AxisStop(Right, AxisPosition::Cw),
        JawStop(Right, JawPosition::Closed),
        JawStop(Right, JawPosition::Open),
        JawStop(Right, JawPosition::Load),
        AxisStop(Left, AxisPosition::Ccw),
        AxisStop(Left, AxisPosition::Center),
        AxisStop(Left, AxisPosition::Cw),
        JawStop(Left, JawPosition::Closed),
        JawStop(Left, JawPosition::Open),
        JawStop(Left, JawPosition::Load),
    ]
};

/// Tune-file line order
pub const TUNE_FILE_ENTRIES: [CalibrationEntry; 19] = {
    use Actuator::{Left, Right};
    use CalibrationEntry::*;

    [
        PwmFrequency,
        PulseMin,
        PulseMax,
        Port(Right, Servo::Jaw),
        Port(Right, Servo::Axis),
        Port(Left, Servo::Jaw),
        Port(Left, Servo::Axis),
        STOP_ENTRIES[0],
        STOP_ENTRIES[1],
        STOP_ENTRIES[2],
        STOP_ENTRIES[3],
        STOP_ENTRIES[4],
        STOP_ENTRIES[5],
        STOP_ENTRIES[6],
        STOP_ENTRIES[7],
        STOP_ENTRIES[8],
        STOP_ENTRIES[9],
        STOP_ENTRIES[10],
        STOP_ENTRIES[11],
    ]
};

/// Errors from reading a tune file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// The file ended before this entry
    Missing(CalibrationEntry),
    /// Line (1-based, counting non-blank lines) is not a valid value
    InvalidValue { line: u8 },
}

/// Complete servo calibration stored in flash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoCalibration {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// PWM frequency in Hz
    pub pwm_freq_hz: u16,
    /// Lowest pulse count any stop may use
    pub pulse_min: u16,
    /// Highest pulse count any stop may use
    pub pulse_max: u16,
    pub left: ActuatorCalibration,
    pub right: ActuatorCalibration,
    /// CRC32 checksum (calculated over magic..right)
    pub crc: u32,
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoCalibration {
    /// Calibration with every stop at mid travel of a 50 Hz, 12-bit range
    pub const fn new() -> Self {
        const fn actuator(axis_port: u8, jaw_port: u8) -> ActuatorCalibration {
            ActuatorCalibration {
                axis: AxisCalibration {
                    port: axis_port,
                    ccw: 307,
                    center: 307,
                    cw: 307,
                },
                jaw: JawCalibration {
                    port: jaw_port,
                    closed: 307,
                    open: 307,
                    load: 307,
                },
            }
        }

        Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            pwm_freq_hz: 50,
            pulse_min: 102,
            pulse_max: 512,
            left: actuator(3, 2),
            right: actuator(1, 0),
            crc: 0,
        }
    }

    /// Check if the data is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Calibration of one actuator
    pub fn actuator(&self, actuator: Actuator) -> &ActuatorCalibration {
        match actuator {
            Actuator::Left => &self.left,
            Actuator::Right => &self.right,
        }
    }

    fn actuator_mut(&mut self, actuator: Actuator) -> &mut ActuatorCalibration {
        match actuator {
            Actuator::Left => &mut self.left,
            Actuator::Right => &mut self.right,
        }
    }

    /// Controller channel of a servo
    pub fn port(&self, actuator: Actuator, servo: Servo) -> u8 {
        let cal = self.actuator(actuator);
        match servo {
            Servo::Axis => cal.axis.port,
            Servo::Jaw => cal.jaw.port,
        }
    }

    /// Pulse count for a discrete stop
    pub fn pulse(&self, actuator: Actuator, stop: Primitive) -> u16 {
        let entry = match stop {
            Primitive::Axis(p) => CalibrationEntry::AxisStop(actuator, p),
            Primitive::Jaw(p) => CalibrationEntry::JawStop(actuator, p),
        };
        self.get(entry)
    }

    /// Clamp a pulse count into the allowed range
    pub fn clamp(&self, pulse: u16) -> u16 {
        pulse.clamp(self.pulse_min, self.pulse_max.max(self.pulse_min))
    }

    /// Read one entry
    pub fn get(&self, entry: CalibrationEntry) -> u16 {
        match entry {
            CalibrationEntry::PwmFrequency => self.pwm_freq_hz,
            CalibrationEntry::PulseMin => self.pulse_min,
            CalibrationEntry::PulseMax => self.pulse_max,
            CalibrationEntry::Port(a, s) => self.port(a, s) as u16,
            CalibrationEntry::AxisStop(a, p) => {
                let axis = &self.actuator(a).axis;
                match p {
                    AxisPosition::Ccw => axis.ccw,
                    AxisPosition::Center => axis.center,
                    AxisPosition::Cw => axis.cw,
                }
            }
            CalibrationEntry::JawStop(a, p) => {
                let jaw = &self.actuator(a).jaw;
                match p {
                    JawPosition::Closed => jaw.closed,
                    JawPosition::Open => jaw.open,
                    JawPosition::Load => jaw.load,
                }
            }
        }
    }

    /// Write one entry
    ///
    /// Stop pulses are clamped to the allowed range. Returns false for a
    /// port outside the controller's channels or a zero frequency.
    pub fn set(&mut self, entry: CalibrationEntry, value: u16) -> bool {
        let pulse = self.clamp(value);

        match entry {
            CalibrationEntry::PwmFrequency => {
                if value == 0 {
                    return false;
                }
                self.pwm_freq_hz = value;
            }
            CalibrationEntry::PulseMin => self.pulse_min = value,
            CalibrationEntry::PulseMax => self.pulse_max = value,
            CalibrationEntry::Port(a, s) => {
                if value >= PWM_CHANNELS as u16 {
                    return false;
                }
                let cal = self.actuator_mut(a);
                match s {
                    Servo::Axis => cal.axis.port = value as u8,
                    Servo::Jaw => cal.jaw.port = value as u8,
                }
            }
            CalibrationEntry::AxisStop(a, p) => {
                let axis = &mut self.actuator_mut(a).axis;
                match p {
                    AxisPosition::Ccw => axis.ccw = pulse,
                    AxisPosition::Center => axis.center = pulse,
                    AxisPosition::Cw => axis.cw = pulse,
                }
            }
            CalibrationEntry::JawStop(a, p) => {
                let jaw = &mut self.actuator_mut(a).jaw;
                match p {
                    JawPosition::Closed => jaw.closed = pulse,
                    JawPosition::Open => jaw.open = pulse,
                    JawPosition::Load => jaw.load = pulse,
                }
            }
        }
        true
    }

    /// Parse a tune file
    ///
    /// One value per line in [`TUNE_FILE_ENTRIES`] order; anything after
    /// the first whitespace-separated token is a comment. Blank lines are
    /// skipped. Stop pulses are clamped to the min/max range given earlier
    /// in the same file.
    pub fn parse_tune_file(text: &str) -> Result<Self, CalibrationError> {
        let mut cal = Self::new();
        let mut values = text
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .enumerate();

        for entry in TUNE_FILE_ENTRIES {
            let (index, token) = values.next().ok_or(CalibrationError::Missing(entry))?;
            let invalid = CalibrationError::InvalidValue {
                line: index as u8 + 1,
            };
            let value: u16 = token.parse().map_err(|_| invalid)?;
            if !cal.set(entry, value) {
                return Err(invalid);
            }
        }

        if cal.pulse_min > cal.pulse_max {
            return Err(CalibrationError::InvalidValue { line: 3 });
        }

        cal.update_crc();
        Ok(cal)
    }

    /// Write the tune-file form with a comment on every line
    pub fn write_tune_file<W: Write>(&self, out: &mut W) -> core::fmt::Result {
        for entry in TUNE_FILE_ENTRIES {
            writeln!(out, "{} {}", self.get(entry), entry.label())?;
        }
        Ok(())
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        for entry in TUNE_FILE_ENTRIES {
            crc = crc32_update(crc, &self.get(entry).to_le_bytes());
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize to postcard bytes
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize from postcard bytes
    ///
    /// Only the encoding is checked; call [`is_valid`](Self::is_valid) and
    /// [`verify_crc`](Self::verify_crc) before use.
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

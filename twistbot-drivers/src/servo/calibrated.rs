//! Calibrated gripper servos
//!
//! Maps discrete actuator stops onto PCA9685 channels and pulse counts
//! using the servo calibration.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use twistbot_core::config::{MotionConfig, ServoCalibration};
use twistbot_core::motion::{Actuator, JawPosition, Primitive};
use twistbot_core::traits::{Motion, ServoOutput};

use super::pca9685::{Pca9685, Pca9685Error};

/// Servo output for both actuators
///
/// Opening a jaw from a tight grip first stops halfway between the
/// closed and loading pulses for the ease delay, so the release does not
/// jerk the puzzle.
pub struct CalibratedServos<I2C, D> {
    pwm: Pca9685<I2C>,
    delay: D,
    calibration: ServoCalibration,
    ease_ms: u32,
}

impl<I2C: I2c, D: DelayNs> CalibratedServos<I2C, D> {
    pub fn new(
        pwm: Pca9685<I2C>,
        delay: D,
        calibration: ServoCalibration,
        config: &MotionConfig,
    ) -> Self {
        Self {
            pwm,
            delay,
            calibration,
            ease_ms: config.ease_ms,
        }
    }

    /// Program the controller frequency from the calibration
    pub fn init(&mut self) -> Result<(), Pca9685Error<I2C::Error>> {
        self.pwm.init(self.calibration.pwm_freq_hz, &mut self.delay)
    }

    /// Calibration in use
    pub fn calibration(&self) -> &ServoCalibration {
        &self.calibration
    }

    /// Replace the calibration (after tuning)
    pub fn set_calibration(&mut self, calibration: ServoCalibration) {
        self.calibration = calibration;
    }

    /// Drive a channel directly, clamped to the calibrated pulse range
    pub fn drive_raw(&mut self, port: u8, pulse: u16) -> Result<(), Pca9685Error<I2C::Error>> {
        let pulse = self.calibration.clamp(pulse);
        self.pwm.set_pulse(port, pulse)
    }
}

impl<I2C: I2c, D: DelayNs> ServoOutput for CalibratedServos<I2C, D> {
    type Error = Pca9685Error<I2C::Error>;

    fn drive(&mut self, actuator: Actuator, motion: Motion) -> Result<(), Self::Error> {
        let port = self.calibration.port(actuator, motion.servo());

        let target = match motion {
            Motion::Axis { to, .. } => Primitive::Axis(to),
            Motion::Jaw {
                from: JawPosition::Closed,
                to: JawPosition::Open,
            } => {
                let jaw = self.calibration.actuator(actuator).jaw;
                let midpoint = ((jaw.closed as u32 + jaw.load as u32) / 2) as u16;
                self.pwm.set_pulse(port, self.calibration.clamp(midpoint))?;
                self.delay.delay_ms(self.ease_ms);
                Primitive::Jaw(JawPosition::Open)
            }
            Motion::Jaw { to, .. } => Primitive::Jaw(to),
        };

        let pulse = self.calibration.pulse(actuator, target);
        self.pwm.set_pulse(port, pulse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servo::pca9685::mock::{CountingDelay, MockI2c};
    use twistbot_core::motion::AxisPosition;

    fn servos() -> CalibratedServos<MockI2c, CountingDelay> {
        let mut cal = ServoCalibration::new();
        cal.right.axis.center = 300;
        cal.right.axis.cw = 450;
        cal.left.jaw.closed = 280;
        cal.left.jaw.open = 340;
        cal.left.jaw.load = 380;

        CalibratedServos::new(
            Pca9685::new(MockI2c::default()),
            CountingDelay::default(),
            cal,
            &MotionConfig::default(),
        )
    }

    fn last_pulse(servos: &CalibratedServos<MockI2c, CountingDelay>, n: usize) -> (u8, u16) {
        let writes = servos.pwm.i2c_writes();
        let data = &writes[writes.len() - n].1;
        ((data[0] - 0x06) / 4, u16::from_le_bytes([data[3], data[4]]))
    }

    #[test]
    fn test_axis_uses_calibrated_port_and_pulse() {
        let mut s = servos();
        s.drive(
            Actuator::Right,
            Motion::Axis {
                from: AxisPosition::Center,
                to: AxisPosition::Cw,
            },
        )
        .unwrap();

        assert_eq!(last_pulse(&s, 1), (1, 450));
        assert_eq!(s.delay.total_us, 0);
    }

    #[test]
    fn test_jaw_eases_open_from_closed() {
        let mut s = servos();
        s.drive(
            Actuator::Left,
            Motion::Jaw {
                from: JawPosition::Closed,
                to: JawPosition::Open,
            },
        )
        .unwrap();

        assert_eq!(last_pulse(&s, 2), (2, 330));
        assert_eq!(last_pulse(&s, 1), (2, 340));
        assert_eq!(s.delay.total_us, 250_000);
    }

    #[test]
    fn test_jaw_opens_directly_from_load() {
        let mut s = servos();
        s.drive(
            Actuator::Left,
            Motion::Jaw {
                from: JawPosition::Load,
                to: JawPosition::Open,
            },
        )
        .unwrap();

        assert_eq!(s.pwm.i2c_writes().len(), 1);
        assert_eq!(last_pulse(&s, 1), (2, 340));
    }

    #[test]
    fn test_drive_raw_clamps() {
        let mut s = servos();
        s.drive_raw(5, 4000).unwrap();
        assert_eq!(last_pulse(&s, 1), (5, 512));
    }

    #[test]
    fn test_init_uses_calibrated_frequency() {
        let mut s = servos();
        s.init().unwrap();
        assert!(s.pwm.i2c_writes().iter().any(|(_, d)| d.as_slice() == [0xFE, 121]));
    }
}

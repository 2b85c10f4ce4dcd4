//! PCA9685 16-channel PWM controller (I2C)
//!
//! Each channel produces a pulse whose width is set as a 12-bit "off"
//! count within the PWM period. All channels share one frequency, set by
//! the prescaler from the 25 MHz internal oscillator.
//!
//! # Initialization
//!
//! The prescaler can only be written while the oscillator sleeps:
//! sleep → PRE_SCALE → wake → wait 500 µs → restart.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// PCA9685 register addresses
pub mod reg {
    /// Mode register 1
    pub const MODE1: u8 = 0x00;
    /// Mode register 2
    pub const MODE2: u8 = 0x01;
    /// Channel 0 ON low byte; channel n is at `LED0_ON_L + 4 * n`
    pub const LED0_ON_L: u8 = 0x06;
    /// Prescaler for PWM output frequency
    pub const PRE_SCALE: u8 = 0xFE;
}

/// MODE1 bits
pub mod mode1 {
    pub const RESTART: u8 = 0x80;
    pub const AI: u8 = 0x20;
    pub const SLEEP: u8 = 0x10;
    pub const ALLCALL: u8 = 0x01;
}

/// MODE2 totem-pole outputs
const MODE2_OUTDRV: u8 = 0x04;

/// Full-off bit in LEDn_OFF_H
const FULL_OFF: u8 = 0x10;

/// Default I2C address (all address pins low)
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Internal oscillator frequency
pub const OSCILLATOR_HZ: u32 = 25_000_000;

/// Number of channels
pub const CHANNELS: u8 = 16;

/// Largest pulse count (12-bit counter)
pub const MAX_COUNT: u16 = 4095;

/// PCA9685 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pca9685Error<E> {
    /// I2C transfer failed
    Bus(E),
    /// Channel outside 0..16
    InvalidChannel(u8),
}

/// Prescaler value for a PWM frequency
///
/// `round(25 MHz / (4096 × f)) − 1`, clamped to the hardware range 3..=255.
pub fn prescale(freq_hz: u16) -> u8 {
    if freq_hz == 0 {
        return 255;
    }
    let div = 4096 * freq_hz as u32;
    let value = (OSCILLATOR_HZ + div / 2) / div;
    value.saturating_sub(1).clamp(3, 255) as u8
}

/// PCA9685 driver
pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pca9685<I2C> {
    /// Create a driver at the default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a driver at a specific address
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Program the output frequency and enable the outputs
    pub fn init<D: DelayNs>(
        &mut self,
        freq_hz: u16,
        delay: &mut D,
    ) -> Result<(), Pca9685Error<I2C::Error>> {
        self.write_reg(reg::MODE1, mode1::SLEEP | mode1::AI | mode1::ALLCALL)?;
        self.write_reg(reg::PRE_SCALE, prescale(freq_hz))?;
        self.write_reg(reg::MODE2, MODE2_OUTDRV)?;
        self.write_reg(reg::MODE1, mode1::AI | mode1::ALLCALL)?;
        delay.delay_us(500);
        self.write_reg(reg::MODE1, mode1::RESTART | mode1::AI | mode1::ALLCALL)
    }

    /// Output a pulse of `count` ticks (out of 4096) on `channel`
    pub fn set_pulse(&mut self, channel: u8, count: u16) -> Result<(), Pca9685Error<I2C::Error>> {
        let count = count.min(MAX_COUNT);
        self.write_channel(channel, [0, 0, count as u8, (count >> 8) as u8])
    }

    /// Turn a channel fully off (servo unpowered, free to move)
    pub fn set_off(&mut self, channel: u8) -> Result<(), Pca9685Error<I2C::Error>> {
        self.write_channel(channel, [0, 0, 0, FULL_OFF])
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_channel(
        &mut self,
        channel: u8,
        data: [u8; 4],
    ) -> Result<(), Pca9685Error<I2C::Error>> {
        if channel >= CHANNELS {
            return Err(Pca9685Error::InvalidChannel(channel));
        }
        let reg = reg::LED0_ON_L + 4 * channel;
        self.i2c
            .write(self.address, &[reg, data[0], data[1], data[2], data[3]])
            .map_err(Pca9685Error::Bus)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Pca9685Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Pca9685Error::Bus)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
    use heapless::Vec;

    /// Mock I2C bus recording every write
    #[derive(Default)]
    pub struct MockI2c {
        pub writes: Vec<(u8, Vec<u8, 8>), 32>,
        pub fail: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        let data = Vec::from_slice(bytes).map_err(|_| ErrorKind::Overrun)?;
                        self.writes
                            .push((address, data))
                            .map_err(|_| ErrorKind::Overrun)?;
                    }
                    Operation::Read(buf) => buf.fill(0),
                }
            }
            Ok(())
        }
    }

    impl super::Pca9685<MockI2c> {
        pub fn i2c_writes(&self) -> &[(u8, Vec<u8, 8>)] {
            &self.i2c.writes
        }
    }

    /// Delay that only adds up requested time
    #[derive(Default)]
    pub struct CountingDelay {
        pub total_us: u32,
    }

    impl embedded_hal::delay::DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_us += ns / 1000;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{CountingDelay, MockI2c};
    use super::*;

    #[test]
    fn test_prescale() {
        assert_eq!(prescale(50), 121);
        assert_eq!(prescale(60), 101);
        assert_eq!(prescale(1526), 3);
        assert_eq!(prescale(10_000), 3);
        assert_eq!(prescale(1), 255);
        assert_eq!(prescale(0), 255);
    }

    #[test]
    fn test_init_sequence() {
        let mut pwm = Pca9685::new(MockI2c::default());
        let mut delay = CountingDelay::default();
        pwm.init(50, &mut delay).unwrap();

        let writes: heapless::Vec<&[u8], 8> =
            pwm.i2c.writes.iter().map(|(_, d)| d.as_slice()).collect();
        assert_eq!(
            writes,
            [
                &[reg::MODE1, 0x31][..],
                &[reg::PRE_SCALE, 121],
                &[reg::MODE2, 0x04],
                &[reg::MODE1, 0x21],
                &[reg::MODE1, 0xA1],
            ]
        );
        assert!(pwm.i2c.writes.iter().all(|(addr, _)| *addr == DEFAULT_ADDRESS));
        assert!(delay.total_us >= 500);
    }

    #[test]
    fn test_set_pulse() {
        let mut pwm = Pca9685::with_address(MockI2c::default(), 0x41);
        pwm.set_pulse(3, 0x134).unwrap();
        pwm.set_pulse(0, 5000).unwrap();

        assert_eq!(pwm.i2c.writes[0].0, 0x41);
        assert_eq!(pwm.i2c.writes[0].1.as_slice(), &[0x12, 0, 0, 0x34, 0x01]);
        assert_eq!(pwm.i2c.writes[1].1.as_slice(), &[0x06, 0, 0, 0xFF, 0x0F]);
    }

    #[test]
    fn test_set_off() {
        let mut pwm = Pca9685::new(MockI2c::default());
        pwm.set_off(15).unwrap();
        assert_eq!(pwm.i2c.writes[0].1.as_slice(), &[0x42, 0, 0, 0, FULL_OFF]);
    }

    #[test]
    fn test_invalid_channel_and_bus_error() {
        let mut pwm = Pca9685::new(MockI2c::default());
        assert_eq!(pwm.set_pulse(16, 300), Err(Pca9685Error::InvalidChannel(16)));
        assert!(pwm.i2c.writes.is_empty());

        pwm.i2c.fail = true;
        assert_eq!(
            pwm.set_pulse(0, 300),
            Err(Pca9685Error::Bus(embedded_hal::i2c::ErrorKind::Other))
        );
    }
}

//! Twistbot - Twin-Gripper Puzzle Robot Firmware
//!
//! Main firmware binary for the RP2040 gripper board. Two grippers, each an
//! axis servo and a jaw servo behind a PCA9685 PWM controller, turn the
//! solve string received from the host into puzzle moves.
//!
//! Core 1 runs the blocking motion pipeline; buttons, the host link, the
//! controller and flash persistence run on core 0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use twistbot_core::config::MotionConfig;
use twistbot_core::state::ErrorKind;
use twistbot_drivers::servo::{CalibratedServos, Pca9685};
use twistbot_hal_rp2040::flash::FlashStorage;

mod channels;
mod config;
mod controller;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// I2C clock for the PWM controller
const I2C_FREQUENCY_HZ: u32 = 400_000;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static CORE1_STACK: StaticCell<Stack<8192>> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

/// Main entry point (core 0)
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Twistbot firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Calibration: flash, then the embedded tune file
    let mut storage = FlashStorage::new(p.FLASH, p.DMA_CH0);
    let (calibration, mut fault) = match config::load_calibration(&mut storage).await {
        Ok(calibration) => (Some(calibration), None),
        Err(e) => {
            error!("No servo calibration: {:?}", e);
            (None, e.error_kind())
        }
    };

    let motion_config = MotionConfig::default();

    // PCA9685 on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);

    let mut servos = CalibratedServos::new(
        Pca9685::new(i2c),
        Delay,
        calibration.clone().unwrap_or_default(),
        &motion_config,
    );
    if let Err(e) = servos.init() {
        error!("PWM controller init failed: {:?}", e);
        fault = fault.or(Some(ErrorKind::HardwareFault));
    }
    info!("Servo controller initialized");

    let home = calibration.is_some();
    spawn_core1(p.CORE1, CORE1_STACK.init(Stack::new()), move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| {
            spawner
                .spawn(tasks::motion_task(servos, motion_config, home))
                .unwrap()
        })
    });
    info!("Motion core started");

    // Host link on UART0 (TX=GPIO0, RX=GPIO1), 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let (tx, rx) = uart.into_buffered(Irqs, tx_buf, rx_buf).split();
    info!("UART initialized for host communication");

    // Buttons (active low)
    let up = Input::new(p.PIN_13, Pull::Up);
    let down = Input::new(p.PIN_14, Pull::Up);
    let enter = Input::new(p.PIN_15, Pull::Up);

    spawner.spawn(tasks::buttons_task(up, down, enter)).unwrap();
    spawner.spawn(tasks::host_rx_task(rx)).unwrap();
    spawner.spawn(tasks::host_tx_task(tx)).unwrap();
    spawner.spawn(tasks::calibration_task(storage)).unwrap();
    spawner
        .spawn(tasks::controller_task(calibration, fault))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

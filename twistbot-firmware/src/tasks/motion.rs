//! Motion task (core 1)
//!
//! Owns the solver and the servo controller. Plans block for the settle
//! delay after every servo command, so this task runs alone in the core 1
//! executor. Aborts are polled between commands.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;

use twistbot_core::config::MotionConfig;
use twistbot_core::motion::{Actuator, ActuatorState, PositionModel};
use twistbot_core::traits::{AbortSource, Motion, ServoOutput};
use twistbot_core::{PlanError, Solver};
use twistbot_drivers::servo::CalibratedServos;

use crate::channels::{ABORT, MOTION_REQUESTS, MOTION_RESULTS};
use crate::controller::{MotionRequest, MotionResult};

/// Servo output on the board's I2C0 bus
pub type Servos = CalibratedServos<I2c<'static, I2C0, Blocking>, Delay>;

/// Abort requests raised by the controller on core 0
struct AbortSignal;

impl AbortSource for AbortSignal {
    fn abort_requested(&mut self) -> bool {
        ABORT.try_take().is_some()
    }
}

#[embassy_executor::task]
pub async fn motion_task(mut servos: Servos, config: MotionConfig, home: bool) {
    info!("Motion task started, settle {} ms", config.settle_ms);

    // Without a calibration the servos stay unpowered until tuning
    if home {
        for actuator in Actuator::ALL {
            hold(&mut servos, actuator, ActuatorState::default());
        }
    }
    let mut solver = Solver::new(PositionModel::new(servos, Delay, config.settle_ms));

    loop {
        let request = MOTION_REQUESTS.receive().await;
        debug!("Motion request: {:?}", request);

        let reports = request.has_result();
        let result = run(&mut solver, request);

        if let Err(e) = result {
            if e.is_abort() {
                info!("Plan aborted");
            } else {
                error!("Motion failed: {:?}", e);
            }
        }

        if reports {
            MOTION_RESULTS.send(result).await;
        }
    }
}

fn run(solver: &mut Solver<Servos, Delay>, request: MotionRequest) -> MotionResult {
    match request {
        MotionRequest::Load => {
            ABORT.reset();
            solver.reset();
            solver.load()
        }
        MotionRequest::Grip => solver.grip(),
        MotionRequest::Solve(moves) => {
            let result = solver.solve_str(&moves, &mut AbortSignal);
            ABORT.reset();

            let status = solver.status();
            info!(
                "Solve done: left holds {:?}, right holds {:?}",
                status.faces.left, status.faces.right
            );
            result
        }
        MotionRequest::Release => solver.release(),
        MotionRequest::Tune { port, pulse } => solver
            .model_mut()
            .output_mut()
            .drive_raw(port, pulse)
            .map_err(|_| PlanError::HardwareFault),
        MotionRequest::SetCalibration(calibration) => {
            let status = solver.status();
            let servos = solver.model_mut().output_mut();
            servos.set_calibration(calibration);

            // Tuning left the servos wherever the last stop was
            hold(servos, Actuator::Left, status.left);
            hold(servos, Actuator::Right, status.right);
            Ok(())
        }
    }
}

/// Drive an actuator to the stops the position model has recorded for it
fn hold(servos: &mut Servos, actuator: Actuator, state: ActuatorState) {
    let axis = Motion::Axis {
        from: state.axis,
        to: state.axis,
    };
    let jaw = Motion::Jaw {
        from: state.jaw,
        to: state.jaw,
    };

    if servos.drive(actuator, axis).is_err() || servos.drive(actuator, jaw).is_err() {
        warn!("Failed to drive {:?} actuator to {:?}", actuator, state);
    }
}

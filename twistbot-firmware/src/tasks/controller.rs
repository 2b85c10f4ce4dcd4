//! Controller task
//!
//! Feeds buttons, host solve strings, motion results and save outcomes to
//! the [`Controller`] and carries out the commands it returns.

use defmt::*;
use embassy_futures::select::{select4, Either4};

use twistbot_core::config::ServoCalibration;
use twistbot_core::state::{ErrorKind, State};

use crate::channels::{
    ABORT, BUTTONS, CALIBRATION_SAVE, CALIBRATION_STORED, HOST_MOVES, MOTION_REQUESTS,
    MOTION_RESULTS, STATE_UPDATE,
};
use crate::controller::{Command, Controller, MotionRequest};

#[embassy_executor::task]
pub async fn controller_task(calibration: Option<ServoCalibration>, fault: Option<ErrorKind>) {
    info!("Controller task started");

    let mut controller = Controller::new(calibration);
    controller.boot(fault);
    info!("Boot complete, state {:?}", controller.state());
    STATE_UPDATE.signal(controller.state());

    loop {
        let previous = controller.state();

        let command = match select4(
            BUTTONS.receive(),
            HOST_MOVES.wait(),
            MOTION_RESULTS.receive(),
            CALIBRATION_STORED.wait(),
        )
        .await
        {
            Either4::First(button) => {
                let command = controller.on_button(button);
                log_selection(&controller);
                command
            }
            Either4::Second(moves) => {
                if controller.state() != State::AwaitingMoves {
                    warn!("Solve string ignored in state {:?}", controller.state());
                }
                controller.on_moves(moves)
            }
            Either4::Third(result) => controller.on_motion_result(result),
            Either4::Fourth(ok) => {
                controller.on_saved(ok);
                None
            }
        };

        if let Some(command) = command {
            execute(command).await;
        }

        if controller.state() != previous {
            info!("State: {:?} -> {:?}", previous, controller.state());
            STATE_UPDATE.signal(controller.state());
        }
    }
}

async fn execute(command: Command) {
    match command {
        Command::Motion(request) => MOTION_REQUESTS.send(request).await,
        Command::Abort => {
            info!("Abort requested");
            ABORT.signal(());
        }
        Command::Save(calibration) => {
            MOTION_REQUESTS
                .send(MotionRequest::SetCalibration(calibration.clone()))
                .await;
            CALIBRATION_SAVE.signal(calibration);
        }
    }
}

fn log_selection(controller: &Controller) {
    match controller.state() {
        State::Idle => debug!("Menu: {}", controller.menu().selected().label()),
        State::Calibrating => {
            let Some(session) = controller.tuning() else {
                return;
            };
            if let Some(entry) = session.current() {
                debug!("Tuning {}: {}", entry.label(), session.calibration().get(entry));
            }
        }
        _ => {}
    }
}

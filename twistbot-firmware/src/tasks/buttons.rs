//! Button input task
//!
//! Three active-low push buttons (Up, Down, Enter) with internal pull-ups.
//! A press counts once the line is still low after the debounce time; the
//! next press needs a release first.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use twistbot_core::state::Button;

use crate::channels::BUTTONS;

/// Debounce time in milliseconds
const DEBOUNCE_MS: u64 = 20;

#[embassy_executor::task]
pub async fn buttons_task(
    mut up: Input<'static>,
    mut down: Input<'static>,
    mut enter: Input<'static>,
) {
    info!("Button task started");

    loop {
        let button = match select3(
            up.wait_for_falling_edge(),
            down.wait_for_falling_edge(),
            enter.wait_for_falling_edge(),
        )
        .await
        {
            Either3::First(()) => Button::Up,
            Either3::Second(()) => Button::Down,
            Either3::Third(()) => Button::Enter,
        };

        let input = match button {
            Button::Up => &mut up,
            Button::Down => &mut down,
            Button::Enter => &mut enter,
        };

        Timer::after_millis(DEBOUNCE_MS).await;
        if input.is_low() {
            debug!("Button: {:?}", button);
            if BUTTONS.try_send(button).is_err() {
                warn!("Button channel full, dropping press");
            }
        }

        input.wait_for_high().await;
    }
}

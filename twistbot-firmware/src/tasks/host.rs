//! Host UART link
//!
//! The host (the face-recognition and solving side) sends one solve string
//! per line, e.g. `U2 R1 F3 3`. The robot reports every run-state change as
//! a `STATE <name>` line.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};
use heapless::String;

use crate::channels::{HOST_MOVES, STATE_UPDATE};
use crate::controller::MoveString;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Receives solve strings from the host
#[embassy_executor::task]
pub async fn host_rx_task(mut rx: BufferedUartRx) {
    info!("Host RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];
    let mut line = MoveString::new();
    let mut discard = false;

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match byte {
                b'\r' | b'\n' => {
                    if discard {
                        warn!("Solve string too long or not ASCII, dropped");
                    } else if !line.trim().is_empty() {
                        debug!("Solve string: {}", line.as_str());
                        HOST_MOVES.signal(line.clone());
                    }
                    line.clear();
                    discard = false;
                }
                _ if discard => {}
                _ => {
                    if !byte.is_ascii() || line.push(byte as char).is_err() {
                        discard = true;
                    }
                }
            }
        }
    }
}

/// Reports run-state changes to the host
#[embassy_executor::task]
pub async fn host_tx_task(mut tx: BufferedUartTx) {
    info!("Host TX task started");

    let mut line: String<48> = String::new();

    loop {
        let state = STATE_UPDATE.wait().await;

        line.clear();
        if writeln!(line, "STATE {:?}", state).is_err() {
            continue;
        }

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("UART write error: {:?}", e);
        }
    }
}

//! Transmit loop
//!
//! The transmit loop is the only always-present worker of an emulator. It
//! wakes every [`TICK`](crate::device::TICK), emits a status sentence when
//! the variant's period has elapsed, and drains at most one queued event
//! sentence per tick. All writes go through a single shared writer lock so
//! bytes from different sentences (including the receive loop's
//! acknowledgements) never interleave on the wire.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::device::{DeviceVariant, TICK};
use crate::queue::OutboundQueue;
use crate::state::DeviceState;

/// Whether an I/O error means the transport is permanently gone.
///
/// Transient failures are logged and retried on the next tick; these kinds
/// terminate the loop instead. Shared with the receive loop, which applies
/// the same classification to read errors.
pub(crate) fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::WriteZero
    )
}

/// Write one complete sentence as a single write-then-flush critical
/// section.
///
/// Returns `Err` only for permanent transport closure; transient errors
/// are logged and swallowed so the calling loop tries again next tick.
pub(crate) async fn write_frame<W>(
    writer: &tokio::sync::Mutex<W>,
    frame: &[u8],
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut w = writer.lock().await;

    let result = async {
        w.write_all(frame).await?;
        w.flush().await
    }
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(e) if is_disconnect(e.kind()) => Err(e),
        Err(e) => {
            warn!("Transport write failed, retrying next tick: {}", e);
            Ok(())
        }
    }
}

/// Run the transmit loop until shutdown or transport closure.
pub async fn run_transmit_task<W>(
    writer: Arc<tokio::sync::Mutex<W>>,
    variant: DeviceVariant,
    state: Arc<Mutex<DeviceState>>,
    queue: OutboundQueue,
    mut shutdown: watch::Receiver<bool>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    info!("Starting {} transmit loop", variant.name());

    let mut tick = interval(TICK);
    let mut last_status = Instant::now();

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
        if *shutdown.borrow() {
            break;
        }

        if last_status.elapsed() >= variant.status_period() {
            let snapshot = *state.lock().unwrap_or_else(PoisonError::into_inner);
            let frame = variant.status_sentence(&snapshot).encode();

            if let Err(e) = write_frame(&writer, &frame).await {
                warn!("Transport closed, ending transmit loop: {}", e);
                return Err(e);
            }

            last_status = Instant::now();
        }

        if variant.emits_events() {
            if let Some(frame) = queue.try_pop() {
                debug!("Transmitting queued event: {:02X?}", frame);

                if let Err(e) = write_frame(&writer, &frame).await {
                    warn!("Transport closed, ending transmit loop: {}", e);
                    return Err(e);
                }
            }
        }
    }

    info!("{} transmit loop ended", variant.name());
    Ok(())
}

//! Emulator handle
//!
//! [`Emulator`] owns one emulated instrument: its shared state, its event
//! queue, the writer lock, and the spawned transmit/receive tasks. The
//! control-surface methods mirror what the physical units' front panels
//! and host software can do; none of them block beyond a short lock hold
//! and none of them return errors - failures inside the loops are logged.

use std::sync::{Arc, Mutex, PoisonError};

use bolt_protocol::Sentence;
use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::device::{DeviceVariant, EmulatorConfig};
use crate::queue::OutboundQueue;
use crate::receive::run_receive_task;
use crate::state::DeviceState;
use crate::transmit::run_transmit_task;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A running instrument emulator bound to one duplex transport.
pub struct Emulator {
    config: EmulatorConfig,
    state: Arc<Mutex<DeviceState>>,
    queue: OutboundQueue,
    writer: Arc<tokio::sync::Mutex<BoxedWriter>>,
    shutdown_tx: watch::Sender<bool>,
    transmit_task: JoinHandle<std::io::Result<()>>,
    receive_task: Option<JoinHandle<std::io::Result<()>>>,
}

impl Emulator {
    /// Start an emulator on the given duplex byte stream.
    ///
    /// The stream is split; the transmit loop owns the write half through
    /// a shared lock and, for the strike detector, the receive loop owns
    /// the read half. Port configuration (baud rate, parity, ...) is the
    /// caller's concern - any `AsyncRead + AsyncWrite` will do.
    pub fn start<S>(config: EmulatorConfig, stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        info!("Initialising {} emulator ({})", config.variant.name(), config.id);

        let (reader, writer) = tokio::io::split(stream);
        let reader: BoxedReader = Box::new(reader);
        let writer: Arc<tokio::sync::Mutex<BoxedWriter>> =
            Arc::new(tokio::sync::Mutex::new(Box::new(writer)));

        let state = Arc::new(Mutex::new(DeviceState::new()));
        let queue = OutboundQueue::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let receive_task = if config.variant.accepts_commands() {
            Some(tokio::spawn(run_receive_task(
                reader,
                Arc::clone(&writer),
                shutdown_rx.clone(),
            )))
        } else {
            // The field monitor never reads; inbound bytes are discarded
            // with the dropped read half
            None
        };

        let transmit_task = tokio::spawn(run_transmit_task(
            Arc::clone(&writer),
            config.variant,
            Arc::clone(&state),
            queue.clone(),
            shutdown_rx,
        ));

        Self {
            config,
            state,
            queue,
            writer,
            shutdown_tx,
            transmit_task,
            receive_task,
        }
    }

    /// The emulator's display identifier
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// The emulated instrument variant
    pub fn variant(&self) -> DeviceVariant {
        self.config.variant
    }

    /// Snapshot of the current device state
    pub fn state(&self) -> DeviceState {
        *self.lock_state()
    }

    /// Adjust the electric field level by a delta, returning the clamped
    /// new level
    pub fn adjust_field(&self, delta: f64) -> f64 {
        self.lock_state().adjust_field(delta)
    }

    /// Toggle the receiver fault flag, returning the new value
    pub fn toggle_fault(&self) -> bool {
        self.lock_state().toggle_fault()
    }

    /// Toggle the close alarm flag, returning the new value
    pub fn toggle_close_alarm(&self) -> bool {
        self.lock_state().toggle_close_alarm()
    }

    /// Toggle the severe alarm flag, returning the new value
    pub fn toggle_severe_alarm(&self) -> bool {
        self.lock_state().toggle_severe_alarm()
    }

    /// Queue a strike event sentence for transmission.
    ///
    /// Out-of-range values are sanitized by the sentence builder, not
    /// rejected. A no-op with a warning on the field monitor, which has
    /// no event sentences.
    pub fn enqueue_strike(&self, distance: i32, bearing: f64) {
        if !self.config.variant.emits_events() {
            warn!("{} does not emit event sentences", self.config.variant.name());
            return;
        }

        debug!("Queueing strike: distance={} bearing={}", distance, bearing);
        self.queue.push(Sentence::Strike { distance, bearing }.encode());
    }

    /// Queue a strike event with random distance and bearing, returning
    /// the values used
    pub fn enqueue_random_strike(&self) -> (i32, f64) {
        let mut rng = rand::thread_rng();
        let distance = rng.gen_range(0..=300);
        let bearing = rng.gen_range(0..=359) as f64;

        self.enqueue_strike(distance, bearing);
        (distance, bearing)
    }

    /// Queue a noise event sentence for transmission
    pub fn enqueue_noise(&self) {
        if !self.config.variant.emits_events() {
            warn!("{} does not emit event sentences", self.config.variant.name());
            return;
        }

        debug!("Queueing noise event");
        self.queue.push(Sentence::Noise.encode());
    }

    /// Number of event sentences waiting to be transmitted
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Stop the emulator: signal both loops, wait for them to exit, and
    /// close the transport.
    ///
    /// Each loop observes the signal within one tick. The transport is
    /// closed exactly once here; if a loop already saw it close, the
    /// second close is harmless.
    pub async fn shutdown(self) {
        debug!("Shutting down {} emulator", self.config.variant.name());

        let _ = self.shutdown_tx.send(true);

        if let Some(task) = self.receive_task {
            log_loop_exit("receive", task.await);
        }
        log_loop_exit("transmit", self.transmit_task.await);

        use tokio::io::AsyncWriteExt;
        if let Err(e) = self.writer.lock().await.shutdown().await {
            debug!("Transport already closed: {}", e);
        }

        info!("{} emulator stopped", self.config.variant.name());
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_loop_exit(name: &str, result: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("{} loop ended with transport error: {}", name, e),
        Err(e) => warn!("{} loop panicked: {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_control_surface_mutations() {
        let (stream, _peer) = tokio::io::duplex(1024);
        let emu = Emulator::start(EmulatorConfig::default(), stream);

        assert_eq!(emu.adjust_field(0.5), 0.5);
        assert_eq!(emu.adjust_field(100.0), 20.0);
        assert!(emu.toggle_fault());

        let state = emu.state();
        assert_eq!(state.field_level, 20.0);
        assert!(state.fault);

        emu.shutdown().await;
    }

    #[tokio::test]
    async fn test_events_require_strike_detector() {
        let (stream, _peer) = tokio::io::duplex(1024);
        let emu = Emulator::start(EmulatorConfig::default(), stream);

        emu.enqueue_strike(10, 90.0);
        emu.enqueue_noise();
        assert_eq!(emu.pending_events(), 0);

        emu.shutdown().await;
    }

    #[tokio::test]
    async fn test_random_strike_in_range() {
        let (stream, _peer) = tokio::io::duplex(4096);
        let emu = Emulator::start(
            EmulatorConfig::new(DeviceVariant::StrikeDetector),
            stream,
        );

        for _ in 0..50 {
            let (distance, bearing) = emu.enqueue_random_strike();
            assert!((0..=300).contains(&distance));
            assert!((0.0..=359.9).contains(&bearing));
        }

        emu.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_completes_promptly() {
        let (stream, _peer) = tokio::io::duplex(1024);
        let emu = Emulator::start(
            EmulatorConfig::new(DeviceVariant::StrikeDetector),
            stream,
        );

        tokio::time::timeout(Duration::from_millis(500), emu.shutdown())
            .await
            .expect("shutdown did not complete within a few ticks");
    }
}

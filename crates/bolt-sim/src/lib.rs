//! Boltek Instrument Emulator Engine
//!
//! This crate emulates the wire behavior of two Boltek lightning
//! instruments over any duplex byte stream:
//!
//! - **EFM-100** field monitor: emits a field-level status sentence every
//!   100 ms
//! - **LD-250** strike detector: emits a combined status sentence every
//!   second, drains queued strike/noise events, and answers inbound
//!   squelch commands
//!
//! Both share one engine parameterized by [`DeviceVariant`]: a transmit
//! loop polling at a 10 ms tick, plus (strike detector only) a receive
//! loop scanning the inbound stream. The [`Emulator`] handle exposes the
//! control surface a console or network front-end drives.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() {
//! use bolt_sim::{DeviceVariant, Emulator, EmulatorConfig};
//!
//! // Any AsyncRead + AsyncWrite works as the transport; a serial port,
//! // a TCP socket, or an in-memory pipe for tests
//! let (stream, _peer) = tokio::io::duplex(1024);
//!
//! let emu = Emulator::start(EmulatorConfig::new(DeviceVariant::StrikeDetector), stream);
//!
//! emu.toggle_close_alarm();
//! emu.enqueue_strike(42, 187.5);
//! emu.enqueue_noise();
//!
//! emu.shutdown().await;
//! # }
//! ```

pub mod device;
pub mod emulator;
pub mod queue;
pub mod receive;
pub mod state;
pub mod transmit;

pub use device::{DeviceVariant, EmulatorConfig, TICK};
pub use emulator::Emulator;
pub use queue::OutboundQueue;
pub use receive::run_receive_task;
pub use state::{DeviceState, FIELD_LEVEL_LIMIT};
pub use transmit::run_transmit_task;

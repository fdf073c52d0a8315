//! Boltek Lightning Instrument Protocol Library
//!
//! This crate provides encoding and parsing for the ASCII sentence protocol
//! spoken by two Boltek lightning instruments over a serial line:
//!
//! - **EFM-100**: electric field monitor, emits a field-level status sentence
//! - **LD-250**: strike detector, emits strike/noise events and a periodic
//!   status sentence, and accepts a squelch command on the inbound side
//!
//! # Format
//!
//! Outbound sentences are NMEA-like: a `$`-prefixed talker id, comma-joined
//! fields, a `*`, a two-digit XOR checksum, and a `\r\n` terminator:
//!
//! - `$+EE.EE,F*CS` / `$-EE.EE,F*CS` - field-level status
//! - `$WIMLI,<ddd>,<uuu>,<bbb.b>*CS` - strike event
//! - `$WIMLN*CS` - noise event
//! - `$WIMST,<ccc>,<sss>,<ca>,<sa>,<hhh.h>*CS` - combined status
//!
//! The inbound squelch command is bare ASCII with no framing checksum:
//! `SQ<digits>\r`, acknowledged with a plain-text `:SQUELCH <n> (0-15)` line.
//!
//! # Example
//!
//! ```rust
//! use bolt_protocol::{Sentence, SquelchCodec};
//!
//! // Encode a strike event
//! let wire = Sentence::Strike { distance: 42, bearing: 187.5 }.encode();
//! assert_eq!(wire, b"$WIMLI,42,42,187.5*5F\r\n");
//!
//! // Parse an inbound squelch command from a partial byte stream
//! let mut codec = SquelchCodec::new();
//! codec.push_bytes(b"SQ7\r");
//! let cmd = codec.next_command().unwrap();
//! assert_eq!(cmd.value, 7);
//! ```

pub mod checksum;
pub mod error;
pub mod sentence;
pub mod squelch;

pub use checksum::{checksum, checksum_field};
pub use error::ParseError;
pub use sentence::Sentence;
pub use squelch::{SquelchCodec, SquelchCommand};

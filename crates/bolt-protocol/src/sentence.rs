//! Outbound sentence encoding
//!
//! Builds the exact wire bytes for every sentence the instruments emit.
//! Field key (from the LD-250 manual):
//!
//! - `<bbb.b>` = bearing to strike 0-359.9 degrees
//! - `<ccc>`   = close strike rate 0-999 strikes/minute
//! - `<ca>`    = close alarm status (0 = inactive, 1 = active)
//! - `<cs>`    = checksum
//! - `<ddd>`   = corrected strike distance (0-300 miles)
//! - `<hhh.h>` = current heading from GPS/compass
//! - `<sa>`    = severe alarm status (0 = inactive, 1 = active)
//! - `<sss>`   = total strike rate 0-999 strikes/minute
//! - `<uuu>`   = uncorrected strike distance (0-300 miles)
//!
//! The EFM-100 field-level sentence is `$+EE.EE,F` / `$-EE.EE,F` where the
//! sign prefix carries the field polarity and `F` is the fault flag.
//!
//! Encoding is a pure function of the variant payload: out-of-range strike
//! values are reset to zero rather than rejected, and the emulated unit
//! reports the uncorrected distance equal to the corrected one (matching
//! real captures of the device under emulation).

use crate::checksum::checksum_field;

/// Strike event talker id: `$WIMLI,<ddd>,<uuu>,<bbb.b>*<cs>`
pub const TALKER_STRIKE: &str = "$WIMLI";
/// Noise event talker id: `$WIMLN*<cs>`
pub const TALKER_NOISE: &str = "$WIMLN";
/// Combined status talker id: `$WIMST,<ccc>,<sss>,<ca>,<sa>,<hhh.h>*<cs>`
pub const TALKER_STATUS: &str = "$WIMST";

/// One outbound protocol sentence.
///
/// A sentence is built, checksum-sealed and transmitted as a single
/// immutable unit; [`Sentence::encode`] produces the full frame including
/// the checksum field and the `\r\n` terminator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sentence {
    /// Electric field level status: `$+EE.EE,F*<cs>` or `$-EE.EE,F*<cs>`
    FieldLevel {
        /// Field level in kV/m, nominally within [-20.0, 20.0]
        level: f64,
        /// Receiver fault flag
        fault: bool,
    },
    /// Lightning strike event: `$WIMLI,<ddd>,<uuu>,<bbb.b>*<cs>`
    Strike {
        /// Corrected strike distance in miles; values outside [0, 300]
        /// are reset to 0
        distance: i32,
        /// Bearing to strike in degrees; values outside [0.0, 359.9]
        /// are reset to 0.0
        bearing: f64,
    },
    /// Noise event: `$WIMLN*<cs>`
    Noise,
    /// Periodic combined status: `$WIMST,<ccc>,<sss>,<ca>,<sa>,<hhh.h>*<cs>`
    ///
    /// Strike rates are always reported as 0 and the heading as `000.0`;
    /// the emulation does not model them.
    Status {
        /// Close alarm flag
        close_alarm: bool,
        /// Severe alarm flag
        severe_alarm: bool,
    },
}

impl Sentence {
    /// Encode this sentence to its wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut s = match *self {
            Sentence::FieldLevel { level, fault } => {
                let prefix = if level >= 0.0 { "$+" } else { "$-" };
                format!("{}{:05.2},{}*", prefix, level.abs(), u8::from(fault))
            }
            Sentence::Strike { distance, bearing } => {
                let distance = if !(0..=300).contains(&distance) {
                    0
                } else {
                    distance
                };
                let bearing = if !(0.0..=359.9).contains(&bearing) {
                    0.0
                } else {
                    bearing
                };

                // The unit echoes the corrected distance in the
                // uncorrected field as well
                format!(
                    "{},{},{},{:.1}*",
                    TALKER_STRIKE, distance, distance, bearing
                )
            }
            Sentence::Noise => format!("{}*", TALKER_NOISE),
            Sentence::Status {
                close_alarm,
                severe_alarm,
            } => format!(
                "{},0,0,{},{},000.0*",
                TALKER_STATUS,
                u8::from(close_alarm),
                u8::from(severe_alarm)
            ),
        };

        s.push_str(&checksum_field(s.as_bytes()));
        s.push_str("\r\n");
        s.into_bytes()
    }
}

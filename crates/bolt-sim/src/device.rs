//! Device variant descriptor and emulator configuration
//!
//! The two instruments share one engine shape and differ only in sentence
//! vocabulary, status period, and whether the inbound side is scanned for
//! commands. [`DeviceVariant`] captures those differences so the engine
//! itself stays parameterized rather than duplicated per device.

use std::time::Duration;

use bolt_protocol::Sentence;
use serde::{Deserialize, Serialize};

use crate::state::DeviceState;

/// Polling tick shared by the transmit and receive loops.
///
/// Both loops wake at this granularity, which also bounds how quickly a
/// shutdown request is observed.
pub const TICK: Duration = Duration::from_millis(10);

/// Which instrument the engine emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceVariant {
    /// EFM-100 electric field monitor: field-level status every 100 ms,
    /// no inbound commands, no event sentences
    FieldMonitor,
    /// LD-250 strike detector: combined status every second, strike and
    /// noise events on demand, squelch command on the inbound side
    StrikeDetector,
}

impl DeviceVariant {
    /// Returns the instrument's model name
    pub fn name(&self) -> &'static str {
        match self {
            DeviceVariant::FieldMonitor => "EFM-100",
            DeviceVariant::StrikeDetector => "LD-250",
        }
    }

    /// Interval between periodic status sentences
    pub fn status_period(&self) -> Duration {
        match self {
            DeviceVariant::FieldMonitor => Duration::from_millis(100),
            DeviceVariant::StrikeDetector => Duration::from_secs(1),
        }
    }

    /// Whether the inbound byte stream is scanned for commands
    pub fn accepts_commands(&self) -> bool {
        matches!(self, DeviceVariant::StrikeDetector)
    }

    /// Whether the variant emits queued event sentences
    pub fn emits_events(&self) -> bool {
        matches!(self, DeviceVariant::StrikeDetector)
    }

    /// Build the periodic status sentence from a state snapshot
    pub fn status_sentence(&self, state: &DeviceState) -> Sentence {
        match self {
            DeviceVariant::FieldMonitor => Sentence::FieldLevel {
                level: state.field_level,
                fault: state.fault,
            },
            DeviceVariant::StrikeDetector => Sentence::Status {
                close_alarm: state.close_alarm,
                severe_alarm: state.severe_alarm,
            },
        }
    }
}

/// Configuration for creating an emulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Display name/identifier
    pub id: String,
    /// Instrument to emulate
    pub variant: DeviceVariant,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            id: "EFM-100".to_string(),
            variant: DeviceVariant::FieldMonitor,
        }
    }
}

impl EmulatorConfig {
    /// Create a configuration for the given variant, named after it
    pub fn new(variant: DeviceVariant) -> Self {
        Self {
            id: variant.name().to_string(),
            variant,
        }
    }
}

//! Shared device state
//!
//! One live [`DeviceState`] exists per emulator instance. Control-surface
//! callers mutate it while the transmit loop reads it to build status
//! sentences, so the emulator keeps it behind a single long-lived mutex.

/// Field level clamp boundary in kV/m.
pub const FIELD_LEVEL_LIMIT: f64 = 20.0;

/// Mutable state of an emulated instrument.
///
/// The field level and fault flag drive the EFM-100 status sentence; the
/// alarm flags drive the LD-250 combined status. Unused fields for a given
/// variant simply stay at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceState {
    /// Electric field level in kV/m, clamped to [-20.0, 20.0]
    pub field_level: f64,
    /// Receiver fault flag
    pub fault: bool,
    /// Close (within 15 miles) strike alarm flag
    pub close_alarm: bool,
    /// Severe storm alarm flag
    pub severe_alarm: bool,
}

impl DeviceState {
    /// Create a state with all defaults (level 0.0, flags clear)
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust the field level by a delta and clamp the result.
    ///
    /// Returns the new level. Clamping is idempotent at the boundary:
    /// repeated large deltas leave the level pinned at ±20.0.
    pub fn adjust_field(&mut self, delta: f64) -> f64 {
        self.field_level = (self.field_level + delta).clamp(-FIELD_LEVEL_LIMIT, FIELD_LEVEL_LIMIT);
        self.field_level
    }

    /// Toggle the fault flag, returning the new value
    pub fn toggle_fault(&mut self) -> bool {
        self.fault = !self.fault;
        self.fault
    }

    /// Toggle the close alarm flag, returning the new value
    pub fn toggle_close_alarm(&mut self) -> bool {
        self.close_alarm = !self.close_alarm;
        self.close_alarm
    }

    /// Toggle the severe alarm flag, returning the new value
    pub fn toggle_severe_alarm(&mut self) -> bool {
        self.severe_alarm = !self.severe_alarm;
        self.severe_alarm
    }
}

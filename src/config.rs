//! Sensor configuration parameters
//!
//! Wiring and decode options for one ECH1560 instance.  Assembled at
//! startup by whatever builds the sensor list and passed to
//! [`Ech1560Sensor::configure`](crate::sensors::ech1560::Ech1560Sensor::configure).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

/// What the periodic hook does with a completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecodeMode {
    /// Derive voltage, apparent power and current from the frame.
    #[default]
    Full,
    /// Log the raw payload bytes only; readings stay at their last value.
    RawOnly,
}

/// Per-instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// GPIO wired to the chip's clock line (interrupt source)
    pub clock_pin: u8,
    /// GPIO wired to the chip's serial data output
    pub data_pin: u8,
    /// Power bytes are ones-complemented on the wire
    pub inverted: bool,
    /// Decode behaviour for completed frames
    pub decode_mode: DecodeMode,
    /// Periodic hook interval (milliseconds)
    pub poll_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            clock_pin: pins::ECH1560_CLK_GPIO,
            data_pin: pins::ECH1560_SDO_GPIO,
            inverted: pins::ECH1560_INVERTED,
            decode_mode: DecodeMode::Full,
            poll_interval_ms: 1000,
        }
    }
}

impl SensorConfig {
    /// Reject wiring that can never produce a reading.
    pub fn validate(&self) -> Result<()> {
        if !pins::is_interrupt_capable(self.clock_pin) {
            return Err(Error::Config("clock_pin is not interrupt-capable"));
        }
        if self.clock_pin == self.data_pin {
            return Err(Error::Config("clock_pin and data_pin must differ"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero"));
        }
        Ok(())
    }
}

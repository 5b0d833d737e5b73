//! Log-based reading sink.
//!
//! Writes every slot of a [`Sensor`] to the ESP-IDF logger (UART / USB-CDC
//! in production).  A telemetry uplink would consume the same accessors.

use log::{debug, info};

use crate::sensors::Sensor;

/// Adapter that logs sensor readings to the serial console.
#[derive(Debug, Default)]
pub struct LogSink {
    reports: u32,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed reports.
    pub fn reports(&self) -> u32 {
        self.reports
    }

    /// Log one line per slot and return how many slots were reported.
    /// Sensors that are not ready are skipped.
    pub fn report(&mut self, sensor: &dyn Sensor) -> u8 {
        if !sensor.ready() {
            debug!("READ | {} not ready", sensor.description());
            return 0;
        }
        let mut reported = 0;
        for index in 0..sensor.slot_count() {
            let magnitude = sensor.magnitude(index);
            let value = sensor.value(index);
            info!(
                "READ | {} | {}={:.2}{}",
                sensor.address(index),
                magnitude.topic(),
                value,
                magnitude.unit(),
            );
            reported += 1;
        }
        self.reports = self.reports.wrapping_add(1);
        reported
    }
}

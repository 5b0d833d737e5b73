//! ECH1560 power monitor firmware entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │  EspGpio (GpioPort)        EspEdgeIo (EdgeIo)          │
//! │  ─────────────── Port Trait Boundary ───────────────   │
//! │  InterruptRegistry ─▶ FrameCapture ─▶ Ech1560Sensor    │
//! │                                          │             │
//! │                                      LogSink           │
//! └───────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_svc::hal::delay::FreeRtos;
use log::{info, warn};

use ech1560::adapters::gpio::{EspEdgeIo, EspGpio};
use ech1560::adapters::log_sink::LogSink;
use ech1560::config::SensorConfig;
use ech1560::sensors::Sensor;
use ech1560::sensors::ech1560::Ech1560Sensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("ECH1560 monitor v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SensorConfig::default();
    if let Err(e) = config.validate() {
        warn!("{}: sensor will not report", e);
    }

    // ── 3. Sensor ─────────────────────────────────────────────
    let mut sensor = Ech1560Sensor::new(EspGpio::new(), EspEdgeIo);
    sensor.apply_config(&config);
    sensor.initialize();
    info!("{}", sensor.description());

    let mut sink = LogSink::new();

    // ── 4. Main loop ──────────────────────────────────────────
    loop {
        FreeRtos::delay_ms(config.poll_interval_ms);
        sensor.periodic_hook();
        sink.report(&sensor);
    }
}

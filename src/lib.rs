//! ECH1560 power-monitor firmware library.
//!
//! Exposes the pure-logic modules (interrupt registry, frame capture,
//! frame decoder, sensor facade) for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod ports;
pub mod sensors;

//! Unified error types for the ECH1560 driver.
//!
//! A single `Error` enum that every subsystem converts into.  All variants
//! are `Copy` so they can be passed around the main loop without allocation.
//! None of them are fatal: every failure degrades to a stale or absent
//! reading.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the driver funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An interrupt pin could not be bound or unbound.
    Pin(PinError),
    /// A received frame could not be turned into readings.
    Frame(FrameError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pin(e) => write!(f, "pin: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pin errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinError {
    /// GPIO is not one of the interrupt-capable pins.
    NotInterruptCapable(u8),
}

impl fmt::Display for PinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInterruptCapable(gpio) => write!(f, "GPIO{gpio} is not interrupt-capable"),
        }
    }
}

impl From<PinError> for Error {
    fn from(e: PinError) -> Self {
        Self::Pin(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

/// Reasons a complete frame is discarded instead of published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The validity byte carries the "not the power section yet" sentinel.
    NotPowerSection,
    /// The validity byte is zero: nothing connected, or out of sync.
    Disconnected,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPowerSection => write!(f, "not at power section"),
            Self::Disconnected => write!(f, "nothing connected or out of sync"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

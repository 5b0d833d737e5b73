//! Sensor capability contract consumed by the polling framework.
//!
//! Every sensor exposes a lifecycle ([`Sensor::initialize`],
//! [`Sensor::periodic_hook`]) and a fixed number of independently
//! addressable slots, each with a name, an address, a [`Magnitude`] and a
//! current value.  The framework decides when to poll and where the values
//! go.

pub mod ech1560;

/// Fixed-capacity sensor / slot description.
pub type SensorName = heapless::String<40>;
/// Fixed-capacity slot address (GPIO numbers or bus address).
pub type SlotAddress = heapless::String<8>;

/// Physical quantity a slot reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magnitude {
    None,
    Current,
    Voltage,
    PowerApparent,
}

impl Magnitude {
    /// Short name used as telemetry topic suffix.
    pub const fn topic(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Current => "current",
            Self::Voltage => "voltage",
            Self::PowerApparent => "apparent",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Current => "A",
            Self::Voltage => "V",
            Self::PowerApparent => "VA",
        }
    }
}

/// Lifecycle and per-slot accessors every sensor implements.
pub trait Sensor {
    /// Bring the hardware up.  Must be idempotent: a second call without an
    /// intervening configuration change does nothing.
    fn initialize(&mut self);

    /// Called on every framework tick from the main loop.
    fn periodic_hook(&mut self);

    /// True once [`initialize`](Self::initialize) has completed.
    fn ready(&self) -> bool;

    /// Number of slots; valid indices are `0..slot_count()`.
    fn slot_count(&self) -> u8;

    fn description(&self) -> SensorName;

    /// Human-readable name of slot `index`.
    fn slot_name(&self, index: u8) -> SensorName {
        let _ = index;
        self.description()
    }

    fn address(&self, index: u8) -> SlotAddress;

    /// Quantity reported by slot `index`; [`Magnitude::None`] when out of range.
    fn magnitude(&self, index: u8) -> Magnitude;

    /// Current value of slot `index`; `0.0` when out of range.
    fn value(&self, index: u8) -> f64;
}

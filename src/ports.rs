//! Port traits: the boundary between driver logic and the platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ Ech1560Sensor / InterruptRegistry
//! ```
//!
//! Two ports exist because the platform is touched from two contexts:
//!
//! - [`GpioPort`] is used from the main loop only (pin direction, attaching
//!   and detaching interrupt handlers).
//! - [`EdgeIo`] is used from interrupt context (pin level, microsecond
//!   clock).  Implementations must be lock-free and must not allocate.
//!
//! The concrete ESP32 adapters live in [`crate::adapters::gpio`]; the host
//! tests supply recording mocks.

use embedded_hal::digital::PinState;

// ───────────────────────────────────────────────────────────────
// Edge trigger mode
// ───────────────────────────────────────────────────────────────

/// Which clock transitions raise an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    Rising,
    Falling,
    /// Both edges; the synchronizer needs rising and falling transitions.
    Change,
}

/// Zero-argument interrupt handler, as the platform interrupt API expects.
pub type IsrHandler = fn();

// ───────────────────────────────────────────────────────────────
// Main-loop GPIO port
// ───────────────────────────────────────────────────────────────

/// Pin configuration and interrupt wiring, called from the main loop.
pub trait GpioPort {
    /// Configure `gpio` as a floating digital input.
    fn set_input(&mut self, gpio: u8);

    /// Route edge interrupts on `gpio` to `handler`.
    fn attach_interrupt(&mut self, gpio: u8, handler: IsrHandler, mode: EdgeMode);

    /// Stop delivering interrupts for `gpio`.
    fn detach_interrupt(&mut self, gpio: u8);
}

// ───────────────────────────────────────────────────────────────
// Interrupt-context I/O port
// ───────────────────────────────────────────────────────────────

/// Pin level and timestamp queries made from inside the edge ISR.
///
/// `Sync` because the implementation is reached through a `'static`
/// back-reference stored in the interrupt registry.
pub trait EdgeIo: Sync {
    /// Current level of `gpio`.
    fn level(&self, gpio: u8) -> PinState;

    /// Monotonic microseconds since boot, wrapping at `u32::MAX`.
    fn micros(&self) -> u32;
}

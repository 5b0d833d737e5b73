//! ECH1560 power monitor sensor.
//!
//! The ECH1560 clocks its measurements out on a two-wire synchronous line
//! (CLK, SDO) that no on-chip peripheral understands, so the driver
//! bit-bangs it from the clock pin's edge interrupt.
//!
//! ```text
//!  CLK edge ─▶ REGISTRY ─▶ FrameCapture (ISR)      periodic_hook (main loop)
//!                           sync + assemble ──▶ take_frame ─▶ frame::decode ─▶ Readings
//! ```
//!
//! ## Slots
//!
//! | Index | Magnitude       | Unit |
//! |-------|-----------------|------|
//! | 0     | current         | A    |
//! | 1     | voltage         | V    |
//! | 2     | apparent power  | VA   |
//!
//! Readings start at zero and only change on a valid frame; discarded
//! frames leave the last published values in place.

pub mod capture;
pub mod frame;

use core::fmt::Write;

use log::{debug, info, warn};

use crate::config::{DecodeMode, SensorConfig};
use crate::drivers::interrupts::{InterruptRegistry, REGISTRY};
use crate::error::{Error, FrameError};
use crate::ports::{EdgeIo, GpioPort};
use crate::sensors::{Magnitude, Sensor, SensorName, SlotAddress};

use capture::{Frame, FrameCapture};
use frame::Readings;

const SLOT_COUNT: u8 = 3;

/// One ECH1560 wired to a clock and a data pin.
pub struct Ech1560Sensor<G: GpioPort, IO: EdgeIo + 'static> {
    clock_pin: u8,
    data_pin: u8,
    inverted: bool,
    decode_mode: DecodeMode,

    gpio: G,
    capture: &'static FrameCapture<IO>,
    registry: &'static InterruptRegistry,
    /// Clock pin this instance currently holds in the registry.
    bound_clock: Option<u8>,

    dirty: bool,
    ready: bool,
    readings: Readings,
    last_fault: Option<Error>,
}

impl<G: GpioPort, IO: EdgeIo + 'static> Ech1560Sensor<G, IO> {
    /// New instance on the process-wide interrupt registry, with the default
    /// board wiring.  Nothing touches the hardware until
    /// [`initialize`](Sensor::initialize).
    ///
    /// Startup only: the capture state is leaked to obtain the `'static`
    /// back-reference the registry holds, and is never reclaimed.  Callers
    /// that manage that storage themselves use
    /// [`with_registry`](Self::with_registry).
    pub fn new(gpio: G, io: IO) -> Self {
        Self::with_registry(gpio, FrameCapture::leak(io), &REGISTRY)
    }

    /// New instance on an explicit capture and registry.
    pub fn with_registry(
        gpio: G,
        capture: &'static FrameCapture<IO>,
        registry: &'static InterruptRegistry,
    ) -> Self {
        let defaults = SensorConfig::default();
        Self {
            clock_pin: defaults.clock_pin,
            data_pin: defaults.data_pin,
            inverted: defaults.inverted,
            decode_mode: defaults.decode_mode,
            gpio,
            capture,
            registry,
            bound_clock: None,
            dirty: true,
            ready: false,
            readings: Readings::default(),
            last_fault: None,
        }
    }

    // ── Configuration ─────────────────────────────────────────

    /// Set wiring and polarity.  Marks the instance dirty if a pin changed.
    pub fn configure(&mut self, clock_pin: u8, data_pin: u8, inverted: bool) {
        self.set_clock_pin(clock_pin);
        self.set_data_pin(data_pin);
        self.set_inverted(inverted);
    }

    /// Apply a full [`SensorConfig`].
    pub fn apply_config(&mut self, config: &SensorConfig) {
        self.configure(config.clock_pin, config.data_pin, config.inverted);
        self.decode_mode = config.decode_mode;
    }

    pub fn set_clock_pin(&mut self, gpio: u8) {
        if self.clock_pin == gpio {
            return;
        }
        self.clock_pin = gpio;
        self.dirty = true;
    }

    pub fn set_data_pin(&mut self, gpio: u8) {
        if self.data_pin == gpio {
            return;
        }
        self.data_pin = gpio;
        self.dirty = true;
    }

    /// Polarity only affects decoding, so it never requires re-initialisation.
    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn set_decode_mode(&mut self, mode: DecodeMode) {
        self.decode_mode = mode;
    }

    pub fn clock_pin(&self) -> u8 {
        self.clock_pin
    }

    pub fn data_pin(&self) -> u8 {
        self.data_pin
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn decode_mode(&self) -> DecodeMode {
        self.decode_mode
    }

    /// True if the wiring changed since the last [`initialize`](Sensor::initialize).
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    // ── Readings / diagnostics ────────────────────────────────

    pub fn readings(&self) -> Readings {
        self.readings
    }

    /// Most recent binding or frame fault, if any.
    pub fn last_fault(&self) -> Option<Error> {
        self.last_fault
    }

    pub fn capture(&self) -> &'static FrameCapture<IO> {
        self.capture
    }

    /// Drop synchronization; the next start marker re-acquires it.
    pub fn resync(&self) {
        self.capture.resync();
    }

    // ── Internal ──────────────────────────────────────────────

    fn release_interrupt(&mut self) {
        if let Some(gpio) = self.bound_clock.take() {
            self.registry.release(gpio, self.capture, &mut self.gpio);
        }
    }

    fn process(&mut self, frame: &Frame) {
        debug!("ECH1560 frame: {:02X?}", frame::payload(frame));

        if self.decode_mode == DecodeMode::RawOnly {
            return;
        }

        match frame::decode(frame, self.inverted) {
            Ok(decoded) => {
                self.readings.apply(&decoded);
                debug!(
                    "ECH1560 U={:.2}V S={:.2}VA I={:.3}A",
                    self.readings.voltage, self.readings.apparent, self.readings.current
                );
            }
            Err(FrameError::NotPowerSection) => {
                debug!("ECH1560 frame skipped: {}", FrameError::NotPowerSection);
            }
            Err(e @ FrameError::Disconnected) => {
                let fault = Error::from(e);
                warn!("ECH1560 {}, resyncing", fault);
                self.last_fault = Some(fault);
                self.capture.resync();
            }
        }
    }
}

impl<G: GpioPort, IO: EdgeIo + 'static> Sensor for Ech1560Sensor<G, IO> {
    fn initialize(&mut self) {
        if !self.dirty {
            return;
        }

        self.gpio.set_input(self.clock_pin);
        self.gpio.set_input(self.data_pin);
        self.capture.set_pins(self.clock_pin, self.data_pin);
        self.capture.invalidate();

        // Another instance may have taken the pin since the last bind.
        if !self.registry.is_bound_to(self.clock_pin, self.capture) {
            self.release_interrupt();
            match self.registry.bind(self.clock_pin, self.capture, &mut self.gpio) {
                Ok(()) => self.bound_clock = Some(self.clock_pin),
                Err(e) => {
                    let fault = Error::from(e);
                    warn!("ECH1560 interrupt not attached: {}", fault);
                    self.last_fault = Some(fault);
                }
            }
        }

        self.dirty = false;
        self.ready = true;
        info!("{} initialised", self.description());
    }

    fn periodic_hook(&mut self) {
        let stats = self.capture.stats();
        let pulse_width_max = self.capture.take_pulse_width_max();
        debug!(
            "ECH1560 pulse_start={}us pulse_width_max={}us frames={} dropped={}",
            stats.pulse_start_us, pulse_width_max, stats.frames_completed, stats.frames_dropped
        );

        if let Some(frame) = self.capture.take_frame() {
            self.process(&frame);
        }
    }

    fn ready(&self) -> bool {
        self.ready
    }

    fn slot_count(&self) -> u8 {
        SLOT_COUNT
    }

    fn description(&self) -> SensorName {
        let mut s = SensorName::new();
        let _ = write!(s, "ECH1560 (CLK,SDO) @ GPIO({},{})", self.clock_pin, self.data_pin);
        s
    }

    fn address(&self, _index: u8) -> SlotAddress {
        let mut s = SlotAddress::new();
        let _ = write!(s, "{}:{}", self.clock_pin, self.data_pin);
        s
    }

    fn magnitude(&self, index: u8) -> Magnitude {
        match index {
            0 => Magnitude::Current,
            1 => Magnitude::Voltage,
            2 => Magnitude::PowerApparent,
            _ => Magnitude::None,
        }
    }

    fn value(&self, index: u8) -> f64 {
        match index {
            0 => self.readings.current,
            1 => self.readings.voltage,
            2 => self.readings.apparent,
            _ => 0.0,
        }
    }
}

impl<G: GpioPort, IO: EdgeIo + 'static> Drop for Ech1560Sensor<G, IO> {
    fn drop(&mut self) {
        self.release_interrupt();
    }
}

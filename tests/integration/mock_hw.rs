//! Mock hardware for integration tests.
//!
//! `MockGpio` records every GPIO call into a shared log so tests can assert
//! on the full history after the sensor has taken ownership of the port.
//! `SimLines` stands in for the pin/timer reads the ISR performs, and
//! `ChipSim` plays the ECH1560 side of the wire through a registry.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use ech1560::drivers::interrupts::InterruptRegistry;
use ech1560::ports::{EdgeIo, EdgeMode, GpioPort, IsrHandler};
use ech1560::sensors::ech1560::capture::Frame;
use embedded_hal::digital::PinState;

// ── GPIO call record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    SetInput(u8),
    Attach(u8, EdgeMode),
    Detach(u8),
}

// ── MockGpio ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockGpio {
    calls: Arc<Mutex<Vec<GpioCall>>>,
}

#[allow(dead_code)]
impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GpioCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attaches(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GpioCall::Attach(gpio, _) => Some(gpio),
                _ => None,
            })
            .collect()
    }

    pub fn detaches(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GpioCall::Detach(gpio) => Some(gpio),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl GpioPort for MockGpio {
    fn set_input(&mut self, gpio: u8) {
        self.calls.lock().unwrap().push(GpioCall::SetInput(gpio));
    }

    fn attach_interrupt(&mut self, gpio: u8, _handler: IsrHandler, mode: EdgeMode) {
        self.calls.lock().unwrap().push(GpioCall::Attach(gpio, mode));
    }

    fn detach_interrupt(&mut self, gpio: u8) {
        self.calls.lock().unwrap().push(GpioCall::Detach(gpio));
    }
}

// ── SimLines ──────────────────────────────────────────────────

const SIM_PINS: usize = 16;

/// Pin levels and a microsecond clock, readable from "interrupt context".
pub struct SimLines {
    levels: [AtomicBool; SIM_PINS],
    micros: AtomicU32,
}

impl SimLines {
    pub fn new() -> Self {
        Self {
            levels: [const { AtomicBool::new(false) }; SIM_PINS],
            micros: AtomicU32::new(0),
        }
    }

    pub fn set(&self, gpio: u8, high: bool) {
        self.levels[gpio as usize].store(high, Ordering::Relaxed);
    }

    pub fn set_micros(&self, us: u32) {
        self.micros.store(us, Ordering::Relaxed);
    }
}

impl EdgeIo for SimLines {
    fn level(&self, gpio: u8) -> PinState {
        PinState::from(self.levels[gpio as usize % SIM_PINS].load(Ordering::Relaxed))
    }

    fn micros(&self) -> u32 {
        self.micros.load(Ordering::Relaxed)
    }
}

// ── ChipSim ───────────────────────────────────────────────────

/// Drives clock edges through `registry.dispatch`, as the trampolines would.
pub struct ChipSim<'a> {
    registry: &'a InterruptRegistry,
    lines: &'a SimLines,
    clock: u8,
    data: u8,
    now: u32,
}

#[allow(dead_code)]
impl<'a> ChipSim<'a> {
    pub fn new(registry: &'a InterruptRegistry, lines: &'a SimLines, clock: u8, data: u8) -> Self {
        Self {
            registry,
            lines,
            clock,
            data,
            now: 50_000,
        }
    }

    fn edge(&mut self, clock_high: bool, advance_us: u32) {
        self.now = self.now.wrapping_add(advance_us);
        self.lines.set_micros(self.now);
        self.lines.set(self.clock, clock_high);
        self.registry.dispatch(self.clock);
    }

    /// Clock held high for `width_us`, then released.
    pub fn pulse(&mut self, width_us: u32) {
        self.edge(true, 100);
        self.edge(false, width_us);
    }

    pub fn bit(&mut self, high: bool) {
        self.lines.set(self.data, high);
        self.edge(true, 25);
        self.edge(false, 25);
    }

    pub fn byte(&mut self, value: u8) {
        for i in 0..8 {
            self.bit(value & (1 << i) != 0);
        }
    }

    /// Start marker followed by all 128 bits.
    pub fn frame(&mut self, frame: &Frame) {
        self.pulse(1500);
        for &b in frame {
            self.byte(b);
        }
    }
}

/// Frame with the given voltage pair and power triple; other bytes filler.
pub fn power_frame(voltage: [u8; 2], power: [u8; 3]) -> Frame {
    let mut f = [0x5A; 16];
    f[5..7].copy_from_slice(&voltage);
    f[7..10].copy_from_slice(&power);
    f
}

/// A fresh registry per test; the process-wide one backs the trampolines.
pub fn local_registry() -> &'static InterruptRegistry {
    Box::leak(Box::new(InterruptRegistry::new()))
}

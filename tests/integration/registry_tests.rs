//! Interrupt registry behaviour against a recording GPIO port.

use std::sync::atomic::{AtomicU32, Ordering};

use ech1560::drivers::interrupts::{EdgeHandler, REGISTRY, TRAMPOLINES};
use ech1560::error::PinError;
use ech1560::pins::{INTERRUPT_PINS, interrupt_slot};
use ech1560::ports::EdgeMode;

use crate::mock_hw::{GpioCall, MockGpio, local_registry};

struct Tally {
    edges: AtomicU32,
    last_gpio: AtomicU32,
}

impl Tally {
    fn leak() -> &'static Self {
        Box::leak(Box::new(Self {
            edges: AtomicU32::new(0),
            last_gpio: AtomicU32::new(u32::MAX),
        }))
    }

    fn edges(&self) -> u32 {
        self.edges.load(Ordering::Relaxed)
    }
}

impl EdgeHandler for Tally {
    fn handle_edge(&self, gpio: u8) {
        self.edges.fetch_add(1, Ordering::Relaxed);
        self.last_gpio.store(u32::from(gpio), Ordering::Relaxed);
    }
}

#[test]
fn every_interrupt_pin_can_be_bound_at_once() {
    let registry = local_registry();
    let mut gpio = MockGpio::new();
    let tally = Tally::leak();

    for &pin in &INTERRUPT_PINS {
        registry.bind(pin, tally, &mut gpio).unwrap();
    }
    assert_eq!(registry.bound_count(), INTERRUPT_PINS.len());
    assert!(gpio.calls().iter().all(|c| matches!(c, GpioCall::Attach(_, EdgeMode::Change))));

    for &pin in &INTERRUPT_PINS {
        registry.dispatch(pin);
        assert_eq!(tally.last_gpio.load(Ordering::Relaxed), u32::from(pin));
    }
    assert_eq!(tally.edges(), INTERRUPT_PINS.len() as u32);
}

#[test]
fn invalid_pins_leave_registry_untouched() {
    let registry = local_registry();
    let mut gpio = MockGpio::new();
    let tally = Tally::leak();

    for pin in [6, 7, 11, 16, 39, 255] {
        assert_eq!(
            registry.bind(pin, tally, &mut gpio),
            Err(PinError::NotInterruptCapable(pin))
        );
        assert_eq!(registry.unbind(pin, &mut gpio), Err(PinError::NotInterruptCapable(pin)));
        registry.dispatch(pin);
    }
    assert_eq!(registry.bound_count(), 0);
    assert_eq!(tally.edges(), 0);
    assert!(gpio.calls().is_empty());
}

#[test]
fn rebinding_replaces_previous_owner() {
    let registry = local_registry();
    let mut gpio = MockGpio::new();
    let first = Tally::leak();
    let second = Tally::leak();

    registry.bind(13, first, &mut gpio).unwrap();
    registry.bind(13, second, &mut gpio).unwrap();
    assert_eq!(gpio.detaches(), vec![13]);
    assert_eq!(gpio.attaches(), vec![13, 13]);

    registry.dispatch(13);
    assert_eq!(first.edges(), 0);
    assert_eq!(second.edges(), 1);
    assert!(registry.is_bound_to(13, second));
    assert!(!registry.is_bound_to(13, first));
}

#[test]
fn release_by_stale_owner_keeps_new_binding() {
    let registry = local_registry();
    let mut gpio = MockGpio::new();
    let stale = Tally::leak();
    let current = Tally::leak();

    registry.bind(2, stale, &mut gpio).unwrap();
    registry.bind(2, current, &mut gpio).unwrap();
    gpio.clear();

    registry.release(2, stale, &mut gpio);
    assert!(registry.is_bound_to(2, current));
    assert!(gpio.calls().is_empty());

    registry.release(2, current, &mut gpio);
    assert!(!registry.is_bound(2));
    assert_eq!(gpio.detaches(), vec![2]);
}

#[test]
fn unbinding_free_pin_does_not_touch_hardware() {
    let registry = local_registry();
    let mut gpio = MockGpio::new();
    assert_eq!(registry.unbind(12, &mut gpio), Ok(()));
    assert!(gpio.calls().is_empty());
}

#[test]
fn trampoline_reaches_global_registry_with_its_pin() {
    let mut gpio = MockGpio::new();
    let tally = Tally::leak();

    REGISTRY.bind(14, tally, &mut gpio).unwrap();
    let slot = interrupt_slot(14).unwrap();
    TRAMPOLINES[slot]();
    assert_eq!(tally.edges(), 1);
    assert_eq!(tally.last_gpio.load(Ordering::Relaxed), 14);

    REGISTRY.release(14, tally, &mut gpio);
    TRAMPOLINES[slot]();
    assert_eq!(tally.edges(), 1);
}

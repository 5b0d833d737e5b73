//! GPIO pin assignments and interrupt-capable pin table.
//!
//! Single source of truth: the interrupt registry, the configuration
//! validator and the board defaults all reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// ECH1560 default wiring
// ---------------------------------------------------------------------------

/// Clock line from the ECH1560 (CLK).  Must be interrupt-capable.
pub const ECH1560_CLK_GPIO: u8 = 4;
/// Serial data output from the ECH1560 (SDO / MISO).
pub const ECH1560_SDO_GPIO: u8 = 5;
/// Power bytes arrive ones-complemented on some boards.
pub const ECH1560_INVERTED: bool = false;

// ---------------------------------------------------------------------------
// Interrupt-capable pins
// ---------------------------------------------------------------------------

/// Number of GPIOs that support edge-triggered interrupt callbacks.
pub const INTERRUPT_PIN_COUNT: usize = 10;

/// Every interrupt-capable GPIO, in registry slot order.
pub const INTERRUPT_PINS: [u8; INTERRUPT_PIN_COUNT] = [0, 1, 2, 3, 4, 5, 12, 13, 14, 15];

/// Registry slot for an interrupt-capable GPIO.
///
/// GPIO 0–5 map to slots 0–5, GPIO 12–15 map to slots 6–9.  GPIO 6–11 are
/// wired to the SPI flash and never valid.
pub const fn interrupt_slot(gpio: u8) -> Option<usize> {
    match gpio {
        0..=5 => Some(gpio as usize),
        12..=15 => Some(gpio as usize - 6),
        _ => None,
    }
}

/// True if `gpio` supports edge-triggered interrupts.
pub const fn is_interrupt_capable(gpio: u8) -> bool {
    interrupt_slot(gpio).is_some()
}

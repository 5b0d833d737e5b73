//! GPIO interrupt registry with per-pin trampolines.
//!
//! The platform interrupt API only accepts zero-argument handlers, so every
//! interrupt-capable pin gets its own statically generated trampoline that
//! forwards to one shared dispatcher with the pin number baked in.  The
//! dispatcher looks the pin up in a fixed table of back-references and
//! forwards the edge to whichever [`EdgeHandler`] is bound there.
//!
//! ```text
//!   GPIO14 edge ──▶ TRAMPOLINES[8] ──▶ REGISTRY.dispatch(14) ──▶ handler.handle_edge(14)
//! ```
//!
//! ## Invariants
//!
//! - At most one handler per pin.  Binding a pin that is already bound
//!   detaches the previous owner first.
//! - The table never allocates: one slot per entry in
//!   [`INTERRUPT_PINS`](crate::pins::INTERRUPT_PINS).
//! - Handlers are `&'static` back-references, never owned by the registry.

use core::cell::Cell;

use critical_section::Mutex;
use log::{debug, info};

use crate::error::PinError;
use crate::pins::{INTERRUPT_PIN_COUNT, interrupt_slot};
use crate::ports::{EdgeMode, GpioPort, IsrHandler};

/// Receiver of clock-line edges.  Called from interrupt context.
pub trait EdgeHandler: Sync {
    /// One edge was observed on `gpio`.  Must not block or allocate.
    fn handle_edge(&self, gpio: u8);
}

type Binding = Option<&'static dyn EdgeHandler>;

/// Process-wide registry that the trampolines dispatch into.
pub static REGISTRY: InterruptRegistry = InterruptRegistry::new();

// ── Trampolines ───────────────────────────────────────────────

macro_rules! trampolines {
    ($($gpio:literal),* $(,)?) => {
        [$({
            fn trampoline() {
                REGISTRY.dispatch($gpio);
            }
            trampoline as IsrHandler
        }),*]
    };
}

/// Zero-argument ISR entry points, indexed by registry slot.
pub static TRAMPOLINES: [IsrHandler; INTERRUPT_PIN_COUNT] =
    trampolines!(0, 1, 2, 3, 4, 5, 12, 13, 14, 15);

// ── Registry ──────────────────────────────────────────────────

/// Fixed table binding interrupt-capable pins to edge handlers.
pub struct InterruptRegistry {
    slots: [Mutex<Cell<Binding>>; INTERRUPT_PIN_COUNT],
}

impl Default for InterruptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptRegistry {
    pub const fn new() -> Self {
        Self {
            slots: [const { Mutex::new(Cell::new(None)) }; INTERRUPT_PIN_COUNT],
        }
    }

    /// Bind `handler` to `gpio` and attach the pin's trampoline on both edges.
    ///
    /// A previous binding on the same pin is detached first.  Fails without
    /// touching the table or the hardware if the pin is not interrupt-capable.
    pub fn bind(
        &self,
        gpio: u8,
        handler: &'static dyn EdgeHandler,
        port: &mut impl GpioPort,
    ) -> Result<(), PinError> {
        let slot = interrupt_slot(gpio).ok_or(PinError::NotInterruptCapable(gpio))?;

        self.unbind(gpio, port)?;
        critical_section::with(|cs| self.slots[slot].borrow(cs).set(Some(handler)));
        port.attach_interrupt(gpio, TRAMPOLINES[slot], EdgeMode::Change);

        info!("GPIO{} interrupt attached", gpio);
        Ok(())
    }

    /// Remove whatever is bound to `gpio` and detach the hardware interrupt.
    ///
    /// Returns `Ok(())` even if nothing was bound.
    pub fn unbind(&self, gpio: u8, port: &mut impl GpioPort) -> Result<(), PinError> {
        let slot = interrupt_slot(gpio).ok_or(PinError::NotInterruptCapable(gpio))?;

        let previous = critical_section::with(|cs| self.slots[slot].borrow(cs).take());
        if previous.is_some() {
            port.detach_interrupt(gpio);
            info!("GPIO{} interrupt detached", gpio);
        }
        Ok(())
    }

    /// Unbind `gpio` only if `owner` is the handler currently bound to it.
    ///
    /// Used on teardown so that an instance never detaches a pin that has
    /// since been re-bound to someone else.
    pub fn release(&self, gpio: u8, owner: &'static dyn EdgeHandler, port: &mut impl GpioPort) {
        if self.is_bound_to(gpio, owner) {
            // Pin validity was established by is_bound_to.
            let _ = self.unbind(gpio, port);
        } else {
            debug!("GPIO{} not owned, leaving binding in place", gpio);
        }
    }

    /// Forward an edge on `gpio` to its bound handler.  Interrupt context.
    pub fn dispatch(&self, gpio: u8) {
        let Some(slot) = interrupt_slot(gpio) else {
            return;
        };
        let handler = critical_section::with(|cs| self.slots[slot].borrow(cs).get());
        if let Some(handler) = handler {
            handler.handle_edge(gpio);
        }
    }

    /// True if any handler is bound to `gpio`.
    pub fn is_bound(&self, gpio: u8) -> bool {
        self.binding(gpio).is_some()
    }

    /// True if `owner` is the handler bound to `gpio`.
    pub fn is_bound_to(&self, gpio: u8, owner: &'static dyn EdgeHandler) -> bool {
        self.binding(gpio)
            .is_some_and(|bound| core::ptr::addr_eq(bound, owner))
    }

    /// Number of pins currently bound.
    pub fn bound_count(&self) -> usize {
        critical_section::with(|cs| {
            self.slots
                .iter()
                .filter(|slot| slot.borrow(cs).get().is_some())
                .count()
        })
    }

    fn binding(&self, gpio: u8) -> Binding {
        let slot = interrupt_slot(gpio)?;
        critical_section::with(|cs| self.slots[slot].borrow(cs).get())
    }
}

//! Interrupt plumbing shared by the interrupt-driven sensors.

pub mod interrupts;

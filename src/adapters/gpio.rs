//! ESP32 GPIO adapters for the port traits.
//!
//! - [`EspGpio`] implements [`GpioPort`]: pin direction and per-pin ISR
//!   registration through the ESP-IDF GPIO ISR service.
//! - [`EspEdgeIo`] implements [`EdgeIo`]: register-level pin reads and the
//!   high-resolution timer, both safe in interrupt context.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw `esp_idf_svc::sys` calls.
//! On host/test: pin levels and the microsecond clock come from static
//! atomics (`sim_set_level`, `sim_set_micros`) and GPIO configuration is
//! logged only.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::digital::PinState;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::ports::{EdgeIo, EdgeMode, GpioPort, IsrHandler};

// ── Error type ────────────────────────────────────────────────

/// Errors from ESP-IDF GPIO calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    ConfigFailed(i32),
    IsrInstallFailed(i32),
    HandlerAddFailed(i32),
}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::HandlerAddFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

// ── Main-loop GPIO ────────────────────────────────────────────

/// ESP-IDF GPIO driver.  Stateless; all state lives in the GPIO matrix.
#[derive(Debug, Default)]
pub struct EspGpio;

impl EspGpio {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl EspGpio {
    fn try_set_input(gpio: u8) -> Result<(), GpioError> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << gpio,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: gpio_config only touches the pin in `pin_bit_mask`;
        // called from the main task.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(GpioError::ConfigFailed(ret));
        }
        Ok(())
    }

    fn try_attach(gpio: u8, handler: IsrHandler, mode: EdgeMode) -> Result<(), GpioError> {
        let intr_type = match mode {
            EdgeMode::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
            EdgeMode::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
            EdgeMode::Change => gpio_int_type_t_GPIO_INTR_ANYEDGE,
        };
        // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
        // means it was already installed.  The handler argument is a plain
        // `fn()` pointer that lives for the whole program.
        unsafe {
            let ret = gpio_install_isr_service(0);
            if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
                return Err(GpioError::IsrInstallFailed(ret));
            }
            gpio_set_intr_type(gpio as i32, intr_type);
            let ret = gpio_isr_handler_add(
                gpio as i32,
                Some(call_isr_handler),
                handler as *mut core::ffi::c_void,
            );
            if ret != ESP_OK as i32 {
                return Err(GpioError::HandlerAddFailed(ret));
            }
            gpio_intr_enable(gpio as i32);
        }
        Ok(())
    }
}

/// ESP-IDF passes one opaque argument; it carries the zero-argument handler.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn call_isr_handler(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` was produced from an `IsrHandler` in `try_attach`.
    let handler = unsafe { core::mem::transmute::<*mut core::ffi::c_void, IsrHandler>(arg) };
    handler();
}

#[cfg(target_os = "espidf")]
impl GpioPort for EspGpio {
    fn set_input(&mut self, gpio: u8) {
        if let Err(e) = Self::try_set_input(gpio) {
            log::error!("GPIO{}: {}", gpio, e);
        }
    }

    fn attach_interrupt(&mut self, gpio: u8, handler: IsrHandler, mode: EdgeMode) {
        if let Err(e) = Self::try_attach(gpio, handler, mode) {
            log::error!("GPIO{}: {}", gpio, e);
        }
    }

    fn detach_interrupt(&mut self, gpio: u8) {
        // SAFETY: removing a handler that may not exist is reported via the
        // return code only.
        unsafe {
            gpio_intr_disable(gpio as i32);
            gpio_isr_handler_remove(gpio as i32);
            gpio_set_intr_type(gpio as i32, gpio_int_type_t_GPIO_INTR_DISABLE);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl GpioPort for EspGpio {
    fn set_input(&mut self, gpio: u8) {
        log::debug!("gpio(sim): GPIO{} -> input", gpio);
    }

    fn attach_interrupt(&mut self, gpio: u8, _handler: IsrHandler, mode: EdgeMode) {
        log::debug!("gpio(sim): GPIO{} interrupt on {:?}", gpio, mode);
    }

    fn detach_interrupt(&mut self, gpio: u8) {
        log::debug!("gpio(sim): GPIO{} interrupt off", gpio);
    }
}

// ── Interrupt-context I/O ─────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
const SIM_PIN_COUNT: usize = 16;

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: [AtomicBool; SIM_PIN_COUNT] = [const { AtomicBool::new(false) }; SIM_PIN_COUNT];
#[cfg(not(target_os = "espidf"))]
static SIM_MICROS: AtomicU32 = AtomicU32::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(gpio: u8, high: bool) {
    if let Some(level) = SIM_LEVELS.get(gpio as usize) {
        level.store(high, Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_micros(us: u32) {
    SIM_MICROS.store(us, Ordering::Relaxed);
}

/// Pin level and timer reads for the edge ISR.
#[derive(Debug, Default, Clone, Copy)]
pub struct EspEdgeIo;

#[cfg(target_os = "espidf")]
impl EdgeIo for EspEdgeIo {
    fn level(&self, gpio: u8) -> PinState {
        // SAFETY: gpio_get_level is a register read; safe in ISR context.
        PinState::from(unsafe { gpio_get_level(gpio as i32) } != 0)
    }

    fn micros(&self) -> u32 {
        // SAFETY: esp_timer_get_time is ISR-safe.
        (unsafe { esp_timer_get_time() }) as u32
    }
}

#[cfg(not(target_os = "espidf"))]
impl EdgeIo for EspEdgeIo {
    fn level(&self, gpio: u8) -> PinState {
        let high = SIM_LEVELS
            .get(gpio as usize)
            .is_some_and(|level| level.load(Ordering::Relaxed));
        PinState::from(high)
    }

    fn micros(&self) -> u32 {
        SIM_MICROS.load(Ordering::Relaxed)
    }
}

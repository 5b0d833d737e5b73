//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements | Connects to                 |
//! |------------|------------|-----------------------------|
//! | `gpio`     | GpioPort   | ESP32 GPIO matrix, ISR svc  |
//! |            | EdgeIo     | GPIO level reads, esp_timer |
//! | `log_sink` | (consumer) | Serial log output           |

pub mod gpio;
pub mod log_sink;

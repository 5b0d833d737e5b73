//! Frame decoder: raw ECH1560 frame bytes to physical units.
//!
//! | Bytes | Meaning                                                    |
//! |-------|------------------------------------------------------------|
//! | 0–4   | preamble, ignored                                          |
//! | 5, 6  | voltage pair `(v1, v2)`; `v2` doubles as validity marker   |
//! | 7–9   | apparent power `(p1, p2, p3)`, ones-complement if inverted |
//! | 10–15 | unused                                                     |
//!
//! - voltage  = 2 × (v1 + v2 / 255)
//! - apparent = (p1 × 255 + p2 + p3 / 255) / 2
//! - current  = apparent / voltage

use crate::error::FrameError;

use super::capture::Frame;

/// Validity marker: frame is not at the power-reporting portion yet.
pub const MARKER_NOT_POWER: u8 = 3;
/// Validity marker: nothing connected, or the stream is out of sync.
pub const MARKER_DISCONNECTED: u8 = 0;

const PREAMBLE_LEN: usize = 5;
const VOLTAGE_AT: usize = PREAMBLE_LEN;
const POWER_AT: usize = VOLTAGE_AT + 2;

/// Values derived from one valid frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub voltage: f64,
    pub apparent: f64,
    /// `None` when voltage is zero.
    pub current: Option<f64>,
}

/// Last published readings.  All zero until the first successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readings {
    pub current: f64,
    pub voltage: f64,
    pub apparent: f64,
}

impl Readings {
    /// Publish a decoded frame.  A missing or non-finite value leaves the
    /// previous one in place.
    pub fn apply(&mut self, decoded: &Decoded) {
        if decoded.voltage.is_finite() {
            self.voltage = decoded.voltage;
        }
        if decoded.apparent.is_finite() {
            self.apparent = decoded.apparent;
        }
        if let Some(current) = decoded.current.filter(|c| c.is_finite()) {
            self.current = current;
        }
    }
}

/// Everything after the preamble, for raw logging.
pub fn payload(frame: &Frame) -> &[u8] {
    &frame[PREAMBLE_LEN..]
}

/// Decode a complete frame.
///
/// `inverted` selects ones-complement power bytes.
pub fn decode(frame: &Frame, inverted: bool) -> Result<Decoded, FrameError> {
    let v1 = frame[VOLTAGE_AT];
    let v2 = frame[VOLTAGE_AT + 1];

    match v2 {
        MARKER_NOT_POWER => return Err(FrameError::NotPowerSection),
        MARKER_DISCONNECTED => return Err(FrameError::Disconnected),
        _ => {}
    }

    let voltage = 2.0 * (f64::from(v1) + f64::from(v2) / 255.0);

    let [mut p1, mut p2, mut p3] = [frame[POWER_AT], frame[POWER_AT + 1], frame[POWER_AT + 2]];
    if inverted {
        p1 = !p1;
        p2 = !p2;
        p3 = !p3;
    }
    let apparent = (f64::from(p1) * 255.0 + f64::from(p2) + f64::from(p3) / 255.0) / 2.0;

    let current = if voltage > 0.0 {
        Some(apparent / voltage)
    } else {
        None
    };

    Ok(Decoded {
        voltage,
        apparent,
        current,
    })
}

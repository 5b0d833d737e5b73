//! Fuzz target: `frame::decode`
//!
//! Decodes arbitrary 16-byte frames in both polarities and asserts that a
//! successful decode is always finite and that publishing it never
//! corrupts the readings.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use ech1560::sensors::ech1560::capture::{FRAME_LEN, Frame};
use ech1560::sensors::ech1560::frame::{Readings, decode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&flags, rest)) = data.split_first() else {
        return;
    };
    let mut frame: Frame = [0; FRAME_LEN];
    let n = rest.len().min(FRAME_LEN);
    frame[..n].copy_from_slice(&rest[..n]);

    let mut readings = Readings::default();
    if let Ok(decoded) = decode(&frame, flags & 1 != 0) {
        assert!(decoded.voltage.is_finite());
        assert!(decoded.apparent.is_finite());
        readings.apply(&decoded);
    }
    assert!(readings.current.is_finite());
});

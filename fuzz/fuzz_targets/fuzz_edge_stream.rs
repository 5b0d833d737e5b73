//! Fuzz target: `FrameCapture::on_edge`
//!
//! Each 3-byte chunk is one clock transition: levels in the first byte,
//! a 16-bit time delta in the next two.  The capture must never index out
//! of its frame buffer, and any frame it hands over must be taken once.
//!
//! cargo fuzz run fuzz_edge_stream

#![no_main]

use ech1560::ports::EdgeIo;
use ech1560::sensors::ech1560::capture::{FRAME_LEN, FrameCapture};
use embedded_hal::digital::PinState;
use libfuzzer_sys::fuzz_target;

struct NoIo;

impl EdgeIo for NoIo {
    fn level(&self, _gpio: u8) -> PinState {
        PinState::Low
    }

    fn micros(&self) -> u32 {
        0
    }
}

fuzz_target!(|data: &[u8]| {
    let cap = FrameCapture::new(NoIo);
    let mut now = 0u32;

    for chunk in data.chunks_exact(3) {
        let clock = PinState::from(chunk[0] & 1 != 0);
        let sdo = PinState::from(chunk[0] & 2 != 0);
        now = now.wrapping_add(u32::from(u16::from_le_bytes([chunk[1], chunk[2]])));
        cap.on_edge(clock, sdo, now);

        let (byte, bit) = cap.cursors();
        assert!(usize::from(byte) <= FRAME_LEN);
        assert!(bit <= 7);

        if chunk[0] & 4 != 0 && cap.take_frame().is_some() {
            assert!(cap.take_frame().is_none());
        }
        if chunk[0] & 8 != 0 {
            cap.resync();
        }
    }
});

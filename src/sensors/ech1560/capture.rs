//! Interrupt-side frame capture: pulse-timing synchronizer and bit assembler.
//!
//! ## Protocol
//!
//! The ECH1560 clocks out a 16-byte frame on two lines.  A frame starts
//! with the clock held high for 1–2 ms; after that marker every rising
//! clock edge carries one data bit, least-significant bit first.
//!
//! ```text
//!  CLK  ___|‾‾‾‾‾‾‾‾‾ 1..2 ms ‾‾‾‾‾‾‾‾|_|‾|_|‾|_|‾|_ ... (128 rising edges)
//!  SDO  ___________________________ b0  b1  b2  ...
//!                                    ▲   ▲   ▲   sampled on rising edge
//! ```
//!
//! ## Handoff
//!
//! Two frame buffers.  The ISR only ever writes `buffers[write_buf]`; when a
//! frame completes it publishes that buffer through `ready_buf` + `ready`
//! (release) and moves on to the other one.  The main loop copies the ready
//! buffer and clears `ready` (acquire/release).  While `ready` is set the
//! ISR never touches the reader's buffer: a frame that completes in that
//! window is dropped and counted instead.
//!
//! All shared state is atomic and every field has a single writer per
//! context, so the ISR path uses plain load/store without read-modify-write.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use embedded_hal::digital::PinState;

use crate::drivers::interrupts::EdgeHandler;
use crate::ports::EdgeIo;

/// Bytes in one frame.
pub const FRAME_LEN: usize = 16;

/// One complete frame as clocked out by the chip.
pub type Frame = [u8; FRAME_LEN];

/// Shortest clock-high pulse accepted as a start-of-frame marker.
pub const SYNC_PULSE_MIN_US: u32 = 1000;
/// Longest clock-high pulse accepted as a start-of-frame marker.
pub const SYNC_PULSE_MAX_US: u32 = 2000;

/// True if a clock-high pulse of `width_us` marks the start of a frame.
pub const fn is_sync_pulse(width_us: u32) -> bool {
    width_us >= SYNC_PULSE_MIN_US && width_us <= SYNC_PULSE_MAX_US
}

/// Synchronizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncState {
    /// Waiting for a start-of-frame marker.
    Idle = 0,
    /// Marker seen; shifting in data bits.
    Syncing = 1,
}

/// Snapshot of the capture counters, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStats {
    pub state: SyncState,
    pub frames_completed: u32,
    pub frames_dropped: u32,
    pub pulse_start_us: u32,
    pub pulse_width_max_us: u32,
}

/// ISR-shared capture state for one sensor instance.
///
/// Lives behind a `&'static` so the interrupt registry can hold a
/// back-reference to it.
pub struct FrameCapture<IO: EdgeIo> {
    io: IO,
    clock_pin: AtomicU8,
    data_pin: AtomicU8,

    state: AtomicU8,
    pulse_start_us: AtomicU32,
    pulse_width_max_us: AtomicU32,
    bit_cursor: AtomicU8,
    byte_cursor: AtomicU8,

    buffers: [[AtomicU8; FRAME_LEN]; 2],
    write_buf: AtomicU8,
    ready_buf: AtomicU8,
    ready: AtomicBool,

    frames_completed: AtomicU32,
    frames_dropped: AtomicU32,
}

impl<IO: EdgeIo> FrameCapture<IO> {
    pub const fn new(io: IO) -> Self {
        Self {
            io,
            clock_pin: AtomicU8::new(0),
            data_pin: AtomicU8::new(0),
            state: AtomicU8::new(SyncState::Idle as u8),
            pulse_start_us: AtomicU32::new(0),
            pulse_width_max_us: AtomicU32::new(0),
            bit_cursor: AtomicU8::new(0),
            byte_cursor: AtomicU8::new(0),
            buffers: [const { [const { AtomicU8::new(0) }; FRAME_LEN] }; 2],
            write_buf: AtomicU8::new(0),
            ready_buf: AtomicU8::new(1),
            ready: AtomicBool::new(false),
            frames_completed: AtomicU32::new(0),
            frames_dropped: AtomicU32::new(0),
        }
    }

    /// Move `self` to the heap for the rest of the program.
    ///
    /// Instances are created once at startup; the registry needs a
    /// `'static` back-reference.
    pub fn leak(io: IO) -> &'static Self
    where
        IO: 'static,
    {
        Box::leak(Box::new(Self::new(io)))
    }

    /// Platform I/O used from the ISR.
    pub fn io(&self) -> &IO {
        &self.io
    }

    // ── ISR side ──────────────────────────────────────────────

    /// Feed one clock transition.
    ///
    /// `clock` is the clock level after the transition, `data` the data line
    /// level at the same instant, `now_us` the monotonic timestamp.
    pub fn on_edge(&self, clock: PinState, data: PinState, now_us: u32) {
        match clock {
            PinState::High => {
                self.pulse_start_us.store(now_us, Ordering::Relaxed);
                if self.sync_state() == SyncState::Syncing {
                    self.shift_in(data);
                }
            }
            PinState::Low => {
                let width = now_us.wrapping_sub(self.pulse_start_us.load(Ordering::Relaxed));
                if width > self.pulse_width_max_us.load(Ordering::Relaxed) {
                    self.pulse_width_max_us.store(width, Ordering::Relaxed);
                }
                if is_sync_pulse(width) {
                    self.start_frame();
                }
            }
        }
    }

    fn start_frame(&self) {
        self.bit_cursor.store(0, Ordering::Relaxed);
        self.byte_cursor.store(0, Ordering::Relaxed);
        let buf = self.write_index();
        for cell in &self.buffers[buf] {
            cell.store(0, Ordering::Relaxed);
        }
        self.state.store(SyncState::Syncing as u8, Ordering::Release);
    }

    fn shift_in(&self, data: PinState) {
        let bit = self.bit_cursor.load(Ordering::Relaxed);
        let byte = self.byte_cursor.load(Ordering::Relaxed) as usize;
        if bit > 7 || byte >= FRAME_LEN {
            self.lose_sync();
            return;
        }

        if data == PinState::High {
            let cell = &self.buffers[self.write_index()][byte];
            cell.store(cell.load(Ordering::Relaxed) | (1 << bit), Ordering::Relaxed);
        }

        if bit < 7 {
            self.bit_cursor.store(bit + 1, Ordering::Relaxed);
            return;
        }
        self.bit_cursor.store(0, Ordering::Relaxed);
        self.byte_cursor.store(byte as u8 + 1, Ordering::Relaxed);
        if byte + 1 == FRAME_LEN {
            self.complete_frame();
        }
    }

    fn complete_frame(&self) {
        self.state.store(SyncState::Idle as u8, Ordering::Release);

        if self.ready.load(Ordering::Acquire) {
            let dropped = self.frames_dropped.load(Ordering::Relaxed);
            self.frames_dropped.store(dropped.wrapping_add(1), Ordering::Relaxed);
            return;
        }

        let buf = self.write_index() as u8;
        self.ready_buf.store(buf, Ordering::Relaxed);
        self.write_buf.store(buf ^ 1, Ordering::Relaxed);
        let completed = self.frames_completed.load(Ordering::Relaxed);
        self.frames_completed.store(completed.wrapping_add(1), Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    fn lose_sync(&self) {
        self.state.store(SyncState::Idle as u8, Ordering::Release);
        self.bit_cursor.store(0, Ordering::Relaxed);
        self.byte_cursor.store(0, Ordering::Relaxed);
    }

    fn write_index(&self) -> usize {
        (self.write_buf.load(Ordering::Relaxed) & 1) as usize
    }

    // ── Main-loop side ────────────────────────────────────────

    /// Take ownership of the completed frame, if any.
    ///
    /// The buffer is copied out and released back to the ISR in one step.
    pub fn take_frame(&self) -> Option<Frame> {
        if !self.ready.load(Ordering::Acquire) {
            return None;
        }
        let buf = (self.ready_buf.load(Ordering::Relaxed) & 1) as usize;
        let mut frame = [0u8; FRAME_LEN];
        for (dst, src) in frame.iter_mut().zip(&self.buffers[buf]) {
            *dst = src.load(Ordering::Relaxed);
        }
        self.ready.store(false, Ordering::Release);
        Some(frame)
    }

    /// Drop synchronization and any partial frame; wait for the next marker.
    pub fn resync(&self) {
        critical_section::with(|_| self.lose_sync());
    }

    /// Reconfiguration boundary: forget the partial frame and any frame
    /// still waiting for the decoder.
    pub fn invalidate(&self) {
        critical_section::with(|_| {
            self.lose_sync();
            self.ready.store(false, Ordering::Release);
        });
    }

    /// Pins the ISR reads when an edge arrives.
    pub fn set_pins(&self, clock_pin: u8, data_pin: u8) {
        self.clock_pin.store(clock_pin, Ordering::Relaxed);
        self.data_pin.store(data_pin, Ordering::Relaxed);
    }

    /// Read and reset the widest clock-high pulse seen since the last call.
    pub fn take_pulse_width_max(&self) -> u32 {
        critical_section::with(|_| self.pulse_width_max_us.swap(0, Ordering::Relaxed))
    }

    pub fn sync_state(&self) -> SyncState {
        match self.state.load(Ordering::Acquire) {
            1 => SyncState::Syncing,
            _ => SyncState::Idle,
        }
    }

    /// `(byte_cursor, bit_cursor)` of the frame being built.
    pub fn cursors(&self) -> (u8, u8) {
        (
            self.byte_cursor.load(Ordering::Relaxed),
            self.bit_cursor.load(Ordering::Relaxed),
        )
    }

    /// True while a completed frame waits for [`take_frame`](Self::take_frame).
    pub fn frame_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Copy of the buffer the ISR is currently filling.
    pub fn building_frame(&self) -> Frame {
        let mut frame = [0u8; FRAME_LEN];
        for (dst, src) in frame.iter_mut().zip(&self.buffers[self.write_index()]) {
            *dst = src.load(Ordering::Relaxed);
        }
        frame
    }

    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            state: self.sync_state(),
            frames_completed: self.frames_completed.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            pulse_start_us: self.pulse_start_us.load(Ordering::Relaxed),
            pulse_width_max_us: self.pulse_width_max_us.load(Ordering::Relaxed),
        }
    }
}

impl<IO: EdgeIo> EdgeHandler for FrameCapture<IO> {
    fn handle_edge(&self, gpio: u8) {
        let clock = self.io.level(gpio);
        let data = self.io.level(self.data_pin.load(Ordering::Relaxed));
        self.on_edge(clock, data, self.io.micros());
    }
}

//! Color-clock arithmetic.
//!
//! The TIA runs three color clocks per CPU cycle. A scanline is 76 CPU cycles
//! (228 color clocks); the first 68 clocks of each line are horizontal blank
//! and the remaining 160 produce one pixel each.
//!
//! Clocks are kept as `i32` because the frame-start clock is negative right
//! after a frame begins mid-line.

/// Color clocks per CPU cycle
pub const PIXEL_CLOCKS: i32 = 3;
/// CPU cycles per scanline
pub const SCANLINE_CYCLES: i32 = 76;
/// Color clocks per scanline
pub const SCANLINE_CLOCKS: i32 = PIXEL_CLOCKS * SCANLINE_CYCLES;
/// Visible pixels per scanline
pub const SCANLINE_PIXELS: i32 = 160;
/// Color clocks of horizontal blank at the start of each scanline
pub const HBLANK_CLOCKS: i32 = SCANLINE_CLOCKS - SCANLINE_PIXELS;

/// Scanlines held by each framebuffer
pub const BUFFER_LINES: u32 = 320;
/// Bytes per framebuffer
pub const BUFFER_SIZE: usize = SCANLINE_PIXELS as usize * BUFFER_LINES as usize;

/// Color clock for a CPU cycle count.
#[inline]
pub fn color_clock(cycles: u32) -> i32 {
    (cycles as i32).wrapping_mul(PIXEL_CLOCKS)
}

/// Wrap an object position into `0..160`.
#[inline]
pub fn wrap_pos(pos: i32) -> i32 {
    pos.rem_euclid(SCANLINE_PIXELS)
}

/// Position of `clock` relative to the frame that began at `frame_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamPosition {
    /// Scanlines since the frame started
    pub scanline: i32,
    /// Color clocks since the start of the scanline (0..228)
    pub line_clock: i32,
}

impl BeamPosition {
    #[inline]
    pub fn at(clock: i32, frame_start: i32) -> Self {
        let since = clock - frame_start;
        Self {
            scanline: since.div_euclid(SCANLINE_CLOCKS),
            line_clock: since.rem_euclid(SCANLINE_CLOCKS),
        }
    }

    /// Horizontal position; negative during HBLANK, `0..160` when visible.
    #[inline]
    pub fn hpos(&self) -> i32 {
        self.line_clock - HBLANK_CLOCKS
    }

    /// CPU cycle within the scanline (0..76)
    #[inline]
    pub fn cycle(&self) -> usize {
        (self.line_clock / PIXEL_CLOCKS) as usize
    }
}

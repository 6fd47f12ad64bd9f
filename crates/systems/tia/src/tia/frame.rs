//! Frame boundaries: buffer swaps, short and runaway frames, autoframe and
//! the cycle-counter rewind done at the start of every frame.

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::clock::{color_clock, BUFFER_LINES, SCANLINE_CLOCKS, SCANLINE_PIXELS};
use crate::host::TiaHost;
use crate::registers::ColorIndex;

use super::Tia;

/// Frames at least this tall count towards the PAL classification
const PAL_SCANLINES: u32 = 287;

impl Tia {
    /// Run one frame: `execute` steps the CPU (which reads and writes the
    /// TIA through [`Tia::peek`] and [`Tia::poke`]) until it halts, either
    /// because the frame finished or because the host stopped for its own
    /// reasons. In the latter case the next call resumes the same frame.
    pub fn update<H: TiaHost>(&mut self, host: &mut H, execute: impl FnOnce(&mut Self, &mut H)) {
        if !self.partial_frame {
            self.start_frame(host);
        }
        self.partial_frame = true;

        execute(self, host);

        self.end_frame(host);
    }

    pub(crate) fn start_frame(&mut self, host: &mut impl TiaHost) {
        std::mem::swap(&mut self.current_frame, &mut self.previous_frame);

        // Objects may have been positioned during VSYNC; the new frame keeps
        // the beam's place within the current line.
        let clocks = (color_clock(host.cycles()) - self.frame_start).rem_euclid(SCANLINE_CLOCKS);

        self.system_cycles_reset(host.cycles());
        host.reset_cycles();

        self.frame_start = -clocks;
        self.clock_start_display = self.frame_start;
        self.clock_stop_display = self.frame_start + self.stop_display_offset;
        self.clock_last_update = self.clock_start_display;
        self.clocks_to_end_of_scanline = SCANLINE_CLOCKS;

        self.frame_pointer = 0;
        self.frame_pointer_clocks = 0;

        if self.color_loss {
            let odd = self.scanline_count_last_frame & 0x01 != 0;
            for color in &mut self.colors[..ColorIndex::HBlank as usize] {
                if odd {
                    *color |= 0x01;
                } else {
                    *color &= 0xFE;
                }
            }
        }
        self.start_scanline = 0;
    }

    pub(crate) fn end_frame(&mut self, host: &mut impl TiaHost) {
        let lines = self.scanlines(host);

        // Frames that end before VBLANK was ever released never reach the screen
        if lines <= self.start_scanline {
            log(LogCategory::Frame, LogLevel::Debug, || {
                format!(
                    "TIA: discarding short frame ({} lines, drawing starts at {})",
                    lines, self.start_scanline
                )
            });
            self.start_frame(host);
            return;
        }

        let previous_count = self.scanline_count_last_frame;
        self.scanline_count_last_frame = lines;

        // Blank whatever the new frame height uncovers. The two buffers get
        // different fill values so a consumer comparing them sees a change.
        if lines > self.max_scanlines + 1 {
            self.scanline_count_last_frame = self.max_scanlines;
            if previous_count < self.max_scanlines {
                self.current_frame.fill(0);
                self.previous_frame.fill(1);
            }
        } else if lines < previous_count && lines < BUFFER_LINES && previous_count < BUFFER_LINES {
            let from = (lines * SCANLINE_PIXELS as u32) as usize;
            let to = (previous_count * SCANLINE_PIXELS as u32) as usize;
            self.current_frame[from..to].fill(0);
            self.previous_frame[from..to].fill(1);
        }

        self.frame_counter += 1;
        if self.scanline_count_last_frame >= PAL_SCANLINES {
            self.pal_frame_counter += 1;
        }

        if self.autoframe {
            let count = self.scanline_count_last_frame;
            let base = if count > 285 { 15600.0 } else { 15720.0 };
            self.framerate = base / count as f32;

            let offset = SCANLINE_CLOCKS * count as i32;
            if offset > self.stop_display_offset && offset < SCANLINE_CLOCKS * BUFFER_LINES as i32 {
                self.stop_display_offset = offset;
            }
        }

        log(LogCategory::Frame, LogLevel::Debug, || {
            format!(
                "TIA: frame {} done, {} scanlines, {:.2} fps",
                self.frame_counter, self.scanline_count_last_frame, self.framerate
            )
        });
    }

    /// Shift every clock and cycle stamp back by `cycles`, just before the
    /// host rewinds its counter by the same amount.
    pub fn system_cycles_reset(&mut self, cycles: u32) {
        self.sound.adjust_cycle_counter(-i64::from(cycles));
        self.dump_disabled_cycle -= i64::from(cycles);

        let clocks = color_clock(cycles);
        self.frame_start -= clocks;
        self.clock_start_display -= clocks;
        self.clock_stop_display -= clocks;
        self.clock_last_update -= clocks;
        if let Some(finish) = self.vsync_finish_clock.as_mut() {
            *finish -= clocks;
        }
    }

    /// Scanlines since the frame started, at the host's current cycle
    pub fn scanlines(&self, host: &impl TiaHost) -> u32 {
        ((color_clock(host.cycles()) - self.frame_start) / SCANLINE_CLOCKS).max(0) as u32
    }

    /// Color clocks since the start of the current scanline
    pub fn clocks_this_line(&self, host: &impl TiaHost) -> u32 {
        self.beam(color_clock(host.cycles())).line_clock as u32
    }

    /// Beam position relative to the visible window, for debugger overlays.
    /// Outside a frame in progress this is `(width, height, false)`.
    pub fn scanline_pos(&self) -> (u32, u32, bool) {
        if !self.partial_frame {
            return (self.width(), self.height(), false);
        }
        let offset = self.frame_pointer_offset as u32;
        if self.frame_pointer_clocks >= offset {
            let drawn = self.frame_pointer_clocks - offset;
            let width = SCANLINE_PIXELS as u32;
            (drawn % width, drawn / width, true)
        } else {
            (0, 0, false)
        }
    }

    /// Whether at least 25 of every 60 frames so far were PAL length
    pub fn is_pal(&self) -> bool {
        self.frame_counter > 0 && u64::from(self.pal_frame_counter) * 60 >= u64::from(self.frame_counter) * 25
    }
}

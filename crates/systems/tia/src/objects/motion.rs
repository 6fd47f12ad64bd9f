//! Horizontal motion state shared by players, missiles and the ball.
//!
//! An HMOVE strobe loads a motion clock from the HMxx register; each tick of
//! that clock delays the object one pixel. Writing HMxx while the clock is
//! still running, or strobing HMOVE or RESxx at odd points of the scanline,
//! produces artifacts that games rely on:
//!
//! - a write that the running comparator can no longer match moves the object
//!   a full 15 pixels and latches "more motion required", which keeps pulling
//!   the object 17 pixels left on every following scanline until the next
//!   HMOVE (the Cosmic Ark starfield). The values `0x70` and `0x80` never
//!   latch.
//! - an HMOVE during the visible part of a line only applies the motion ticks
//!   that fit before the line ends; the rest carry into the next line.
//! - a RESxx shortly after an HMOVE lands where the remaining motion ticks
//!   would have put it.

use serde::{Deserialize, Serialize};

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::clock::{wrap_pos, HBLANK_CLOCKS, SCANLINE_CLOCKS};

use super::FrameTiming;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Motion {
    hm: u8,
    pos: i32,
    motion_clock: i32,
    more_motion_required: bool,
}

/// Motion ticks encoded by an HMxx value: `0x80` is 0 ticks, `0x70` is 15.
#[inline]
fn motion_ticks(hm: u8) -> i32 {
    ((hm ^ 0x80) >> 4) as i32
}

impl Motion {
    pub fn pos(&self) -> i32 {
        self.pos
    }

    pub fn hm(&self) -> u8 {
        self.hm
    }

    pub fn motion_clock(&self) -> i32 {
        self.motion_clock
    }

    pub fn more_motion_required(&self) -> bool {
        self.more_motion_required
    }

    pub(crate) fn set_pos(&mut self, pos: i32) {
        self.pos = wrap_pos(pos);
    }

    /// HMxx write, also HMCLR with `value == 0`
    pub fn write_hm(&mut self, value: u8, timing: &FrameTiming) {
        let value = value & 0xF0;
        if self.hm == value {
            return;
        }

        if let Some(hmove) = timing.current_hmove {
            let hpos = timing.hpos;
            if hpos < (hmove + 6 + self.motion_clock * 4).min(7) {
                let new_motion = motion_ticks(value);
                if new_motion > self.motion_clock || hpos <= (hmove + 6 + new_motion * 4).min(7) {
                    self.pos -= new_motion - self.motion_clock;
                    self.motion_clock = new_motion;
                } else {
                    self.pos -= 15 - self.motion_clock;
                    self.motion_clock = 15;
                    if value != 0x70 && value != 0x80 {
                        self.more_motion_required = true;
                        log(LogCategory::Motion, LogLevel::Trace, || {
                            format!(
                                "TIA: HM write ${:02X} at hpos {} latched more-motion-required",
                                value, hpos
                            )
                        });
                    }
                }
                self.pos = wrap_pos(self.pos);
            }
        }
        self.hm = value;
    }

    /// HMOVE strobe at `hpos`
    pub fn hmove(&mut self, hpos: i32) {
        // Undo part of the extra clocks already applied by a pending latch
        if hpos < 0 && self.more_motion_required {
            let cycle_fix = 17 - ((hpos + HBLANK_CLOCKS + 7) / 4);
            self.pos = wrap_pos(self.pos + cycle_fix);
        }
        self.more_motion_required = false;

        if (-5..97).contains(&hpos) {
            self.motion_clock = 0;
            return;
        }

        self.motion_clock = motion_ticks(self.hm);

        // Visible part of the line only leaves room for some ticks
        if (97..151).contains(&hpos) {
            let skipped = (160 - hpos - 6) >> 2;
            self.motion_clock = (self.motion_clock - skipped).max(0);
        }

        if (-56..-5).contains(&hpos) {
            let max_ticks = (7 - (hpos + 5)) >> 2;
            self.motion_clock = self.motion_clock.min(max_ticks);
        }

        if hpos < -5 || hpos >= 157 {
            self.pos += 8 - self.motion_clock;
        }
        self.pos = wrap_pos(self.pos);
    }

    /// Scanline boundary: apply ticks of a late HMOVE that did not fit on the
    /// previous line, and the more-motion-required pull.
    pub fn pending_motions(&mut self, current_hmove: Option<i32>) {
        if let Some(hmove) = current_hmove {
            if (97..157).contains(&hmove) {
                self.pos = wrap_pos(self.pos - self.motion_clock);
            }
        }
        if self.more_motion_required {
            self.pos = wrap_pos(self.pos - 17);
        }
    }

    /// Position a RESxx strobed at `timing` lands on, given the object's
    /// nominal landing spots with and without an HMOVE in progress.
    pub fn reset_target(&self, timing: &FrameTiming, active: i32, previous: i32) -> i32 {
        let hpos = timing.hpos;
        let newx = match timing.current_hmove {
            Some(hmove) => {
                let mut newx = active;
                if hpos < (hmove + 6 + 16 * 4).min(7) {
                    let decrements_passed = (hpos - (hmove + 4)) >> 2;
                    newx += 8;
                    let remaining = self.motion_clock - decrements_passed;
                    if remaining > 0 {
                        newx -= remaining;
                    }
                }
                newx
            }
            None => {
                let mut newx = previous;
                if let Some(prev) = timing.previous_hmove {
                    let ticks = motion_ticks(self.hm);
                    if hpos <= prev - SCANLINE_CLOCKS + 5 + ticks * 4 {
                        let passed = (hpos - (prev - SCANLINE_CLOCKS + 6)) >> 2;
                        newx -= ticks - passed;
                    }
                }
                newx
            }
        };
        wrap_pos(newx)
    }
}

//! Lazy scanline renderer.
//!
//! Nothing is drawn until a register access needs the picture to be current.
//! [`Tia::update_frame`] then catches up from the last rendered clock to the
//! requested one, a scanline at a time, so every pixel is produced with the
//! register values that were in effect when the beam passed it.

use crate::clock::{HBLANK_CLOCKS, SCANLINE_CLOCKS};
use crate::objects::{Moveable, PixelEnabled};
use crate::registers::ColorIndex;

use super::Tia;

/// Pixels covered by the HMOVE blank at the start of a line
const HMOVE_BLANK_PIXELS: i32 = 8;

impl Tia {
    /// Render up to (not including) color clock `clock`. Clocks already
    /// rendered, before the display window or past its end are ignored.
    pub fn update_frame(&mut self, clock: i32) {
        if clock < self.clock_start_display
            || self.clock_last_update >= self.clock_stop_display
            || self.clock_last_update >= clock
        {
            return;
        }
        let clock = clock.min(self.clock_stop_display);

        let start_line = (self.clock_last_update - self.frame_start) / SCANLINE_CLOCKS;
        let end_line = (clock - self.frame_start) / SCANLINE_CLOCKS;

        for line in start_line..=end_line {
            if line != start_line {
                self.finish_scanline_motion();
            }

            let mut clocks_from_start = SCANLINE_CLOCKS - self.clocks_to_end_of_scanline;
            let mut clocks_to_update;
            if clock >= self.clock_last_update + self.clocks_to_end_of_scanline {
                clocks_to_update = self.clocks_to_end_of_scanline;
                self.clocks_to_end_of_scanline = SCANLINE_CLOCKS;
                self.clock_last_update += clocks_to_update;
            } else {
                clocks_to_update = clock - self.clock_last_update;
                self.clocks_to_end_of_scanline -= clocks_to_update;
                self.clock_last_update = clock;
            }

            if clocks_from_start < HBLANK_CLOCKS {
                let skipped = (HBLANK_CLOCKS - clocks_from_start).min(clocks_to_update);
                clocks_from_start += skipped;
                clocks_to_update -= skipped;
            }

            let line_pointer = self.frame_pointer;
            if clocks_to_update > 0 {
                let hpos = (clocks_from_start - HBLANK_CLOCKS) as usize;
                self.draw_pixels(hpos, clocks_to_update as usize);
            }

            if self.hmove_blank && clocks_from_start < HBLANK_CLOCKS + HMOVE_BLANK_PIXELS {
                let blanks = (HBLANK_CLOCKS + HMOVE_BLANK_PIXELS - clocks_from_start)
                    .min(HMOVE_BLANK_PIXELS) as usize;
                let end = (line_pointer + blanks).min(self.current_frame.len());
                let color = self.palette()[ColorIndex::HBlank as usize];
                self.current_frame[line_pointer..end].fill(color);

                if clocks_to_update + clocks_from_start >= HBLANK_CLOCKS + HMOVE_BLANK_PIXELS {
                    self.hmove_blank = false;
                }
            }

            // Suppression only lasts for the line the reset happened on
            if self.clocks_to_end_of_scanline == SCANLINE_CLOCKS {
                self.player0.clear_suppress();
                self.player1.clear_suppress();
            }
        }
    }

    /// Scanline boundary: carry late HMOVE ticks and the more-motion pull
    /// into the new line, and retire this line's HMOVE.
    fn finish_scanline_motion(&mut self) {
        self.previous_hmove = None;

        let current = self.current_hmove;
        self.player0.handle_pending_motions(current);
        self.player1.handle_pending_motions(current);
        self.missile0.handle_pending_motions(current);
        self.missile1.handle_pending_motions(current);
        self.ball.handle_pending_motions(current);

        if let Some(hpos) = current {
            if (97..157).contains(&hpos) {
                self.previous_hmove = Some(hpos);
            }
        }
        self.current_hmove = None;
    }

    /// Draw `count` visible pixels starting at `hpos` of the current line.
    fn draw_pixels(&mut self, hpos: usize, count: usize) {
        let start = self.frame_pointer.min(self.current_frame.len());
        let end = (self.frame_pointer + count).min(self.current_frame.len());
        self.frame_pointer += count;
        self.frame_pointer_clocks += count as u32;

        if self.vblank & 0x02 != 0 {
            self.current_frame[start..end].fill(0);
            return;
        }

        let t = self.tables;
        self.player0.update_mask(t);
        self.player1.update_mask(t);
        self.missile0.update_mask(t);
        self.missile1.update_mask(t);
        self.ball.update_mask(t);

        let palette = *self.palette();
        let priority_and_score = self.playfield.priority_and_score();

        for (i, pixel) in self.current_frame[start..end].iter_mut().enumerate() {
            let x = hpos + i;
            let enabled = (self.playfield.enable_bits(t, x)
                | self.ball.enable_bits(t, x)
                | self.player1.enable_bits(t, x)
                | self.missile1.enable_bits(t, x)
                | self.player0.enable_bits(t, x)
                | self.missile0.enable_bits(t, x))
                & self.enabled_objects;

            self.collision |= t.collisions(enabled);
            let half = (x >= 80) as usize;
            let slot = self.priority_encoder[half][(enabled | priority_and_score) as usize];
            *pixel = palette[slot as usize];
        }
    }

    pub fn clear_buffers(&mut self) {
        self.current_frame.fill(0);
        self.previous_frame.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TiaConfig;
    use crate::host::NullSound;
    use crate::objects::RegisterWritable;
    use crate::registers::collision::P0PF;

    fn tia() -> Tia {
        let mut tia = Tia::new(TiaConfig::default(), Box::new(NullSound));
        tia.colors[ColorIndex::BK as usize] = 0x1A;
        tia
    }

    #[test]
    fn test_renders_background() {
        let mut tia = tia();
        tia.update_frame(2 * SCANLINE_CLOCKS);
        assert_eq!(tia.frame_pointer, 320);
        assert!(tia.current_frame[..320].iter().all(|&p| p == 0x1A));
        assert_eq!(tia.current_frame[320], 0);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut tia = tia();
        tia.update_frame(SCANLINE_CLOCKS + 100);
        let pointer = tia.frame_pointer;
        let clocks = tia.clock_last_update;
        tia.update_frame(SCANLINE_CLOCKS + 100);
        tia.update_frame(SCANLINE_CLOCKS + 50);
        assert_eq!(tia.frame_pointer, pointer);
        assert_eq!(tia.clock_last_update, clocks);
    }

    #[test]
    fn test_partial_lines_join_up() {
        let mut tia = tia();
        // Stop in the middle of HBLANK, then in the middle of the picture
        tia.update_frame(30);
        assert_eq!(tia.frame_pointer, 0);
        tia.update_frame(HBLANK_CLOCKS + 40);
        assert_eq!(tia.frame_pointer, 40);
        tia.update_frame(SCANLINE_CLOCKS);
        assert_eq!(tia.frame_pointer, 160);
        assert_eq!(tia.clocks_to_end_of_scanline, SCANLINE_CLOCKS);
    }

    #[test]
    fn test_vblank_draws_black() {
        let mut tia = tia();
        tia.vblank = 0x02;
        tia.update_frame(SCANLINE_CLOCKS);
        assert!(tia.current_frame[..160].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_render_clamped_to_stop() {
        let mut tia = tia();
        tia.update_frame(i32::MAX / 2);
        assert_eq!(tia.clock_last_update, tia.clock_stop_display);
        assert_eq!(tia.frame_pointer, 160 * 262);
    }

    #[test]
    fn test_hmove_blank_covers_eight_pixels() {
        let mut tia = tia();
        tia.hmove_blank = true;
        tia.update_frame(SCANLINE_CLOCKS);
        assert!(tia.current_frame[..8].iter().all(|&p| p == 0));
        assert!(tia.current_frame[8..160].iter().all(|&p| p == 0x1A));
        assert!(!tia.hmove_blank);
    }

    #[test]
    fn test_collision_latched_while_drawing() {
        let mut tia = tia();
        tia.playfield.write_register(
            crate::registers::write::PF0,
            0x10,
            &Default::default(),
            tia.tables,
        );
        tia.player0.write_register(
            crate::registers::write::GRP0,
            0x80,
            &Default::default(),
            tia.tables,
        );
        // P0 sits at 0, under the playfield's first block
        tia.update_frame(SCANLINE_CLOCKS);
        assert_ne!(tia.collision & P0PF, 0);
    }

    #[test]
    fn test_hidden_object_neither_drawn_nor_collides() {
        use crate::registers::TiaBit;

        let mut tia = tia();
        tia.colors[ColorIndex::PF as usize] = 0x44;
        tia.playfield.write_register(
            crate::registers::write::PF0,
            0x10,
            &Default::default(),
            tia.tables,
        );
        tia.player0.write_register(
            crate::registers::write::GRP0,
            0x80,
            &Default::default(),
            tia.tables,
        );
        tia.toggle_bit(TiaBit::PF, 0);
        tia.update_frame(SCANLINE_CLOCKS);
        assert_eq!(tia.collision, 0);
        assert_eq!(tia.current_frame[2], 0x1A);
    }
}

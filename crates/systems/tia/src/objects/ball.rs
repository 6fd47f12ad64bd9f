use serde::{Deserialize, Serialize};

use crate::registers::{write::*, TiaBit};
use crate::tables::TiaTables;

use super::{FrameTiming, Moveable, Motion, PixelEnabled, RegisterWritable, Resettable};

/// The ball: a 1 to 8 pixel line sized by CTRLPF, with its own vertical
/// delay latched by GRP1 writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ball {
    motion: Motion,
    enable: bool,
    denable: bool,
    vdel: bool,
    size: u8,
    #[serde(skip)]
    mask_row: usize,
}

impl Ball {
    pub fn enable(&self) -> bool {
        self.enable
    }

    pub fn denable(&self) -> bool {
        self.denable
    }

    pub fn vdel(&self) -> bool {
        self.vdel
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    #[inline]
    fn current_enable(&self) -> bool {
        if self.vdel {
            self.denable
        } else {
            self.enable
        }
    }
}

impl Resettable for Ball {
    fn reset(&mut self) {
        *self = Ball::default();
    }
}

impl RegisterWritable for Ball {
    fn write_register(&mut self, addr: u8, value: u8, timing: &FrameTiming, _tables: &TiaTables) {
        match addr {
            CTRLPF => self.size = (value & 0x30) >> 4,
            ENABL => self.enable = value & 0x02 != 0,
            GRP1 => self.denable = self.enable,
            VDELBL => self.vdel = value & 0x01 != 0,
            HMBL => self.motion.write_hm(value, timing),
            RESBL => {
                let newx = self.reset_target(timing);
                self.motion.set_pos(newx);
            }
            HMCLR => self.motion.write_hm(0, timing),
            HMOVE => self.motion.hmove(timing.hpos),
            _ => {}
        }
    }
}

impl Moveable for Ball {
    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn active_hpos(&self, hpos: i32) -> i32 {
        if hpos < 7 {
            2
        } else {
            (hpos + 4) % 160
        }
    }

    fn previous_hpos(&self, hpos: i32) -> i32 {
        if hpos < 0 {
            2
        } else {
            (hpos + 4) % 160
        }
    }
}

impl PixelEnabled for Ball {
    fn bit(&self) -> TiaBit {
        TiaBit::BL
    }

    fn update_mask(&mut self, tables: &TiaTables) {
        self.mask_row = tables.ball_row(self.motion.pos(), self.size);
    }

    #[inline]
    fn is_enabled_at(&self, tables: &TiaTables, hpos: usize) -> bool {
        self.current_enable() && tables.ball_bit(self.mask_row, hpos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::tables;

    fn write(ball: &mut Ball, addr: u8, value: u8) {
        ball.write_register(addr, value, &FrameTiming::default(), tables());
    }

    fn lit(ball: &mut Ball) -> Vec<usize> {
        let t = tables();
        ball.update_mask(t);
        (0..160).filter(|&h| ball.is_enabled_at(t, h)).collect()
    }

    #[test]
    fn test_enable_and_size() {
        let mut ball = Ball::default();
        ball.motion_mut().set_pos(70);
        write(&mut ball, ENABL, 0x02);
        assert_eq!(lit(&mut ball), vec![70]);
        write(&mut ball, CTRLPF, 0x10);
        assert_eq!(lit(&mut ball), vec![70, 71]);
    }

    #[test]
    fn test_vertical_delay() {
        let mut ball = Ball::default();
        ball.motion_mut().set_pos(20);
        write(&mut ball, VDELBL, 0x01);
        write(&mut ball, ENABL, 0x02);
        assert!(lit(&mut ball).is_empty());

        // GRP1 copies the enable into the delayed latch
        write(&mut ball, GRP1, 0x00);
        assert!(ball.denable());
        assert_eq!(lit(&mut ball), vec![20]);

        write(&mut ball, ENABL, 0x00);
        assert_eq!(lit(&mut ball), vec![20]);
        write(&mut ball, VDELBL, 0x00);
        assert!(lit(&mut ball).is_empty());
    }

    #[test]
    fn test_reset_positions() {
        let mut ball = Ball::default();
        let at = |hpos| FrameTiming {
            hpos,
            ..FrameTiming::default()
        };
        ball.write_register(RESBL, 0, &at(-1), tables());
        assert_eq!(ball.motion().pos(), 2);
        ball.write_register(RESBL, 0, &at(0), tables());
        assert_eq!(ball.motion().pos(), 4);
        ball.write_register(RESBL, 0, &at(50), tables());
        assert_eq!(ball.motion().pos(), 54);
    }
}

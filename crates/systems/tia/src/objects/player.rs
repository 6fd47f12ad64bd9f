use serde::{Deserialize, Serialize};

use crate::registers::{write::*, TiaBit};
use crate::tables::{ResetTiming, TiaTables};

use super::{FrameTiming, Moveable, Motion, PixelEnabled, RegisterWritable, Resettable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerId {
    P0,
    P1,
}

/// Register addresses a player answers to
struct PlayerRegisters {
    hm: u8,
    grp: u8,
    other_grp: u8,
    nusiz: u8,
    refp: u8,
    vdel: u8,
}

impl PlayerId {
    fn registers(self) -> PlayerRegisters {
        match self {
            PlayerId::P0 => PlayerRegisters {
                hm: HMP0,
                grp: GRP0,
                other_grp: GRP1,
                nusiz: NUSIZ0,
                refp: REFP0,
                vdel: VDELP0,
            },
            PlayerId::P1 => PlayerRegisters {
                hm: HMP1,
                grp: GRP1,
                other_grp: GRP0,
                nusiz: NUSIZ1,
                refp: REFP1,
                vdel: VDELP1,
            },
        }
    }
}

/// An 8-pixel sprite drawn in up to three copies.
///
/// Writing the *other* player's GRP register copies this player's GRP into
/// its delayed register, so a kernel that writes GRP0 then GRP1 every other
/// line can show both players updated on the same line via VDELPx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    motion: Motion,
    grp: u8,
    dgrp: u8,
    nusiz: u8,
    refp: bool,
    vdel: bool,
    /// Skip the first copy on this scanline (set by RESPx)
    suppress: bool,
    /// Pattern actually drawn: GRP or DGRP per VDEL, reflected per REFP
    current_grp: u8,
    #[serde(skip)]
    mask_row: usize,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            motion: Motion::default(),
            grp: 0,
            dgrp: 0,
            nusiz: 0,
            refp: false,
            vdel: false,
            suppress: false,
            current_grp: 0,
            mask_row: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn grp(&self) -> u8 {
        self.grp
    }

    pub fn dgrp(&self) -> u8 {
        self.dgrp
    }

    pub fn current_grp(&self) -> u8 {
        self.current_grp
    }

    pub fn nusiz(&self) -> u8 {
        self.nusiz
    }

    pub fn refp(&self) -> bool {
        self.refp
    }

    pub fn vdel(&self) -> bool {
        self.vdel
    }

    pub fn suppress(&self) -> bool {
        self.suppress
    }

    pub(crate) fn clear_suppress(&mut self) {
        self.suppress = false;
    }

    fn refresh_current_grp(&mut self, tables: &TiaTables) {
        let grp = if self.vdel { self.dgrp } else { self.grp };
        self.current_grp = if self.refp { tables.reflect(grp) } else { grp };
    }

    /// Where RESPx would move the player and how the move relates to the
    /// copies being drawn. `None` when the player is already there.
    pub fn plan_reset(&self, timing: &FrameTiming, tables: &TiaTables) -> Option<(i32, ResetTiming)> {
        let newx = self.reset_target(timing);
        if newx == self.motion.pos() {
            return None;
        }
        Some((newx, tables.player_reset_when(self.nusiz, self.motion.pos(), newx)))
    }

    /// Apply a reset computed by [`Player::plan_reset`].
    pub fn commit_reset(&mut self, newx: i32, when: ResetTiming) {
        self.suppress = when != ResetTiming::Delay;
        self.motion.set_pos(newx);
    }
}

impl Resettable for Player {
    fn reset(&mut self) {
        *self = Player::new(self.id);
    }
}

impl RegisterWritable for Player {
    fn write_register(&mut self, addr: u8, value: u8, timing: &FrameTiming, tables: &TiaTables) {
        let regs = self.id.registers();
        match addr {
            a if a == regs.hm => self.motion.write_hm(value, timing),
            a if a == regs.grp => {
                self.grp = value;
                self.refresh_current_grp(tables);
            }
            a if a == regs.other_grp => {
                self.dgrp = self.grp;
                self.refresh_current_grp(tables);
            }
            a if a == regs.nusiz => {
                self.nusiz = value;
                self.suppress = false;
            }
            a if a == regs.refp => {
                self.refp = value & 0x08 != 0;
                self.refresh_current_grp(tables);
            }
            a if a == regs.vdel => {
                self.vdel = value & 0x01 != 0;
                self.refresh_current_grp(tables);
            }
            HMCLR => self.motion.write_hm(0, timing),
            HMOVE => {
                self.motion.hmove(timing.hpos);
                self.suppress = false;
            }
            _ => {}
        }
    }
}

impl Moveable for Player {
    fn motion(&self) -> &Motion {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    fn active_hpos(&self, hpos: i32) -> i32 {
        if hpos < 7 {
            3
        } else {
            (hpos + 5) % 160
        }
    }

    fn previous_hpos(&self, hpos: i32) -> i32 {
        if hpos < -2 {
            3
        } else {
            (hpos + 5) % 160
        }
    }
}

impl PixelEnabled for Player {
    fn bit(&self) -> TiaBit {
        match self.id {
            PlayerId::P0 => TiaBit::P0,
            PlayerId::P1 => TiaBit::P1,
        }
    }

    fn update_mask(&mut self, tables: &TiaTables) {
        self.mask_row = tables.player_row(self.motion.pos(), self.suppress, self.nusiz);
    }

    #[inline]
    fn is_enabled_at(&self, tables: &TiaTables, hpos: usize) -> bool {
        self.current_grp & tables.player_bits(self.mask_row, hpos) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::tables;

    fn write(player: &mut Player, addr: u8, value: u8) {
        player.write_register(addr, value, &FrameTiming::default(), tables());
    }

    fn lit(player: &mut Player) -> Vec<usize> {
        let t = tables();
        player.update_mask(t);
        (0..160).filter(|&h| player.is_enabled_at(t, h)).collect()
    }

    #[test]
    fn test_grp_and_reflect() {
        let mut p0 = Player::new(PlayerId::P0);
        write(&mut p0, GRP0, 0xC0);
        assert_eq!(p0.current_grp(), 0xC0);
        write(&mut p0, REFP0, 0x08);
        assert_eq!(p0.current_grp(), 0x03);
        // Only bit 3 matters
        write(&mut p0, REFP0, 0xF7);
        assert_eq!(p0.current_grp(), 0xC0);
    }

    #[test]
    fn test_vertical_delay_uses_other_players_grp_write() {
        let mut p0 = Player::new(PlayerId::P0);
        write(&mut p0, VDELP0, 0x01);
        write(&mut p0, GRP0, 0xAA);
        assert_eq!(p0.current_grp(), 0);

        // GRP1 latches GRP0 into the delayed register
        write(&mut p0, GRP1, 0x00);
        assert_eq!(p0.dgrp(), 0xAA);
        assert_eq!(p0.current_grp(), 0xAA);

        write(&mut p0, VDELP0, 0x00);
        assert_eq!(p0.current_grp(), 0xAA);
        write(&mut p0, GRP0, 0x55);
        assert_eq!(p0.current_grp(), 0x55);
    }

    #[test]
    fn test_player1_ignores_player0_registers() {
        let mut p1 = Player::new(PlayerId::P1);
        write(&mut p1, NUSIZ0, 0x03);
        write(&mut p1, REFP0, 0x08);
        assert_eq!(p1.nusiz(), 0);
        assert!(!p1.refp());
        write(&mut p1, NUSIZ1, 0x03);
        assert_eq!(p1.nusiz(), 0x03);
    }

    #[test]
    fn test_pixels_follow_position() {
        let mut p0 = Player::new(PlayerId::P0);
        p0.motion_mut().set_pos(100);
        write(&mut p0, GRP0, 0x81);
        assert_eq!(lit(&mut p0), vec![100, 107]);
    }

    #[test]
    fn test_reset_classification_sets_suppress() {
        let t = tables();
        let mut p0 = Player::new(PlayerId::P0);
        write(&mut p0, NUSIZ0, 0x03);
        write(&mut p0, GRP0, 0xFF);

        // Reset at hpos 20 lands on 25, in the gap of copies drawn from 3
        let timing = FrameTiming {
            hpos: 20,
            ..FrameTiming::default()
        };
        let (newx, when) = p0.plan_reset(&timing, t).unwrap();
        assert_eq!(newx, 25);
        assert_eq!(when, ResetTiming::Display);
        p0.commit_reset(newx, when);
        assert!(p0.suppress());
        assert_eq!(p0.motion().pos(), 25);

        // First copy hidden for the rest of this line
        let pixels = lit(&mut p0);
        assert!(!pixels.contains(&25));
        assert!(pixels.contains(&41));
        assert!(pixels.contains(&57));

        // Same position again is not a reset at all
        assert!(p0.plan_reset(&timing, t).is_none());
    }

    #[test]
    fn test_hmove_clears_suppress() {
        let mut p0 = Player::new(PlayerId::P0);
        p0.commit_reset(40, ResetTiming::Gap);
        assert!(p0.suppress());
        let timing = FrameTiming {
            hpos: -60,
            ..FrameTiming::default()
        };
        p0.write_register(HMOVE, 0, &timing, tables());
        assert!(!p0.suppress());
    }

    #[test]
    fn test_reset_restores_power_on_state() {
        let mut p1 = Player::new(PlayerId::P1);
        write(&mut p1, GRP1, 0xFF);
        write(&mut p1, HMP1, 0x70);
        p1.reset();
        assert_eq!(p1.current_grp(), 0);
        assert_eq!(p1.motion().hm(), 0);
        assert_eq!(p1.id(), PlayerId::P1);
    }
}

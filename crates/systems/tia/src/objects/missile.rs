use serde::{Deserialize, Serialize};

use crate::clock::wrap_pos;
use crate::registers::{write::*, TiaBit};
use crate::tables::TiaTables;

use super::{FrameTiming, Moveable, Motion, PixelEnabled, PlayerId, RegisterWritable, Resettable};

struct MissileRegisters {
    enam: u8,
    nusiz: u8,
    hm: u8,
    res: u8,
}

/// A 1, 2, 4 or 8 pixel line that follows its player's NUSIZ copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    owner: PlayerId,
    motion: Motion,
    enable: bool,
    nusiz: u8,
    size: u8,
    /// Locked to the owner's center (RESMPx)
    resmp: bool,
    /// `None` while the missile is hidden for the whole line
    #[serde(skip)]
    mask_row: Option<usize>,
}

impl Missile {
    pub fn new(owner: PlayerId) -> Self {
        Self {
            owner,
            motion: Motion::default(),
            enable: false,
            nusiz: 0,
            size: 0,
            resmp: false,
            mask_row: None,
        }
    }

    fn registers(&self) -> MissileRegisters {
        match self.owner {
            PlayerId::P0 => MissileRegisters {
                enam: ENAM0,
                nusiz: NUSIZ0,
                hm: HMM0,
                res: RESM0,
            },
            PlayerId::P1 => MissileRegisters {
                enam: ENAM1,
                nusiz: NUSIZ1,
                hm: HMM1,
                res: RESM1,
            },
        }
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn enable(&self) -> bool {
        self.enable
    }

    pub fn nusiz(&self) -> u8 {
        self.nusiz
    }

    /// Width code, 0..=3 for 1, 2, 4 and 8 pixels
    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn resmp(&self) -> bool {
        self.resmp
    }

    /// RESMPx write. Clearing the lock drops the missile onto the middle of
    /// the owner's first copy, adjusted for motion ticks still pending on
    /// either object.
    pub fn write_resmp(&mut self, value: u8, player: &Motion, timing: &FrameTiming) {
        let lock = value & 0x02 != 0;
        if self.resmp && !lock {
            let middle = match self.nusiz & 0x07 {
                5 => 8,
                7 => 16,
                _ => 4,
            };
            let mut pos = player.pos() + middle;
            if timing.current_hmove.is_some() {
                pos -= 8 - player.motion_clock();
                pos += 8 - self.motion.motion_clock();
            }
            self.motion.set_pos(wrap_pos(pos));
        }
        self.resmp = lock;
    }
}

impl Resettable for Missile {
    fn reset(&mut self) {
        *self = Missile::new(self.owner);
    }
}

impl RegisterWritable for Missile {
    fn write_register(&mut self, addr: u8, value: u8, timing: &FrameTiming, _tables: &TiaTables) {
        let regs = self.registers();
        match addr {
            a if a == regs.enam => self.enable = value & 0x02 != 0,
            a if a == regs.nusiz => {
                self.nusiz = value;
                self.size = (value & 0x30) >> 4;
            }
            a if a == regs.hm => self.motion.write_hm(value, timing),
            a if a == regs.res => {
                let newx = self.reset_target(timing);
                self.motion.set_pos(newx);
            }
            HMCLR => self.motion.write_hm(0, timing),
            HMOVE => self.motion.hmove(timing.hpos),
            _ => {}
        }
    }
}

impl Moveable for Missile {
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
        if hpos < -1 {
            2
        } else {
            (hpos + 4) % 160
        }
    }
}

impl PixelEnabled for Missile {
    fn bit(&self) -> TiaBit {
        match self.owner {
            PlayerId::P0 => TiaBit::M0,
            PlayerId::P1 => TiaBit::M1,
        }
    }

    fn update_mask(&mut self, tables: &TiaTables) {
        let pos = self.motion.pos();
        // A pending extra-motion latch stretches or hides the missile
        self.mask_row = if self.motion.more_motion_required() {
            match pos % 4 {
                3 => Some(tables.missile_row(pos - 1, self.nusiz, self.size | 1)),
                2 => None,
                _ => Some(tables.missile_row(pos, self.nusiz, self.size)),
            }
        } else {
            Some(tables.missile_row(pos, self.nusiz, self.size))
        };
    }

    #[inline]
    fn is_enabled_at(&self, tables: &TiaTables, hpos: usize) -> bool {
        if !self.enable || self.resmp {
            return false;
        }
        match self.mask_row {
            Some(row) => tables.missile_bit(row, hpos),
            None => false,
        }
    }
}

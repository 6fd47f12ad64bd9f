use serde::{Deserialize, Serialize};

use crate::registers::{write::*, TiaBit};
use crate::tables::TiaTables;

use super::{FrameTiming, PixelEnabled, RegisterWritable, Resettable};

/// The 20-bit low-resolution playfield.
///
/// PF0 bits 4-7 occupy bits 0-3, PF1 bits 4-11 and PF2 bits 12-19. Each bit
/// covers four pixels; the right half repeats or mirrors the left.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playfield {
    pf: u32,
    ctrlpf: u8,
    /// Score and priority bits of CTRLPF, shifted into the enable mask byte
    priority_and_score: u8,
    reflected: bool,
}

impl Playfield {
    pub fn pf(&self) -> u32 {
        self.pf
    }

    pub fn ctrlpf(&self) -> u8 {
        self.ctrlpf
    }

    #[inline]
    pub fn priority_and_score(&self) -> u8 {
        self.priority_and_score
    }

    pub fn reflected(&self) -> bool {
        self.reflected
    }
}

impl Resettable for Playfield {
    fn reset(&mut self) {
        *self = Playfield::default();
    }
}

impl RegisterWritable for Playfield {
    fn write_register(&mut self, addr: u8, value: u8, _timing: &FrameTiming, _tables: &TiaTables) {
        let value = value as u32;
        match addr {
            PF0 => self.pf = (self.pf & 0xFFFF0) | ((value >> 4) & 0x0F),
            PF1 => self.pf = (self.pf & 0xFF00F) | (value << 4),
            PF2 => self.pf = (self.pf & 0x00FFF) | (value << 12),
            CTRLPF => {
                self.ctrlpf = value as u8;
                self.priority_and_score = (self.ctrlpf & 0x06) << 5;
                self.reflected = self.ctrlpf & 0x01 != 0;
            }
            _ => {}
        }
    }
}

impl PixelEnabled for Playfield {
    fn bit(&self) -> TiaBit {
        TiaBit::PF
    }

    #[inline]
    fn is_enabled_at(&self, tables: &TiaTables, hpos: usize) -> bool {
        self.pf & tables.playfield_bit(self.reflected, hpos) != 0
    }
}

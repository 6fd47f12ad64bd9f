//! Debugger switches for hiding objects and masking collisions.

use crate::registers::TiaBit;

use super::Tia;

/// `mode` 0 and 1 force off and on; anything else flips `current`.
fn resolve(mode: u8, current: bool) -> bool {
    match mode {
        0 => false,
        1 => true,
        _ => !current,
    }
}

impl Tia {
    /// Show or hide one object. Returns whether it is now shown.
    pub fn toggle_bit(&mut self, bit: TiaBit, mode: u8) -> bool {
        let on = resolve(mode, self.enabled_objects & bit.mask() != 0);
        if on {
            self.enabled_objects |= bit.mask();
        } else {
            self.enabled_objects &= !bit.mask();
        }
        on
    }

    pub fn enable_bits(&mut self, on: bool) {
        for bit in TiaBit::ALL {
            self.toggle_bit(bit, on as u8);
        }
    }

    pub fn toggle_bits(&mut self) -> bool {
        self.bits_enabled = !self.bits_enabled;
        self.enable_bits(self.bits_enabled);
        self.bits_enabled
    }

    /// Include or exclude one object from collision detection. Returns
    /// whether its collisions are now latched.
    pub fn toggle_collision(&mut self, bit: TiaBit, mode: u8) -> bool {
        let mut enabled = (self.collision_enabled_mask >> 16) as u16;
        let on = resolve(mode, enabled & bit.mask() as u16 != 0);
        if on {
            enabled |= bit.mask() as u16;
        } else {
            enabled &= !(bit.mask() as u16);
        }

        let mask = TiaBit::ALL
            .iter()
            .filter(|b| enabled & b.mask() as u16 == 0)
            .fold(0xFFFF_u16, |mask, b| mask & !b.collision_pairs());
        self.collision_enabled_mask = (u32::from(enabled) << 16) | u32::from(mask);
        on
    }

    pub fn enable_collisions(&mut self, on: bool) {
        for bit in TiaBit::ALL {
            self.toggle_collision(bit, on as u8);
        }
    }

    pub fn toggle_collisions(&mut self) -> bool {
        self.collisions_enabled = !self.collisions_enabled;
        self.enable_collisions(self.collisions_enabled);
        self.collisions_enabled
    }

    pub fn toggle_hmove_blank(&mut self) -> bool {
        self.allow_hmove_blanks = !self.allow_hmove_blanks;
        self.allow_hmove_blanks
    }
}

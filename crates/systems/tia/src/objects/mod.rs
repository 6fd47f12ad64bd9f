//! The graphical objects. The background has no state beyond the COLUBK
//! palette slot, so it is not modeled here.
//!
//! Objects implement only the traits they need. Horizontal motion shared by
//! players, missiles and the ball lives in [`Motion`], which each of them
//! embeds. Nothing here holds a reference back to the chip: clock-dependent
//! operations receive a [`FrameTiming`] and the lookup tables as arguments.

mod ball;
mod missile;
mod motion;
mod player;
mod playfield;

pub use ball::Ball;
pub use missile::Missile;
pub use motion::Motion;
pub use player::{Player, PlayerId};
pub use playfield::Playfield;

use crate::registers::TiaBit;
use crate::tables::TiaTables;

/// Beam and HMOVE state at the moment of a register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTiming {
    /// Horizontal position; negative during HBLANK
    pub hpos: i32,
    /// hpos of an HMOVE strobed on this scanline that is still in effect
    pub current_hmove: Option<i32>,
    /// hpos of a late HMOVE from the previous scanline
    pub previous_hmove: Option<i32>,
}

pub trait Resettable {
    /// Return to power-on state
    fn reset(&mut self);
}

pub trait RegisterWritable {
    /// React to a write of `value` to register `addr` (already masked to
    /// `0x3F`). Registers the object does not care about are ignored.
    fn write_register(&mut self, addr: u8, value: u8, timing: &FrameTiming, tables: &TiaTables);
}

pub trait PixelEnabled {
    /// Bit this object sets in the per-pixel enable mask
    fn bit(&self) -> TiaBit;

    /// Recompute the mask row from the current position and size. Called
    /// before each run of visible pixels.
    fn update_mask(&mut self, _tables: &TiaTables) {}

    fn is_enabled_at(&self, tables: &TiaTables, hpos: usize) -> bool;

    #[inline]
    fn enable_bits(&self, tables: &TiaTables, hpos: usize) -> u8 {
        if self.is_enabled_at(tables, hpos) {
            self.bit().mask()
        } else {
            0
        }
    }
}

/// Objects with a position counter that RESxx, HMxx and HMOVE act on.
pub trait Moveable {
    fn motion(&self) -> &Motion;

    fn motion_mut(&mut self) -> &mut Motion;

    /// Position a reset lands on while an HMOVE is in progress
    fn active_hpos(&self, hpos: i32) -> i32;

    /// Position a reset lands on otherwise
    fn previous_hpos(&self, hpos: i32) -> i32;

    /// Where a reset strobed now would put the object
    fn reset_target(&self, timing: &FrameTiming) -> i32 {
        self.motion().reset_target(
            timing,
            self.active_hpos(timing.hpos),
            self.previous_hpos(timing.hpos),
        )
    }

    /// Carry HMOVE work over a scanline boundary
    fn handle_pending_motions(&mut self, current_hmove: Option<i32>) {
        self.motion_mut().pending_motions(current_hmove);
    }
}

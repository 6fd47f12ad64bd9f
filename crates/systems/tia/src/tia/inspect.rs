//! Read-only views for debuggers, frontends and tests.

use crate::clock::SCANLINE_PIXELS;
use crate::objects::{Ball, Missile, Player, PlayerId, Playfield};
use crate::registers::ColorIndex;

use super::Tia;

impl Tia {
    pub fn player(&self, id: PlayerId) -> &Player {
        match id {
            PlayerId::P0 => &self.player0,
            PlayerId::P1 => &self.player1,
        }
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        match id {
            PlayerId::P0 => &mut self.player0,
            PlayerId::P1 => &mut self.player1,
        }
    }

    pub fn player0(&self) -> &Player {
        &self.player0
    }

    pub fn player1(&self) -> &Player {
        &self.player1
    }

    pub fn missile0(&self) -> &Missile {
        &self.missile0
    }

    pub fn missile1(&self) -> &Missile {
        &self.missile1
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    /// Color register value, as written (low bit cleared unless color loss
    /// is active)
    pub fn color(&self, index: ColorIndex) -> u8 {
        self.colors[index as usize]
    }

    /// Latched collision pairs, before debugger masking
    pub fn collision(&self) -> u16 {
        self.collision
    }

    pub fn collision_enabled_mask(&self) -> u32 {
        self.collision_enabled_mask
    }

    pub fn enabled_objects(&self) -> u8 {
        self.enabled_objects
    }

    pub fn vsync(&self) -> u8 {
        self.vsync
    }

    pub fn vblank(&self) -> u8 {
        self.vblank
    }

    pub fn audc(&self) -> [u8; 2] {
        self.audc
    }

    pub fn audf(&self) -> [u8; 2] {
        self.audf
    }

    pub fn audv(&self) -> [u8; 2] {
        self.audv
    }

    pub fn inpt4(&self) -> u8 {
        self.inpt4
    }

    pub fn inpt5(&self) -> u8 {
        self.inpt5
    }

    pub fn current_hmove(&self) -> Option<i32> {
        self.current_hmove
    }

    pub fn previous_hmove(&self) -> Option<i32> {
        self.previous_hmove
    }

    pub fn hmove_blank(&self) -> bool {
        self.hmove_blank
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn pal_frame_counter(&self) -> u32 {
        self.pal_frame_counter
    }

    /// Visible window of the frame being drawn, `width() * height()` bytes
    /// of palette indices
    pub fn current_frame_buffer(&self) -> &[u8] {
        self.visible(&self.current_frame)
    }

    /// Visible window of the last completed frame
    pub fn previous_frame_buffer(&self) -> &[u8] {
        self.visible(&self.previous_frame)
    }

    fn visible<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        let start = self.frame_pointer_offset.min(buffer.len());
        let end = (start + self.width() as usize * self.height as usize).min(buffer.len());
        &buffer[start..end]
    }

    pub fn width(&self) -> u32 {
        SCANLINE_PIXELS as u32
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ystart(&self) -> u32 {
        self.ystart
    }

    pub fn scanline_count_last_frame(&self) -> u32 {
        self.scanline_count_last_frame
    }

    /// Whether a frame is in progress (the CPU stopped before VSYNC)
    pub fn partial_frame(&self) -> bool {
        self.partial_frame
    }

    pub fn framerate(&self) -> f32 {
        self.framerate
    }

    pub fn max_scanlines(&self) -> u32 {
        self.max_scanlines
    }
}

//! The TIA chip: object state, global registers, framebuffers and the
//! priority encoder. Register access lives in `access`, the renderer in
//! `render`, frame bookkeeping in `frame` and save states in `state`.

mod access;
mod frame;
mod inspect;
mod render;
mod state;
mod toggles;

use rand::rngs::StdRng;
use rand::SeedableRng;

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::clock::{color_clock, BeamPosition, BUFFER_LINES, BUFFER_SIZE, SCANLINE_CLOCKS};
use crate::config::TiaConfig;
use crate::host::{TiaHost, TiaSound};
use crate::objects::{Ball, FrameTiming, Missile, Player, PlayerId, Playfield, Resettable};
use crate::registers::ColorIndex;
use crate::tables::{tables, TiaTables};

/// NTSC frames halt the CPU after this many scanlines without VSYNC
const NTSC_MAX_SCANLINES: u32 = 290;
/// PAL frames halt the CPU after this many scanlines without VSYNC
const PAL_MAX_SCANLINES: u32 = 342;

/// Debug palettes, indexed by [`ColorIndex`]
const NTSC_FIXED_COLORS: [u8; 8] = [0x30, 0x16, 0x76, 0x0a, 0x38, 0x12, 0x7e, 0x0e];
const PAL_FIXED_COLORS: [u8; 8] = [0x62, 0x26, 0xd8, 0x1c, 0x68, 0x2e, 0xde, 0x0e];

pub struct Tia {
    config: TiaConfig,
    tables: &'static TiaTables,
    sound: Box<dyn TiaSound>,
    rng: StdRng,

    // Color clocks, relative to the host's cycle counter times three
    frame_start: i32,
    clock_start_display: i32,
    clock_stop_display: i32,
    clock_last_update: i32,
    clocks_to_end_of_scanline: i32,
    vsync_finish_clock: Option<i32>,
    stop_display_offset: i32,

    ystart: u32,
    height: u32,
    max_scanlines: u32,
    scanline_count_last_frame: u32,
    /// Scanline at which VBLANK was first released this frame
    start_scanline: u32,
    partial_frame: bool,
    autoframe: bool,
    framerate: f32,
    color_loss: bool,

    current_frame: Vec<u8>,
    previous_frame: Vec<u8>,
    /// Next pixel written in `current_frame`
    frame_pointer: usize,
    /// Pixels written since the frame started
    frame_pointer_clocks: u32,
    /// First pixel exposed to the outside (`ystart` lines in)
    frame_pointer_offset: usize,

    /// Objects drawn at all; a cleared bit hides the object and its collisions
    enabled_objects: u8,
    bits_enabled: bool,
    collisions_enabled: bool,
    allow_hmove_blanks: bool,
    fixed_colors: bool,

    vsync: u8,
    vblank: u8,
    colors: [u8; 8],
    fixed_palette: [u8; 8],
    /// Color slot per `[screen half][enable bits | priority and score]`
    priority_encoder: [[u8; 256]; 2],

    collision: u16,
    /// High half: objects taking part in collisions. Low half: pair bits latched.
    collision_enabled_mask: u32,

    dump_enabled: bool,
    dump_disabled_cycle: i64,
    inpt4: u8,
    inpt5: u8,
    tia_driven: bool,

    audc: [u8; 2],
    audf: [u8; 2],
    audv: [u8; 2],

    current_hmove: Option<i32>,
    previous_hmove: Option<i32>,
    hmove_blank: bool,

    frame_counter: u32,
    pal_frame_counter: u32,

    playfield: Playfield,
    player0: Player,
    player1: Player,
    missile0: Missile,
    missile1: Missile,
    ball: Ball,
}

impl Tia {
    /// Build a TIA in its power-on state, as if reset at cycle 0.
    pub fn new(config: TiaConfig, sound: Box<dyn TiaSound>) -> Self {
        let mut tia = Self {
            config,
            tables: tables(),
            sound,
            rng: StdRng::from_entropy(),
            frame_start: 0,
            clock_start_display: 0,
            clock_stop_display: 0,
            clock_last_update: 0,
            clocks_to_end_of_scanline: SCANLINE_CLOCKS,
            vsync_finish_clock: None,
            stop_display_offset: 0,
            ystart: 0,
            height: 0,
            max_scanlines: NTSC_MAX_SCANLINES,
            scanline_count_last_frame: 0,
            start_scanline: 0,
            partial_frame: false,
            autoframe: true,
            framerate: 60.0,
            color_loss: false,
            current_frame: vec![0; BUFFER_SIZE],
            previous_frame: vec![0; BUFFER_SIZE],
            frame_pointer: 0,
            frame_pointer_clocks: 0,
            frame_pointer_offset: 0,
            enabled_objects: 0xFF,
            bits_enabled: true,
            collisions_enabled: true,
            allow_hmove_blanks: true,
            fixed_colors: false,
            vsync: 0,
            vblank: 0,
            colors: [0; 8],
            fixed_palette: NTSC_FIXED_COLORS,
            priority_encoder: [[0; 256]; 2],
            collision: 0,
            collision_enabled_mask: 0xFFFF_FFFF,
            dump_enabled: false,
            dump_disabled_cycle: 0,
            inpt4: 0x80,
            inpt5: 0x80,
            tia_driven: false,
            audc: [0; 2],
            audf: [0; 2],
            audv: [0; 2],
            current_hmove: None,
            previous_hmove: None,
            hmove_blank: false,
            frame_counter: 0,
            pal_frame_counter: 0,
            playfield: Playfield::default(),
            player0: Player::new(PlayerId::P0),
            player1: Player::new(PlayerId::P1),
            missile0: Missile::new(PlayerId::P0),
            missile1: Missile::new(PlayerId::P1),
            ball: Ball::default(),
        };
        tia.reset_at(0);
        tia
    }

    /// Seed the generator used for undriven data-bus bits
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &TiaConfig {
        &self.config
    }

    /// Replace the settings; they take effect on the next reset or frame reset.
    pub fn set_config(&mut self, config: TiaConfig) {
        self.config = config;
    }

    /// Power-on reset
    pub fn reset(&mut self, host: &impl TiaHost) {
        self.reset_at(host.cycles());
    }

    fn reset_at(&mut self, cycles: u32) {
        self.sound.reset();

        self.enabled_objects = 0xFF;
        self.allow_hmove_blanks = self.config.hmove_blanks;

        self.vsync = 0;
        self.vblank = 0;
        self.colors = [0; 8];

        self.collision = 0;
        self.collision_enabled_mask = 0xFFFF_FFFF;

        self.current_hmove = None;
        self.previous_hmove = None;
        self.hmove_blank = false;

        self.enable_bits(true);

        self.dump_enabled = false;
        self.dump_disabled_cycle = 0;
        self.inpt4 = 0x80;
        self.inpt5 = 0x80;
        self.tia_driven = self.config.tia_driven;

        self.audc = [0; 2];
        self.audf = [0; 2];
        self.audv = [0; 2];

        self.frame_counter = 0;
        self.pal_frame_counter = 0;
        self.scanline_count_last_frame = 0;

        self.playfield.reset();
        self.player0.reset();
        self.player1.reset();
        self.missile0.reset();
        self.missile1.reset();
        self.ball.reset();

        self.toggle_fixed_colors(0);
        self.frame_reset_at(cycles);
    }

    /// Recompute the display geometry and palette from the settings and
    /// start drawing a fresh frame.
    pub fn frame_reset(&mut self, host: &impl TiaHost) {
        self.frame_reset_at(host.cycles());
    }

    fn frame_reset_at(&mut self, cycles: u32) {
        self.clear_buffers();
        self.frame_pointer = 0;

        let (ystart, height) = self.config.visible_window();
        self.ystart = ystart;
        self.height = height;
        self.frame_pointer_offset = 160 * ystart as usize;

        self.autoframe = self.config.autoframe();
        self.framerate = self.config.initial_framerate();

        let min_lines = if self.framerate > 55.0 {
            self.fixed_palette = NTSC_FIXED_COLORS;
            self.color_loss = false;
            self.max_scanlines = NTSC_MAX_SCANLINES;
            262
        } else {
            self.fixed_palette = PAL_FIXED_COLORS;
            self.color_loss = self.config.color_loss;
            self.max_scanlines = PAL_MAX_SCANLINES;
            312
        };
        let lines = (ystart + height).max(min_lines).min(BUFFER_LINES);
        self.stop_display_offset = SCANLINE_CLOCKS * lines as i32;

        self.frame_start = color_clock(cycles);
        self.clock_start_display = self.frame_start;
        self.clock_stop_display = self.frame_start + self.stop_display_offset;
        self.clock_last_update = self.frame_start;
        self.clocks_to_end_of_scanline = SCANLINE_CLOCKS;
        self.vsync_finish_clock = None;

        log(LogCategory::Render, LogLevel::Debug, || {
            format!(
                "TIA: display window lines {}..{}, drawing stops after {} lines",
                ystart,
                ystart + height,
                lines
            )
        });
    }

    /// Rebuild the priority encoder; `mode` 0/1 turns the debug palette
    /// off/on, anything else flips it. Returns whether it is on.
    pub fn toggle_fixed_colors(&mut self, mode: u8) -> bool {
        use crate::registers::{TiaBit, PRIORITY_BIT, SCORE_BIT};

        let on = match mode {
            0 => false,
            1 => true,
            _ => !self.fixed_colors,
        };
        self.fixed_colors = on;

        let has = |enabled: usize, bit: TiaBit| enabled & bit.mask() as usize != 0;
        for (half, encoder) in self.priority_encoder.iter_mut().enumerate() {
            for (enabled, slot) in encoder.iter_mut().enumerate() {
                let mut color = ColorIndex::BK;
                if enabled & PRIORITY_BIT as usize != 0 {
                    // PF/BL above P0/M0 above P1/M1
                    for (bit, index) in [
                        (TiaBit::M1, ColorIndex::M1),
                        (TiaBit::P1, ColorIndex::P1),
                        (TiaBit::M0, ColorIndex::M0),
                        (TiaBit::P0, ColorIndex::P0),
                        (TiaBit::BL, ColorIndex::BL),
                        (TiaBit::PF, ColorIndex::PF),
                    ] {
                        if has(enabled, bit) {
                            color = index;
                        }
                    }
                } else {
                    // P0/M0 above P1/M1 above PF/BL; score mode paints the
                    // playfield in the color of the player on that side
                    if has(enabled, TiaBit::BL) {
                        color = ColorIndex::BL;
                    }
                    if has(enabled, TiaBit::PF) {
                        color = if !on && enabled & SCORE_BIT as usize != 0 {
                            if half == 0 {
                                ColorIndex::P0
                            } else {
                                ColorIndex::P1
                            }
                        } else {
                            ColorIndex::PF
                        };
                    }
                    for (bit, index) in [
                        (TiaBit::M1, ColorIndex::M1),
                        (TiaBit::P1, ColorIndex::P1),
                        (TiaBit::M0, ColorIndex::M0),
                        (TiaBit::P0, ColorIndex::P0),
                    ] {
                        if has(enabled, bit) {
                            color = index;
                        }
                    }
                }
                *slot = color as u8;
            }
        }
        on
    }

    /// Palette in effect: the registers or the debug colors
    #[inline]
    fn palette(&self) -> &[u8; 8] {
        if self.fixed_colors {
            &self.fixed_palette
        } else {
            &self.colors
        }
    }

    fn beam(&self, clock: i32) -> BeamPosition {
        BeamPosition::at(clock, self.frame_start)
    }

    /// Timing context handed to the objects for a write at `clock`
    fn timing_at(&self, clock: i32) -> FrameTiming {
        FrameTiming {
            hpos: self.beam(clock).hpos(),
            current_hmove: self.current_hmove,
            previous_hmove: self.previous_hmove,
        }
    }
}

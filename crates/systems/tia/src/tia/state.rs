//! Save states and display snapshots.
//!
//! A save state captures everything the emulated program can observe. The
//! display snapshot is separate: it restores the picture shown while paused
//! or rewinding without touching chip state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::state::{load_block, save_block};
use emu_core::StateError;

use crate::clock::{BUFFER_LINES, BUFFER_SIZE, SCANLINE_CLOCKS, SCANLINE_PIXELS};
use crate::objects::{Ball, Missile, Moveable, Player, Playfield};

use super::Tia;

const STATE_DEVICE: &str = "TIA";
const STATE_VERSION: u32 = 1;
const DISPLAY_DEVICE: &str = "TIADisplay";
const DISPLAY_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TiaState {
    frame_start: i32,
    clock_start_display: i32,
    clock_stop_display: i32,
    clock_last_update: i32,
    clocks_to_end_of_scanline: i32,
    vsync_finish_clock: Option<i32>,
    stop_display_offset: i32,
    ystart: u32,
    height: u32,
    scanline_count_last_frame: u32,
    start_scanline: u32,
    partial_frame: bool,
    framerate: f32,
    frame_pointer: usize,
    frame_pointer_clocks: u32,

    enabled_objects: u8,
    vsync: u8,
    vblank: u8,
    audc: [u8; 2],
    audf: [u8; 2],
    audv: [u8; 2],

    colors: [u8; 8],

    collision: u16,
    collision_enabled_mask: u32,

    dump_enabled: bool,
    dump_disabled_cycle: i64,
    inpt4: u8,
    inpt5: u8,

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

    sound: Value,
}

fn check_range(
    field: &'static str,
    value: i64,
    range: std::ops::RangeInclusive<i64>,
) -> Result<(), StateError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(StateError::OutOfRange { field, value })
    }
}

impl TiaState {
    /// Reject values the renderer indexes with
    fn validate(&self) -> Result<(), StateError> {
        let last_pixel = SCANLINE_PIXELS as i64 - 1;
        let positions = [
            ("player0.pos", self.player0.motion().pos()),
            ("player1.pos", self.player1.motion().pos()),
            ("missile0.pos", self.missile0.motion().pos()),
            ("missile1.pos", self.missile1.motion().pos()),
            ("ball.pos", self.ball.motion().pos()),
        ];
        for (field, pos) in positions {
            check_range(field, pos as i64, 0..=last_pixel)?;
        }

        check_range(
            "clocks_to_end_of_scanline",
            self.clocks_to_end_of_scanline as i64,
            1..=SCANLINE_CLOCKS as i64,
        )?;
        check_range("frame_pointer", self.frame_pointer as i64, 0..=BUFFER_SIZE as i64)?;
        check_range(
            "ystart + height",
            self.ystart as i64 + self.height as i64,
            0..=BUFFER_LINES as i64,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DisplayState {
    partial_frame: bool,
    frame_pointer_clocks: u32,
    buffer: Vec<u8>,
}

impl Tia {
    pub fn save_state(&self) -> Result<Value, StateError> {
        let state = TiaState {
            frame_start: self.frame_start,
            clock_start_display: self.clock_start_display,
            clock_stop_display: self.clock_stop_display,
            clock_last_update: self.clock_last_update,
            clocks_to_end_of_scanline: self.clocks_to_end_of_scanline,
            vsync_finish_clock: self.vsync_finish_clock,
            stop_display_offset: self.stop_display_offset,
            ystart: self.ystart,
            height: self.height,
            scanline_count_last_frame: self.scanline_count_last_frame,
            start_scanline: self.start_scanline,
            partial_frame: self.partial_frame,
            framerate: self.framerate,
            frame_pointer: self.frame_pointer,
            frame_pointer_clocks: self.frame_pointer_clocks,
            enabled_objects: self.enabled_objects,
            vsync: self.vsync,
            vblank: self.vblank,
            audc: self.audc,
            audf: self.audf,
            audv: self.audv,
            colors: self.colors,
            collision: self.collision,
            collision_enabled_mask: self.collision_enabled_mask,
            dump_enabled: self.dump_enabled,
            dump_disabled_cycle: self.dump_disabled_cycle,
            inpt4: self.inpt4,
            inpt5: self.inpt5,
            current_hmove: self.current_hmove,
            previous_hmove: self.previous_hmove,
            hmove_blank: self.hmove_blank,
            frame_counter: self.frame_counter,
            pal_frame_counter: self.pal_frame_counter,
            playfield: self.playfield.clone(),
            player0: self.player0.clone(),
            player1: self.player1.clone(),
            missile0: self.missile0.clone(),
            missile1: self.missile1.clone(),
            ball: self.ball.clone(),
            sound: self.sound.save(),
        };
        save_block(STATE_DEVICE, STATE_VERSION, &state)
    }

    /// Restore a block written by [`Tia::save_state`]. Nothing changes unless
    /// the whole block decodes and every position and counter is in range.
    /// Debugger toggles come back switched off.
    pub fn load_state(&mut self, block: &Value) -> Result<(), StateError> {
        let result = load_block::<TiaState>(block, STATE_DEVICE, STATE_VERSION)
            .and_then(|state| {
                state.validate()?;
                self.sound.load(&state.sound)?;
                Ok(state)
            })
            .map(|state| self.apply_state(state));

        if let Err(e) = &result {
            log(LogCategory::State, LogLevel::Error, || {
                format!("TIA: failed to load state: {}", e)
            });
        }
        result
    }

    fn apply_state(&mut self, state: TiaState) {
        self.frame_start = state.frame_start;
        self.clock_start_display = state.clock_start_display;
        self.clock_stop_display = state.clock_stop_display;
        self.clock_last_update = state.clock_last_update;
        self.clocks_to_end_of_scanline = state.clocks_to_end_of_scanline;
        self.vsync_finish_clock = state.vsync_finish_clock;
        self.stop_display_offset = state.stop_display_offset;
        self.ystart = state.ystart;
        self.height = state.height;
        self.frame_pointer_offset = 160 * state.ystart as usize;
        self.scanline_count_last_frame = state.scanline_count_last_frame;
        self.start_scanline = state.start_scanline;
        self.partial_frame = state.partial_frame;
        self.framerate = state.framerate;
        self.frame_pointer = state.frame_pointer;
        self.frame_pointer_clocks = state.frame_pointer_clocks;

        self.enabled_objects = state.enabled_objects;
        self.vsync = state.vsync;
        self.vblank = state.vblank;
        self.audc = state.audc;
        self.audf = state.audf;
        self.audv = state.audv;

        self.colors = state.colors;

        self.collision = state.collision;
        self.collision_enabled_mask = state.collision_enabled_mask;

        self.dump_enabled = state.dump_enabled;
        self.dump_disabled_cycle = state.dump_disabled_cycle;
        self.inpt4 = state.inpt4;
        self.inpt5 = state.inpt5;

        self.current_hmove = state.current_hmove;
        self.previous_hmove = state.previous_hmove;
        self.hmove_blank = state.hmove_blank;

        self.frame_counter = state.frame_counter;
        self.pal_frame_counter = state.pal_frame_counter;

        self.playfield = state.playfield;
        self.player0 = state.player0;
        self.player1 = state.player1;
        self.missile0 = state.missile0;
        self.missile1 = state.missile1;
        self.ball = state.ball;

        self.enable_bits(true);
        self.toggle_fixed_colors(0);
        self.allow_hmove_blanks = true;

        log(LogCategory::State, LogLevel::Debug, || {
            format!("TIA: state loaded at frame {}", self.frame_counter)
        });
    }

    /// Snapshot of the frame being drawn
    pub fn save_display(&self) -> Result<Value, StateError> {
        let display = DisplayState {
            partial_frame: self.partial_frame,
            frame_pointer_clocks: self.frame_pointer_clocks,
            buffer: self.current_frame.clone(),
        };
        save_block(DISPLAY_DEVICE, DISPLAY_VERSION, &display)
    }

    /// Restore a snapshot into both buffers. A frame that was in progress
    /// resumes drawing where it stopped.
    pub fn load_display(&mut self, block: &Value) -> Result<(), StateError> {
        let display = load_block::<DisplayState>(block, DISPLAY_DEVICE, DISPLAY_VERSION)
            .and_then(|display| {
                if display.buffer.len() != BUFFER_SIZE {
                    return Err(StateError::SizeMismatch {
                        what: "framebuffer",
                        expected: BUFFER_SIZE,
                        found: display.buffer.len(),
                    });
                }
                check_range(
                    "frame_pointer_clocks",
                    display.frame_pointer_clocks as i64,
                    0..=BUFFER_SIZE as i64,
                )?;
                Ok(display)
            });
        let display = match display {
            Ok(display) => display,
            Err(e) => {
                log(LogCategory::State, LogLevel::Error, || {
                    format!("TIA: failed to load display: {}", e)
                });
                return Err(e);
            }
        };

        self.clear_buffers();
        self.current_frame.copy_from_slice(&display.buffer);
        self.previous_frame.copy_from_slice(&display.buffer);
        self.partial_frame = display.partial_frame;
        self.frame_pointer_clocks = display.frame_pointer_clocks;
        if self.partial_frame {
            self.frame_pointer = self.frame_pointer_clocks as usize;
        }
        Ok(())
    }
}

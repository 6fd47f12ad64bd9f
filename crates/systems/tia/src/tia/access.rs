//! Memory-mapped register access.
//!
//! Both directions first bring the picture up to date: a write only takes
//! effect after every pixel before its (delayed) clock has been drawn, and a
//! read sees collisions latched up to the current clock.

use rand::Rng;

use emu_core::logging::{log, LogCategory, LogLevel};

use crate::clock::{color_clock, PIXEL_CLOCKS, SCANLINE_CLOCKS, SCANLINE_CYCLES};
use crate::host::{AnalogPin, DigitalPin, Jack, TiaHost, MAXIMUM_RESISTANCE, MINIMUM_RESISTANCE};
use crate::objects::{FrameTiming, Moveable, PlayerId, RegisterWritable};
use crate::registers::{collision::READ_PAIRS, read, write::*, ColorIndex};
use crate::tables::ResetTiming;

use super::Tia;

/// Extra clocks a NUSIZx write waits before the new copies take effect
const NUSIZ_DELAY: i32 = 8;
/// Extra clocks drawn before a player reset during one of its copies
const RESET_DISPLAY_DELAY: i32 = 11;

impl Tia {
    /// CPU read of a TIA register. Only bits 6 and 7 are driven by the
    /// chip; the rest come from the data bus (or noise, with driven pins).
    pub fn peek(&mut self, host: &mut impl TiaHost, addr: u16) -> u8 {
        self.update_frame(color_clock(host.cycles()));

        let bus = if self.tia_driven {
            self.rng.gen::<u8>()
        } else {
            host.data_bus_state()
        };
        let value = bus & 0x3F;
        let collision = self.collision & self.collision_enabled_mask as u16;

        let reg = (addr & 0x0F) as u8;
        match reg {
            read::CXM0P..=read::CXPPMM => {
                let (high, low) = READ_PAIRS[reg as usize];
                let mut bits = 0;
                if collision & high != 0 {
                    bits |= 0x80;
                }
                if collision & low != 0 {
                    bits |= 0x40;
                }
                value | bits
            }
            read::INPT0 => value | self.dumped_input_port(host, Jack::Left, AnalogPin::Nine),
            read::INPT1 => value | self.dumped_input_port(host, Jack::Left, AnalogPin::Five),
            read::INPT2 => value | self.dumped_input_port(host, Jack::Right, AnalogPin::Nine),
            read::INPT3 => value | self.dumped_input_port(host, Jack::Right, AnalogPin::Five),
            read::INPT4 => {
                self.inpt4 = self.latched_button(host, Jack::Left, self.inpt4);
                value | self.inpt4
            }
            read::INPT5 => {
                self.inpt5 = self.latched_button(host, Jack::Right, self.inpt5);
                value | self.inpt5
            }
            _ => value,
        }
    }

    /// Paddle input: the pot charges a capacitor that VBLANK bit 7 dumps to
    /// ground; the pin reads high once enough time has passed since the dump
    /// was released.
    fn dumped_input_port(&self, host: &impl TiaHost, jack: Jack, pin: AnalogPin) -> u8 {
        let resistance = host.input().read_resistance(jack, pin);
        if resistance == MINIMUM_RESISTANCE {
            return 0x80;
        }
        if resistance == MAXIMUM_RESISTANCE || self.dump_enabled {
            return 0x00;
        }

        // 1.6 * 0.01e-6 * 228 / 3
        let needed = (1.216e-6
            * f64::from(resistance)
            * f64::from(self.scanline_count_last_frame)
            * f64::from(self.framerate)) as i64;
        let elapsed = i64::from(host.cycles()) - self.dump_disabled_cycle;
        if elapsed > needed {
            0x80
        } else {
            0x00
        }
    }

    /// Fire button: with VBLANK bit 6 set the latch can only fall
    fn latched_button(&self, host: &impl TiaHost, jack: Jack, latch: u8) -> u8 {
        let button = if host.input().read_digital(jack, DigitalPin::Six) {
            0x80
        } else {
            0x00
        };
        if self.vblank & 0x40 != 0 {
            if latch & button != latch {
                log(LogCategory::Input, LogLevel::Trace, || {
                    format!("TIA: fire button latched on {:?} jack", jack)
                });
            }
            latch & button
        } else {
            button
        }
    }

    /// CPU write to a TIA register
    pub fn poke(&mut self, host: &mut impl TiaHost, addr: u16, value: u8) {
        let addr = (addr & 0x3F) as u8;
        let clock = color_clock(host.cycles());
        let beam = self.beam(clock);

        let delay = self
            .tables
            .poke_delay(addr)
            .unwrap_or_else(|| self.tables.playfield_delay(beam.cycle()));
        self.update_frame(clock + delay);

        // No VSYNC in time: end the frame here
        if beam.scanline >= self.max_scanlines as i32 {
            if self.partial_frame {
                log(LogCategory::Frame, LogLevel::Warn, || {
                    format!(
                        "TIA: no VSYNC after {} scanlines, halting frame",
                        self.max_scanlines
                    )
                });
            }
            host.stop();
            self.partial_frame = false;
        }

        match addr {
            VSYNC => self.write_vsync(host, clock, value),
            VBLANK => self.write_vblank(host, value),
            WSYNC => {
                // The CPU only halts on a read cycle
                if host.last_access_was_read() {
                    self.wait_horizontal_sync(host);
                }
            }
            RSYNC => {}
            NUSIZ0 | NUSIZ1 => {
                self.update_frame(clock + NUSIZ_DELAY);
                let timing = self.timing_at(clock);
                self.write_objects(addr, value, &timing);
            }
            COLUP0 | COLUP1 | COLUPF | COLUBK => self.write_color(addr, value),
            RESP0 => self.reset_player(PlayerId::P0, clock),
            RESP1 => self.reset_player(PlayerId::P1, clock),
            RESMP0 => {
                let timing = self.timing_at(clock);
                self.missile0.write_resmp(value, self.player0.motion(), &timing);
            }
            RESMP1 => {
                let timing = self.timing_at(clock);
                self.missile1.write_resmp(value, self.player1.motion(), &timing);
            }
            HMOVE => self.strobe_hmove(clock),
            CXCLR => self.collision = 0,
            AUDC0 | AUDC1 => {
                self.audc[(addr - AUDC0) as usize] = value & 0x0F;
                self.sound.set(addr, value, host.cycles());
            }
            AUDF0 | AUDF1 => {
                self.audf[(addr - AUDF0) as usize] = value & 0x1F;
                self.sound.set(addr, value, host.cycles());
            }
            AUDV0 | AUDV1 => {
                self.audv[(addr - AUDV0) as usize] = value & 0x0F;
                self.sound.set(addr, value, host.cycles());
            }
            CTRLPF | REFP0 | REFP1 | PF0 | PF1 | PF2 | RESM0 | RESM1 | RESBL | GRP0 | GRP1
            | ENAM0 | ENAM1 | ENABL | HMP0 | HMP1 | HMM0 | HMM1 | HMBL | VDELP0 | VDELP1
            | VDELBL | HMCLR => {
                let timing = self.timing_at(clock);
                self.write_objects(addr, value, &timing);
            }
            _ => {
                log(LogCategory::Registers, LogLevel::Debug, || {
                    format!("TIA: write ${:02X} to unused register ${:02X}", value, addr)
                });
            }
        }
    }

    /// Hand a write to every object; each ignores registers it does not own.
    fn write_objects(&mut self, addr: u8, value: u8, timing: &FrameTiming) {
        let t = self.tables;
        self.playfield.write_register(addr, value, timing, t);
        self.player0.write_register(addr, value, timing, t);
        self.player1.write_register(addr, value, timing, t);
        self.missile0.write_register(addr, value, timing, t);
        self.missile1.write_register(addr, value, timing, t);
        self.ball.write_register(addr, value, timing, t);
    }

    fn write_vsync(&mut self, host: &mut impl TiaHost, clock: i32, value: u8) {
        self.vsync = value;
        if value & 0x02 != 0 {
            // Officially three lines, but plenty of games give only one
            self.vsync_finish_clock = Some(clock + SCANLINE_CLOCKS);
        } else if matches!(self.vsync_finish_clock, Some(finish) if clock >= finish) {
            self.vsync_finish_clock = None;
            host.stop();
            self.partial_frame = false;
        }
    }

    fn write_vblank(&mut self, host: &impl TiaHost, value: u8) {
        let old = self.vblank;
        if old & 0x80 == 0 && value & 0x80 != 0 {
            self.dump_enabled = true;
            log(LogCategory::Input, LogLevel::Trace, || {
                "TIA: paddle capacitors dumped to ground".to_string()
            });
        } else if old & 0x80 != 0 && value & 0x80 == 0 {
            self.dump_enabled = false;
            self.dump_disabled_cycle = i64::from(host.cycles());
            log(LogCategory::Input, LogLevel::Trace, || {
                format!("TIA: paddle dump released at cycle {}", host.cycles())
            });
        }

        if old & 0x40 == 0 {
            self.inpt4 = 0x80;
            self.inpt5 = 0x80;
        }

        if self.start_scanline == 0 && value & 0x10 == 0 {
            self.start_scanline = self.scanlines(host);
        }
        self.vblank = value;
    }

    /// Stall the CPU until the start of the next scanline
    fn wait_horizontal_sync(&self, host: &mut impl TiaHost) {
        let since_frame = i64::from(host.cycles()) - i64::from(self.frame_start / PIXEL_CLOCKS);
        let remaining = i64::from(SCANLINE_CYCLES) - since_frame.rem_euclid(i64::from(SCANLINE_CYCLES));
        if remaining < i64::from(SCANLINE_CYCLES) {
            host.increment_cycles(remaining as u32);
        }
    }

    fn write_color(&mut self, addr: u8, value: u8) {
        let mut color = value & 0xFE;
        if self.color_loss && self.scanline_count_last_frame & 0x01 != 0 {
            color |= 0x01;
        }
        let slots: &[ColorIndex] = match addr {
            COLUP0 => &[ColorIndex::P0, ColorIndex::M0],
            COLUP1 => &[ColorIndex::P1, ColorIndex::M1],
            COLUPF => &[ColorIndex::PF, ColorIndex::BL],
            _ => &[ColorIndex::BK],
        };
        for &slot in slots {
            self.colors[slot as usize] = color;
        }
    }

    /// RESPx: move the player to the beam, deciding whether its first copy
    /// still shows on this line.
    fn reset_player(&mut self, id: PlayerId, clock: i32) {
        let timing = self.timing_at(clock);
        let Some((newx, when)) = self.player(id).plan_reset(&timing, self.tables) else {
            return;
        };

        if when == ResetTiming::Display {
            self.update_frame(clock + RESET_DISPLAY_DELAY);
        }
        log(LogCategory::Motion, LogLevel::Trace, || {
            format!(
                "TIA: RESP{} at hpos {} moves player to {} ({:?})",
                id as u8, timing.hpos, newx, when
            )
        });
        self.player_mut(id).commit_reset(newx, when);
    }

    fn strobe_hmove(&mut self, clock: i32) {
        let beam = self.beam(clock);
        let hpos = beam.hpos();

        self.current_hmove = Some(hpos);
        self.hmove_blank =
            self.allow_hmove_blanks && self.tables.hmove_blank_enabled(beam.cycle());

        let timing = self.timing_at(clock);
        self.write_objects(HMOVE, 0, &timing);

        if (-5..97).contains(&hpos) {
            self.hmove_blank = false;
            self.current_hmove = None;
        }
        log(LogCategory::Motion, LogLevel::Trace, || {
            format!(
                "TIA: HMOVE at hpos {} (blank {})",
                hpos, self.hmove_blank
            )
        });
    }
}

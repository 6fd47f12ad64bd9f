//! Atari 2600 TIA (Television Interface Adaptor) video core.
//!
//! The TIA draws one scanline of 160 pixels per 76 CPU cycles from six
//! objects (two players, two missiles, the ball and the playfield) over a
//! background color. This crate emulates it at color-clock resolution,
//! including the HMOVE and RESxx timing quirks that games depend on.
//!
//! The chip is driven by its host:
//!
//! - [`Tia::update`] runs one frame, calling back into the host's CPU loop
//!   until VSYNC (or a runaway frame) stops it.
//! - [`Tia::peek`] and [`Tia::poke`] are the memory-mapped register reads and
//!   writes the CPU performs while it runs.
//! - The picture is rendered lazily; [`Tia::current_frame_buffer`] and
//!   [`Tia::previous_frame_buffer`] expose palette indices for the visible
//!   window.
//!
//! ```rust
//! use emu_tia::{HeadlessHost, NullSound, Tia, TiaConfig};
//!
//! let mut tia = Tia::new(TiaConfig::default(), Box::new(NullSound));
//! let mut host = HeadlessHost::new();
//! tia.poke(&mut host, 0x09, 0x1A); // COLUBK
//! host.at(76 * 40);
//! tia.update_frame(emu_tia::clock::color_clock(host.cycles));
//! assert_eq!(tia.current_frame_buffer()[0], 0x1A);
//! ```

#![allow(clippy::upper_case_acronyms)]

pub mod clock;
pub mod config;
pub mod host;
pub mod objects;
pub mod registers;
pub mod tables;
mod tia;

pub use config::{ConfigError, DisplayFormat, TiaConfig};
pub use emu_core::StateError;
pub use host::{
    AnalogPin, DigitalPin, FixedInputs, HeadlessHost, InputPorts, Jack, NullSound, TiaHost,
    TiaSound, MAXIMUM_RESISTANCE, MINIMUM_RESISTANCE,
};
pub use objects::PlayerId;
pub use registers::{ColorIndex, TiaBit};
pub use tia::Tia;

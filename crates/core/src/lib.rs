//! Core emulator infrastructure shared by device crates.
//!
//! - [`logging`]: per-category, rate-limited log output
//! - [`state`]: versioned, device-tagged save-state blocks

pub mod logging;
pub mod state;

pub use state::StateError;

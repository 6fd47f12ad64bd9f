//! Collaborators the TIA needs from the machine it is installed in.
//!
//! The chip never owns its host. Every operation that needs the CPU cycle
//! counter, the data bus or the controller ports takes a `&mut impl TiaHost`.

use serde_json::Value;

use emu_core::StateError;

/// Controller jack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jack {
    Left,
    Right,
}

/// Digital pins read by the TIA (the fire buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitalPin {
    Six,
}

/// Analog pins read by the TIA (the paddle pots)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogPin {
    Five,
    Nine,
}

/// Resistance of a pot turned fully to ground; the capacitor charges at once.
pub const MINIMUM_RESISTANCE: i32 = 0;
/// Resistance of a disconnected pot; the capacitor never charges.
pub const MAXIMUM_RESISTANCE: i32 = i32::MAX;

pub trait InputPorts {
    /// Level of a digital pin; `true` means high (button released).
    fn read_digital(&self, jack: Jack, pin: DigitalPin) -> bool;

    /// Effective resistance on an analog pin, between
    /// [`MINIMUM_RESISTANCE`] and [`MAXIMUM_RESISTANCE`].
    fn read_resistance(&self, jack: Jack, pin: AnalogPin) -> i32;
}

/// The CPU side of the machine.
pub trait TiaHost {
    /// CPU cycles since the counter was last reset
    fn cycles(&self) -> u32;

    /// Rewind the cycle counter to zero. Other devices on the bus must adjust
    /// their own cycle stamps; the TIA does so in [`crate::Tia::system_cycles_reset`].
    fn reset_cycles(&mut self);

    /// Stall the CPU (WSYNC)
    fn increment_cycles(&mut self, cycles: u32);

    /// Whether the bus cycle in progress is a read
    fn last_access_was_read(&self) -> bool;

    /// Last value seen on the data bus
    fn data_bus_state(&self) -> u8;

    /// Ask the CPU to stop executing at the next instruction boundary
    fn stop(&mut self);

    fn input(&self) -> &dyn InputPorts;
}

/// Audio generator fed by the AUDxx registers.
pub trait TiaSound {
    fn reset(&mut self);

    /// A register write stamped with the CPU cycle it happened on
    fn set(&mut self, addr: u8, value: u8, cycle: u32);

    /// Shift internal cycle stamps after the host rewinds its counter
    fn adjust_cycle_counter(&mut self, delta: i64);

    fn save(&self) -> Value;

    fn load(&mut self, state: &Value) -> Result<(), StateError>;
}

/// Sound sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSound;

impl TiaSound for NullSound {
    fn reset(&mut self) {}

    fn set(&mut self, _addr: u8, _value: u8, _cycle: u32) {}

    fn adjust_cycle_counter(&mut self, _delta: i64) {}

    fn save(&self) -> Value {
        Value::Null
    }

    fn load(&mut self, _state: &Value) -> Result<(), StateError> {
        Ok(())
    }
}

/// Controller ports with fixed levels
#[derive(Debug, Clone, Copy)]
pub struct FixedInputs {
    /// Fire button state per jack (`true` = pressed)
    pub pressed: [bool; 2],
    /// Pot resistance per jack, for pins five and nine
    pub resistance: [[i32; 2]; 2],
}

impl Default for FixedInputs {
    fn default() -> Self {
        Self {
            pressed: [false; 2],
            resistance: [[MAXIMUM_RESISTANCE; 2]; 2],
        }
    }
}

impl InputPorts for FixedInputs {
    fn read_digital(&self, jack: Jack, _pin: DigitalPin) -> bool {
        !self.pressed[jack as usize]
    }

    fn read_resistance(&self, jack: Jack, pin: AnalogPin) -> i32 {
        self.resistance[jack as usize][pin as usize]
    }
}

/// Minimal host: a cycle counter the caller advances by hand.
///
/// Useful for driving the chip from a script of register writes without a
/// CPU core, as the tests and benchmarks do.
#[derive(Debug, Default, Clone)]
pub struct HeadlessHost {
    pub cycles: u32,
    pub stopped: bool,
    pub last_access_read: bool,
    pub data_bus: u8,
    pub inputs: FixedInputs,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cycle counter to `cycles`
    pub fn at(&mut self, cycles: u32) -> &mut Self {
        self.cycles = cycles;
        self
    }
}

impl TiaHost for HeadlessHost {
    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn reset_cycles(&mut self) {
        self.cycles = 0;
    }

    fn increment_cycles(&mut self, cycles: u32) {
        self.cycles = self.cycles.wrapping_add(cycles);
    }

    fn last_access_was_read(&self) -> bool {
        self.last_access_read
    }

    fn data_bus_state(&self) -> u8 {
        self.data_bus
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn input(&self) -> &dyn InputPorts {
        &self.inputs
    }
}

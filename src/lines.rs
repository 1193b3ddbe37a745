//! Line control for the two bus wires.
//!
//! The bit-level engine only ever talks to a [`Lines`] implementation, so any
//! platform that can drive two pins and read one of them back can carry the
//! bus. [`OpenDrain`] covers the common case of two `embedded-hal` pins wired
//! open-drain with pull-ups.

use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Direction of the data line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// The master drives SDA
    Output,
    /// SDA is released so the peer can drive it
    Input,
}

/// Control over the SCL and SDA lines.
pub trait Lines {
    /// Error raised by the underlying pins
    type Error;

    /// Drive SCL high or low.
    fn set_clock_level(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive SDA high or low. Only has a visible effect in output direction.
    fn set_data_level(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Switch SDA between output and input.
    fn set_data_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Sample the current SDA level.
    fn read_data_level(&mut self) -> Result<bool, Self::Error>;

    /// One-time platform setup, called before the bus is brought to idle.
    fn configure(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Return both lines to their unconfigured state.
    fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Open-drain SCL/SDA pin pair.
///
/// Both pins must be configured as open-drain outputs with external pull-ups.
/// Switching SDA to input releases it high; the last requested output level
/// is re-applied when it is switched back to output.
pub struct OpenDrain<SCL, SDA> {
    scl: SCL,
    sda: SDA,
    direction: Direction,
    level: bool,
}

impl<SCL, SDA, E> OpenDrain<SCL, SDA>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
{
    /// Create instance
    pub fn new(scl: SCL, sda: SDA) -> Self {
        OpenDrain {
            scl,
            sda,
            direction: Direction::Output,
            level: true,
        }
    }

    /// Current direction of the data line.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Give back the pins.
    pub fn free(self) -> (SCL, SDA) {
        (self.scl, self.sda)
    }

    #[inline]
    fn drive_sda(&mut self, high: bool) -> Result<(), E> {
        if high {
            self.sda.set_high()
        } else {
            self.sda.set_low()
        }
    }
}

impl<SCL, SDA, E> Lines for OpenDrain<SCL, SDA>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
{
    type Error = E;

    fn set_clock_level(&mut self, high: bool) -> Result<(), E> {
        if high {
            self.scl.set_high()
        } else {
            self.scl.set_low()
        }
    }

    fn set_data_level(&mut self, high: bool) -> Result<(), E> {
        self.level = high;
        match self.direction {
            Direction::Output => self.drive_sda(high),
            Direction::Input => Ok(()),
        }
    }

    fn set_data_direction(&mut self, direction: Direction) -> Result<(), E> {
        self.direction = direction;
        match direction {
            Direction::Output => self.drive_sda(self.level),
            Direction::Input => self.sda.set_high(),
        }
    }

    fn read_data_level(&mut self) -> Result<bool, E> {
        self.sda.is_high()
    }

    fn release(&mut self) -> Result<(), E> {
        self.direction = Direction::Output;
        self.level = true;
        self.scl.set_high()?;
        self.sda.set_high()
    }
}

//! Bus handle and lifecycle.
//!
//! A [`Bus`] owns the two lines and the delay for as long as they are
//! configured for bit-banged I2C. Each handle is independent, so several
//! buses can coexist. A handle is not reentrant: transactions on one bus
//! must be serialized by the caller, which `&mut self` enforces within a
//! single thread.

use embedded_hal::blocking::delay::DelayUs;

use crate::device::Device;
use crate::engine::Engine;
use crate::error::Error;
use crate::lines::{Direction, Lines};
use crate::timing::Timing;

/// Bit banging I2C bus
pub struct Bus<L, D> {
    pub(crate) engine: Engine<L, D>,
}

impl<L, D, E> Bus<L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    /// Configure both lines as outputs and release them high, with the
    /// reference timing.
    pub fn init(lines: L, delay: D) -> Result<Self, Error<E>> {
        Self::init_with_timing(lines, delay, Timing::default())
    }

    /// Like [`init`](Self::init), with custom timing.
    pub fn init_with_timing(mut lines: L, delay: D, timing: Timing) -> Result<Self, Error<E>> {
        lines.configure().map_err(Error::Bus)?;
        lines
            .set_data_direction(Direction::Output)
            .map_err(Error::Bus)?;
        lines.set_data_level(true).map_err(Error::Bus)?;
        lines.set_clock_level(true).map_err(Error::Bus)?;

        trace!("bus idle");

        Ok(Bus {
            engine: Engine::new(lines, delay, timing),
        })
    }

    /// Release both lines and give back the lines and the delay.
    pub fn deinit(mut self) -> Result<(L, D), Error<E>> {
        self.engine.lines_mut().release().map_err(Error::Bus)?;

        trace!("bus released");

        Ok(self.engine.free())
    }

    /// Timing currently in use
    pub fn timing(&self) -> &Timing {
        self.engine.timing()
    }

    /// Replace the timing used by all following operations
    pub fn set_timing(&mut self, timing: Timing) {
        self.engine.set_timing(timing);
    }

    /// Direct access to the bit-level primitives, for sequences the register
    /// operations do not cover.
    ///
    /// Framing is then up to the caller: every [`Engine::start`] needs a
    /// matching [`Engine::stop`], except after [`Engine::wait_ack`] returns
    /// [`Acknowledge::Nack`](crate::engine::Acknowledge::Nack), which has
    /// already stopped the bus.
    pub fn engine(&mut self) -> &mut Engine<L, D> {
        &mut self.engine
    }

    /// Drive SCL to `high` without any framing.
    pub fn set_scl(&mut self, high: bool) -> Result<(), Error<E>> {
        self.engine.set_scl(high)
    }

    /// Switch SDA to output and drive it to `high` without any framing.
    pub fn set_sda(&mut self, high: bool) -> Result<(), Error<E>> {
        self.engine.set_sda(high)
    }

    /// Block for `ms` milliseconds on the bus delay.
    pub fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.engine.delay_us(1_000);
        }
    }

    /// Bind an 8-bit write address to this bus.
    pub fn device(&mut self, address: u8) -> Device<'_, L, D> {
        Device::new(self, address)
    }
}

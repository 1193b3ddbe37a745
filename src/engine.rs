/*!
  # Bit-level I2C engine

  Generates START/STOP conditions, shifts bytes out and in MSB first, answers
  received bytes with ACK/NACK and waits for the peer's acknowledge.

  Every transition is followed by a fixed delay taken from [`Timing`]:
  `settle_us` around START and STOP, `bit_us` around data bits and `ack_us`
  around acknowledge handling. The data line is only driven while the master
  sends (address, register and data bytes, ACK/NACK) and is switched to input
  before every read of the peer's bits.

  Clock stretching is not supported.
*/

use embedded_hal::blocking::delay::DelayUs;

use crate::error::Error;
use crate::lines::{Direction, Lines};
use crate::timing::Timing;

/// Outcome of a single acknowledge bit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Acknowledge {
    /// SDA was low during the acknowledge clock
    Ack,
    /// SDA stayed high
    Nack,
}

impl Acknowledge {
    /// `true` for [`Acknowledge::Ack`]
    pub fn is_ack(self) -> bool {
        self == Acknowledge::Ack
    }
}

/// Bit banging I2C engine
pub struct Engine<L, D> {
    lines: L,
    delay: D,
    timing: Timing,
}

impl<L, D, E> Engine<L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    /// Create instance. The lines are used as they are; see
    /// [`Bus::init`](crate::bus::Bus::init) for bringing the bus to idle.
    pub fn new(lines: L, delay: D, timing: Timing) -> Self {
        Engine {
            lines,
            delay,
            timing,
        }
    }

    /// Timing currently in use
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Replace the timing; takes effect from the next transition
    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
    }

    /// START condition: SDA falls while SCL is high, then SCL goes low.
    ///
    /// Also used as repeated START in the middle of a transaction.
    pub fn start(&mut self) -> Result<(), Error<E>> {
        let settle = self.timing.settle_us;

        self.sda_output()?;
        self.set_sda_high()?;
        self.set_scl_high()?;
        self.wait(settle);

        self.set_sda_low()?;
        self.wait(settle);

        self.set_scl_low()?;
        self.wait(settle);

        Ok(())
    }

    /// STOP condition: SDA rises while SCL is high.
    pub fn stop(&mut self) -> Result<(), Error<E>> {
        let settle = self.timing.settle_us;

        self.sda_output()?;
        self.set_sda_low()?;
        self.wait(settle);

        self.set_scl_high()?;
        self.wait(settle);

        self.set_sda_high()?;
        self.wait(settle);

        Ok(())
    }

    /// Shift `byte` out, most significant bit first.
    ///
    /// Must be followed by [`wait_ack`](Self::wait_ack).
    pub fn send_byte(&mut self, byte: u8) -> Result<(), Error<E>> {
        let hold = self.timing.bit_us;

        self.sda_output()?;
        self.set_scl_low()?;

        for bit_offset in 0..8 {
            let out_bit = (byte >> (7 - bit_offset)) & 0b1;
            self.lines.set_data_level(out_bit == 1).map_err(Error::Bus)?;
            self.wait(hold);

            self.set_scl_high()?;
            self.wait(hold);

            self.set_scl_low()?;
            self.wait(hold);
        }

        Ok(())
    }

    /// Clock the acknowledge bit and poll SDA for the peer pulling it low.
    ///
    /// SDA is sampled up to `ack_poll_limit` times, `ack_poll_us` apart. When
    /// the budget runs out with SDA still high, a STOP is issued before
    /// [`Acknowledge::Nack`] is returned, so the bus is idle again.
    pub fn wait_ack(&mut self) -> Result<Acknowledge, Error<E>> {
        let hold = self.timing.ack_us;
        let interval = self.timing.ack_poll_us;

        self.sda_input()?;
        self.set_sda_high()?;
        self.wait(hold);

        self.set_scl_high()?;
        self.wait(hold);

        for _ in 0..self.timing.ack_poll_limit {
            if !self.sda_is_high()? {
                self.set_scl_low()?;
                self.wait(hold);
                return Ok(Acknowledge::Ack);
            }
            self.wait(interval);
        }

        debug!(
            "no ack after {=u16} polls, stopping",
            self.timing.ack_poll_limit
        );
        self.stop()?;

        Ok(Acknowledge::Nack)
    }

    /// Shift a byte in, most significant bit first, then answer it with
    /// `reply`.
    pub fn read_byte(&mut self, reply: Acknowledge) -> Result<u8, Error<E>> {
        let hold = self.timing.bit_us;
        let mut byte: u8 = 0;

        self.sda_input()?;

        for _ in 0..8 {
            self.set_scl_low()?;
            self.wait(hold);

            self.set_scl_high()?;
            byte <<= 1;
            if self.sda_is_high()? {
                byte |= 1;
            }
            self.wait(hold);
        }

        match reply {
            Acknowledge::Ack => self.ack()?,
            Acknowledge::Nack => self.nack()?,
        }

        Ok(byte)
    }

    pub(crate) fn set_scl(&mut self, high: bool) -> Result<(), Error<E>> {
        self.lines.set_clock_level(high).map_err(Error::Bus)
    }

    pub(crate) fn set_sda(&mut self, high: bool) -> Result<(), Error<E>> {
        self.sda_output()?;
        self.lines.set_data_level(high).map_err(Error::Bus)
    }

    pub(crate) fn delay_us(&mut self, us: u32) {
        self.wait(us);
    }

    pub(crate) fn lines_mut(&mut self) -> &mut L {
        &mut self.lines
    }

    pub(crate) fn free(self) -> (L, D) {
        (self.lines, self.delay)
    }

    fn ack(&mut self) -> Result<(), Error<E>> {
        self.reply(false)
    }

    fn nack(&mut self) -> Result<(), Error<E>> {
        self.reply(true)
    }

    fn reply(&mut self, sda_high: bool) -> Result<(), Error<E>> {
        let hold = self.timing.ack_us;

        self.set_scl_low()?;
        self.wait(hold);

        self.sda_output()?;
        self.lines.set_data_level(sda_high).map_err(Error::Bus)?;
        self.wait(hold);

        self.set_scl_high()?;
        self.wait(hold);

        self.set_scl_low()?;
        self.wait(hold);

        Ok(())
    }

    #[inline]
    fn set_scl_high(&mut self) -> Result<(), Error<E>> {
        self.lines.set_clock_level(true).map_err(Error::Bus)
    }

    #[inline]
    fn set_scl_low(&mut self) -> Result<(), Error<E>> {
        self.lines.set_clock_level(false).map_err(Error::Bus)
    }

    #[inline]
    fn set_sda_high(&mut self) -> Result<(), Error<E>> {
        self.lines.set_data_level(true).map_err(Error::Bus)
    }

    #[inline]
    fn set_sda_low(&mut self) -> Result<(), Error<E>> {
        self.lines.set_data_level(false).map_err(Error::Bus)
    }

    #[inline]
    fn sda_output(&mut self) -> Result<(), Error<E>> {
        self.lines
            .set_data_direction(Direction::Output)
            .map_err(Error::Bus)
    }

    #[inline]
    fn sda_input(&mut self) -> Result<(), Error<E>> {
        self.lines
            .set_data_direction(Direction::Input)
            .map_err(Error::Bus)
    }

    #[inline]
    fn sda_is_high(&mut self) -> Result<bool, Error<E>> {
        self.lines.read_data_level().map_err(Error::Bus)
    }

    #[inline]
    fn wait(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

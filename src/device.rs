//! Address-bound handle for a single peer on a bus.

use embedded_hal::blocking::delay::DelayUs;

use crate::bus::Bus;
use crate::error::Error;
use crate::lines::Lines;

/// A peer at a fixed 8-bit write address, borrowing its bus.
///
/// This is what a sensor driver holds: the register operations without the
/// address argument, plus the millisecond delay drivers use between
/// commands.
pub struct Device<'a, L, D> {
    bus: &'a mut Bus<L, D>,
    address: u8,
}

impl<'a, L, D, E> Device<'a, L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    /// Create instance
    pub fn new(bus: &'a mut Bus<L, D>, address: u8) -> Self {
        Device { bus, address }
    }

    /// 8-bit write address of the peer.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// See [`Bus::write_command`]
    pub fn write_command(&mut self, buf: &[u8]) -> Result<(), Error<E>> {
        self.bus.write_command(self.address, buf)
    }

    /// See [`Bus::write`]
    pub fn write(&mut self, reg: u8, buf: &[u8]) -> Result<(), Error<E>> {
        self.bus.write(self.address, reg, buf)
    }

    /// See [`Bus::write_address16`]
    pub fn write_address16(&mut self, reg: u16, buf: &[u8]) -> Result<(), Error<E>> {
        self.bus.write_address16(self.address, reg, buf)
    }

    /// See [`Bus::read_command`]
    pub fn read_command(&mut self, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.bus.read_command(self.address, buf)
    }

    /// See [`Bus::read`]
    pub fn read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.bus.read(self.address, reg, buf)
    }

    /// See [`Bus::read_address16`]
    pub fn read_address16(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.bus.read_address16(self.address, reg, buf)
    }

    /// See [`Bus::delay_ms`]
    pub fn delay_ms(&mut self, ms: u32) {
        self.bus.delay_ms(ms);
    }
}

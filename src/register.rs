//! Register access protocol.
//!
//! Every operation is one transaction: START, the address byte, optional
//! register byte(s), the data phase, STOP. `addr` is always the 8-bit write
//! address; the read address is `addr + 1`.
//!
//! The first byte the peer does not acknowledge aborts the operation with
//! [`Error::NoAck`]. The engine has already issued the STOP by then, so the
//! bus is idle and the whole operation can be retried. A failing line aborts
//! with [`Error::Bus`] after one best-effort STOP. Received bytes are
//! acknowledged except the last one, which gets a NACK.

use embedded_hal::blocking::delay::DelayUs;

use crate::bus::Bus;
use crate::engine::Acknowledge;
use crate::error::Error;
use crate::lines::Lines;

impl<L, D, E> Bus<L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    /// Write `buf` to the device with no register phase.
    pub fn write_command(&mut self, addr: u8, buf: &[u8]) -> Result<(), Error<E>> {
        self.write_prefixed(addr, &[], buf)
    }

    /// Write `buf` starting at 8-bit register `reg`.
    pub fn write(&mut self, addr: u8, reg: u8, buf: &[u8]) -> Result<(), Error<E>> {
        self.write_prefixed(addr, &[reg], buf)
    }

    /// Write `buf` starting at 16-bit register `reg`, sent high byte first.
    pub fn write_address16(&mut self, addr: u8, reg: u16, buf: &[u8]) -> Result<(), Error<E>> {
        self.write_prefixed(addr, &reg.to_be_bytes(), buf)
    }

    /// Fill `buf` from 8-bit register `reg`.
    pub fn read(&mut self, addr: u8, reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.read_prefixed(addr, &[reg], buf)
    }

    /// Fill `buf` from 16-bit register `reg`, sent high byte first.
    pub fn read_address16(&mut self, addr: u8, reg: u16, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.read_prefixed(addr, &reg.to_be_bytes(), buf)
    }

    /// Fill `buf` straight after the read address, with no register phase.
    pub fn read_command(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.framed(|bus| {
            // ST
            bus.engine.start()?;

            // SAD + R
            bus.send_checked(read_address(addr))?;

            bus.receive(buf)?;

            // SP
            bus.engine.stop()
        })
    }

    pub(crate) fn write_prefixed(
        &mut self,
        addr: u8,
        prefix: &[u8],
        data: &[u8],
    ) -> Result<(), Error<E>> {
        self.framed(|bus| {
            // ST
            bus.engine.start()?;

            // SAD + W
            bus.send_checked(addr)?;

            // SUB, then data
            for byte in prefix.iter().chain(data) {
                bus.send_checked(*byte)?;
            }

            // SP
            bus.engine.stop()
        })
    }

    pub(crate) fn read_prefixed(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &mut [u8],
    ) -> Result<(), Error<E>> {
        self.framed(|bus| {
            // ST
            bus.engine.start()?;

            // SAD + W
            bus.send_checked(addr)?;

            // SUB
            for byte in prefix {
                bus.send_checked(*byte)?;
            }

            // SR
            bus.engine.start()?;

            // SAD + R
            bus.send_checked(read_address(addr))?;

            bus.receive(buf)?;

            // SP
            bus.engine.stop()
        })
    }

    /// Run one transaction. A line error part way through still gets a
    /// best-effort STOP; the line error is what gets reported. `NoAck` is
    /// passed through untouched since `wait_ack` has already stopped.
    fn framed<F>(&mut self, transaction: F) -> Result<(), Error<E>>
    where
        F: FnOnce(&mut Self) -> Result<(), Error<E>>,
    {
        match transaction(self) {
            Err(Error::Bus(e)) => {
                debug!("line error mid-transaction, stopping");
                self.engine.stop().ok();
                Err(Error::Bus(e))
            }
            result => result,
        }
    }

    fn send_checked(&mut self, byte: u8) -> Result<(), Error<E>> {
        self.engine.send_byte(byte)?;
        match self.engine.wait_ack()? {
            Acknowledge::Ack => Ok(()),
            Acknowledge::Nack => {
                debug!("byte {=u8:#04x} not acknowledged", byte);
                Err(Error::NoAck)
            }
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<(), Error<E>> {
        let last = buf.len().saturating_sub(1);
        for (i, slot) in buf.iter_mut().enumerate() {
            let reply = if i == last {
                Acknowledge::Nack
            } else {
                Acknowledge::Ack
            };
            *slot = self.engine.read_byte(reply)?;
        }
        Ok(())
    }
}

#[inline]
fn read_address(addr: u8) -> u8 {
    addr.wrapping_add(1)
}

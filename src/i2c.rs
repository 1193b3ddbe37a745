/*!
  # embedded-hal blocking I2C traits on a [`Bus`]

  The register operations take 8-bit write addresses. The `embedded-hal`
  traits take 7-bit addresses instead, so existing drivers can run on the
  bit-banged bus unchanged:

  ```ignore
    let lines = bitbang_iic::OpenDrain::new(scl, sda);
    let delay = bitbang_iic::CountDownDelay::new(tmr);
    let i2c = bitbang_iic::Bus::init(lines, delay)?;
    let mut sensor = Lm75::new(i2c, SlaveAddr::default());
    let temp = sensor.read_temperature()?;
  ```

  Unlike a hardware peripheral, an empty `write` or `read` still performs the
  address handshake, which makes it usable as a presence probe.
*/

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::{Read, Write, WriteRead};

use crate::bus::Bus;
use crate::error::Error;
use crate::lines::Lines;

#[inline]
fn write_address(addr: u8) -> u8 {
    debug_assert!(addr < 0x80, "7-bit address out of range");
    addr << 1
}

impl<L, D, E> Write for Bus<L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    type Error = Error<E>;

    fn write(&mut self, addr: u8, output: &[u8]) -> Result<(), Self::Error> {
        self.write_command(write_address(addr), output)
    }
}

impl<L, D, E> Read for Bus<L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    type Error = Error<E>;

    fn read(&mut self, addr: u8, input: &mut [u8]) -> Result<(), Self::Error> {
        self.read_command(write_address(addr), input)
    }
}

impl<L, D, E> WriteRead for Bus<L, D>
where
    L: Lines<Error = E>,
    D: DelayUs<u32>,
{
    type Error = Error<E>;

    fn write_read(&mut self, addr: u8, output: &[u8], input: &mut [u8]) -> Result<(), Self::Error> {
        if output.is_empty() {
            return self.read_command(write_address(addr), input);
        }

        self.read_prefixed(write_address(addr), output, input)
    }
}

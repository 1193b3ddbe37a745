//! A [bit banging] I2C master over two GPIO lines, with the register access
//! protocol sensor drivers expect on top of it.
//!
//! [bit banging]: https://en.wikipedia.org/wiki/Bit_banging
//!
//! The layers, from the bottom:
//!
//! - [`Lines`]: set SCL/SDA levels, switch SDA direction, read SDA back.
//!   [`OpenDrain`] implements it for any pair of `embedded-hal` pins.
//! - [`Engine`]: START/STOP, byte shift out/in, ACK/NACK and the bounded
//!   wait for the peer's acknowledge, all timed by [`Timing`].
//! - [`Bus`]: init/deinit and the register operations (`write_command`,
//!   `write`, `write_address16`, `read`, `read_address16`, `read_command`).
//!   It also implements the `embedded-hal` blocking I2C traits.
//!
//! The delay is any `embedded_hal::blocking::delay::DelayUs<u32>`;
//! [`CountDownDelay`] builds one from a count-down timer.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

pub mod bus;
pub mod device;
pub mod engine;
pub mod error;
pub mod i2c;
pub mod lines;
mod register;
pub mod timing;

pub use crate::bus::Bus;
pub use crate::device::Device;
pub use crate::engine::{Acknowledge, Engine};
pub use crate::error::Error;
pub use crate::lines::{Direction, Lines, OpenDrain};
pub use crate::timing::{CountDownDelay, Timing};

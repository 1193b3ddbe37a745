//! Error type shared by every bus operation.

use core::fmt;

/// I2C error
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Line control error, including configuration failures at init/deinit
    Bus(E),
    /// No ack received within the poll budget. The bus has already been stopped.
    NoAck,
}

impl<E> Error<E> {
    /// Whether the peer failed to acknowledge.
    pub fn is_no_ack(&self) -> bool {
        matches!(self, Error::NoAck)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "line control error: {:?}", e),
            Error::NoAck => f.write_str("no acknowledge from peer"),
        }
    }
}

//! Bus timing.
//!
//! Every step of the protocol is a fixed busy-wait rather than a measured
//! clock. The three delay bands and the acknowledge poll budget live in
//! [`Timing`] so they can be tuned to the instruction speed of the target.

use core::time::Duration;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::timer::CountDown;
use nb::block;

/// Settle time around START and STOP conditions, in µs.
pub const START_STOP_SETTLE_US: u32 = 15;
/// Hold time around each shifted bit, in µs.
pub const BIT_HOLD_US: u32 = 10;
/// Hold time around acknowledge handling, in µs.
pub const ACK_HOLD_US: u32 = 20;
/// Wait between two samples of SDA while polling for an acknowledge, in µs.
pub const ACK_POLL_INTERVAL_US: u32 = 20;
/// Maximum number of SDA samples while polling for an acknowledge.
pub const ACK_POLL_LIMIT: u16 = 500;

/// Delay bands and acknowledge budget used by the engine.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Delay between transitions of START and STOP
    pub settle_us: u32,
    /// Delay between transitions while shifting a byte in or out
    pub bit_us: u32,
    /// Delay between transitions of ACK/NACK and of the acknowledge wait
    pub ack_us: u32,
    /// Delay between two acknowledge samples
    pub ack_poll_us: u32,
    /// Number of acknowledge samples before giving up
    pub ack_poll_limit: u16,
}

impl Timing {
    /// Reference timing: 15/10/20 µs bands, 500 polls at 20 µs.
    pub const fn new() -> Self {
        Timing {
            settle_us: START_STOP_SETTLE_US,
            bit_us: BIT_HOLD_US,
            ack_us: ACK_HOLD_US,
            ack_poll_us: ACK_POLL_INTERVAL_US,
            ack_poll_limit: ACK_POLL_LIMIT,
        }
    }

    /// Override the START/STOP settle time.
    pub const fn with_settle_us(mut self, us: u32) -> Self {
        self.settle_us = us;
        self
    }

    /// Override the per-bit hold time.
    pub const fn with_bit_us(mut self, us: u32) -> Self {
        self.bit_us = us;
        self
    }

    /// Override the acknowledge hold time.
    pub const fn with_ack_us(mut self, us: u32) -> Self {
        self.ack_us = us;
        self
    }

    /// Override the acknowledge poll interval and sample budget.
    pub const fn with_ack_poll(mut self, interval_us: u32, limit: u16) -> Self {
        self.ack_poll_us = interval_us;
        self.ack_poll_limit = limit;
        self
    }

    /// Upper bound spent polling for a single acknowledge, in µs.
    pub fn ack_timeout_us(&self) -> u32 {
        self.ack_poll_us.saturating_mul(u32::from(self.ack_poll_limit))
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::new()
    }
}

/// Microsecond delay built on a count-down timer.
///
/// The timer is restarted for every delay and waited on until it expires.
pub struct CountDownDelay<T> {
    timer: T,
}

impl<T> CountDownDelay<T>
where
    T: CountDown,
    T::Time: From<Duration>,
{
    /// Create instance
    pub fn new(timer: T) -> Self {
        CountDownDelay { timer }
    }

    /// Give back the timer.
    pub fn free(self) -> T {
        self.timer
    }
}

impl<T> DelayUs<u32> for CountDownDelay<T>
where
    T: CountDown,
    T::Time: From<Duration>,
{
    fn delay_us(&mut self, us: u32) {
        if us == 0 {
            return;
        }
        self.timer.start(Duration::from_micros(u64::from(us)));
        block!(self.timer.wait()).ok();
    }
}

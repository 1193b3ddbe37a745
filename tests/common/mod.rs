//! Simulated I2C peer.
//!
//! Implements [`Lines`] and `DelayUs<u32>` on top of a register-memory device
//! that watches SCL/SDA edges the way real hardware would: START/STOP are
//! decoded from SDA changing while SCL is high, bits are sampled on SCL rising
//! edges and the peer only changes SDA while SCL is low.

#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::convert::Infallible;
use std::rc::Rc;

use bitbang_iic::{Bus, Direction, Lines, Timing};
use embedded_hal::blocking::delay::DelayUs;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Event {
    Start,
    Stop,
    /// Byte clocked in from the master, and whether the peer acknowledged it
    Received { byte: u8, acked: bool },
    /// Byte clocked out to the master, and whether the master acknowledged it
    Sent { byte: u8, acked: bool },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Phase {
    Idle,
    Receive,
    Transmit,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Expect {
    Address,
    Register(usize),
    Data,
}

pub struct Peer {
    /// 8-bit write address the peer answers to
    pub address: u8,
    /// Register address bytes following the write address
    pub register_width: usize,
    pub present: bool,
    /// Indices of received bytes (counted from the first one) to leave unacknowledged
    pub refuse: Vec<usize>,
    /// Number of acknowledge samples that still see SDA high before the peer pulls it low
    pub ack_after_polls: usize,
    pub memory: Vec<u8>,

    pub events: Vec<Event>,
    pub delays: Vec<u32>,
    pub ack_polls: usize,
    pub reads_while_output: usize,

    scl: bool,
    level: bool,
    direction: Direction,

    pull_low: bool,
    pending_ack: bool,
    slot_polls: usize,
    phase: Phase,
    expect: Expect,
    pointer: usize,
    received: usize,
    bits: u8,
    shift: u8,
    out: u8,
    ack_slot: bool,
    transmit_next: bool,
    master_acked: bool,
}

impl Peer {
    fn new(address: u8) -> Self {
        Peer {
            address,
            register_width: 1,
            present: true,
            refuse: Vec::new(),
            ack_after_polls: 0,
            memory: vec![0xFF; 0x1_0000],
            events: Vec::new(),
            delays: Vec::new(),
            ack_polls: 0,
            reads_while_output: 0,
            scl: true,
            level: true,
            direction: Direction::Input,
            pull_low: false,
            pending_ack: false,
            slot_polls: 0,
            phase: Phase::Idle,
            expect: Expect::Address,
            pointer: 0,
            received: 0,
            bits: 0,
            shift: 0,
            out: 0,
            ack_slot: false,
            transmit_next: false,
            master_acked: false,
        }
    }

    /// Level seen on the wire: low if either side pulls it low.
    pub fn sda(&self) -> bool {
        let master_low = self.direction == Direction::Output && !self.level;
        !(master_low || self.pull_low)
    }

    pub fn scl(&self) -> bool {
        self.scl
    }

    pub fn stops(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Stop).count()
    }

    /// Bytes clocked in from the master with the peer's answer.
    pub fn received(&self) -> Vec<(u8, bool)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                Event::Received { byte, acked } => Some((byte, acked)),
                _ => None,
            })
            .collect()
    }

    /// Bytes clocked out to the master with the master's answer.
    pub fn sent(&self) -> Vec<(u8, bool)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                Event::Sent { byte, acked } => Some((byte, acked)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.delays.clear();
        self.ack_polls = 0;
        self.reads_while_output = 0;
    }

    fn apply(&mut self, change: impl FnOnce(&mut Self)) {
        let (scl0, sda0) = (self.scl, self.sda());
        change(self);
        let (scl1, sda1) = (self.scl, self.sda());

        if scl0 && scl1 {
            if sda0 && !sda1 {
                self.on_start();
            } else if !sda0 && sda1 {
                self.on_stop();
            }
        } else if !scl0 && scl1 {
            self.on_rise();
        } else if scl0 && !scl1 {
            self.on_fall();
        }
    }

    fn on_start(&mut self) {
        self.events.push(Event::Start);
        self.phase = Phase::Receive;
        self.expect = Expect::Address;
        self.bits = 0;
        self.shift = 0;
        self.ack_slot = false;
        self.pull_low = false;
        self.pending_ack = false;
        self.transmit_next = false;
    }

    fn on_stop(&mut self) {
        self.events.push(Event::Stop);
        self.phase = Phase::Idle;
        self.ack_slot = false;
        self.pull_low = false;
        self.pending_ack = false;
    }

    fn on_rise(&mut self) {
        match self.phase {
            Phase::Receive => {
                if !self.ack_slot && self.bits < 8 {
                    self.shift = (self.shift << 1) | self.sda() as u8;
                    self.bits += 1;
                }
            }
            Phase::Transmit => {
                if self.ack_slot {
                    self.master_acked = !self.sda();
                } else {
                    self.bits += 1;
                }
            }
            Phase::Idle => {}
        }
    }

    fn on_fall(&mut self) {
        match self.phase {
            Phase::Receive => {
                if self.ack_slot {
                    self.pull_low = false;
                    self.pending_ack = false;
                    self.ack_slot = false;
                    self.bits = 0;
                    self.shift = 0;
                    if self.transmit_next {
                        self.transmit_next = false;
                        self.phase = Phase::Transmit;
                        self.load();
                    }
                } else if self.bits == 8 {
                    let byte = self.shift;
                    let acked = self.accept(byte);
                    self.events.push(Event::Received { byte, acked });
                    self.ack_slot = true;
                    if acked {
                        if self.ack_after_polls == 0 {
                            self.pull_low = true;
                        } else {
                            self.pending_ack = true;
                            self.slot_polls = 0;
                        }
                    }
                }
            }
            Phase::Transmit => {
                if self.ack_slot {
                    self.events.push(Event::Sent {
                        byte: self.out,
                        acked: self.master_acked,
                    });
                    self.ack_slot = false;
                    if self.master_acked {
                        self.load();
                    } else {
                        self.phase = Phase::Idle;
                        self.pull_low = false;
                    }
                } else if self.bits == 8 {
                    self.pull_low = false;
                    self.ack_slot = true;
                } else {
                    self.put_bit();
                }
            }
            Phase::Idle => {}
        }
    }

    fn accept(&mut self, byte: u8) -> bool {
        let index = self.received;
        self.received += 1;

        if !self.present || self.refuse.contains(&index) {
            return false;
        }

        let len = self.memory.len();
        match self.expect {
            Expect::Address => {
                if byte & 0xFE != self.address & 0xFE {
                    return false;
                }
                if byte & 1 == 1 {
                    self.transmit_next = true;
                } else if self.register_width == 0 {
                    self.expect = Expect::Data;
                } else {
                    self.expect = Expect::Register(0);
                }
            }
            Expect::Register(i) => {
                self.pointer = if i == 0 {
                    byte as usize
                } else {
                    ((self.pointer << 8) | byte as usize) % len
                };
                self.expect = if i + 1 < self.register_width {
                    Expect::Register(i + 1)
                } else {
                    Expect::Data
                };
            }
            Expect::Data => {
                self.memory[self.pointer] = byte;
                self.pointer = (self.pointer + 1) % len;
            }
        }
        true
    }

    fn load(&mut self) {
        self.out = self.memory[self.pointer];
        self.pointer = (self.pointer + 1) % self.memory.len();
        self.bits = 0;
        self.master_acked = false;
        self.put_bit();
    }

    fn put_bit(&mut self) {
        self.pull_low = (self.out >> (7 - self.bits)) & 1 == 0;
    }

    fn sample(&mut self) -> bool {
        if self.direction == Direction::Output {
            self.reads_while_output += 1;
        }
        if self.phase == Phase::Receive && self.ack_slot {
            self.ack_polls += 1;
        }
        if self.pending_ack {
            if self.slot_polls >= self.ack_after_polls {
                self.pull_low = true;
                self.pending_ack = false;
            } else {
                self.slot_polls += 1;
            }
        }
        self.sda()
    }
}

pub struct SimLines(Rc<RefCell<Peer>>);

impl Lines for SimLines {
    type Error = Infallible;

    fn set_clock_level(&mut self, high: bool) -> Result<(), Infallible> {
        self.0.borrow_mut().apply(|p| p.scl = high);
        Ok(())
    }

    fn set_data_level(&mut self, high: bool) -> Result<(), Infallible> {
        self.0.borrow_mut().apply(|p| p.level = high);
        Ok(())
    }

    fn set_data_direction(&mut self, direction: Direction) -> Result<(), Infallible> {
        self.0.borrow_mut().apply(|p| p.direction = direction);
        Ok(())
    }

    fn read_data_level(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().sample())
    }
}

pub struct SimDelay(Rc<RefCell<Peer>>);

impl DelayUs<u32> for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().delays.push(us);
    }
}

pub type SimBus = Bus<SimLines, SimDelay>;

/// A bus wired to one simulated peer.
pub struct Sim {
    peer: Rc<RefCell<Peer>>,
}

impl Sim {
    pub fn new(address: u8) -> Self {
        Sim {
            peer: Rc::new(RefCell::new(Peer::new(address))),
        }
    }

    pub fn peer(&self) -> RefMut<'_, Peer> {
        self.peer.borrow_mut()
    }

    pub fn lines(&self) -> SimLines {
        SimLines(self.peer.clone())
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.peer.clone())
    }

    /// Initialized bus with reference timing; init itself is not recorded.
    pub fn bus(&self) -> SimBus {
        self.bus_with_timing(Timing::default())
    }

    pub fn bus_with_timing(&self, timing: Timing) -> SimBus {
        let bus = Bus::init_with_timing(self.lines(), self.delay(), timing).unwrap();
        self.peer().clear();
        bus
    }

    pub fn events(&self) -> Vec<Event> {
        self.peer.borrow().events.clone()
    }
}

//! # Timer module
//!
//! Channel 0 of the 8253/8254 PIT drives IRQ 0 at `TICK_RATE_HZ`; the timer
//! interrupt counts the interrupts and the count gives the uptime.
//!
//! Channel 2 feeds the PC speaker and is programmed from the `speaker` module
//! through `set_speaker_frequency`.

use core::sync::atomic::{ AtomicU64, Ordering };
use x86_64::instructions::port::Port;

use crate::services::Clock;

/// Input clock of the PIT.
const PIT_FREQUENCY: u32 = 1_193_182;
/// Interrupts per second programmed into channel 0.
pub const TICK_RATE_HZ: u32 = 100;
/// Milliseconds between two timer interrupts.
pub const MS_PER_INTERRUPT: u64 = 1000 / TICK_RATE_HZ as u64;

const CHANNEL_0: u16 = 0x40;
const CHANNEL_2: u16 = 0x42;
const COMMAND: u16 = 0x43;

const BINARY_COUNTER: u8 = 0;
const RATE_GENERATOR_MODE: u8 = 2 << 1;
const SQUARE_WAVE_MODE: u8 = 3 << 1;
const ACCESS_LOBYTE_HIBYTE: u8 = 3 << 4;
const SELECT_CHANNEL_0: u8 = 0 << 6;
const SELECT_CHANNEL_2: u8 = 2 << 6;

static INTERRUPTS: AtomicU64 = AtomicU64::new(0);

/// Reload value for a channel so that it fires `frequency` times a second.
fn divisor(frequency: u32) -> u16 {
    let divisor = PIT_FREQUENCY / frequency.max(1);
    // 0 stands for 65536, the slowest rate.
    if divisor > (u16::MAX as u32) { 0 } else { divisor as u16 }
}

/// Programs channel 0 as a rate generator at `TICK_RATE_HZ`.
pub fn init() {
    let reload = divisor(TICK_RATE_HZ);
    let mut command = Port::<u8>::new(COMMAND);
    let mut channel = Port::<u8>::new(CHANNEL_0);
    unsafe {
        command.write(BINARY_COUNTER | RATE_GENERATOR_MODE | ACCESS_LOBYTE_HIBYTE | SELECT_CHANNEL_0);
        channel.write((reload & 0xff) as u8);
        channel.write((reload >> 8) as u8);
    }
}

/// Programs channel 2 to a square wave at `frequency` Hz.
pub fn set_speaker_frequency(frequency: u32) {
    let reload = divisor(frequency);
    let mut command = Port::<u8>::new(COMMAND);
    let mut channel = Port::<u8>::new(CHANNEL_2);
    unsafe {
        command.write(BINARY_COUNTER | SQUARE_WAVE_MODE | ACCESS_LOBYTE_HIBYTE | SELECT_CHANNEL_2);
        channel.write((reload & 0xff) as u8);
        channel.write((reload >> 8) as u8);
    }
}

/// Called from the timer interrupt handler.
///
/// *** MUST NOT BLOCK / ALLOCATE ***
pub(crate) fn tick() -> u64 {
    let interrupts = INTERRUPTS.fetch_add(1, Ordering::AcqRel) + 1;
    interrupts * MS_PER_INTERRUPT
}

/// Milliseconds since `init`.
pub fn uptime_ms() -> u64 {
    INTERRUPTS.load(Ordering::Acquire) * MS_PER_INTERRUPT
}

/// The uptime as a `Clock`, one tick per millisecond.
pub struct PitClock;

impl Clock for PitClock {
    fn now(&self) -> u64 {
        uptime_ms()
    }
}

#[test_case]
fn divisors_fit_the_counter() {
    assert_eq!(divisor(TICK_RATE_HZ), 11931);
    assert_eq!(divisor(440), 2711);
    assert_eq!(divisor(1), 0);
}

#[test_case]
fn uptime_moves_with_interrupts_enabled() {
    let clock = PitClock;
    let start = clock.now();
    while clock.now() == start {
        x86_64::instructions::hlt();
    }
    assert!(clock.now() > start);
    assert_eq!(clock.now() % MS_PER_INTERRUPT, 0);
}

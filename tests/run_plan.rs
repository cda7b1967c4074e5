//! # Full run integration test
//!
//! One pass of the runner over the kernel's own devices. Only the keyboard is
//! scripted, there is nobody to press keys under QEMU.

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(probe_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

extern crate alloc;

use alloc::{ string::{ String, ToString }, vec::Vec };
use bootloader::{ entry_point, BootInfo };
use core::fmt;
use core::panic::PanicInfo;
use probe_os::allocator::KernelHeap;
use probe_os::config::{ ProbeConfig, ProbeKind, RunPlan };
use probe_os::fs::RamFs;
use probe_os::probe::{ self, Console };
use probe_os::runner::{ RunState, Runner, START_BANNER, STOP_BANNER };
use probe_os::services::{ Devices, KeyEvent, KeySource };
use probe_os::speaker::{ self, Speaker };
use probe_os::timer::PitClock;
use probe_os::video::VgaDisplay;

entry_point!(main);

fn main(boot_info: &'static BootInfo) -> ! {
    probe_os::init();
    probe_os::init_heap(boot_info);

    test_main();
    loop {}
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    probe_os::test_panic_handler(info)
}

/// Keeps the printed lines.
struct Lines(Vec<String>);

impl Console for Lines {
    fn line(&mut self, args: fmt::Arguments) {
        self.0.push(args.to_string());
    }
}

struct Script(Vec<KeyEvent>);

impl KeySource for Script {
    fn next_key(&mut self) -> KeyEvent {
        self.0.remove(0)
    }
}

/// The default constants, with a tenth of the timer budget.
fn quick_config() -> ProbeConfig {
    ProbeConfig {
        tick_budget: 400,
        tick_interval: 100,
        sound_repeat: 1,
        ..ProbeConfig::default()
    }
}

#[test_case]
fn full_pass_on_kernel_devices() {
    let clock = PitClock;
    let mut keys = Script(alloc::vec![KeyEvent::Left, KeyEvent::Down, KeyEvent::Esc]);
    let mut files = RamFs::boot();
    let mut heap = KernelHeap::new();
    // Stays in text mode: the plan has no video probe.
    let mut video = VgaDisplay::new();
    let mut audio = Speaker::new(RamFs::boot());
    let mut devices = Devices {
        clock: &clock,
        keys: &mut keys,
        files: &mut files,
        heap: &mut heap,
        video: &mut video,
        audio: &mut audio,
    };
    let plan = RunPlan::new(&[
        ProbeKind::Filesystem,
        ProbeKind::Allocation,
        ProbeKind::Keyboard,
        ProbeKind::Timer,
        ProbeKind::Audio,
    ]);
    let mut console = Lines(Vec::new());
    let mut runner = Runner::new(plan, quick_config());

    assert_eq!(runner.run(&mut devices, &mut console), RunState::Idle);
    assert!(runner.outcomes().iter().all(|(_, outcome)| outcome.is_ok()));

    let lines = &console.0;
    assert_eq!(lines.first().map(String::as_str), Some(START_BANNER));
    assert_eq!(lines[1], "open(\"text.txt\") = 3");
    assert_eq!(lines[4], "read again: \"ello\"");
    assert!(lines[6].starts_with("malloc(8) = 0x"));
    assert_eq!(&lines[7..10], [probe::keyboard::BANNER, "Left!", "Down!"]);
    assert_eq!(&lines[10..13], ["1...", "2...", "3..."]);
    assert_eq!(lines.last().map(String::as_str), Some(STOP_BANNER));
    assert_eq!(lines.len(), 14);

    assert!(speaker::is_playing());
    audio.stop();
    assert_eq!(heap.live_blocks(), 0);
    assert_eq!(files.open_count(), 0);
}

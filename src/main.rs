#![no_std] // don't link the Rust standard library
#![no_main] // disable all Rust-level entry points
#![feature(custom_test_frameworks)] // Rust supports replacing the default test framework through the unstable custom_test_frameworks feature
#![test_runner(probe_os::test_runner)]
#![reexport_test_harness_main = "test_main"] // set the name of the test framework entry function to test_main

use core::panic::PanicInfo;
use bootloader::{ BootInfo, entry_point };
use probe_os::println;
use probe_os::allocator::KernelHeap;
use probe_os::config::{ ProbeConfig, RunPlan };
use probe_os::console::ScreenConsole;
use probe_os::fs::RamFs;
use probe_os::runner::Runner;
use probe_os::services::Devices;
use probe_os::speaker::Speaker;
use probe_os::task::keyboard::KeyboardSource;
use probe_os::timer::PitClock;
use probe_os::video::VgaDisplay;

// To make sure that the entry point function has always the correct signature
// that the bootloader expects, the `bootloader` crate provides an `entry_point`
// macro that provides a type-checked way to define a Rust function as the entry
// point.
entry_point!(kernel_main);

fn kernel_main(boot_info: &'static BootInfo) -> ! {
    probe_os::init();
    probe_os::init_heap(boot_info);

    // Call the renamed test framework entry function.
    #[cfg(test)] // use conditional compilation to add the call to `test_main` only in test contexts.
    test_main();

    let clock = PitClock;
    let mut keys = KeyboardSource::new();
    let mut files = RamFs::boot();
    let mut heap = KernelHeap::new();
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

    let mut console = ScreenConsole::new();
    let mut runner = Runner::new(RunPlan::from_features(), ProbeConfig::default());
    let state = runner.run(&mut devices, &mut console);
    log::info!("runner {:?} after {} lines", state, console.lines());

    // A looping melody keeps playing from the timer interrupt.
    probe_os::hlt_loop();
}

/// This function is called on panic.
#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    println!("{}", info);
    probe_os::serial_println!("{}", info);
    probe_os::hlt_loop();
}

/// Panic handler in test mode.
#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    probe_os::test_panic_handler(info)
}

#[test_case]
fn trivial_assertion() {
    assert_eq!(1, 1);
}

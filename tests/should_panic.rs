//! # Tests that should panic
//!
//! `#[should_panic]` needs the standard library, so this test binary runs
//! without a harness and reports success from its panic handler instead. Only
//! one such test fits in a binary: execution does not continue after the
//! panic handler.

#![no_std]
#![no_main]

use bootloader::{ entry_point, BootInfo };
use core::panic::PanicInfo;
use probe_os::task::keyboard::KeyboardSource;
use probe_os::{ QemuExitCode, exit_qemu, serial_println, serial_print };

entry_point!(main);

fn main(boot_info: &'static BootInfo) -> ! {
    probe_os::init();
    // The scancode queue lives on the heap.
    probe_os::init_heap(boot_info);

    second_keyboard_source();
    serial_println!("[test did not panic]");
    exit_qemu(QemuExitCode::Failed);
    loop {}
}

#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    serial_println!("[ok]");
    exit_qemu(QemuExitCode::Success);
    loop {}
}

/// There is one keyboard, so there can only be one source of its keys.
fn second_keyboard_source() {
    serial_print!("should_panic::second_keyboard_source...\t");
    let _first = KeyboardSource::new();
    let _second = KeyboardSource::new();
}

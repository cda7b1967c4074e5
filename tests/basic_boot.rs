#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(probe_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

use core::panic::PanicInfo;
use probe_os::console::ScreenConsole;
use probe_os::probe::Console;
use probe_os::println;

#[no_mangle] // don't mangle the name of this function
pub extern "C" fn _start() -> ! {
    test_main();

    loop {}
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    probe_os::test_panic_handler(info)
}

// Nothing is initialized here: no IDT, no heap, no logger. Panic messages and
// the first banner of a run go out through these paths, so they have to work
// right after booting.
#[test_case]
fn test_println() {
    println!("test_println output");
}

#[test_case]
fn console_works_before_init() {
    let mut console = ScreenConsole::new();
    console.line(format_args!("Start"));
    assert_eq!(console.lines(), 1);
}

#[test_case]
fn logging_before_init_is_dropped() {
    log::info!("nobody listens yet");
}

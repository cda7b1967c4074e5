//! # Console module
//!
//! The probe console of the kernel: every line goes to the screen and to the
//! serial port, the same bytes on both.

use core::fmt;

use crate::probe::Console;
use crate::{ println, serial_println };

pub struct ScreenConsole {
    lines: usize,
}

impl ScreenConsole {
    pub fn new() -> Self {
        ScreenConsole { lines: 0 }
    }

    /// Number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }
}

impl Console for ScreenConsole {
    fn line(&mut self, args: fmt::Arguments) {
        println!("{}", args);
        serial_println!("{}", args);
        self.lines += 1;
    }
}

#[test_case]
fn lines_are_counted() {
    let mut console = ScreenConsole::new();
    console.line(format_args!("Start"));
    console.line(format_args!("{}...", 1));
    assert_eq!(console.lines(), 2);
}

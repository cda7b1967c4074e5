//! # Keyboard probe
//!
//! Echoes arrow keys until Escape is pressed.

use super::{ Console, ProbeResult };
use crate::services::{ KeyEvent, KeySource };

pub const BANNER: &str = "Try the arrow keys, or press ESC...";

/// Label printed for a recognized key, `None` for keys that are ignored.
fn label(key: KeyEvent) -> Option<&'static str> {
    match key {
        KeyEvent::Up => Some("Up!"),
        KeyEvent::Left => Some("Left!"),
        KeyEvent::Right => Some("Right!"),
        KeyEvent::Down => Some("Down!"),
        KeyEvent::Esc | KeyEvent::Other => None,
    }
}

/// Only returns once the source produced `KeyEvent::Esc`.
pub fn run(console: &mut dyn Console, keys: &mut dyn KeySource) -> ProbeResult {
    console.line(format_args!("{}", BANNER));
    loop {
        let key = keys.next_key();
        if key == KeyEvent::Esc {
            return Ok(());
        }
        if let Some(label) = label(key) {
            console.line(format_args!("{}", label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fakes::{ RecordingConsole, ScriptedKeys };
    use crate::services::KeyEvent::*;

    #[test_case]
    fn echoes_arrows_until_escape() {
        let mut keys = ScriptedKeys::new(&[Up, Left, Right, Down, Esc]);
        let mut console = RecordingConsole::new();

        assert_eq!(run(&mut console, &mut keys), Ok(()));
        assert_eq!(console.lines, [BANNER, "Up!", "Left!", "Right!", "Down!"]);
        assert_eq!(keys.remaining(), 0);
    }

    #[test_case]
    fn other_keys_are_silent() {
        let mut keys = ScriptedKeys::new(&[Other, Other, Down, Other, Esc]);
        let mut console = RecordingConsole::new();

        run(&mut console, &mut keys).unwrap();
        assert_eq!(console.lines, [BANNER, "Down!"]);
    }

    #[test_case]
    fn stops_at_first_escape() {
        let mut keys = ScriptedKeys::new(&[Up, Esc, Down, Esc]);
        let mut console = RecordingConsole::new();

        run(&mut console, &mut keys).unwrap();
        assert_eq!(console.lines, [BANNER, "Up!"]);
        assert_eq!(keys.remaining(), 2);
    }

    #[test_case]
    fn immediate_escape_prints_only_the_banner() {
        let mut keys = ScriptedKeys::new(&[Esc]);
        let mut console = RecordingConsole::new();

        run(&mut console, &mut keys).unwrap();
        assert_eq!(console.lines, [BANNER]);
    }
}

//! # Audio probe

use super::{ fail, Console, ProbeError, ProbeResult };
use crate::services::SoundDevice;

/// Repeat count meaning "loop until something else is played".
pub const LOOP_FOREVER: i32 = -1;

/// Loads `path` and starts playing it. Returns as soon as playback is started.
pub fn run(
    console: &mut dyn Console,
    audio: &mut dyn SoundDevice,
    path: &'static str,
    repeat: i32,
) -> ProbeResult {
    match audio.load_sound(path) {
        Some(sound) => {
            audio.play(sound, repeat);
            Ok(())
        }
        None => fail(console, ProbeError::SoundUnavailable { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fakes::{ RecordingConsole, RecordingSound };
    use crate::services::SoundHandle;

    #[test_case]
    fn plays_loaded_sound_in_a_loop() {
        let mut audio = RecordingSound::knowing(&["chime.tones"]);
        let mut console = RecordingConsole::new();

        assert_eq!(run(&mut console, &mut audio, "chime.tones", LOOP_FOREVER), Ok(()));
        assert_eq!(audio.played, [(SoundHandle(0), -1)]);
        assert!(console.lines.is_empty());
    }

    #[test_case]
    fn missing_sound_is_never_played() {
        let mut audio = RecordingSound::knowing(&[]);
        let mut console = RecordingConsole::new();

        let outcome = run(&mut console, &mut audio, "chime.tones", LOOP_FOREVER);
        assert_eq!(outcome, Err(ProbeError::SoundUnavailable { path: "chime.tones" }));
        assert!(audio.played.is_empty());
        assert_eq!(console.lines, ["cannot load sound \"chime.tones\""]);
    }
}

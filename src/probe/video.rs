//! # Video probe

use super::{ fail, Console, ProbeError, ProbeResult };
use crate::services::{ VideoDevice, VideoMode };

/// Asks for `mode` once. Success is silent; there is no revert on failure.
pub fn run(console: &mut dyn Console, video: &mut dyn VideoDevice, mode: VideoMode) -> ProbeResult {
    match video.set_mode(mode) {
        0 => Ok(()),
        status => fail(console, ProbeError::VideoModeRejected { mode, status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fakes::{ FixedVideo, RecordingConsole };

    #[test_case]
    fn accepted_mode_prints_nothing() {
        let mut video = FixedVideo::new(0);
        let mut console = RecordingConsole::new();

        assert_eq!(run(&mut console, &mut video, VideoMode::Graphic320x200), Ok(()));
        assert!(console.lines.is_empty());
        assert_eq!(video.requests, [VideoMode::Graphic320x200]);
    }

    #[test_case]
    fn rejected_mode_is_reported_once() {
        let mut video = FixedVideo::new(-1);
        let mut console = RecordingConsole::new();

        let outcome = run(&mut console, &mut video, VideoMode::Graphic320x200);
        assert_eq!(
            outcome,
            Err(ProbeError::VideoModeRejected { mode: VideoMode::Graphic320x200, status: -1 })
        );
        assert_eq!(console.lines, ["switch to graphic 320x200x256 mode failed (-1)"]);
        assert_eq!(video.requests.len(), 1);
    }
}

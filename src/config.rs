//! # Configuration
//!
//! Constants the probes run with, and the ordered list of probes a run
//! executes.

use alloc::vec::Vec;
use core::fmt;

use crate::probe::audio::LOOP_FOREVER;
use crate::services::VideoMode;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Ticks the timer probe watches the clock for.
    pub tick_budget: u64,
    /// Ticks between two progress lines of the timer probe.
    pub tick_interval: u64,
    /// File the filesystem probe opens.
    pub file_name: &'static str,
    /// Absolute offset the filesystem probe seeks to between its two reads.
    pub seek_offset: isize,
    /// Sound the audio probe loads.
    pub sound_path: &'static str,
    /// Repeat count the sound is played with.
    pub sound_repeat: i32,
    /// Mode the video probe switches to.
    pub video_mode: VideoMode,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            tick_budget: 4000,
            tick_interval: 1000,
            file_name: "text.txt",
            seek_offset: 1,
            sound_path: "chime.tones",
            sound_repeat: LOOP_FOREVER,
            video_mode: VideoMode::Graphic320x200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Timer,
    Keyboard,
    Filesystem,
    Allocation,
    Video,
    Audio,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ProbeKind::Timer => "timer",
            ProbeKind::Keyboard => "keyboard",
            ProbeKind::Filesystem => "filesystem",
            ProbeKind::Allocation => "allocation",
            ProbeKind::Video => "video",
            ProbeKind::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// The probes of one run, in the order they run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    probes: Vec<ProbeKind>,
}

impl RunPlan {
    pub fn new(probes: &[ProbeKind]) -> Self {
        RunPlan { probes: probes.to_vec() }
    }

    pub fn keyboard_then_timer() -> Self {
        RunPlan::new(&[ProbeKind::Keyboard, ProbeKind::Timer])
    }

    pub fn filesystem_keyboard_timer() -> Self {
        RunPlan::new(&[ProbeKind::Filesystem, ProbeKind::Keyboard, ProbeKind::Timer])
    }

    /// Every probe. The video probe goes last since the text console is no
    /// longer visible once the graphic mode is on.
    pub fn everything() -> Self {
        RunPlan::new(&[
            ProbeKind::Filesystem,
            ProbeKind::Allocation,
            ProbeKind::Keyboard,
            ProbeKind::Timer,
            ProbeKind::Audio,
            ProbeKind::Video,
        ])
    }

    /// The plan selected by the `plan-*` Cargo features.
    pub fn from_features() -> Self {
        if cfg!(feature = "plan-everything") {
            RunPlan::everything()
        } else if cfg!(feature = "plan-keyboard-timer") {
            RunPlan::keyboard_then_timer()
        } else {
            RunPlan::filesystem_keyboard_timer()
        }
    }

    pub fn probes(&self) -> &[ProbeKind] {
        &self.probes
    }
}

#[test_case]
fn default_plan_is_filesystem_keyboard_timer() {
    if !cfg!(feature = "plan-everything") && !cfg!(feature = "plan-keyboard-timer") {
        assert_eq!(RunPlan::from_features(), RunPlan::filesystem_keyboard_timer());
    }
    assert_eq!(
        RunPlan::filesystem_keyboard_timer().probes(),
        [ProbeKind::Filesystem, ProbeKind::Keyboard, ProbeKind::Timer]
    );
}

#[test_case]
fn default_config_matches_probe_constants() {
    let config = ProbeConfig::default();
    assert_eq!(config.tick_budget, 4 * config.tick_interval);
    assert_eq!(config.file_name, "text.txt");
    assert_eq!(config.sound_repeat, -1);
}

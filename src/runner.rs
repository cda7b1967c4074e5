//! # Runner
//!
//! Runs the probes of a `RunPlan` one after the other between a start and a
//! stop banner, then settles in the `Idle` state.
//!
//! A failing probe prints its own diagnostic; the runner keeps its outcome
//! for inspection but never acts on it.

use alloc::vec::Vec;

use crate::config::{ ProbeConfig, ProbeKind, RunPlan };
use crate::probe::{ self, Console, ProbeResult };
use crate::services::Devices;

pub const START_BANNER: &str = "Start";
pub const STOP_BANNER: &str = "Stop";

/// Where a runner is in its single pass over the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, nothing printed yet.
    Ready,
    /// The given probe is executing.
    Running(ProbeKind),
    /// The stop banner is out. Nothing else happens from here on.
    Idle,
}

pub struct Runner {
    plan: RunPlan,
    config: ProbeConfig,
    state: RunState,
    outcomes: Vec<(ProbeKind, ProbeResult)>,
}

impl Runner {
    pub fn new(plan: RunPlan, config: ProbeConfig) -> Self {
        Runner {
            plan,
            config,
            state: RunState::Ready,
            outcomes: Vec::new(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Outcome of every probe that ran, in run order.
    pub fn outcomes(&self) -> &[(ProbeKind, ProbeResult)] {
        &self.outcomes
    }

    /// Executes the whole plan once and returns the final state, `Idle`.
    ///
    /// Calling it again on an idle runner does nothing.
    pub fn run(&mut self, devices: &mut Devices, console: &mut dyn Console) -> RunState {
        if self.state != RunState::Ready {
            log::warn!("runner already went through its plan");
            return self.state;
        }

        console.line(format_args!("{}", START_BANNER));
        let plan = self.plan.clone();
        for &kind in plan.probes() {
            self.state = RunState::Running(kind);
            log::info!("{} probe: start", kind);
            let outcome = self.run_probe(kind, devices, console);
            match &outcome {
                Ok(()) => log::info!("{} probe: done", kind),
                Err(error) => log::info!("{} probe: {}", kind, error),
            }
            self.outcomes.push((kind, outcome));
        }
        console.line(format_args!("{}", STOP_BANNER));

        self.state = RunState::Idle;
        self.state
    }

    fn run_probe(&self, kind: ProbeKind, devices: &mut Devices, console: &mut dyn Console) -> ProbeResult {
        let config = &self.config;
        match kind {
            ProbeKind::Timer => probe::tick::run(
                console,
                devices.clock,
                config.tick_budget,
                config.tick_interval,
            ),
            ProbeKind::Keyboard => probe::keyboard::run(console, devices.keys),
            ProbeKind::Filesystem => {
                probe::file::run(console, devices.files, config.file_name, config.seek_offset)
            }
            ProbeKind::Allocation => probe::heap::run(console, devices.heap),
            ProbeKind::Video => probe::video::run(console, devices.video, config.video_mode),
            ProbeKind::Audio => {
                probe::audio::run(console, devices.audio, config.sound_path, config.sound_repeat)
            }
        }
    }
}

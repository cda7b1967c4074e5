//! # Probes
//!
//! One probe per primitive service. A probe prints human-readable progress on
//! a `Console`, handles every failure of the service it exercises on its own,
//! and returns a `ProbeResult` so the outcome can be checked without reading
//! the printed text back.

use core::fmt;

use crate::services::{ Fd, VideoMode };

pub mod audio;
pub mod file;
pub mod heap;
pub mod keyboard;
pub mod tick;
pub mod video;

#[cfg(test)]
pub mod fakes;

/// A line-oriented text sink.
pub trait Console {
    /// Writes one line. The newline is added by the console.
    fn line(&mut self, args: fmt::Arguments);
}

/// A collaborator answered with its failure sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// `open` returned a negative descriptor.
    OpenFailed { path: &'static str, fd: Fd },
    /// The heap had no block of the requested size.
    OutOfMemory { size: usize },
    /// `set_mode` returned a non-zero status.
    VideoModeRejected { mode: VideoMode, status: i32 },
    /// `load_sound` found nothing to play.
    SoundUnavailable { path: &'static str },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProbeError::OpenFailed { path, fd } => {
                write!(f, "open(\"{}\") failed ({})", path, fd)
            }
            ProbeError::OutOfMemory { size } => {
                write!(f, "allocation of {} bytes failed", size)
            }
            ProbeError::VideoModeRejected { mode, status } => {
                write!(f, "switch to {} mode failed ({})", mode, status)
            }
            ProbeError::SoundUnavailable { path } => {
                write!(f, "cannot load sound \"{}\"", path)
            }
        }
    }
}

pub type ProbeResult = Result<(), ProbeError>;

/// Prints `error` on the console and hands it back as the probe's outcome.
pub(crate) fn fail(console: &mut dyn Console, error: ProbeError) -> ProbeResult {
    console.line(format_args!("{}", error));
    Err(error)
}

//! # Services module
//!
//! The primitive OS services the probes exercise, seen from the caller's side.
//!
//! Every trait here mirrors one call contract of the system interface: a tick
//! counter, a blocking key source, a POSIX-like file surface, a heap, a video
//! mode switch and a sound player. The file, video and close calls keep their
//! integer sentinels (a negative descriptor, a non-zero status) because the
//! probes print those numbers verbatim.

use core::fmt;
use core::ptr::NonNull;

/// A monotonic tick counter.
pub trait Clock {
    /// Current tick count. Never decreases.
    fn now(&self) -> u64;

    /// Called between two samples of a busy poll.
    fn relax(&self) {
        core::hint::spin_loop();
    }
}

/// One discrete key press, reduced to the keys the diagnostics care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Up,
    Left,
    Right,
    Down,
    Esc,
    Other,
}

/// A source of key events.
pub trait KeySource {
    /// Blocks until one key event is available and returns it.
    fn next_key(&mut self) -> KeyEvent;
}

/// A file descriptor. Negative values are the "invalid handle" sentinel.
pub type Fd = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Reference point of a seek, like `SEEK_SET`, `SEEK_CUR` and `SEEK_END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

/// POSIX-like file I/O.
pub trait FileApi {
    /// Returns a descriptor, or a negative value when the file cannot be opened.
    fn open(&mut self, path: &str, mode: OpenMode) -> Fd;

    /// Reads up to `buf.len()` bytes. Returns the number of bytes read, `0` at
    /// the end of the file, or a negative value on error.
    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> isize;

    /// Moves the cursor. Returns the new offset or a negative value on error.
    fn seek(&mut self, fd: Fd, offset: isize, whence: Whence) -> isize;

    /// Returns `0` on success, anything else on failure.
    fn close(&mut self, fd: Fd) -> i32;
}

/// A heap handing out raw blocks.
pub trait BlockAllocator {
    /// Returns `None` when the heap is exhausted.
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>>;

    /// Gives a block back to the heap.
    ///
    /// ## Safety
    ///
    /// `block` must come from `allocate` on the same allocator and must not
    /// have been released already.
    unsafe fn release(&mut self, block: NonNull<u8>);
}

/// Video modes the display can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    /// 80x25 text mode the machine boots in.
    Text80x25,
    /// 320x200 with 256 colors (VGA mode 13h).
    Graphic320x200,
}

impl fmt::Display for VideoMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VideoMode::Text80x25 => write!(f, "text 80x25"),
            VideoMode::Graphic320x200 => write!(f, "graphic 320x200x256"),
        }
    }
}

pub trait VideoDevice {
    /// Returns `0` when the mode is active afterwards, non-zero otherwise.
    fn set_mode(&mut self, mode: VideoMode) -> i32;
}

/// A loaded sound resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundHandle(pub usize);

pub trait SoundDevice {
    /// Returns `None` when the resource is missing or unreadable.
    fn load_sound(&mut self, path: &str) -> Option<SoundHandle>;

    /// Starts playback and returns without waiting for it. A `repeat` of `-1`
    /// loops forever.
    fn play(&mut self, sound: SoundHandle, repeat: i32);
}

/// The services one run of the diagnostics talks to.
pub struct Devices<'a> {
    pub clock: &'a dyn Clock,
    pub keys: &'a mut dyn KeySource,
    pub files: &'a mut dyn FileApi,
    pub heap: &'a mut dyn BlockAllocator,
    pub video: &'a mut dyn VideoDevice,
    pub audio: &'a mut dyn SoundDevice,
}

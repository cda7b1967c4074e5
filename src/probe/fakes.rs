//! Test doubles for the services the probes talk to.

use alloc::collections::VecDeque;
use alloc::string::{ String, ToString };
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;
use core::ptr::NonNull;

use super::Console;
use crate::services::{
    BlockAllocator, Clock, Fd, FileApi, KeyEvent, KeySource, OpenMode, SoundDevice, SoundHandle,
    VideoDevice, VideoMode, Whence,
};

/// Keeps every printed line.
pub struct RecordingConsole {
    pub lines: Vec<String>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        RecordingConsole { lines: Vec::new() }
    }
}

impl Console for RecordingConsole {
    fn line(&mut self, args: fmt::Arguments) {
        self.lines.push(args.to_string());
    }
}

/// A clock that advances by `step` ticks every time it is sampled.
pub struct StepClock {
    next: Cell<u64>,
    step: u64,
}

impl StepClock {
    pub fn new(start: u64, step: u64) -> Self {
        StepClock { next: Cell::new(start), step }
    }
}

impl Clock for StepClock {
    fn now(&self) -> u64 {
        let now = self.next.get();
        self.next.set(now + self.step);
        now
    }

    fn relax(&self) {}
}

/// Hands out a fixed list of key events, then panics instead of blocking.
pub struct ScriptedKeys {
    events: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new(events: &[KeyEvent]) -> Self {
        ScriptedKeys { events: events.iter().copied().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> KeyEvent {
        self.events.pop_front().expect("key script exhausted")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCall {
    Open,
    Read,
    Seek,
    Close,
}

/// Forwards to another file API and logs which calls went through.
pub struct CountingFiles<F> {
    inner: F,
    pub calls: Vec<FileCall>,
}

impl<F: FileApi> CountingFiles<F> {
    pub fn new(inner: F) -> Self {
        CountingFiles { inner, calls: Vec::new() }
    }
}

impl<F: FileApi> FileApi for CountingFiles<F> {
    fn open(&mut self, path: &str, mode: OpenMode) -> Fd {
        self.calls.push(FileCall::Open);
        self.inner.open(path, mode)
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> isize {
        self.calls.push(FileCall::Read);
        self.inner.read(fd, buf)
    }

    fn seek(&mut self, fd: Fd, offset: isize, whence: Whence) -> isize {
        self.calls.push(FileCall::Seek);
        self.inner.seek(fd, offset, whence)
    }

    fn close(&mut self, fd: Fd) -> i32 {
        self.calls.push(FileCall::Close);
        self.inner.close(fd)
    }
}

/// Opens anything as descriptor 3 and serves `content` on the first read.
/// Every later call fails: seek with -22, reads with -5, close with -9.
pub struct FailingFiles {
    content: &'static [u8],
    reads: usize,
    pub calls: Vec<FileCall>,
}

impl FailingFiles {
    pub fn new(content: &'static [u8]) -> Self {
        FailingFiles { content, reads: 0, calls: Vec::new() }
    }
}

impl FileApi for FailingFiles {
    fn open(&mut self, _path: &str, _mode: OpenMode) -> Fd {
        self.calls.push(FileCall::Open);
        3
    }

    fn read(&mut self, _fd: Fd, buf: &mut [u8]) -> isize {
        self.calls.push(FileCall::Read);
        self.reads += 1;
        if self.reads > 1 {
            return -5;
        }
        let count = self.content.len().min(buf.len());
        buf[..count].copy_from_slice(&self.content[..count]);
        count as isize
    }

    fn seek(&mut self, _fd: Fd, _offset: isize, _whence: Whence) -> isize {
        self.calls.push(FileCall::Seek);
        -22
    }

    fn close(&mut self, _fd: Fd) -> i32 {
        self.calls.push(FileCall::Close);
        -9
    }
}

/// Hands out up to `capacity` fake addresses (never dereferenced) and logs
/// allocations as `(address, size)` and releases as addresses.
pub struct RecordingHeap {
    capacity: usize,
    pub allocated: Vec<(usize, usize)>,
    pub released: Vec<usize>,
}

impl RecordingHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        RecordingHeap { capacity, allocated: Vec::new(), released: Vec::new() }
    }
}

impl BlockAllocator for RecordingHeap {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        if self.allocated.len() >= self.capacity {
            return None;
        }
        let address = 0x1000 + 0x10 * self.allocated.len();
        self.allocated.push((address, size));
        NonNull::new(address as *mut u8)
    }

    unsafe fn release(&mut self, block: NonNull<u8>) {
        self.released.push(block.as_ptr() as usize);
    }
}

/// Answers every mode request with the same status.
pub struct FixedVideo {
    status: i32,
    pub requests: Vec<VideoMode>,
}

impl FixedVideo {
    pub fn new(status: i32) -> Self {
        FixedVideo { status, requests: Vec::new() }
    }
}

impl VideoDevice for FixedVideo {
    fn set_mode(&mut self, mode: VideoMode) -> i32 {
        self.requests.push(mode);
        self.status
    }
}

/// Knows a fixed set of sound paths and logs what it is asked to play.
pub struct RecordingSound {
    known: Vec<&'static str>,
    pub played: Vec<(SoundHandle, i32)>,
}

impl RecordingSound {
    pub fn knowing(paths: &[&'static str]) -> Self {
        RecordingSound { known: paths.to_vec(), played: Vec::new() }
    }
}

impl SoundDevice for RecordingSound {
    fn load_sound(&mut self, path: &str) -> Option<SoundHandle> {
        self.known.iter().position(|&known| known == path).map(SoundHandle)
    }

    fn play(&mut self, sound: SoundHandle, repeat: i32) {
        self.played.push((sound, repeat));
    }
}

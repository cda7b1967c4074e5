//! # Ram filesystem
//!
//! The files the kernel carries in its own image, read-only, behind a small
//! descriptor table. Descriptors 0, 1 and 2 belong to the console streams and
//! are never handed out, so the first opened file gets 3.

use core::fmt;

use crate::services::{ Fd, FileApi, OpenMode, Whence };

/// Size of the descriptor table, reserved slots included.
pub const MAX_FD: usize = 32;
/// First descriptor a file can get.
const FIRST_FILE_FD: usize = 3;

/// The files built into the kernel image.
static BUILTIN: &[(&str, &[u8])] = &[
    ("text.txt", include_bytes!("../assets/text.txt")),
    ("chime.tones", include_bytes!("../assets/chime.tones")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    NotFound,
    BadDescriptor,
    TooManyOpenFiles,
    ReadOnly,
    InvalidSeek,
}

impl FsError {
    /// Negative errno value returned through `FileApi`.
    pub fn code(self) -> i32 {
        match self {
            FsError::NotFound => -2,
            FsError::BadDescriptor => -9,
            FsError::InvalidSeek => -22,
            FsError::TooManyOpenFiles => -24,
            FsError::ReadOnly => -30,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FsError::NotFound => write!(f, "no such file"),
            FsError::BadDescriptor => write!(f, "bad file descriptor"),
            FsError::TooManyOpenFiles => write!(f, "too many open files"),
            FsError::ReadOnly => write!(f, "read-only file system"),
            FsError::InvalidSeek => write!(f, "invalid seek"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenFile {
    data: &'static [u8],
    cursor: usize,
}

pub struct RamFs {
    files: &'static [(&'static str, &'static [u8])],
    slots: [Option<OpenFile>; MAX_FD],
}

impl RamFs {
    pub fn new(files: &'static [(&'static str, &'static [u8])]) -> Self {
        RamFs {
            files,
            slots: [None; MAX_FD],
        }
    }

    /// The filesystem with the files of the kernel image.
    pub fn boot() -> Self {
        RamFs::new(BUILTIN)
    }

    /// Whole content of `path`, without going through a descriptor.
    pub fn file(&self, path: &str) -> Result<&'static [u8], FsError> {
        self.files
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, data)| *data)
            .ok_or(FsError::NotFound)
    }

    pub fn open_file(&mut self, path: &str, mode: OpenMode) -> Result<usize, FsError> {
        if mode != OpenMode::ReadOnly {
            return Err(FsError::ReadOnly);
        }
        let data = self.file(path)?;
        let fd = (FIRST_FILE_FD..MAX_FD)
            .find(|&fd| self.slots[fd].is_none())
            .ok_or(FsError::TooManyOpenFiles)?;
        self.slots[fd] = Some(OpenFile { data, cursor: 0 });
        log::debug!("fs: open {:?} as {}", path, fd);
        Ok(fd)
    }

    pub fn read_file(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize, FsError> {
        let file = self.slot(fd)?;
        let rest = &file.data[file.cursor..];
        let count = rest.len().min(buf.len());
        buf[..count].copy_from_slice(&rest[..count]);
        file.cursor += count;
        Ok(count)
    }

    /// Moves the cursor of `fd`. Past the end clamps to the end, before the
    /// start is an error and leaves the cursor where it was.
    pub fn seek_file(&mut self, fd: usize, offset: isize, whence: Whence) -> Result<usize, FsError> {
        let file = self.slot(fd)?;
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => file.cursor as isize,
            Whence::End => file.data.len() as isize,
        };
        let target = base.checked_add(offset).ok_or(FsError::InvalidSeek)?;
        if target < 0 {
            return Err(FsError::InvalidSeek);
        }
        file.cursor = (target as usize).min(file.data.len());
        Ok(file.cursor)
    }

    pub fn close_file(&mut self, fd: usize) -> Result<(), FsError> {
        self.slot(fd)?;
        self.slots[fd] = None;
        log::debug!("fs: closed {}", fd);
        Ok(())
    }

    /// Number of descriptors currently open.
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn slot(&mut self, fd: usize) -> Result<&mut OpenFile, FsError> {
        self.slots
            .get_mut(fd)
            .and_then(Option::as_mut)
            .ok_or(FsError::BadDescriptor)
    }
}

/// Descriptors coming in from `FileApi`; negative ones never name a slot.
fn index(fd: Fd) -> Result<usize, FsError> {
    if fd < 0 {
        Err(FsError::BadDescriptor)
    } else {
        Ok(fd as usize)
    }
}

impl FileApi for RamFs {
    fn open(&mut self, path: &str, mode: OpenMode) -> Fd {
        match self.open_file(path, mode) {
            Ok(fd) => fd as Fd,
            Err(error) => {
                log::debug!("fs: open {:?}: {}", path, error);
                error.code()
            }
        }
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> isize {
        match index(fd).and_then(|fd| self.read_file(fd, buf)) {
            Ok(count) => count as isize,
            Err(error) => error.code() as isize,
        }
    }

    fn seek(&mut self, fd: Fd, offset: isize, whence: Whence) -> isize {
        match index(fd).and_then(|fd| self.seek_file(fd, offset, whence)) {
            Ok(position) => position as isize,
            Err(error) => error.code() as isize,
        }
    }

    fn close(&mut self, fd: Fd) -> i32 {
        match index(fd).and_then(|fd| self.close_file(fd)) {
            Ok(()) => 0,
            Err(error) => error.code(),
        }
    }
}

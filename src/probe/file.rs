//! # Filesystem probe
//!
//! Opens a file read-only, reads it, seeks one byte in, reads it again and
//! closes it, printing what every call returned.

use alloc::string::String;

use super::{ fail, Console, ProbeError, ProbeResult };
use crate::services::{ FileApi, OpenMode, Whence };

/// Capacity of the read buffer. One byte is kept for the terminating NUL.
pub const BUFFER_SIZE: usize = 1024;

/// NUL-terminates `buffer` after the `count` bytes a read reported and returns
/// the terminated content.
///
/// A negative count (read error) terminates at the start of the buffer.
fn terminate(buffer: &mut [u8; BUFFER_SIZE], count: isize) -> &[u8] {
    let end = if count > 0 { count as usize } else { 0 };
    let end = end.min(BUFFER_SIZE - 1);
    buffer[end] = 0;
    let len = buffer.iter().position(|&byte| byte == 0).unwrap_or(end);
    &buffer[..len]
}

fn text(content: &[u8]) -> String {
    String::from_utf8_lossy(content).into_owned()
}

pub fn run(
    console: &mut dyn Console,
    files: &mut dyn FileApi,
    path: &'static str,
    seek_offset: isize,
) -> ProbeResult {
    let fd = files.open(path, OpenMode::ReadOnly);
    if fd < 0 {
        return fail(console, ProbeError::OpenFailed { path, fd });
    }
    console.line(format_args!("open(\"{}\") = {}", path, fd));

    let mut buffer = [0u8; BUFFER_SIZE];

    let count = files.read(fd, &mut buffer[..BUFFER_SIZE - 1]);
    let content = text(terminate(&mut buffer, count));
    console.line(format_args!("read {} bytes: \"{}\"", count, content));

    // Printed as is: a failed seek only shows up as a negative number.
    let offset = files.seek(fd, seek_offset, Whence::Start);
    console.line(format_args!("seek({}) = {}", seek_offset, offset));

    let count = files.read(fd, &mut buffer[..BUFFER_SIZE - 1]);
    let content = text(terminate(&mut buffer, count));
    console.line(format_args!("read again: \"{}\"", content));

    let status = files.close(fd);
    console.line(format_args!("close({}) = {}", fd, status));

    Ok(())
}

//! # Allocation probe

use core::mem::size_of;

use super::{ fail, Console, ProbeError, ProbeResult };
use crate::services::BlockAllocator;

/// Size of the block the probe asks for: one machine integer.
pub const BLOCK_SIZE: usize = size_of::<usize>();

/// Allocates one block, prints its address and releases it again.
pub fn run(console: &mut dyn Console, heap: &mut dyn BlockAllocator) -> ProbeResult {
    let block = match heap.allocate(BLOCK_SIZE) {
        Some(block) => block,
        None => return fail(console, ProbeError::OutOfMemory { size: BLOCK_SIZE }),
    };
    console.line(format_args!("malloc({}) = {:p}", BLOCK_SIZE, block));
    // SAFETY: the block was just handed out by this heap and is released once.
    unsafe { heap.release(block) };
    Ok(())
}

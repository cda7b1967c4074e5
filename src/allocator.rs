//! # Memory allocator module
//!
//! The kernel heap: a fixed virtual range mapped at boot and handed to the
//! `linked_list_allocator` crate, which serves the global allocator.
//!
//! `KernelHeap` puts the allocation probe's view on top of it: raw blocks out,
//! bare addresses back in.

use alloc::alloc::{ alloc, dealloc, Layout };
use alloc::vec::Vec;
use core::ptr::NonNull;
use x86_64::{
    structures::paging::{
        Mapper, Size4KiB, FrameAllocator, Page, PageTableFlags,
        mapper::MapToError,
    },
    VirtAddr,
};
use linked_list_allocator::LockedHeap;

use crate::services::BlockAllocator;

// Any virtual range works as long as nothing else lives there.
pub const HEAP_START: usize = 0x_4444_4444_0000;
pub const HEAP_SIZE: usize = 100 * 1024; // 100 KiB

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Maps the pages of the heap range to fresh frames, then initializes the
/// allocator.
pub fn init_heap(
    mapper: &mut impl Mapper<Size4KiB>,
    frame_allocator: &mut impl FrameAllocator<Size4KiB>,
) -> Result<(), MapToError<Size4KiB>> {
    let page_range = {
        let heap_start = VirtAddr::new(HEAP_START as u64);
        let heap_end = heap_start + HEAP_SIZE - 1u64;
        let heap_start_page = Page::containing_address(heap_start);
        let heap_end_page = Page::containing_address(heap_end);
        Page::range_inclusive(heap_start_page, heap_end_page)
    };

    for page in page_range {
        let frame = frame_allocator
            .allocate_frame()
            .ok_or(MapToError::FrameAllocationFailed)?;
        let flags = PageTableFlags::PRESENT | PageTableFlags::WRITABLE;
        unsafe {
            mapper.map_to(page, frame, flags, frame_allocator)?.flush()
        }
    }

    // `init` writes to the heap, so only after the mapping.
    unsafe {
        ALLOCATOR.lock().init(HEAP_START, HEAP_SIZE);
    }
    log::info!("heap mapped at {:#x} ({} bytes)", HEAP_START, HEAP_SIZE);

    Ok(())
}

/// Blocks from the global heap, aligned like a machine word.
///
/// `release` only gets an address, so the layout of each live block is kept
/// until it comes back. Room for that entry is reserved before the block is
/// allocated: an exhausted heap answers `None` instead of reaching the
/// allocation error handler.
pub struct KernelHeap {
    live: Vec<(usize, Layout)>,
}

impl KernelHeap {
    pub fn new() -> Self {
        KernelHeap { live: Vec::new() }
    }

    /// Number of blocks handed out and not released yet.
    pub fn live_blocks(&self) -> usize {
        self.live.len()
    }
}

impl BlockAllocator for KernelHeap {
    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size.max(1), core::mem::align_of::<usize>()).ok()?;
        if self.live.try_reserve(1).is_err() {
            log::debug!("heap: no room to track another block");
            return None;
        }
        // A null pointer from `alloc` is the out-of-memory answer, not an
        // error to abort on.
        let block = NonNull::new(unsafe { alloc(layout) })?;
        self.live.push((block.as_ptr() as usize, layout));
        log::debug!("heap: {} bytes at {:p}", layout.size(), block);
        Some(block)
    }

    unsafe fn release(&mut self, block: NonNull<u8>) {
        let address = block.as_ptr() as usize;
        match self.live.iter().position(|&(live, _)| live == address) {
            Some(index) => {
                let (_, layout) = self.live.swap_remove(index);
                dealloc(block.as_ptr(), layout);
                log::debug!("heap: released {:p}", block);
            }
            None => log::warn!("heap: {:p} was not handed out here", block),
        }
    }
}

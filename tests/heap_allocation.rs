//! # Heap integration test
//!
//! The kernel heap binding and the allocation probe on top of the real global
//! allocator.

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(probe_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

extern crate alloc; // since we want to test allocations, we enable the `alloc` crate

use alloc::{ boxed::Box, string::{ String, ToString }, vec::Vec };
use bootloader::{ entry_point, BootInfo };
use core::fmt;
use core::panic::PanicInfo;
use probe_os::allocator::{ KernelHeap, HEAP_SIZE };
use probe_os::probe::{ self, Console };
use probe_os::services::BlockAllocator;

entry_point!(main);

fn main(boot_info: &'static BootInfo) -> ! {
    probe_os::init();
    probe_os::init_heap(boot_info);

    test_main();
    loop {}
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    probe_os::test_panic_handler(info)
}

/// Keeps the printed lines.
struct Lines(Vec<String>);

impl Console for Lines {
    fn line(&mut self, args: fmt::Arguments) {
        self.0.push(args.to_string());
    }
}

#[test_case]
fn simple_allocation() {
    let heap_value_1 = Box::new(41);
    let heap_value_2 = Box::new(13);
    assert_eq!(*heap_value_1, 41);
    assert_eq!(*heap_value_2, 13);
}

// Freed memory has to be reused, or this runs out of heap.
#[test_case]
fn many_boxes() {
    for i in 0..HEAP_SIZE {
        let x = Box::new(i);
        assert_eq!(*x, i);
    }
}

#[test_case]
fn kernel_heap_tracks_live_blocks() {
    let mut heap = KernelHeap::new();
    let first = heap.allocate(8).unwrap();
    let second = heap.allocate(100).unwrap();
    assert_ne!(first, second);
    assert_eq!(first.as_ptr() as usize % core::mem::align_of::<usize>(), 0);
    assert_eq!(heap.live_blocks(), 2);

    unsafe {
        heap.release(first);
        heap.release(second);
    }
    assert_eq!(heap.live_blocks(), 0);
}

#[test_case]
fn oversized_request_is_refused() {
    let mut heap = KernelHeap::new();
    assert!(heap.allocate(HEAP_SIZE * 2).is_none());
    assert_eq!(heap.live_blocks(), 0);
}

// Runs the heap dry while the kernel heap is tracking blocks: running out
// has to come back as `None`, also when it is the bookkeeping that no longer
// fits.
#[test_case]
fn exhausted_heap_answers_none() {
    let mut heap = KernelHeap::new();
    // Sized up front, so the test's own list never needs the heap.
    let mut blocks = Vec::with_capacity(HEAP_SIZE / 512);
    while let Some(block) = heap.allocate(1024) {
        blocks.push(block);
        assert!(blocks.len() < blocks.capacity());
    }
    assert!(!blocks.is_empty());
    assert_eq!(heap.live_blocks(), blocks.len());

    for block in blocks.drain(..) {
        unsafe { heap.release(block) };
    }
    assert_eq!(heap.live_blocks(), 0);
    assert!(heap.allocate(8).is_some());
}

#[test_case]
fn allocation_probe_on_the_kernel_heap() {
    let mut heap = KernelHeap::new();
    let mut console = Lines(Vec::new());

    assert_eq!(probe::heap::run(&mut console, &mut heap), Ok(()));
    assert_eq!(console.0.len(), 1);
    assert!(console.0[0].starts_with("malloc(8) = 0x"));
    assert_eq!(heap.live_blocks(), 0);
}

//! # Task module
//!
//! Interrupt-fed input consumed as futures, and the executor that blocks the
//! single thread of the kernel on one of them.

pub mod executor;
pub mod keyboard;

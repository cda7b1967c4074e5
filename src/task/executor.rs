//! # Executor module
//!
//! `block_on` drives one future to completion on the current (and only)
//! thread. Between two polls the CPU sleeps with `hlt` until an interrupt
//! arrives, so waiting for a key costs no busy loop.

use alloc::{ boxed::Box, sync::Arc, task::Wake };
use core::future::Future;
use core::sync::atomic::{ AtomicBool, Ordering };
use core::task::{ Context, Poll, Waker };
use x86_64::instructions::interrupts;

/// Remembers that the future asked to be polled again.
struct FlagWaker {
    woken: AtomicBool,
}

impl FlagWaker {
    fn take(&self) -> bool {
        self.woken.swap(false, Ordering::AcqRel)
    }
}

impl Wake for FlagWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.woken.store(true, Ordering::Release);
    }
}

/// Polls `future` until it is ready and returns its output.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = Box::pin(future);
    let flag = Arc::new(FlagWaker { woken: AtomicBool::new(false) });
    let waker = Waker::from(flag.clone());
    let mut context = Context::from_waker(&waker);

    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut context) {
            return output;
        }
        // Checking the flag with interrupts off closes the window where a
        // wakeup lands between the check and `hlt`.
        interrupts::disable();
        if flag.take() {
            interrupts::enable();
        } else {
            interrupts::enable_and_hlt();
            flag.take();
        }
    }
}

#[test_case]
fn ready_future_returns_immediately() {
    assert_eq!(block_on(async { 6 * 7 }), 42);
}

#[test_case]
fn pending_future_is_polled_again_after_wakeup() {
    use core::pin::Pin;

    struct YieldOnce {
        yielded: bool,
    }

    impl Future for YieldOnce {
        type Output = &'static str;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
            if self.yielded {
                Poll::Ready("done")
            } else {
                self.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    assert_eq!(block_on(YieldOnce { yielded: false }), "done");
}

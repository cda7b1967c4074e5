//! # Keyboard module
//!
//! - A global scancode queue filled by the keyboard interrupt.
//! - `ScancodeStream`, the queue as a `Stream`.
//! - `KeyboardSource`, which decodes the scancodes into key events and blocks
//!   until the next key press.

use core::{
    pin::Pin,
    task::{ Context, Poll },
};
use conquer_once::spin::OnceCell;
use crossbeam_queue::ArrayQueue;
use futures_util::{
    stream::{ Stream, StreamExt },
    task::AtomicWaker,
};
use pc_keyboard::{ layouts, HandleControl, KeyCode, KeyState, Keyboard, ScancodeSet1 };

use super::executor::block_on;
use crate::services::{ KeyEvent, KeySource };

/// Scancodes the interrupt handler can queue before input is dropped.
const QUEUE_CAPACITY: usize = 100;

static SCANCODE_QUEUE: OnceCell<ArrayQueue<u8>> = OnceCell::uninit();
static WAKER: AtomicWaker = AtomicWaker::new();

/// Called by the keyboard interrupt handler.
///
/// *** MUST NOT BLOCK / ALLOCATE ***
pub(crate) fn add_scancode(scancode: u8) {
    if let Ok(queue) = SCANCODE_QUEUE.try_get() {
        if let Err(_) = queue.push(scancode) {
            log::warn!("scancode queue full; dropping keyboard input");
        } else {
            WAKER.wake();
        }
    } else {
        log::warn!("scancode queue uninitialized; dropping keyboard input");
    }
}

pub struct ScancodeStream {
    // Keeps the type from being built outside this module.
    _private: (),
}

impl ScancodeStream {
    /// Creates the global queue. There is only one keyboard, so only one stream.
    pub fn new() -> Self {
        SCANCODE_QUEUE.try_init_once(|| ArrayQueue::new(QUEUE_CAPACITY))
            .expect("ScancodeStream::new should only be called once");
        ScancodeStream { _private: () }
    }
}

impl Stream for ScancodeStream {
    type Item = u8;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<u8>> {
        let queue = SCANCODE_QUEUE
            .try_get()
            .expect("not initialized");

        // fast path
        if let Ok(scancode) = queue.pop() {
            return Poll::Ready(Some(scancode));
        }

        // Register before the second look, so a scancode pushed in between
        // still wakes us.
        WAKER.register(&cx.waker());
        match queue.pop() {
            Ok(scancode) => {
                WAKER.take();
                Poll::Ready(Some(scancode))
            },
            Err(crossbeam_queue::PopError) => Poll::Pending,
        }
    }
}

/// Maps a decoded key to the events the diagnostics know about.
fn key_event(code: KeyCode) -> KeyEvent {
    match code {
        KeyCode::ArrowUp => KeyEvent::Up,
        KeyCode::ArrowLeft => KeyEvent::Left,
        KeyCode::ArrowRight => KeyEvent::Right,
        KeyCode::ArrowDown => KeyEvent::Down,
        KeyCode::Escape => KeyEvent::Esc,
        _ => KeyEvent::Other,
    }
}

/// The PS/2 keyboard as a `KeySource`. Key releases are not events.
pub struct KeyboardSource {
    scancodes: ScancodeStream,
    keyboard: Keyboard<layouts::Us104Key, ScancodeSet1>,
}

impl KeyboardSource {
    /// Panics when called a second time, see `ScancodeStream::new`.
    pub fn new() -> Self {
        KeyboardSource {
            scancodes: ScancodeStream::new(),
            keyboard: Keyboard::new(layouts::Us104Key, ScancodeSet1, HandleControl::Ignore),
        }
    }

    /// Feeds one scancode to the decoder; a key press comes out as an event.
    fn decode(&mut self, scancode: u8) -> Option<KeyEvent> {
        match self.keyboard.add_byte(scancode) {
            Ok(Some(event)) if matches!(event.state, KeyState::Down) => Some(key_event(event.code)),
            Ok(_) => None,
            Err(error) => {
                log::debug!("undecodable scancode {:#04x}: {:?}", scancode, error);
                None
            }
        }
    }
}

impl KeySource for KeyboardSource {
    fn next_key(&mut self) -> KeyEvent {
        loop {
            let scancode = block_on(self.scancodes.next())
                .expect("scancode stream never ends");
            if let Some(event) = self.decode(scancode) {
                return event;
            }
        }
    }
}

#[test_case]
fn arrows_and_escape_are_recognized() {
    assert_eq!(key_event(KeyCode::ArrowUp), KeyEvent::Up);
    assert_eq!(key_event(KeyCode::ArrowLeft), KeyEvent::Left);
    assert_eq!(key_event(KeyCode::ArrowRight), KeyEvent::Right);
    assert_eq!(key_event(KeyCode::ArrowDown), KeyEvent::Down);
    assert_eq!(key_event(KeyCode::Escape), KeyEvent::Esc);
    assert_eq!(key_event(KeyCode::A), KeyEvent::Other);
}

/// Scancode set 1 sequences: escape is a single byte, arrows come after the
/// 0xe0 prefix, releases have the top bit set.
#[test_case]
fn queued_scancodes_decode_to_presses_only() {
    let mut keys = KeyboardSource::new();
    for &scancode in &[0xe0, 0x48, 0xe0, 0xc8, 0x1e, 0x9e, 0x01] {
        add_scancode(scancode);
    }

    assert_eq!(keys.next_key(), KeyEvent::Up);
    assert_eq!(keys.next_key(), KeyEvent::Other);
    assert_eq!(keys.next_key(), KeyEvent::Esc);
}

//! # PC speaker
//!
//! Melodies are text files of the ram filesystem, one `frequency_hz
//! duration_ms` pair per line, `#` starting a comment. A frequency of 0 is a
//! rest.
//!
//! `play` only hands the tones to the player; the timer interrupt moves it
//! from one tone to the next by reprogramming PIT channel 2 and opening or
//! closing the speaker gate.

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;
use x86_64::instructions::interrupts;
use x86_64::instructions::port::Port;

use crate::fs::RamFs;
use crate::services::{ SoundDevice, SoundHandle };
use crate::timer;

/// Keyboard controller port B; bits 0 and 1 connect PIT channel 2 to the
/// speaker.
const SPEAKER_GATE: u16 = 0x61;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    /// Hertz, 0 for silence.
    pub frequency: u32,
    /// Milliseconds.
    pub duration: u32,
}

/// Parses a melody file. `None` when a line is malformed or there is no tone
/// at all.
pub fn parse_melody(text: &str) -> Option<Vec<Tone>> {
    let mut tones = Vec::new();
    for line in text.lines() {
        let line = match line.find('#') {
            Some(start) => &line[..start],
            None => line,
        };
        let mut fields = line.split_whitespace();
        let frequency = match fields.next() {
            Some(field) => field.parse().ok()?,
            None => continue,
        };
        let duration = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        tones.push(Tone { frequency, duration });
    }
    if tones.is_empty() { None } else { Some(tones) }
}

/// A melody being played: which tone is next and how many passes are left.
struct Playback {
    tones: Arc<[Tone]>,
    next: usize,
    /// `None` loops forever.
    passes_left: Option<u32>,
    /// Uptime at which the current tone is over.
    tone_end: u64,
    over: bool,
}

impl Playback {
    fn new(tones: Arc<[Tone]>, repeat: i32) -> Self {
        let passes_left = if repeat < 0 { None } else { Some(repeat.max(1) as u32) };
        Playback { tones, next: 0, passes_left, tone_end: 0, over: false }
    }

    /// The tone after the current one, wrapping around while passes are left.
    fn advance(&mut self) -> Option<Tone> {
        if self.next == self.tones.len() {
            match &mut self.passes_left {
                None => {}
                Some(passes) if *passes > 1 => *passes -= 1,
                Some(_) => return None,
            }
            self.next = 0;
        }
        let tone = self.tones.get(self.next).copied()?;
        self.next += 1;
        Some(tone)
    }
}

static PLAYER: Mutex<Option<Playback>> = Mutex::new(None);

fn set_gate(open: bool) {
    let mut port = Port::<u8>::new(SPEAKER_GATE);
    unsafe {
        let value = port.read();
        port.write(if open { value | 3 } else { value & !3 });
    }
}

fn sound(tone: Tone) {
    if tone.frequency == 0 {
        set_gate(false);
    } else {
        timer::set_speaker_frequency(tone.frequency);
        set_gate(true);
    }
}

/// Starts the next tone of `playback` at `now`, or reports the melody is over.
fn start_next(playback: &mut Playback, now: u64) -> bool {
    match playback.advance() {
        Some(tone) => {
            sound(tone);
            playback.tone_end = now + u64::from(tone.duration);
            true
        }
        None => {
            set_gate(false);
            false
        }
    }
}

/// Called from the timer interrupt handler with the current uptime.
///
/// *** MUST NOT BLOCK / ALLOCATE ***
///
/// A finished melody stays in the player, marked over: dropping it here would
/// free memory from inside an interrupt.
pub(crate) fn tick(now: u64) {
    // `play` and `stop` hold the lock with interrupts off, so it is never
    // contended here.
    let mut player = match PLAYER.try_lock() {
        Some(player) => player,
        None => return,
    };
    if let Some(playback) = player.as_mut() {
        if !playback.over && playback.tone_end <= now {
            playback.over = !start_next(playback, now);
        }
    }
}

/// Whether a melody is still sounding.
pub fn is_playing() -> bool {
    interrupts::without_interrupts(|| {
        PLAYER
            .lock()
            .as_ref()
            .map_or(false, |playback| !playback.over)
    })
}

/// The PC speaker as a `SoundDevice`, reading melodies from its own view of
/// the ram filesystem.
pub struct Speaker {
    files: RamFs,
    sounds: Vec<Arc<[Tone]>>,
}

impl Speaker {
    pub fn new(files: RamFs) -> Self {
        Speaker { files, sounds: Vec::new() }
    }

    /// Stops whatever is playing.
    pub fn stop(&mut self) {
        interrupts::without_interrupts(|| {
            PLAYER.lock().take();
            set_gate(false);
        });
    }
}

impl SoundDevice for Speaker {
    fn load_sound(&mut self, path: &str) -> Option<SoundHandle> {
        let data = match self.files.file(path) {
            Ok(data) => data,
            Err(error) => {
                log::debug!("speaker: {:?}: {}", path, error);
                return None;
            }
        };
        let text = match core::str::from_utf8(data) {
            Ok(text) => text,
            Err(_) => {
                log::debug!("speaker: {:?} is not text", path);
                return None;
            }
        };
        let tones = match parse_melody(text) {
            Some(tones) => tones,
            None => {
                log::debug!("speaker: {:?} is not a melody", path);
                return None;
            }
        };
        log::debug!("speaker: {:?} loaded, {} tones", path, tones.len());
        self.sounds.push(Arc::from(tones));
        Some(SoundHandle(self.sounds.len() - 1))
    }

    fn play(&mut self, sound: SoundHandle, repeat: i32) {
        let tones = match self.sounds.get(sound.0) {
            Some(tones) => tones.clone(),
            None => {
                log::warn!("speaker: no sound {:?}", sound);
                return;
            }
        };
        let mut playback = Playback::new(tones, repeat);
        interrupts::without_interrupts(|| {
            let mut player = PLAYER.lock();
            if start_next(&mut playback, timer::uptime_ms()) {
                *player = Some(playback);
            }
        });
    }
}

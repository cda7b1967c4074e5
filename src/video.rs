//! # Video module
//!
//! Switches the VGA adapter from the boot text mode to mode 13h (320x200, 256
//! colors) by writing the register file directly. There is no BIOS to go back
//! through, and the text mode font is lost once the planes are rearranged, so
//! the switch is one way.

use x86_64::instructions::port::{ Port, PortReadOnly, PortWriteOnly };

use crate::services::{ VideoDevice, VideoMode };
use crate::vga_buffer::WRITER;

const MISC_WRITE: u16 = 0x3C2;
const SEQUENCER_INDEX: u16 = 0x3C4;
const CRTC_INDEX: u16 = 0x3D4;
const GRAPHICS_INDEX: u16 = 0x3CE;
const ATTRIBUTE_INDEX: u16 = 0x3C0;
const INPUT_STATUS: u16 = 0x3DA;

const FRAMEBUFFER: usize = 0xA0000;
const FRAMEBUFFER_SIZE: usize = 320 * 200;

/// Status of a switch the adapter cannot do.
pub const UNSUPPORTED: i32 = -1;

/// Register values of mode 13h.
mod mode_13h {
    pub const MISC: u8 = 0x63;
    pub const SEQUENCER: [u8; 5] = [0x03, 0x01, 0x0F, 0x00, 0x0E];
    pub const CRTC: [u8; 25] = [
        0x5F, 0x4F, 0x50, 0x82, 0x54, 0x80, 0xBF, 0x1F, 0x00, 0x41, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x9C, 0x0E, 0x8F, 0x28, 0x40, 0x96, 0xB9, 0xA3, 0xFF,
    ];
    pub const GRAPHICS: [u8; 9] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x05, 0x0F, 0xFF];
    pub const ATTRIBUTE: [u8; 21] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C,
        0x0D, 0x0E, 0x0F, 0x41, 0x00, 0x0F, 0x00, 0x00,
    ];
}

/// Writes `values` to consecutive registers of an index/data port pair.
unsafe fn write_indexed(index_port: u16, values: &[u8]) {
    let mut index = Port::<u8>::new(index_port);
    let mut data = Port::<u8>::new(index_port + 1);
    for (register, &value) in values.iter().enumerate() {
        index.write(register as u8);
        data.write(value);
    }
}

unsafe fn program_mode_13h() {
    PortWriteOnly::<u8>::new(MISC_WRITE).write(mode_13h::MISC);
    write_indexed(SEQUENCER_INDEX, &mode_13h::SEQUENCER);

    // Registers 0-7 of the CRTC are write protected until bit 7 of the
    // vertical retrace end register is cleared.
    let mut index = Port::<u8>::new(CRTC_INDEX);
    let mut data = Port::<u8>::new(CRTC_INDEX + 1);
    index.write(0x03);
    let value = data.read();
    data.write(value | 0x80);
    index.write(0x11);
    let value = data.read();
    data.write(value & !0x80);
    let mut crtc = mode_13h::CRTC;
    crtc[0x03] |= 0x80;
    crtc[0x11] &= !0x80;
    write_indexed(CRTC_INDEX, &crtc);

    write_indexed(GRAPHICS_INDEX, &mode_13h::GRAPHICS);

    // The attribute controller takes index and data on the same port; reading
    // the input status puts its flip-flop back on "index".
    let mut status = PortReadOnly::<u8>::new(INPUT_STATUS);
    let mut attribute = PortWriteOnly::<u8>::new(ATTRIBUTE_INDEX);
    for (register, &value) in mode_13h::ATTRIBUTE.iter().enumerate() {
        status.read();
        attribute.write(register as u8);
        attribute.write(value);
    }
    // Palette address source: the display reads the palette again.
    status.read();
    attribute.write(0x20);
}

unsafe fn clear_framebuffer() {
    let framebuffer = FRAMEBUFFER as *mut u8;
    for offset in 0..FRAMEBUFFER_SIZE {
        framebuffer.add(offset).write_volatile(0);
    }
}

/// The VGA adapter of the machine.
pub struct VgaDisplay {
    mode: VideoMode,
}

impl VgaDisplay {
    /// The adapter as the bootloader leaves it, in text mode.
    pub fn new() -> Self {
        VgaDisplay { mode: VideoMode::Text80x25 }
    }

    pub fn mode(&self) -> VideoMode {
        self.mode
    }
}

impl VideoDevice for VgaDisplay {
    fn set_mode(&mut self, mode: VideoMode) -> i32 {
        if mode == self.mode {
            return 0;
        }
        match mode {
            VideoMode::Graphic320x200 => {
                // The console would scribble over the first planes otherwise.
                x86_64::instructions::interrupts::without_interrupts(|| {
                    WRITER.lock().detach();
                });
                unsafe {
                    program_mode_13h();
                    clear_framebuffer();
                }
                self.mode = mode;
                log::info!("video: switched to {}", mode);
                0
            }
            VideoMode::Text80x25 => {
                log::warn!("video: no way back to {}", mode);
                UNSUPPORTED
            }
        }
    }
}

// Only the mode bookkeeping runs here: actually switching would take the test
// kernel's screen away.
#[test_case]
fn text_mode_is_already_active() {
    let mut display = VgaDisplay::new();
    assert_eq!(display.set_mode(VideoMode::Text80x25), 0);
    assert_eq!(display.mode(), VideoMode::Text80x25);
}

#[test_case]
fn leaving_graphics_is_refused() {
    let mut display = VgaDisplay { mode: VideoMode::Graphic320x200 };
    assert_eq!(display.set_mode(VideoMode::Graphic320x200), 0);
    assert_eq!(display.set_mode(VideoMode::Text80x25), UNSUPPORTED);
    assert_eq!(display.mode(), VideoMode::Graphic320x200);
}

//! State shared with the render and input contexts.

use std::sync::Arc;

use emu_core::{ColorIndex, DisplayFlags, Key, KeyboardInput, Rom, VideoSource};
use parking_lot::Mutex;

use crate::keyboard::Llc2Keyboard;
use crate::video::Video;

pub(crate) struct Shared {
    pub video: Mutex<Video>,
    pub keyboard: Mutex<Llc2Keyboard>,
    pub flags: DisplayFlags,
    pub font: Option<Rom>,
}

/// Handle to an LLC2's screen and keyboard.
#[derive(Clone)]
pub struct Llc2Frontend {
    pub(crate) shared: Arc<Shared>,
}

impl VideoSource for Llc2Frontend {
    fn screen_width(&self) -> usize {
        512
    }

    fn screen_height(&self) -> usize {
        256
    }

    fn border_color_index(&self) -> ColorIndex {
        self.shared.video.lock().border_color_index()
    }

    fn color_index_at(&self, x: usize, y: usize) -> ColorIndex {
        self.shared
            .video
            .lock()
            .color_index_at(self.shared.font.as_ref(), x, y)
    }

    fn extract_text(&self) -> Option<String> {
        Some(self.shared.video.lock().extract_text())
    }

    fn display_flags(&self) -> &DisplayFlags {
        &self.shared.flags
    }

    fn render(&self, out: &mut Vec<ColorIndex>) {
        let video = self.shared.video.lock();
        let font = self.shared.font.as_ref();
        out.clear();
        out.reserve(512 * 256);
        for y in 0..256 {
            for x in 0..512 {
                out.push(video.color_index_at(font, x, y));
            }
        }
    }
}

impl KeyboardInput for Llc2Frontend {
    fn key_pressed(&self, key: Key, _shift: bool) -> bool {
        if key == Key::F(1) {
            let mut video = self.shared.video.lock();
            video.screen_inverse = !video.screen_inverse;
            self.shared.flags.mark_dirty();
            return true;
        }
        self.shared.keyboard.lock().set_key_code(key)
    }

    fn key_released(&self) {
        self.shared.keyboard.lock().key_released();
    }

    fn key_typed(&self, ch: char) -> bool {
        self.shared.keyboard.lock().set_key_char(ch)
    }
}

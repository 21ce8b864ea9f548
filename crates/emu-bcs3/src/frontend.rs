//! State shared with the render and input contexts.

use std::sync::Arc;

use emu_core::{ColorIndex, DisplayFlags, Key, KeyboardInput, KeyboardMatrix, Rom, VideoSource};
use parking_lot::Mutex;

use crate::keyboard::Bcs3Keyboard;
use crate::video::Video;

pub(crate) struct Shared {
    pub video: Mutex<Video>,
    pub keyboard: Mutex<Bcs3Keyboard>,
    pub flags: DisplayFlags,
    pub font: Option<Rom>,
}

/// Handle to a BCS3's screen and keyboard.
#[derive(Clone)]
pub struct Bcs3Frontend {
    pub(crate) shared: Arc<Shared>,
}

impl VideoSource for Bcs3Frontend {
    fn screen_width(&self) -> usize {
        self.shared.video.lock().screen_width()
    }

    fn screen_height(&self) -> usize {
        self.shared.video.lock().screen_height()
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
        let (w, h) = (video.screen_width(), video.screen_height());
        out.clear();
        out.reserve(w * h);
        for y in 0..h {
            for x in 0..w {
                out.push(video.color_index_at(font, x, y));
            }
        }
    }
}

impl KeyboardInput for Bcs3Frontend {
    fn key_pressed(&self, key: Key, shift: bool) -> bool {
        self.shared.keyboard.lock().set_key_code(key, shift)
    }

    fn key_released(&self) {
        self.shared.keyboard.lock().key_released();
    }

    fn key_typed(&self, ch: char) -> bool {
        self.shared.keyboard.lock().set_key_char(ch)
    }
}

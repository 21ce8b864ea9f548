//! State shared with the render and input contexts.

use std::sync::Arc;

use emu_core::{ColorIndex, DisplayFlags, Key, KeyboardInput, Rom, VideoSource};
use parking_lot::Mutex;

use crate::keyboard::Ac1Keyboard;
use crate::video::Video;

pub(crate) struct Shared {
    pub video: Mutex<Video>,
    pub keyboard: Mutex<Ac1Keyboard>,
    pub flags: DisplayFlags,
    pub font: Option<Rom>,
}

/// Handle to an AC1's screen and keyboard.
#[derive(Clone)]
pub struct Ac1Frontend {
    pub(crate) shared: Arc<Shared>,
}

impl VideoSource for Ac1Frontend {
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

impl KeyboardInput for Ac1Frontend {
    /// F1 toggles inverse video.
    fn key_pressed(&self, key: Key, _shift: bool) -> bool {
        if key == Key::F(1) {
            let mut video = self.shared.video.lock();
            video.inverse_by_key = !video.inverse_by_key;
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

//! State shared with the render and input contexts.

use std::sync::Arc;

use emu_core::{
    ColorIndex, DisplayFlags, Key, KeyboardInput, KeyboardMatrix, Rom, VideoSource,
};
use parking_lot::Mutex;

use crate::keyboard::Z1013Keyboard;
use crate::roms::Fonts;
use crate::video::Video;

pub(crate) struct Shared {
    pub video: Mutex<Video>,
    pub keyboard: Mutex<Z1013Keyboard>,
    pub flags: DisplayFlags,
    pub fonts: Fonts,
    pub ccj_font: Option<Rom>,
}

/// Handle to a Z1013's screen and keyboard for the render and input
/// contexts.
#[derive(Clone)]
pub struct Z1013Frontend {
    pub(crate) shared: Arc<Shared>,
}

impl VideoSource for Z1013Frontend {
    fn screen_width(&self) -> usize {
        self.shared.video.lock().screen_width()
    }

    fn screen_height(&self) -> usize {
        self.shared.video.lock().screen_height()
    }

    fn color_index_at(&self, x: usize, y: usize) -> ColorIndex {
        let s = &self.shared;
        s.video
            .lock()
            .color_index_at(&s.fonts, s.ccj_font.as_ref(), x, y)
    }

    fn extract_text(&self) -> Option<String> {
        self.shared.video.lock().extract_text()
    }

    fn display_flags(&self) -> &DisplayFlags {
        &self.shared.flags
    }

    fn render(&self, out: &mut Vec<ColorIndex>) {
        let s = &self.shared;
        let video = s.video.lock();
        let (w, h) = (video.screen_width(), video.screen_height());
        out.clear();
        out.reserve(w * h);
        for y in 0..h {
            for x in 0..w {
                out.push(video.color_index_at(&s.fonts, s.ccj_font.as_ref(), x, y));
            }
        }
    }
}

impl KeyboardInput for Z1013Frontend {
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

//! State shared with the render and input contexts.

use std::sync::Arc;

use emu_core::{ColorIndex, DisplayFlags, Key, KeyboardInput, KeyboardMatrix, Rom, VideoSource};
use parking_lot::Mutex;

use crate::keyboard::Z9001Keyboard;
use crate::video::{SCREEN_HEIGHT, SCREEN_WIDTH, Video};

pub(crate) struct Shared {
    pub video: Mutex<Video>,
    pub keyboard: Mutex<Z9001Keyboard>,
    pub flags: DisplayFlags,
    pub font: Option<Rom>,
}

/// Handle to a Z9001's screen and keyboard.
///
/// Color indices refer to [`PALETTE`](crate::PALETTE).
#[derive(Clone)]
pub struct Z9001Frontend {
    pub(crate) shared: Arc<Shared>,
}

impl VideoSource for Z9001Frontend {
    fn screen_width(&self) -> usize {
        SCREEN_WIDTH
    }

    fn screen_height(&self) -> usize {
        SCREEN_HEIGHT
    }

    fn color_count(&self) -> usize {
        self.shared.video.lock().color_count()
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
        self.shared.video.lock().extract_text()
    }

    fn display_flags(&self) -> &DisplayFlags {
        &self.shared.flags
    }

    fn render(&self, out: &mut Vec<ColorIndex>) {
        let video = self.shared.video.lock();
        let font = self.shared.font.as_ref();
        out.clear();
        out.reserve(SCREEN_WIDTH * SCREEN_HEIGHT);
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                out.push(video.color_index_at(font, x, y));
            }
        }
    }
}

impl KeyboardInput for Z9001Frontend {
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

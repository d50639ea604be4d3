//! Routes raw pointer events to the scene's per-card callbacks.
//!
//! The window only reports a cursor position, so the router keeps the
//! capture state a DOM would: the card that accepted a press receives every
//! move and the release, wherever the cursor goes. A click is a release over
//! the card the press started on.

use glam::Vec2;
use particle_image::CarouselScene;

#[derive(Debug, Default)]
pub struct PointerRouter {
    cursor: Option<Vec2>,
    captured: Option<usize>,
    pressed_on: Option<usize>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last cursor position inside the window, in physical pixels.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn captured(&self) -> Option<usize> {
        self.captured
    }

    pub fn on_cursor_moved(&mut self, scene: &mut CarouselScene, at: Vec2, hit: Option<usize>) {
        self.cursor = Some(at);
        if let Some(index) = self.captured.or(hit) {
            scene.pointer_move(index, at);
        }
    }

    pub fn on_press(&mut self, scene: &mut CarouselScene, hit: Option<usize>) {
        let (Some(index), Some(at)) = (hit, self.cursor) else {
            return;
        };
        self.pressed_on = Some(index);
        if scene.pointer_down(index, at) {
            self.captured = Some(index);
        }
    }

    /// Returns the card to open when the release completes a click.
    pub fn on_release(&mut self, scene: &mut CarouselScene, hit: Option<usize>) -> Option<usize> {
        let at = self.cursor.unwrap_or(Vec2::ZERO);
        if let Some(index) = self.captured.take() {
            scene.pointer_up(index, at);
        }

        match (self.pressed_on.take(), hit) {
            (Some(pressed), Some(released)) if pressed == released => scene.click(released),
            _ => None,
        }
    }

    /// Cursor left the window or focus was lost: nothing stays captured.
    pub fn on_leave(&mut self, scene: &mut CarouselScene) {
        self.cursor = None;
        self.captured = None;
        self.pressed_on = None;
        scene.pointer_cancel();
        scene.hover(None);
    }
}

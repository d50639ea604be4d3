//! Pointer hover/drag state of one card.
//!
//! Only the active card reacts: it can be hovered, grabbed and spun. A drag
//! longer than a few pixels swallows the click that the platform delivers
//! after the button is released, so rotating a card never opens it.

use glam::Vec2;

/// Rotation (radians) per pixel of pointer travel.
pub const DRAG_GAIN: f32 = 0.005;
/// Travel (pixels) beyond which a press counts as a drag.
pub const DRAG_THRESHOLD_PX: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerPhase {
    Idle,
    Hovering,
    Dragging { start: Vec2, last: Vec2 },
}

/// Result of a click delivered to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Select,
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardInteraction {
    phase: PointerPhase,
    hovered: bool,
    was_dragging: bool,
    /// Local rotation applied on top of the carousel layout (x, y radians).
    rotation: Vec2,
}

impl Default for CardInteraction {
    fn default() -> Self {
        Self {
            phase: PointerPhase::Idle,
            hovered: false,
            was_dragging: false,
            rotation: Vec2::ZERO,
        }
    }
}

impl CardInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, PointerPhase::Dragging { .. })
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    fn rest_phase(&self) -> PointerPhase {
        if self.hovered {
            PointerPhase::Hovering
        } else {
            PointerPhase::Idle
        }
    }

    pub fn pointer_enter(&mut self, active: bool) {
        if !active {
            return;
        }
        self.hovered = true;
        if !self.is_dragging() {
            self.phase = PointerPhase::Hovering;
        }
    }

    /// A drag in progress keeps going; the pointer is captured.
    pub fn pointer_leave(&mut self) {
        self.hovered = false;
        if !self.is_dragging() {
            self.phase = PointerPhase::Idle;
        }
    }

    /// Returns `true` when the card captures the pointer. A new press starts
    /// a fresh gesture, so a drag flag left by an earlier release that never
    /// turned into a click is dropped.
    pub fn pointer_down(&mut self, active: bool, at: Vec2) -> bool {
        if !active {
            return false;
        }
        self.was_dragging = false;
        self.phase = PointerPhase::Dragging { start: at, last: at };
        true
    }

    pub fn pointer_move(&mut self, at: Vec2) {
        if let PointerPhase::Dragging { start, last } = self.phase {
            let delta = at - last;
            self.rotation.x += delta.y * DRAG_GAIN;
            self.rotation.y += delta.x * DRAG_GAIN;
            self.phase = PointerPhase::Dragging { start, last: at };
        }
    }

    /// Ends a drag. Returns `true` when a capture should be released.
    pub fn pointer_up(&mut self, at: Vec2) -> bool {
        match self.phase {
            PointerPhase::Dragging { start, .. } => {
                if at.distance(start) > DRAG_THRESHOLD_PX {
                    self.was_dragging = true;
                }
                self.phase = self.rest_phase();
                true
            }
            _ => false,
        }
    }

    /// The pointer went away mid-gesture (left the window, lost focus).
    pub fn pointer_cancel(&mut self) {
        self.hovered = false;
        self.was_dragging = false;
        self.phase = PointerPhase::Idle;
    }

    /// Consumes the drag flag. A click right after a drag is suppressed once.
    pub fn click(&mut self) -> ClickOutcome {
        if std::mem::take(&mut self.was_dragging) {
            ClickOutcome::Suppressed
        } else {
            ClickOutcome::Select
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_suppresses_exactly_one_click() {
        let mut card = CardInteraction::new();
        card.pointer_enter(true);
        assert!(card.pointer_down(true, Vec2::new(100.0, 100.0)));
        card.pointer_move(Vec2::new(106.0, 100.0));
        card.pointer_move(Vec2::new(110.0, 100.0));
        assert!(card.pointer_up(Vec2::new(110.0, 100.0)));

        assert_eq!(card.click(), ClickOutcome::Suppressed);
        assert_eq!(card.click(), ClickOutcome::Select);
    }

    #[test]
    fn short_press_is_a_click() {
        let mut card = CardInteraction::new();
        card.pointer_enter(true);
        card.pointer_down(true, Vec2::new(10.0, 10.0));
        card.pointer_move(Vec2::new(13.0, 12.0));
        card.pointer_up(Vec2::new(13.0, 12.0));
        assert_eq!(card.click(), ClickOutcome::Select);
        assert_eq!(card.phase(), PointerPhase::Hovering);
    }

    #[test]
    fn drag_rotates_by_gain() {
        let mut card = CardInteraction::new();
        card.pointer_down(true, Vec2::ZERO);
        card.pointer_move(Vec2::new(100.0, -40.0));
        let r = card.rotation();
        assert!((r.y - 0.5).abs() < 1e-6);
        assert!((r.x + 0.2).abs() < 1e-6);
    }

    #[test]
    fn inactive_cards_ignore_pointer() {
        let mut card = CardInteraction::new();
        card.pointer_enter(false);
        assert!(!card.is_hovered());
        assert!(!card.pointer_down(false, Vec2::ZERO));
        card.pointer_move(Vec2::new(50.0, 50.0));
        assert_eq!(card.rotation(), Vec2::ZERO);
        assert_eq!(card.phase(), PointerPhase::Idle);
    }

    #[test]
    fn leaving_mid_drag_keeps_the_capture() {
        let mut card = CardInteraction::new();
        card.pointer_enter(true);
        card.pointer_down(true, Vec2::ZERO);
        card.pointer_leave();
        assert!(card.is_dragging());
        card.pointer_move(Vec2::new(20.0, 0.0));
        assert!(card.rotation().y > 0.0);
        card.pointer_up(Vec2::new(20.0, 0.0));
        assert_eq!(card.phase(), PointerPhase::Idle);
    }

    #[test]
    fn unclaimed_drag_flag_does_not_outlive_the_next_press() {
        let mut card = CardInteraction::new();
        card.pointer_enter(true);
        card.pointer_down(true, Vec2::ZERO);
        card.pointer_move(Vec2::new(400.0, 0.0));
        // Released off the card: no click follows.
        assert!(card.pointer_up(Vec2::new(400.0, 0.0)));

        card.pointer_down(true, Vec2::new(10.0, 10.0));
        card.pointer_up(Vec2::new(10.0, 10.0));
        assert_eq!(card.click(), ClickOutcome::Select);
    }

    #[test]
    fn cancel_never_leaves_a_drag_stuck() {
        let mut card = CardInteraction::new();
        card.pointer_enter(true);
        card.pointer_down(true, Vec2::ZERO);
        card.pointer_move(Vec2::new(30.0, 0.0));
        card.pointer_cancel();
        assert_eq!(card.phase(), PointerPhase::Idle);
        assert!(!card.pointer_up(Vec2::new(30.0, 0.0)));
        assert_eq!(card.click(), ClickOutcome::Select);
    }
}

/// A discrete change observed on one hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HandEdge {
    Connected,
    Disconnected,
    SelectStart,
}

/// Turns per-frame action levels into connect, disconnect and select edges.
///
/// `active` is whether the runtime currently tracks the hand's aim action;
/// `pressed` is the select action's boolean state. A held trigger produces a
/// single `SelectStart`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct HandTracker {
    active: bool,
    pressed: bool,
}

impl HandTracker {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn update(&mut self, active: bool, pressed: bool, mut emit: impl FnMut(HandEdge)) {
        if active != self.active {
            self.active = active;
            emit(if active { HandEdge::Connected } else { HandEdge::Disconnected });
        }

        let pressed = pressed && active;
        if pressed && !self.pressed {
            emit(HandEdge::SelectStart);
        }
        self.pressed = pressed;
    }

    /// Forgets all state, reporting a disconnect if the hand was active.
    pub fn reset(&mut self, mut emit: impl FnMut(HandEdge)) {
        if self.active {
            emit(HandEdge::Disconnected);
        }
        *self = Self::default();
    }
}

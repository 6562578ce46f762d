use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// Transitions seen since the last redraw.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    /// Button presses with the pointer position at the time of the press.
    pub clicks: Vec<(MouseButton, (f32, f32))>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.clicks.clear();
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Position of the first press of `button` this frame.
    pub fn click(&self, button: MouseButton) -> Option<(f32, f32)> {
        self.clicks
            .iter()
            .find(|(b, _)| *b == button)
            .map(|&(_, pos)| pos)
    }
}

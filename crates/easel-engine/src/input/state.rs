use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, MouseButton, Press};

/// Held keys and buttons, pointer position and focus.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub pointer_pos: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the held state and records new presses in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Key { repeat: true, .. } => {}
            InputEvent::Key { key, press: Press::Down, .. } => {
                if self.keys_down.insert(key) {
                    frame.keys_pressed.insert(key);
                }
            }
            InputEvent::Key { key, press: Press::Up, .. } => {
                self.keys_down.remove(&key);
            }

            InputEvent::Button { button, press: Press::Down } => {
                if self.buttons_down.insert(button) {
                    // A press with no known pointer cannot hit anything.
                    if let Some(pos) = self.pointer_pos {
                        frame.clicks.push((button, pos));
                    }
                }
            }
            InputEvent::Button { button, press: Press::Up } => {
                self.buttons_down.remove(&button);
            }

            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((x, y)),
            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Focus(focused) => {
                self.focused = focused;
                if !focused {
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }
        }
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, press: Press, repeat: bool) -> InputEvent {
        InputEvent::Key { key, press, repeat }
    }

    fn left(press: Press) -> InputEvent {
        InputEvent::Button { button: MouseButton::Left, press }
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn held_key_is_pressed_once() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, key(Key::Enter, Press::Down, false));
        st.apply_event(&mut fr, key(Key::Enter, Press::Down, true));
        assert!(fr.key_pressed(Key::Enter));
        assert!(st.key_down(Key::Enter));

        fr.clear();
        st.apply_event(&mut fr, key(Key::Enter, Press::Down, false));
        assert!(!fr.key_pressed(Key::Enter));

        st.apply_event(&mut fr, key(Key::Enter, Press::Up, false));
        st.apply_event(&mut fr, key(Key::Enter, Press::Down, false));
        assert!(fr.key_pressed(Key::Enter));
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn click_records_pointer_position() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();

        st.apply_event(&mut fr, InputEvent::PointerMoved { x: 12.0, y: 34.0 });
        st.apply_event(&mut fr, left(Press::Down));
        st.apply_event(&mut fr, InputEvent::PointerMoved { x: 50.0, y: 50.0 });

        assert_eq!(fr.click(MouseButton::Left), Some((12.0, 34.0)));
        assert_eq!(fr.click(MouseButton::Right), None);
        assert!(st.button_down(MouseButton::Left));

        st.apply_event(&mut fr, left(Press::Up));
        assert!(!st.button_down(MouseButton::Left));
    }

    #[test]
    fn click_outside_window_is_dropped() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();
        st.apply_event(&mut fr, InputEvent::PointerMoved { x: 1.0, y: 2.0 });
        st.apply_event(&mut fr, InputEvent::PointerLeft);
        st.apply_event(&mut fr, left(Press::Down));

        assert_eq!(st.pointer_pos, None);
        assert!(fr.clicks.is_empty());
    }

    // ── focus ─────────────────────────────────────────────────────────────

    #[test]
    fn focus_loss_releases_everything() {
        let mut st = InputState::default();
        let mut fr = InputFrame::default();
        st.apply_event(&mut fr, key(Key::Space, Press::Down, false));
        st.apply_event(&mut fr, InputEvent::PointerMoved { x: 0.0, y: 0.0 });
        st.apply_event(&mut fr, left(Press::Down));

        st.apply_event(&mut fr, InputEvent::Focus(false));
        assert!(st.keys_down.is_empty());
        assert!(st.buttons_down.is_empty());
        assert!(!st.focused);
    }
}

/// Keyboard key. Keys without a binding in the studio are `Other`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    /// Platform key code.
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Down/up transition of a key or button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Press {
    Down,
    Up,
}

/// Input event in window terms. Positions are logical pixels, top-left origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, press: Press, repeat: bool },
    Button { button: MouseButton, press: Press },
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    Focus(bool),
}

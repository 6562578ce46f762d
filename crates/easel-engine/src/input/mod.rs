//! Window input: pointer, mouse buttons and the few keys the studio binds.
//!
//! Public types carry no winit types; `platform::winit` does the translation.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, MouseButton, Press};

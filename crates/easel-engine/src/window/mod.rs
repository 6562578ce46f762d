//! The event loop and its single window.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};

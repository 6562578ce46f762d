//! OpenXR bridge.
//!
//! The studio never talks to OpenXR directly: [`probe`] answers whether an
//! immersive session is plausible, and [`XrRuntime`] turns a headless session
//! into a stream of [`XrEvent`]s plus polled controller and head poses.
//!
//! The session is headless (`XR_MND_headless`): it supplies tracking, input
//! and lifecycle, while the window keeps rendering the mirror view.

mod hands;
mod pose;
mod probe;
mod runtime;

pub use hands::{HandEdge, HandTracker};
pub use pose::pose_to_mat4;
pub use probe::{probe, XrConfig, XrSupport};
pub use runtime::{XrEvent, XrRuntime};

/// Number of tracked hands (left, right).
pub const HAND_COUNT: usize = 2;

//! Easel engine crate.
//!
//! This crate owns the platform, GPU and XR runtime pieces used by the studio:
//! the winit event loop, the wgpu device, renderers for the scene, font
//! rasterization and the OpenXR input/session bridge.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod color;
pub mod render;
pub mod text;
pub mod xr;

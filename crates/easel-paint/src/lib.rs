//! Easel core crate.
//!
//! Owns everything that does not touch the GPU, the window system or the XR
//! runtime: the panel's pixel surface, ray picking against the panel, the
//! controller/session model and the per-frame event processing that ties them
//! together. The engine and studio crates feed it events and read it back.

pub mod camera;
pub mod controller;
pub mod event;
pub mod frame;
pub mod interaction;
pub mod panel;
pub mod ray;
pub mod scene;
pub mod session;
pub mod surface;

pub use camera::{DisplaySize, PerspectiveCamera};
pub use controller::{Connectivity, Controller, ControllerIndex, Controllers};
pub use event::{EventQueue, SceneEvent};
pub use frame::{FrameContext, FrameReport, SelectOutcome};
pub use interaction::{uv_to_pixel, Brush, Mark, PointerPainter};
pub use panel::{Panel, PanelHit};
pub use ray::Ray;
pub use scene::{AmbientLight, DirectionalLight, LabelConfig, Scene, SceneConfig};
pub use session::{EligibilityPolicy, InteractionGate, SessionMode};
pub use surface::{Rgba8, SurfaceBuffer};

//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and creates them
//! lazily on first use.
//!
//! Convention:
//! - World geometry is right-handed, Y up, in meters; renderers receive a
//!   camera `view_proj` matrix.
//! - Overlay geometry is in logical pixels (top-left origin, +Y down) and is
//!   mapped to NDC with [`overlay_transform`].

mod common;
mod ctx;
pub mod mesh;
pub mod textured;

pub use common::overlay_transform;
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{LightRig, LitMeshRenderer, MeshInstance};
pub use textured::{QuadMode, TexturedQuad, TexturedQuadRenderer};

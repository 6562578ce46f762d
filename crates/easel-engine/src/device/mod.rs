//! wgpu device, queue and the window swapchain with its depth target.

mod gpu;
mod options;
mod swapchain;

pub use gpu::Gpu;
pub use options::GpuInit;
pub use swapchain::{GpuFrame, SurfaceErrorAction};

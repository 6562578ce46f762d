/// How the GPU layer is brought up.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// FIFO present when set, otherwise the lowest-latency mode the surface offers.
    pub vsync: bool,
    /// Allocate a depth target alongside the swapchain.
    pub depth: bool,
    pub power_preference: wgpu::PowerPreference,
    pub required_limits: wgpu::Limits,
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            vsync: true,
            depth: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits: wgpu::Limits::default(),
            frame_latency: 2,
        }
    }
}

impl GpuInit {
    pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub(crate) fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth.then_some(Self::DEPTH_FORMAT)
    }
}

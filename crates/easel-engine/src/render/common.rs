//! Shared GPU types and utilities used by the renderers.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::coords::{ScreenRect, Viewport};

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── depth ─────────────────────────────────────────────────────────────────

pub(super) fn depth_state(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── uniform sizes ─────────────────────────────────────────────────────────

/// Minimum binding size for a uniform of type `T`.
///
/// Every uniform struct here has fields, so the size is never zero.
pub(super) fn ubo_min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── overlay mapping ───────────────────────────────────────────────────────

/// Maps the unit quad (`[-0.5, 0.5]²`, +Y up) onto a logical-pixel `rect`
/// (top-left origin, +Y down) in clip space.
pub fn overlay_transform(rect: ScreenRect, viewport: Viewport) -> Mat4 {
    let vp = viewport.size().max(glam::Vec2::ONE);
    let c = rect.center() / vp;
    let s = rect.size.abs() / vp;

    Mat4::from_translation(Vec3::new(2.0 * c.x - 1.0, 1.0 - 2.0 * c.y, 0.0))
        * Mat4::from_scale(Vec3::new(2.0 * s.x, 2.0 * s.y, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn full_viewport_rect_covers_clip_space() {
        let vp = Viewport::new(800.0, 600.0);
        let m = overlay_transform(ScreenRect::new(0.0, 0.0, 800.0, 600.0), vp);
        assert!(approx(m.transform_point3(Vec3::new(-0.5, 0.5, 0.0)), Vec3::new(-1.0, 1.0, 0.0)));
        assert!(approx(m.transform_point3(Vec3::new(0.5, -0.5, 0.0)), Vec3::new(1.0, -1.0, 0.0)));
    }

    #[test]
    fn top_right_rect_maps_to_top_right_corner() {
        let vp = Viewport::new(1000.0, 500.0);
        let m = overlay_transform(ScreenRect::new(900.0, 0.0, 100.0, 50.0), vp);
        // Top-right corner of the quad lands on the top-right of clip space.
        assert!(approx(m.transform_point3(Vec3::new(0.5, 0.5, 0.0)), Vec3::new(1.0, 1.0, 0.0)));
        // Bottom-left corner at (900, 50) px.
        assert!(approx(m.transform_point3(Vec3::new(-0.5, -0.5, 0.0)), Vec3::new(0.8, 0.8, 0.0)));
    }
}

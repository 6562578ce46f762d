//! Instanced lit boxes (controller bodies and pointer rays).

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::color::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{depth_state, premul_alpha_blend, ubo_min_binding_size};

/// One box to draw: the unit cube (`[-0.5, 0.5]³`) placed by `model`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshInstance {
    pub model: Mat4,
    pub color: Color,
    /// Skip lighting and output `color` as is.
    pub unlit: bool,
}

/// Camera and lights shared by every instance in a draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightRig {
    pub view_proj: Mat4,
    /// Ambient color, already scaled by intensity.
    pub ambient: Color,
    /// Direction the directional light travels.
    pub light_direction: Vec3,
    /// Directional color, already scaled by intensity.
    pub light: Color,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LightsUniform {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
}

impl From<&LightRig> for LightsUniform {
    fn from(rig: &LightRig) -> Self {
        let dir = rig.light_direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        Self {
            view_proj: rig.view_proj.to_cols_array_2d(),
            ambient: rig.ambient.to_array(),
            light_dir: [dir.x, dir.y, dir.z, 0.0],
            light_color: rig.light.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MeshInstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    color: [f32; 4],
    flags: [f32; 4], // x = unlit
}

impl MeshInstanceRaw {
    const ATTRS: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstanceRaw>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

impl From<&MeshInstance> for MeshInstanceRaw {
    fn from(inst: &MeshInstance) -> Self {
        let n = Mat3::from_mat4(inst.model).inverse().transpose();
        let n = if n.is_finite() { n } else { Mat3::IDENTITY };
        Self {
            model: inst.model.to_cols_array_2d(),
            normal: [
                n.x_axis.extend(0.0).to_array(),
                n.y_axis.extend(0.0).to_array(),
                n.z_axis.extend(0.0).to_array(),
            ],
            color: inst.color.to_array(),
            flags: [if inst.unlit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

// (outward normal, u axis, v axis) per face; u × v == normal.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Unit cube: 4 vertices per face (flat normals), CCW from outside.
fn cube_geometry() -> (Vec<MeshVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (face, (n, u, v)) in CUBE_FACES.iter().enumerate() {
        let n = Vec3::from_array(*n);
        let u = Vec3::from_array(*u);
        let v = Vec3::from_array(*v);
        let centre = n * 0.5;

        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = centre + u * su + v * sv;
            vertices.push(MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            });
        }

        let base = (face * 4) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Draws instanced boxes with ambient + directional lighting.
#[derive(Default)]
pub struct LitMeshRenderer {
    pipeline: Option<wgpu::RenderPipeline>,
    pipeline_key: Option<(wgpu::TextureFormat, Option<wgpu::TextureFormat>)>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,

    cube_vbo: Option<wgpu::Buffer>,
    cube_ibo: Option<wgpu::Buffer>,
    cube_index_count: u32,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl LitMeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        rig: &LightRig,
        instances: &[MeshInstance],
    ) {
        if instances.is_empty() {
            return;
        }

        let use_depth = ctx.depth_format.is_some() && target.depth_view.is_some();

        self.ensure_pipeline(ctx, use_depth);
        self.ensure_bindings(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_instance_capacity(ctx, instances.len());

        let raw: Vec<MeshInstanceRaw> = instances.iter().map(MeshInstanceRaw::from).collect();

        let Some(ubo) = self.ubo.as_ref() else { return };
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };

        ctx.queue
            .write_buffer(ubo, 0, bytemuck::bytes_of(&LightsUniform::from(rig)));
        ctx.queue
            .write_buffer(instance_vbo, 0, bytemuck::cast_slice(&raw));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(cube_vbo) = self.cube_vbo.as_ref() else { return };
        let Some(cube_ibo) = self.cube_ibo.as_ref() else { return };

        let mut rpass = target.begin_load_pass("easel mesh pass", use_depth);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, cube_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(cube_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.cube_index_count, 0, 0..raw.len() as u32);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, use_depth: bool) {
        let depth_format = if use_depth { ctx.depth_format } else { None };
        let key = (ctx.surface_format, depth_format);
        if self.pipeline_key == Some(key) && self.pipeline.is_some() {
            return;
        }

        self.ensure_layout(ctx);
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("easel mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/lit.wgsl").into()),
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel mesh pipeline layout"),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });

        self.pipeline = Some(ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("easel mesh pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout(), MeshInstanceRaw::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: depth_format.map(depth_state),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }));
        self.pipeline_key = Some(key);
    }

    fn ensure_layout(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_layout.is_some() {
            return;
        }
        self.bind_group_layout = Some(ctx.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("easel mesh bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: ubo_min_binding_size::<LightsUniform>(),
                    },
                    count: None,
                }],
            },
        ));
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.ubo.is_some() {
            return;
        }
        self.ensure_layout(ctx);
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel mesh ubo"),
            size: std::mem::size_of::<LightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel mesh bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.ubo = Some(ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.cube_vbo.is_some() && self.cube_ibo.is_some() {
            return;
        }
        let (vertices, indices) = cube_geometry();

        self.cube_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel cube vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.cube_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel cube ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.cube_index_count = indices.len() as u32;
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<MeshInstanceRaw>()) as u64;
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel mesh instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── cube geometry ─────────────────────────────────────────────────────

    #[test]
    fn cube_has_flat_faces() {
        let (vertices, indices) = cube_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);

        for v in &vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-6);
            // Every vertex sits on the face its normal names.
            assert!((p.dot(n) - 0.5).abs() < 1e-6);
            assert!(p.abs().max_element() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn triangles_wind_ccw_from_outside() {
        let (vertices, indices) = cube_geometry();
        for tri in indices.chunks(3) {
            let a = Vec3::from_array(vertices[tri[0] as usize].position);
            let b = Vec3::from_array(vertices[tri[1] as usize].position);
            let c = Vec3::from_array(vertices[tri[2] as usize].position);
            let n = Vec3::from_array(vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    // ── instance packing ──────────────────────────────────────────────────

    #[test]
    fn unlit_flag_and_normal_matrix() {
        let inst = MeshInstance {
            model: Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)),
            color: Color::WHITE,
            unlit: true,
        };
        let raw = MeshInstanceRaw::from(&inst);
        assert_eq!(raw.flags[0], 1.0);
        assert!((raw.normal[0][0] - 0.5).abs() < 1e-6);
        assert!((raw.normal[1][1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn light_direction_is_normalized() {
        let rig = LightRig {
            view_proj: Mat4::IDENTITY,
            ambient: Color::WHITE.scaled(0.5),
            light_direction: Vec3::new(0.0, -4.0, 0.0),
            light: Color::WHITE,
        };
        let u = LightsUniform::from(&rig);
        assert_eq!(u.light_dir, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(u.ambient, [0.5, 0.5, 0.5, 1.0]);
    }
}

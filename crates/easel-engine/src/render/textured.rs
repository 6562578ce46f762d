use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    depth_state, premul_alpha_blend, ubo_min_binding_size, QuadVertex, QUAD_INDICES,
    QUAD_VERTICES,
};

/// How a textured quad is composited.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum QuadMode {
    /// Depth-tested against the 3D scene.
    World,
    /// Drawn over everything, no depth.
    Overlay,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadUniform {
    transform: [[f32; 4]; 4],
    tint: [f32; 4],
}

/// An RGBA8 sRGB texture plus the per-quad uniform that places it.
///
/// Created by [`TexturedQuadRenderer::create_quad`]; the texture contents are
/// replaced wholesale with [`upload`](Self::upload).
pub struct TexturedQuad {
    texture: wgpu::Texture,
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl TexturedQuad {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Replaces the texture contents with tightly packed RGBA8 rows.
    ///
    /// Data of the wrong length is rejected with a warning.
    pub fn upload(&self, queue: &wgpu::Queue, rgba: &[u8]) {
        let expected = self.width as usize * self.height as usize * 4;
        if rgba.len() != expected {
            log::warn!(
                "TexturedQuad: upload of {} bytes ignored (expected {expected})",
                rgba.len()
            );
            return;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Draws textured quads, either into the 3D scene or as screen overlays.
///
/// Quads are two-sided. Textures are sampled as sRGB and composited with
/// premultiplied alpha.
#[derive(Default)]
pub struct TexturedQuadRenderer {
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    pipeline_key: Option<(wgpu::TextureFormat, Option<wgpu::TextureFormat>)>,
    world_pipeline: Option<wgpu::RenderPipeline>,
    overlay_pipeline: Option<wgpu::RenderPipeline>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl TexturedQuadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a `width × height` texture and its bindings.
    pub fn create_quad(
        &mut self,
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
        label: &str,
    ) -> Option<TexturedQuad> {
        self.ensure_layout(ctx);
        self.ensure_sampler(ctx);

        let bgl = self.bind_group_layout.as_ref()?;
        let sampler = self.sampler.as_ref()?;

        let width = width.max(1);
        let height = height.max(1);

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel quad ubo"),
            size: std::mem::size_of::<QuadUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel quad bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Some(TexturedQuad {
            texture,
            ubo,
            bind_group,
            width,
            height,
        })
    }

    /// Draws `quad` with `transform` (unit quad to clip space).
    ///
    /// `QuadMode::World` falls back to an undepth-tested draw when the target
    /// has no depth attachment.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        quad: &TexturedQuad,
        transform: Mat4,
        mode: QuadMode,
    ) {
        self.ensure_layout(ctx);
        self.ensure_pipelines(ctx);
        self.ensure_static_buffers(ctx);

        let uniform = QuadUniform {
            transform: transform.to_cols_array_2d(),
            tint: [1.0; 4],
        };
        ctx.queue.write_buffer(&quad.ubo, 0, bytemuck::bytes_of(&uniform));

        let use_depth = mode == QuadMode::World && target.depth_view.is_some();
        let pipeline = if use_depth {
            self.world_pipeline.as_ref()
        } else {
            self.overlay_pipeline.as_ref()
        };

        let Some(pipeline) = pipeline else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.begin_load_pass("easel quad pass", use_depth);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &quad.bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_layout(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_layout.is_some() {
            return;
        }

        self.bind_group_layout = Some(ctx.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("easel quad bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: ubo_min_binding_size::<QuadUniform>(),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            },
        ));
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("easel quad sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        }));
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        let key = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_key == Some(key) && self.overlay_pipeline.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("easel quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel quad pipeline layout"),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });

        let build = |label: &str, depth: Option<wgpu::DepthStencilState>| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[QuadVertex::layout()],
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
                    // Double-sided.
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: depth,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.world_pipeline = ctx
            .depth_format
            .map(|f| build("easel quad world pipeline", Some(depth_state(f))));
        self.overlay_pipeline = Some(build("easel quad overlay pipeline", None));
        self.pipeline_key = Some(key);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

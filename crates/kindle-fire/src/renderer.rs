use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use kindle_engine::render::{RenderCtx, RenderTarget};

use crate::atlas::AtlasImage;
use crate::flame::Flame;
use crate::motion::DEFAULT_SIZE_SCALE;
use crate::particles::ParticleTable;

/// Everything that varies per frame.
#[derive(Debug, Copy, Clone)]
pub struct FireFrame<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    /// Simulation seconds.
    pub time: f32,
    pub flames: &'a [Flame],
    pub billboard: bool,
    pub atlas_animation: bool,
    pub acceleration: Vec3,
    pub size_scale: f32,
}

impl<'a> FireFrame<'a> {
    /// Frame with the default quad size, no billboarding, no animation and no acceleration.
    pub fn new(view: Mat4, projection: Mat4, time: f32, flames: &'a [Flame]) -> Self {
        Self {
            view,
            projection,
            time,
            flames,
            billboard: false,
            atlas_animation: false,
            acceleration: Vec3::ZERO,
            size_scale: DEFAULT_SIZE_SCALE,
        }
    }
}

const FIRE_SHADER: &str = include_str!("shaders/fire.wgsl");

/// Draws every flame from one shared, static particle table.
///
/// GPU resources are created lazily on the first draw and rebuilt when the
/// surface format changes. Per frame, only the flame uniforms are written.
pub struct FireRenderer {
    table: ParticleTable,
    atlas: AtlasImage,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    bind_group: Option<wgpu::BindGroup>,
    flame_ubo: Option<wgpu::Buffer>,
    flame_capacity: usize,
    uniform_stride: u64,

    particle_buffers: Option<ParticleBuffers>,

    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,
    sampler: Option<wgpu::Sampler>,
}

struct ParticleBuffers {
    lifetimes: wgpu::Buffer,
    corners: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    center_offsets: wgpu::Buffer,
    velocities: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl FireRenderer {
    pub fn new(table: ParticleTable, atlas: AtlasImage) -> Self {
        Self {
            table,
            atlas,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            flame_ubo: None,
            flame_capacity: 0,
            uniform_stride: 0,
            particle_buffers: None,
            atlas_texture: None,
            atlas_view: None,
            sampler: None,
        }
    }

    /// Records one pass that draws every flame in `frame` on top of `target`.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, frame: &FireFrame<'_>) {
        if frame.flames.is_empty() || self.table.index_count() == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_particle_buffers(ctx);
        self.ensure_atlas(ctx);
        self.ensure_sampler(ctx);
        self.ensure_bindings(ctx, frame.flames.len());
        self.write_flame_uniforms(ctx, frame);

        let (Some(pipeline), Some(bind_group), Some(bufs)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.particle_buffers.as_ref(),
        ) else {
            return;
        };

        let mut rpass = target.load_pass("kindle fire pass");
        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, bufs.lifetimes.slice(..));
        rpass.set_vertex_buffer(1, bufs.corners.slice(..));
        rpass.set_vertex_buffer(2, bufs.tex_coords.slice(..));
        rpass.set_vertex_buffer(3, bufs.center_offsets.slice(..));
        rpass.set_vertex_buffer(4, bufs.velocities.slice(..));
        rpass.set_index_buffer(bufs.indices.slice(..), wgpu::IndexFormat::Uint16);

        for i in 0..frame.flames.len() {
            let offset = (i as u64 * self.uniform_stride) as u32;
            rpass.set_bind_group(0, bind_group, &[offset]);
            rpass.draw_indexed(0..bufs.index_count, 0, 0..1);
        }
    }

    // ── lazy-init helpers ─────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kindle fire shader"),
            source: wgpu::ShaderSource::Wgsl(FIRE_SHADER.into()),
        });
        log_compilation_info(&shader);

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kindle fire bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(FLAME_UNIFORM_SIZE),
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
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kindle fire pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kindle fire pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &PARTICLE_LAYOUTS,
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Atlas encoding follows the surface: an sRGB target needs an sRGB texture
        // so sampled values come back unchanged after the output conversion.
        if self.pipeline_format.map(|f| f.is_srgb()) != Some(ctx.surface_format.is_srgb()) {
            self.atlas_texture = None;
            self.atlas_view = None;
        }

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
    }

    fn ensure_particle_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.particle_buffers.is_some() {
            return;
        }

        let t = &self.table;
        let vertex_buffer = |label: &str, contents: &[u8]| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        self.particle_buffers = Some(ParticleBuffers {
            lifetimes: vertex_buffer("kindle fire lifetimes", bytemuck::cast_slice(&t.lifetimes)),
            corners: vertex_buffer("kindle fire corners", bytemuck::cast_slice(&t.corners)),
            tex_coords: vertex_buffer("kindle fire tex coords", bytemuck::cast_slice(&t.tex_coords)),
            center_offsets: vertex_buffer(
                "kindle fire center offsets",
                bytemuck::cast_slice(&t.center_offsets),
            ),
            velocities: vertex_buffer("kindle fire velocities", bytemuck::cast_slice(&t.velocities)),
            indices: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kindle fire indices"),
                contents: bytemuck::cast_slice(&t.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: t.index_count() as u32,
        });

        log::debug!(
            "uploaded {} particles ({} vertices)",
            t.particle_count(),
            t.vertex_count()
        );
    }

    fn ensure_atlas(&mut self, ctx: &RenderCtx<'_>) {
        if self.atlas_texture.is_some() && self.atlas_view.is_some() {
            return;
        }

        let format = if ctx.surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let size = wgpu::Extent3d {
            width: self.atlas.width,
            height: self.atlas.height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kindle fire atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.atlas.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.atlas.bytes_per_row()),
                rows_per_image: Some(self.atlas.height),
            },
            size,
        );

        self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.atlas_texture = Some(texture);
        self.bind_group = None;
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kindle fire sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }

    /// Makes sure the uniform buffer holds at least `flames` slots.
    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>, flames: usize) {
        if self.bind_group.is_some() && self.flame_ubo.is_some() && flames <= self.flame_capacity {
            return;
        }

        let (Some(bgl), Some(atlas_view), Some(sampler)) = (
            self.bind_group_layout.as_ref(),
            self.atlas_view.as_ref(),
            self.sampler.as_ref(),
        ) else {
            return;
        };

        let alignment = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = uniform_stride(alignment);
        let capacity = flames.max(self.flame_capacity).next_power_of_two().max(2);

        let flame_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kindle fire flame ubo"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kindle fire bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &flame_ubo,
                        offset: 0,
                        size: wgpu::BufferSize::new(FLAME_UNIFORM_SIZE),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.uniform_stride = stride;
        self.flame_capacity = capacity;
        self.flame_ubo = Some(flame_ubo);
        self.bind_group = Some(bind_group);
    }

    fn write_flame_uniforms(&mut self, ctx: &RenderCtx<'_>, frame: &FireFrame<'_>) {
        let Some(ubo) = self.flame_ubo.as_ref() else { return };
        let bytes = pack_flame_uniforms(frame, self.uniform_stride as usize);
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }
}

fn log_compilation_info(shader: &wgpu::ShaderModule) {
    let info = pollster::block_on(shader.get_compilation_info());
    for msg in &info.messages {
        let (line, col) = msg
            .location
            .as_ref()
            .map(|l| (l.line_number, l.line_position))
            .unwrap_or((0, 0));
        match msg.message_type {
            wgpu::CompilationMessageType::Error => {
                log::error!("fire.wgsl:{line}:{col}: {}", msg.message)
            }
            wgpu::CompilationMessageType::Warning => {
                log::warn!("fire.wgsl:{line}:{col}: {}", msg.message)
            }
            _ => log::debug!("fire.wgsl:{line}:{col}: {}", msg.message),
        }
    }
}

/// `src * src_alpha + dst`: overlapping particles brighten each other.
fn additive_blend() -> wgpu::BlendState {
    let add = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: add, alpha: add }
}

#[inline]
fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

fn uniform_stride(min_alignment: u64) -> u64 {
    align_up(FLAME_UNIFORM_SIZE, min_alignment)
}

fn pack_flame_uniforms(frame: &FireFrame<'_>, stride: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; stride * frame.flames.len()];
    for (i, flame) in frame.flames.iter().enumerate() {
        let u = FlameUniform::new(frame, flame);
        let start = i * stride;
        bytes[start..start + FLAME_UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&u));
    }
    bytes
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Mirrors `FlameUniform` in `shaders/fire.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct FlameUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    fire_pos: [f32; 3],
    time: f32,
    color: [f32; 4],
    acceleration: [f32; 3],
    size_scale: f32,
    billboard: u32,
    atlas_animation: u32,
    _pad: [u32; 2], // 16-byte struct size
}

const FLAME_UNIFORM_SIZE: u64 = std::mem::size_of::<FlameUniform>() as u64;

impl FlameUniform {
    fn new(frame: &FireFrame<'_>, flame: &Flame) -> Self {
        Self {
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            fire_pos: flame.position,
            time: frame.time,
            color: flame.color,
            acceleration: frame.acceleration.to_array(),
            size_scale: frame.size_scale,
            billboard: frame.billboard as u32,
            atlas_animation: frame.atlas_animation as u32,
            _pad: [0; 2],
        }
    }
}

const LIFETIME_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32];
const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];
const TEX_COORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];
const OFFSET_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];
const VELOCITY_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![4 => Float32x3];

/// One tightly packed buffer per attribute.
const PARTICLE_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 5] = [
    wgpu::VertexBufferLayout {
        array_stride: 4,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &LIFETIME_ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: 8,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &CORNER_ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: 8,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEX_COORD_ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &OFFSET_ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VELOCITY_ATTRS,
    },
];

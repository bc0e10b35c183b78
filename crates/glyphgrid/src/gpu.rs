//! Headless wgpu implementation of [`Device`].
//!
//! Every operation records one command encoder and submits it immediately,
//! so operations land on the GPU in call order. Textures are `Rgba8Unorm`
//! (not sRGB) so encoded index bytes survive the round trip unchanged.

use std::sync::mpsc;

use image::RgbaImage;
use pollster::block_on;
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::compositor::{CompositorInputs, CompositorUniforms, BLIT_WGSL};
use crate::device::{expect_upload_len, BlendMode, Device, DrawOptions, FilterMode};
use crate::error::{RenderError, Result};
use crate::palette::Rgba8;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub struct WgpuTexture {
    id: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl WgpuTexture {
    pub fn raw(&self) -> &wgpu::Texture {
        &self.texture
    }
}

impl PartialEq for WgpuTexture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

pub struct WgpuCompositor {
    pipeline: wgpu::RenderPipeline,
}

pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    blit_layout: wgpu::BindGroupLayout,
    blit_replace: wgpu::RenderPipeline,
    blit_over: wgpu::RenderPipeline,
    nearest: wgpu::Sampler,
    linear: wgpu::Sampler,
    compositor_layout: wgpu::BindGroupLayout,
    next_id: u64,
}

impl WgpuDevice {
    /// Open the default adapter without a surface.
    pub fn new_headless() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
            .map_err(|e| RenderError::Device(format!("no adapter: {e}")))?;
        let (device, queue) = block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("glyphgrid"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        }))
        .map_err(|e| RenderError::Device(e.to_string()))?;
        debug!(adapter = ?adapter.get_info().name, "wgpu device ready");
        Ok(Self::from_parts(device, queue))
    }

    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bgl"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let compositor_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("compositor_bgl"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, false),
                texture_entry(2, false),
                texture_entry(3, false),
            ],
        });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit"),
            source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });
        let blit_replace = render_pipeline(&device, "blit_replace", &blit_layout, &blit_shader, None);
        let blit_over = render_pipeline(
            &device,
            "blit_over",
            &blit_layout,
            &blit_shader,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        let nearest = sampler(&device, "nearest", wgpu::FilterMode::Nearest);
        let linear = sampler(&device, "linear", wgpu::FilterMode::Linear);

        Self {
            device,
            queue,
            blit_layout,
            blit_replace,
            blit_over,
            nearest,
            linear,
            compositor_layout,
            next_id: 0,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Copy a texture back to host memory.
    pub fn read_texture(&self, texture: &WgpuTexture) -> Result<RgbaImage> {
        let (width, height) = (texture.width, texture.height);
        if width == 0 || height == 0 {
            return Ok(RgbaImage::new(width, height));
        }
        let row = width * 4;
        let padded = row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self.encoder("readback");
        encoder.copy_texture_to_buffer(
            copy_info(texture),
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            extent(width, height),
        );
        let submission = self.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(submission),
                timeout: None,
            })
            .map_err(|e| RenderError::Device(e.to_string()))?;
        rx.recv()
            .map_err(|e| RenderError::Device(e.to_string()))?
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let mut pixels = Vec::with_capacity((row * height) as usize);
        {
            let data = slice.get_mapped_range();
            for chunk in data.chunks(padded as usize) {
                pixels.extend_from_slice(&chunk[..row as usize]);
            }
        }
        buffer.unmap();
        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RenderError::Device("readback size mismatch".into()))
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    fn uniform_buffer(&self, label: &str, bytes: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    /// Snapshot of `texture` for draws that read and write the same texture.
    fn duplicate(&mut self, texture: &WgpuTexture) -> Result<WgpuTexture> {
        let copy = self.create_texture("draw_source", texture.width, texture.height)?;
        let mut encoder = self.encoder("duplicate");
        encoder.copy_texture_to_texture(
            copy_info(texture),
            copy_info(&copy),
            extent(texture.width.max(1), texture.height.max(1)),
        );
        self.queue.submit(Some(encoder.finish()));
        Ok(copy)
    }

    fn blit(&self, src: &WgpuTexture, dst: &WgpuTexture, options: &DrawOptions) {
        let size = [
            dst.width as f32,
            dst.height as f32,
            (src.width * options.scale_x) as f32,
            (src.height * options.scale_y) as f32,
        ];
        let bytes: Vec<u8> = size.iter().flat_map(|v| v.to_le_bytes()).collect();
        let uniforms = self.uniform_buffer("blit_uniforms", &bytes);
        let sampler = match options.filter {
            FilterMode::Nearest => &self.nearest,
            FilterMode::Linear => &self.linear,
        };
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bg"),
            layout: &self.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&src.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        let pipeline = match options.blend {
            BlendMode::Replace => &self.blit_replace,
            BlendMode::SourceOver => &self.blit_over,
        };

        let mut encoder = self.encoder("blit");
        {
            let mut pass = begin_pass(&mut encoder, "blit_pass", &dst.view, wgpu::LoadOp::Load);
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..6, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
    }
}

impl Device for WgpuDevice {
    type Texture = WgpuTexture;
    type Compositor = WgpuCompositor;

    fn create_texture(&mut self, label: &str, width: u32, height: u32) -> Result<WgpuTexture> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width.max(1), height.max(1)),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.next_id += 1;
        debug!(label, width, height, "created wgpu texture");
        Ok(WgpuTexture {
            id: self.next_id,
            texture,
            view,
            width,
            height,
        })
    }

    fn texture_size(&self, texture: &WgpuTexture) -> (u32, u32) {
        (texture.width, texture.height)
    }

    fn write_texture(&mut self, texture: &WgpuTexture, pixels: &[u8]) -> Result<()> {
        expect_upload_len(texture.width, texture.height, pixels)?;
        if pixels.is_empty() {
            return Ok(());
        }
        self.queue.write_texture(
            copy_info(texture),
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(texture.width * 4),
                rows_per_image: Some(texture.height),
            },
            extent(texture.width, texture.height),
        );
        Ok(())
    }

    fn clear(&mut self, texture: &WgpuTexture, color: Rgba8) -> Result<()> {
        let c = |v: u8| f64::from(v) / 255.0;
        let clear = wgpu::Color {
            r: c(color.r),
            g: c(color.g),
            b: c(color.b),
            a: c(color.a),
        };
        let mut encoder = self.encoder("clear");
        drop(begin_pass(
            &mut encoder,
            "clear_pass",
            &texture.view,
            wgpu::LoadOp::Clear(clear),
        ));
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn draw_scaled(
        &mut self,
        src: &WgpuTexture,
        dst: &WgpuTexture,
        options: &DrawOptions,
    ) -> Result<()> {
        if options.scale_x == 0 || options.scale_y == 0 {
            return Err(RenderError::Device(format!(
                "draw scale must be positive, got {}x{}",
                options.scale_x, options.scale_y
            )));
        }
        if src.width == 0 || src.height == 0 || dst.width == 0 || dst.height == 0 {
            return Ok(());
        }
        if src == dst {
            let copy = self.duplicate(src)?;
            self.blit(&copy, dst, options);
        } else {
            self.blit(src, dst, options);
        }
        Ok(())
    }

    fn create_compositor(&mut self, label: &str, source: &str) -> Result<WgpuCompositor> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let pipeline = render_pipeline(&self.device, label, &self.compositor_layout, &shader, None);
        if let Some(err) = block_on(scope.pop()) {
            return Err(RenderError::Shader {
                label: label.to_string(),
                reason: err.to_string(),
            });
        }
        debug!(label, "compositor pipeline ready");
        Ok(WgpuCompositor { pipeline })
    }

    fn run_compositor(
        &mut self,
        program: &WgpuCompositor,
        dst: &WgpuTexture,
        inputs: CompositorInputs<'_, WgpuTexture>,
        uniforms: CompositorUniforms,
    ) -> Result<()> {
        if [inputs.atlas, inputs.runes, inputs.palette].contains(&dst) {
            return Err(RenderError::Device(
                "compositor target aliases one of its inputs".into(),
            ));
        }
        if uniforms.cell_width == 0 || uniforms.cell_height == 0 {
            return Err(RenderError::Device("compositor cell size is zero".into()));
        }
        let buffer = self.uniform_buffer("compositor_uniforms", &uniforms.to_bytes());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("compositor_bg"),
            layout: &self.compositor_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&inputs.atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&inputs.runes.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&inputs.palette.view),
                },
            ],
        });

        let mut encoder = self.encoder("compositor");
        {
            let mut pass = begin_pass(
                &mut encoder,
                "compositor_pass",
                &dst.view,
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            );
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..6, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn copy_info(texture: &WgpuTexture) -> wgpu::TexelCopyTextureInfo<'_> {
    wgpu::TexelCopyTextureInfo {
        texture: &texture.texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler(device: &wgpu::Device, label: &str, filter: wgpu::FilterMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

fn render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        immediate_size: 0,
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: FORMAT,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

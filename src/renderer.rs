use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};
use pollster::block_on;
use uuid::Uuid;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::draw_settings::DrawSettings;
use crate::layer::{Layer, PaintCommand};
use crate::shader::layer::ShaderLayer;
use crate::utils::geom::Rectangle;

const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    tex_coords: [f32; 2],
}

/// Destination rectangle in NDC plus a tint. The height is negative so
/// layer coordinates grow downward.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadUniform {
    rect: [f32; 4],
    color: [f32; 4],
}

/// Concrete render target of a [`ShaderLayer`] or the pixel layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetId {
    Canvas,
    Graphics,
    GraphicsUi,
    Pixel,
}

impl From<ShaderLayer> for TargetId {
    fn from(layer: ShaderLayer) -> Self {
        match layer {
            ShaderLayer::Global => TargetId::Canvas,
            ShaderLayer::Graphics => TargetId::Graphics,
            ShaderLayer::GraphicsUi => TargetId::GraphicsUi,
        }
    }
}

struct TargetSide {
    view: wgpu::TextureView,
    bind_linear: wgpu::BindGroup,
    bind_nearest: wgpu::BindGroup,
}

/// Double-buffered offscreen target. Filter passes sample the front side
/// into the back side and swap.
struct LayerTarget {
    sides: [TargetSide; 2],
    front: usize,
}

impl LayerTarget {
    fn front(&self) -> &TargetSide {
        &self.sides[self.front]
    }

    fn back(&self) -> &TargetSide {
        &self.sides[1 - self.front]
    }

    fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}

struct GpuTexture {
    bind_linear: wgpu::BindGroup,
    bind_nearest: wgpu::BindGroup,
}

struct PreparedQuad {
    key: Option<Uuid>,
    uniform_bind: wgpu::BindGroup,
}

/// The wgpu renderer: owns the surface, the four offscreen targets
/// (graphics, UI, pixel, canvas) and the pipelines painting into and
/// compositing between them.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    width: u32,
    height: u32,
    paint_pipeline: wgpu::RenderPipeline,
    surface_pipeline: wgpu::RenderPipeline,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    quad_bind_group_layout: wgpu::BindGroupLayout,
    fullscreen_vertex: wgpu::ShaderModule,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    sampler_linear: wgpu::Sampler,
    sampler_nearest: wgpu::Sampler,
    white: GpuTexture,
    textures: HashMap<Uuid, GpuTexture>,
    graphics: LayerTarget,
    graphics_ui: LayerTarget,
    pixel: LayerTarget,
    canvas: LayerTarget,
}

impl Renderer {
    pub fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("create rendering surface")?;

        let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or_else(|| anyhow!("no suitable graphics adapter"))?;

        let (device, queue) = block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .context("request graphics device")?;

        let surface_size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: SURFACE_FORMAT,
            width: surface_size.width.max(1),
            height: surface_size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let quad_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("quad_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<QuadUniform>() as _,
                        ),
                    },
                    count: None,
                }],
            });

        let paint_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("paint shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../shaders/paint.wgsl"
            ))),
        });
        let fullscreen_vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen vertex shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../shaders/fullscreen.wgsl"
            ))),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("paint pipeline layout"),
            bind_group_layouts: &[&texture_bind_group_layout, &quad_bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |format: wgpu::TextureFormat, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &paint_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2],
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &paint_shader,
                    entry_point: Some("fs_main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let paint_pipeline = make_pipeline(LAYER_FORMAT, "layer paint pipeline");
        let surface_pipeline = make_pipeline(SURFACE_FORMAT, "surface blit pipeline");

        let vertices = [
            Vertex {
                position: [0.0, 0.0, 0.0],
                tex_coords: [0.0, 0.0],
            },
            Vertex {
                position: [1.0, 0.0, 0.0],
                tex_coords: [1.0, 0.0],
            },
            Vertex {
                position: [1.0, 1.0, 0.0],
                tex_coords: [1.0, 1.0],
            },
            Vertex {
                position: [0.0, 1.0, 0.0],
                tex_coords: [0.0, 1.0],
            },
        ];
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertex buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad index buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let sampler_linear = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let sampler_nearest = device.create_sampler(&wgpu::SamplerDescriptor {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_rgba(
            &device,
            &queue,
            &texture_bind_group_layout,
            &sampler_linear,
            &sampler_nearest,
            1,
            1,
            &[255, 255, 255, 255],
            "white texture",
        );

        let graphics = create_target(
            &device,
            &texture_bind_group_layout,
            &sampler_linear,
            &sampler_nearest,
            width,
            height,
            "graphics target",
        );
        let graphics_ui = create_target(
            &device,
            &texture_bind_group_layout,
            &sampler_linear,
            &sampler_nearest,
            width,
            height,
            "graphicsUI target",
        );
        let pixel = create_target(
            &device,
            &texture_bind_group_layout,
            &sampler_linear,
            &sampler_nearest,
            width,
            height,
            "pixel target",
        );
        let canvas = create_target(
            &device,
            &texture_bind_group_layout,
            &sampler_linear,
            &sampler_nearest,
            width,
            height,
            "canvas target",
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            width,
            height,
            paint_pipeline,
            surface_pipeline,
            texture_bind_group_layout,
            quad_bind_group_layout,
            fullscreen_vertex,
            vertex_buffer,
            index_buffer,
            sampler_linear,
            sampler_nearest,
            white,
            textures: HashMap::new(),
            graphics,
            graphics_ui,
            pixel,
            canvas,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn target(&self, id: TargetId) -> &LayerTarget {
        match id {
            TargetId::Canvas => &self.canvas,
            TargetId::Graphics => &self.graphics,
            TargetId::GraphicsUi => &self.graphics_ui,
            TargetId::Pixel => &self.pixel,
        }
    }

    fn target_mut(&mut self, id: TargetId) -> &mut LayerTarget {
        match id {
            TargetId::Canvas => &mut self.canvas,
            TargetId::Graphics => &mut self.graphics,
            TargetId::GraphicsUi => &mut self.graphics_ui,
            TargetId::Pixel => &mut self.pixel,
        }
    }

    /// Reconfigures the window surface after the window changed size.
    /// Layer targets keep the sketch size; the final blit scales.
    pub(crate) fn resize_surface(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// Recreates every layer target at the new sketch size, clearing
    /// their contents.
    pub(crate) fn resize_targets(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        for id in [
            TargetId::Graphics,
            TargetId::GraphicsUi,
            TargetId::Pixel,
            TargetId::Canvas,
        ] {
            let target = create_target(
                &self.device,
                &self.texture_bind_group_layout,
                &self.sampler_linear,
                &self.sampler_nearest,
                width,
                height,
                "layer target",
            );
            *self.target_mut(id) = target;
        }
    }

    fn quad_bind(&self, dest: Rectangle, color: [f32; 4]) -> wgpu::BindGroup {
        let w = self.width as f32;
        let h = self.height as f32;
        let uniform = QuadUniform {
            rect: [
                dest.x / w * 2.0 - 1.0,
                1.0 - dest.y / h * 2.0,
                dest.width / w * 2.0,
                -(dest.height / h * 2.0),
            ],
            color,
        };
        self.quad_bind_raw(uniform)
    }

    fn quad_bind_full(&self) -> wgpu::BindGroup {
        self.quad_bind_raw(QuadUniform {
            rect: [-1.0, 1.0, 2.0, -2.0],
            color: [1.0, 1.0, 1.0, 1.0],
        })
    }

    fn quad_bind_raw(&self, uniform: QuadUniform) -> wgpu::BindGroup {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad uniform buffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad bind group"),
            layout: &self.quad_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: None,
                }),
            }],
        })
    }

    fn upload_image(&mut self, key: Uuid, img: &image::RgbaImage) {
        let texture = upload_rgba(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            &self.sampler_linear,
            &self.sampler_nearest,
            img.width(),
            img.height(),
            img.as_raw(),
            "image texture",
        );
        self.textures.insert(key, texture);
    }

    /// Drains a layer's paint queue into its target. Images whose assets
    /// have not loaded yet are skipped and retried on a later frame.
    pub(crate) fn flush_layer(&mut self, id: TargetId, layer: &mut Layer) {
        let commands = layer.take_queue();
        if commands.is_empty() {
            return;
        }

        let mut passes: Vec<(bool, Vec<PreparedQuad>)> = Vec::new();
        let mut current = (false, Vec::new());
        for command in commands {
            match command {
                PaintCommand::Clear => {
                    passes.push(std::mem::replace(&mut current, (true, Vec::new())));
                }
                PaintCommand::Rect { dest, color } => {
                    let uniform_bind = self.quad_bind(dest, color);
                    current.1.push(PreparedQuad {
                        key: None,
                        uniform_bind,
                    });
                }
                PaintCommand::Image { key, image, dest } => {
                    if !self.textures.contains_key(&key) {
                        let state = image.borrow();
                        match state.get() {
                            Some(img) => self.upload_image(key, img),
                            None => continue,
                        }
                    }
                    let uniform_bind = self.quad_bind(dest, [1.0, 1.0, 1.0, 1.0]);
                    current.1.push(PreparedQuad {
                        key: Some(key),
                        uniform_bind,
                    });
                }
            }
        }
        passes.push(current);

        let smooth = layer.is_smooth();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("layer flush encoder"),
            });
        for (clear, quads) in &passes {
            if !*clear && quads.is_empty() {
                continue;
            }
            let target = self.target(id);
            let load = if *clear {
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
            } else {
                wgpu::LoadOp::Load
            };
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("layer flush pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.front().view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.paint_pipeline);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for quad in quads {
                let texture = match quad.key {
                    Some(key) => match self.textures.get(&key) {
                        Some(texture) => texture,
                        None => continue,
                    },
                    None => &self.white,
                };
                let texture_bind = if smooth {
                    &texture.bind_linear
                } else {
                    &texture.bind_nearest
                };
                rpass.set_bind_group(0, texture_bind, &[]);
                rpass.set_bind_group(1, &quad.uniform_bind, &[]);
                rpass.draw_indexed(0..6, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
    }

    /// Composites the layers: pixel into graphics, then graphics and UI
    /// onto the canvas, honoring the draw settings.
    pub(crate) fn composite_layers(&mut self, settings: &DrawSettings) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("composite encoder"),
            });

        if settings.draw_pixel_graphics {
            let uniform_bind = self.quad_bind_full();
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pixel composite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.graphics.front().view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.paint_pipeline);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.set_bind_group(0, &self.pixel.front().bind_nearest, &[]);
            rpass.set_bind_group(1, &uniform_bind, &[]);
            rpass.draw_indexed(0..6, 0, 0..1);
        }

        {
            let uniform_bind = self.quad_bind_full();
            let load = if settings.auto_clear_canvas {
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
            } else {
                wgpu::LoadOp::Load
            };
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas composite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.canvas.front().view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.paint_pipeline);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.set_bind_group(1, &uniform_bind, &[]);
            if settings.draw_graphics {
                rpass.set_bind_group(0, &self.graphics.front().bind_linear, &[]);
                rpass.draw_indexed(0..6, 0, 0..1);
            }
            if settings.draw_graphics_ui {
                rpass.set_bind_group(0, &self.graphics_ui.front().bind_linear, &[]);
                rpass.draw_indexed(0..6, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
    }

    /// Builds a render pipeline from user GLSL stages targeting the
    /// given shader layer. Validation failures are returned, not
    /// panicked, so a broken shader degrades to a logged error.
    pub(crate) fn build_shader_pipeline(
        &self,
        layer: ShaderLayer,
        frag: &str,
        vert: Option<&str>,
    ) -> Result<wgpu::RenderPipeline> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let frag_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("user fragment stage"),
                source: wgpu::ShaderSource::Glsl {
                    shader: Cow::Borrowed(frag),
                    stage: wgpu::naga::ShaderStage::Fragment,
                    defines: Default::default(),
                },
            });
        let vert_module = vert.map(|source| {
            self.device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("user vertex stage"),
                    source: wgpu::ShaderSource::Glsl {
                        shader: Cow::Borrowed(source),
                        stage: wgpu::naga::ShaderStage::Vertex,
                        defines: Default::default(),
                    },
                })
        });

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shader layer pipeline layout"),
                bind_group_layouts: &[&self.texture_bind_group_layout],
                push_constant_ranges: &[],
            });

        let (vertex_module, vertex_entry) = match &vert_module {
            Some(module) => (module, "main"),
            None => (&self.fullscreen_vertex, "vs_main"),
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(layer.key()),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: vertex_module,
                    entry_point: Some(vertex_entry),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &frag_module,
                    entry_point: Some("main"),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: LAYER_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        if let Some(err) = block_on(self.device.pop_error_scope()) {
            bail!("{err}");
        }
        Ok(pipeline)
    }

    /// Runs a compiled shader over its layer: samples the front texture
    /// into the back one and swaps. Validation errors are returned and
    /// the target is left unswapped.
    pub(crate) fn run_filter_pass(
        &mut self,
        layer: ShaderLayer,
        pipeline: &wgpu::RenderPipeline,
    ) -> Result<()> {
        let id = TargetId::from(layer);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        {
            let target = self.target(id);
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("filter pass encoder"),
                });
            {
                let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("filter pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target.back().view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &target.front().bind_linear, &[]);
                rpass.draw(0..3, 0..1);
            }
            self.queue.submit(Some(encoder.finish()));
        }
        if let Some(err) = block_on(self.device.pop_error_scope()) {
            bail!("{err}");
        }
        self.target_mut(id).swap();
        Ok(())
    }

    /// Blits the canvas target onto the window surface and presents.
    pub(crate) fn present_frame(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .context("reacquire surface frame")?
            }
            Err(err) => return Err(err).context("acquire surface frame"),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniform_bind = self.quad_bind_full();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("present encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.surface_pipeline);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            rpass.set_bind_group(0, &self.canvas.front().bind_linear, &[]);
            rpass.set_bind_group(1, &uniform_bind, &[]);
            rpass.draw_indexed(0..6, 0, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_side(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    linear: &wgpu::Sampler,
    nearest: &wgpu::Sampler,
    width: u32,
    height: u32,
    label: &str,
) -> TargetSide {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: LAYER_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_linear = create_texture_bind_group(device, layout, &view, linear);
    let bind_nearest = create_texture_bind_group(device, layout, &view, nearest);
    TargetSide {
        view,
        bind_linear,
        bind_nearest,
    }
}

fn create_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    linear: &wgpu::Sampler,
    nearest: &wgpu::Sampler,
    width: u32,
    height: u32,
    label: &str,
) -> LayerTarget {
    LayerTarget {
        sides: [
            create_side(device, layout, linear, nearest, width, height, label),
            create_side(device, layout, linear, nearest, width, height, label),
        ],
        front: 0,
    }
}

#[allow(clippy::too_many_arguments)]
fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    linear: &wgpu::Sampler,
    nearest: &wgpu::Sampler,
    width: u32,
    height: u32,
    data: &[u8],
    label: &str,
) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: LAYER_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_linear = create_texture_bind_group(device, layout, &view, linear);
    let bind_nearest = create_texture_bind_group(device, layout, &view, nearest);
    GpuTexture {
        bind_linear,
        bind_nearest,
    }
}

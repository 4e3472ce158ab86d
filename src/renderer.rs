// renderer.rs — wgpu backend: two offscreen sphere targets composited into one window

use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{backing_size, RenderBackend};
use crate::camera::{CameraRig, CameraUniform};
use crate::config::ViewerConfig;
use crate::error::EngineError;
use crate::layout::SurfaceRect;
use crate::mesh::{build_inverted_sphere, SphereMesh, SphereVertex};
use crate::panorama::Side;

// Shown until (or instead of, on failure) the panorama arrives.
const UNTEXTURED_RGBA: [u8; 4] = [40, 40, 40, 255];

/// One side's sphere: its own geometry, camera buffer and material.
pub struct SphereScene {
    side: Side,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    camera_buffer: wgpu::Buffer,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// One side's render target and where it lands in the window.
pub struct RenderTarget {
    side: Side,
    rect: SurfaceRect,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    composite_bind_group: wgpu::BindGroup,
}

pub struct GpuFrame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct GpuRenderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    clear_color: wgpu::Color,

    mesh: SphereMesh,
    scene_layout: wgpu::BindGroupLayout,
    sphere_pipeline: wgpu::RenderPipeline,
    pano_sampler: wgpu::Sampler,

    composite_layout: wgpu::BindGroupLayout,
    composite_pipeline: wgpu::RenderPipeline,
    composite_sampler: wgpu::Sampler,

    // UI
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuRenderer {
    pub async fn new(window: std::sync::Arc<Window>, viewer: &ViewerConfig) -> Result<Self, EngineError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // SAFETY: the window is kept alive by the Arc held alongside the renderer
        let surface = unsafe { instance.create_surface(window.as_ref()) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(EngineError::AdapterUnavailable)?;
        log::info!("GPU adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default().using_resolution(adapter.limits())
                    },
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(viewer.vsync),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let [r, g, b] = viewer.clear_color;
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        // --- sphere pass ---
        let pano_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("panorama_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat, // longitude wraps
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let sphere_shader = device.create_shader_module(wgpu::include_wgsl!("shaders/sphere.wgsl"));
        let sphere_pipeline = create_pipeline(
            &device,
            "sphere_pipeline",
            &scene_layout,
            &sphere_shader,
            &[SphereVertex::layout()],
            Some(wgpu::Face::Back),
            config.format,
        );

        // --- composite pass ---
        let composite_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("composite_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_bind_group_layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let composite_shader =
            device.create_shader_module(wgpu::include_wgsl!("shaders/composite.wgsl"));
        let composite_pipeline = create_pipeline(
            &device,
            "composite_pipeline",
            &composite_layout,
            &composite_shader,
            &[], // the shader generates its own triangle
            None,
            config.format,
        );

        // --- UI ---
        let egui_ctx = egui::Context::default();
        let mut egui_state = egui_winit::State::new(window.as_ref());
        egui_state.set_pixels_per_point(window.scale_factor() as f32);
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        let mesh = build_inverted_sphere(
            viewer.sphere_radius,
            viewer.width_segments,
            viewer.height_segments,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            clear_color,
            mesh,
            scene_layout,
            sphere_pipeline,
            pano_sampler,
            composite_layout,
            composite_pipeline,
            composite_sampler,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = present_mode(enabled);
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire the swap chain image and clear it; sides are drawn into it by
    /// [`RenderBackend::draw`].
    pub fn begin_frame(&mut self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });

        Ok(GpuFrame {
            output,
            view,
            encoder,
        })
    }

    /// Draw the UI on top, submit and present.
    pub fn finish_frame(
        &mut self,
        mut frame: GpuFrame,
        window: &Window,
        run_ui: impl FnOnce(&egui::Context),
    ) {
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, run_ui);

        self.egui_state
            .handle_platform_output(window, &self.egui_ctx, full_output.platform_output);
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes);

        let screen_descriptor = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut frame.encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            self.egui_renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.output.present();
    }

    fn upload_texture(&self, label: &str, width: u32, height: u32, pixels: &[u8]) -> wgpu::Texture {
        let texture_size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            texture_size,
        );
        texture
    }

    fn scene_bind_group(&self, camera_buffer: &wgpu::Buffer, texture: &wgpu::Texture) -> wgpu::BindGroup {
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &self.scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.pano_sampler),
                },
            ],
        })
    }

    fn create_target(&self, side: Side, rect: SurfaceRect) -> RenderTarget {
        let size = backing_size(rect);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(match side {
                Side::Left => "left_target",
                Side::Right => "right_target",
            }),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let composite_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite_bind_group"),
            layout: &self.composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.composite_sampler),
                },
            ],
        });

        RenderTarget {
            side,
            rect,
            texture,
            view,
            composite_bind_group,
        }
    }

    // The part of `rect` that lies on the current swap chain image.
    fn visible_rect(&self, rect: SurfaceRect) -> Option<SurfaceRect> {
        if rect.x >= self.config.width || rect.y >= self.config.height {
            return None;
        }
        let width = rect.width.min(self.config.width - rect.x);
        let height = rect.height.min(self.config.height - rect.y);
        (width > 0 && height > 0).then(|| SurfaceRect::new(rect.x, rect.y, width, height))
    }
}

impl RenderBackend for GpuRenderer {
    type Scene = SphereScene;
    type Surface = RenderTarget;
    type Frame = GpuFrame;

    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_surface(&mut self, side: Side, rect: SurfaceRect) -> Result<RenderTarget, EngineError> {
        let limit = self.max_texture_dimension();
        if rect.width > limit || rect.height > limit {
            return Err(EngineError::Surface {
                side,
                reason: format!("{}x{} exceeds texture limit {}", rect.width, rect.height, limit),
            });
        }
        Ok(self.create_target(side, rect))
    }

    fn resize_surface(&mut self, surface: &mut RenderTarget, rect: SurfaceRect) {
        let limit = self.max_texture_dimension();
        if rect.width > limit || rect.height > limit {
            log::warn!("{} surface {}x{} exceeds texture limit, keeping old size", surface.side, rect.width, rect.height);
            return;
        }
        if backing_size(rect) == backing_size(surface.rect) {
            surface.rect = rect;
            return;
        }
        let replacement = self.create_target(surface.side, rect);
        let old = std::mem::replace(surface, replacement);
        old.texture.destroy();
    }

    fn release_surface(&mut self, surface: RenderTarget) {
        log::debug!("releasing {} render target", surface.side);
        surface.texture.destroy();
    }

    fn create_scene(&mut self, side: Side) -> Result<SphereScene, EngineError> {
        if self.mesh.indices.is_empty() {
            return Err(EngineError::Scene {
                side,
                reason: "sphere mesh has no triangles".to_string(),
            });
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphere_vertices"),
                contents: bytemuck::cast_slice(&self.mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphere_indices"),
                contents: bytemuck::cast_slice(&self.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let camera_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("camera_uniform"),
                contents: bytemuck::cast_slice(&[CameraUniform {
                    view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                }]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let texture = self.upload_texture("untextured", 1, 1, &UNTEXTURED_RGBA);
        let bind_group = self.scene_bind_group(&camera_buffer, &texture);

        Ok(SphereScene {
            side,
            vertex_buffer,
            index_buffer,
            index_count: self.mesh.indices.len() as u32,
            camera_buffer,
            texture,
            bind_group,
        })
    }

    fn bind_texture(&mut self, scene: &mut SphereScene, image: &RgbaImage) {
        let (width, height) = image.dimensions();
        let texture = self.upload_texture("panorama_texture", width, height, image.as_raw());
        scene.bind_group = self.scene_bind_group(&scene.camera_buffer, &texture);
        let old = std::mem::replace(&mut scene.texture, texture);
        old.destroy();
        log::debug!("{} sphere texture swapped", scene.side);
    }

    fn release_scene(&mut self, scene: SphereScene) {
        log::debug!("releasing {} sphere scene", scene.side);
        scene.texture.destroy();
        scene.vertex_buffer.destroy();
        scene.index_buffer.destroy();
        scene.camera_buffer.destroy();
    }

    fn draw(&mut self, frame: &mut GpuFrame, scene: &SphereScene, surface: &RenderTarget, camera: &CameraRig) {
        self.queue
            .write_buffer(&scene.camera_buffer, 0, bytemuck::cast_slice(&[camera.uniform()]));

        {
            let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sphere_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            render_pass.set_pipeline(&self.sphere_pipeline);
            render_pass.set_bind_group(0, &scene.bind_group, &[]);
            render_pass.set_vertex_buffer(0, scene.vertex_buffer.slice(..));
            render_pass.set_index_buffer(scene.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..scene.index_count, 0, 0..1);
        }

        // surface not ready for this swap chain size: skip, the next resize fixes it
        let Some(rect) = self.visible_rect(surface.rect) else {
            return;
        };
        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: true,
                },
            })],
            depth_stencil_attachment: None,
        });
        render_pass.set_pipeline(&self.composite_pipeline);
        render_pass.set_bind_group(0, &surface.composite_bind_group, &[]);
        render_pass.set_viewport(
            surface.rect.x as f32,
            surface.rect.y as f32,
            surface.rect.width as f32,
            surface.rect.height as f32,
            0.0,
            1.0,
        );
        render_pass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        render_pass.draw(0..3, 0..1);
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    cull_mode: Option<wgpu::Face>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

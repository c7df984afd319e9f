//! SDF-based WebGPU render pipeline
//!
//! Draws the whole stage in the fragment shader: reel symbols as procedural
//! glyphs with per-reel vertical blur, the masks above and below the reel
//! window, and the lever.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::consts::{MAX_REELS, MAX_SLOTS_PER_REEL};
use crate::layout::{InputMode, StageLayout};
use crate::settings::Settings;
use crate::sim::SlotMachine;

/// Maximum number of symbol slots across all reels
const MAX_SYMBOLS: usize = MAX_REELS * MAX_SLOTS_PER_REEL;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],   // offset 0
    reel_origin: [f32; 2],  // offset 8
    lever_origin: [f32; 2], // offset 16
    pixel_ratio: f32,       // offset 24
    reel_width: f32,        // offset 28
    symbol_size: f32,       // offset 32
    mask_top: f32,          // offset 36
    window_bottom: f32,     // offset 40
    lever_handle_y: f32,    // offset 44
    lever_visible: u32,     // offset 48
    reel_count: u32,        // offset 52
    slots_per_reel: u32,    // offset 56
    blur_samples: u32,      // offset 60
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ReelData {
    blur: f32,
    _pad: [f32; 3], // 16-byte array stride
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SymbolData {
    pos: [f32; 2], // top-left, relative to the reel column
    size: f32,     // scaled sprite edge
    kind: u32,     // symbol index
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    // Uniform buffers
    globals_buffer: wgpu::Buffer,
    reels_buffer: wgpu::Buffer,
    symbols_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    pixel_ratio: f32,
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                reel_origin: [0.0, 0.0],
                lever_origin: [0.0, 0.0],
                pixel_ratio,
                reel_width: 0.0,
                symbol_size: 0.0,
                mask_top: 0.0,
                window_bottom: 0.0,
                lever_handle_y: 0.0,
                lever_visible: 0,
                reel_count: 0,
                slots_per_reel: 0,
                blur_samples: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let reels_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reels"),
            size: (std::mem::size_of::<ReelData>() * MAX_REELS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let symbols_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("symbols"),
            size: (std::mem::size_of::<SymbolData>() * MAX_SYMBOLS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: reels_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: symbols_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
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
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            reels_buffer,
            symbols_buffer,
            bind_group,
            size: (width, height),
            pixel_ratio,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32, pixel_ratio: f32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.pixel_ratio = pixel_ratio;
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Update GPU buffers from the machine and render
    pub fn render(
        &mut self,
        machine: &SlotMachine,
        layout: &StageLayout,
        settings: &Settings,
    ) -> Result<(), wgpu::SurfaceError> {
        let reels = machine.reels();
        let reel_count = reels.len().min(MAX_REELS);
        let slots_per_reel = reels
            .first()
            .map_or(0, |r| r.slots.len())
            .min(MAX_SLOTS_PER_REEL);

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            reel_origin: layout.reel_origin.to_array(),
            lever_origin: layout.lever_origin.to_array(),
            pixel_ratio: self.pixel_ratio,
            reel_width: layout.reel_width,
            symbol_size: layout.symbol_size,
            mask_top: layout.mask_height(),
            window_bottom: layout.window_bottom(),
            lever_handle_y: machine.lever().handle_y as f32,
            lever_visible: if layout.input_mode == InputMode::Lever { 1 } else { 0 },
            reel_count: reel_count as u32,
            slots_per_reel: slots_per_reel as u32,
            blur_samples: settings.effective_blur_samples(),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        // Update reels
        let mut reels_data = [ReelData {
            blur: 0.0,
            _pad: [0.0; 3],
        }; MAX_REELS];
        for (data, reel) in reels_data.iter_mut().zip(reels.iter().take(reel_count)) {
            data.blur = reel.blur.abs() as f32;
        }
        self.queue
            .write_buffer(&self.reels_buffer, 0, bytemuck::cast_slice(&reels_data));

        // Update symbols, reel-major
        let texture_size = crate::consts::SYMBOL_TEXTURE_SIZE;
        let mut symbols_data = [SymbolData {
            pos: [0.0; 2],
            size: 0.0,
            kind: 0,
        }; MAX_SYMBOLS];
        for (r, reel) in reels.iter().take(reel_count).enumerate() {
            for (j, slot) in reel.slots.iter().take(slots_per_reel).enumerate() {
                symbols_data[r * slots_per_reel + j] = SymbolData {
                    pos: [slot.x as f32, slot.y as f32],
                    size: (texture_size * slot.scale) as f32,
                    kind: slot.symbol as u32,
                };
            }
        }
        self.queue
            .write_buffer(&self.symbols_buffer, 0, bytemuck::cast_slice(&symbols_data));

        // Render
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

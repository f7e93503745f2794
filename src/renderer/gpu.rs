use std::sync::Arc;

use thiserror::Error;
use winit::window::Window;

use crate::renderer::camera::{Camera, CameraUniform};
use crate::renderer::mesh_buffers::{FractalBuffers, gpu_vertex_layout};
use crate::scene::{PointLight, Scene, SceneNode};

const LIGHT_SLOTS: usize = 2;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("could not create window surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub params: [f32; 4],
}

impl NodeUniform {
    pub fn from_node(node: &SceneNode) -> Self {
        let material = &node.object.material;
        let [r, g, b] = material.base_color_linear();
        Self {
            model: node.model_matrix().to_cols_array_2d(),
            base_color: [r, g, b, 1.0],
            params: [material.metalness, material.roughness, material.clearcoat, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub items: [LightUniform; LIGHT_SLOTS],
}

impl LightsUniform {
    /// Extra lights beyond the shader's slots are dropped; missing slots stay dark.
    pub fn from_lights(lights: &[PointLight]) -> Self {
        let mut uniform = Self::default();
        for (slot, light) in uniform.items.iter_mut().zip(lights) {
            *slot = LightUniform {
                position: light.position.extend(light.intensity).to_array(),
                color: light.color.extend(1.0).to_array(),
            };
        }
        uniform
    }
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,

    pub fill_pipeline: wgpu::RenderPipeline,
    pub wire_pipeline: wgpu::RenderPipeline,

    pub camera_buffer: wgpu::Buffer,
    pub node_buffer: wgpu::Buffer,
    pub light_buffer: wgpu::Buffer,
    pub scene_bind_group: wgpu::BindGroup,

    pub fractal_buffers: FractalBuffers,
    has_node: bool,

    pub depth_texture: wgpu::TextureView,
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer<T>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn fractal_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[gpu_vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl GpuState {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Fractal Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fractal Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let camera_buffer = uniform_buffer::<CameraUniform>(&device, "Camera Buffer");
        let node_buffer = uniform_buffer::<NodeUniform>(&device, "Node Buffer");
        let light_buffer = uniform_buffer::<LightsUniform>(&device, "Light Buffer");

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[uniform_entry(0), uniform_entry(1), uniform_entry(2)],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: node_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fractal Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let fill_pipeline = fractal_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "Fractal Fill Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
        );
        let wire_pipeline = fractal_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            "Fractal Wire Pipeline",
            wgpu::PrimitiveTopology::LineList,
        );

        let fractal_buffers = FractalBuffers::new(&device);
        let depth_texture = Self::create_depth_texture(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            fill_pipeline,
            wire_pipeline,
            camera_buffer,
            node_buffer,
            light_buffer,
            scene_bind_group,
            fractal_buffers,
            has_node: false,
            depth_texture,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Self::create_depth_texture(&self.device, &self.config);
        }
    }

    pub fn update_camera(&self, camera: &Camera) {
        let uniform = CameraUniform::from_camera(camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.present_mode = present_mode(enabled);
        self.surface.configure(&self.device, &self.config);
    }

    /// Uploads what the next frame needs: lights, the node transform, and the
    /// node's geometry if it changed. The renderer draws one node, the
    /// fractal currently in the scene.
    pub fn prepare_scene(&mut self, scene: &Scene) {
        let lights = LightsUniform::from_lights(scene.lights());
        self.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(&[lights]));

        self.has_node = match scene.nodes().first() {
            Some(node) => {
                if let Err(err) = self
                    .fractal_buffers
                    .sync(&self.device, &self.queue, &node.object)
                {
                    log::error!("cannot draw level {} fractal: {err}", node.object.key.level);
                }
                let uniform = NodeUniform::from_node(node);
                self.queue
                    .write_buffer(&self.node_buffer, 0, bytemuck::cast_slice(&[uniform]));
                true
            }
            None => false,
        };
    }

    pub fn render_scene(
        &self,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
        wireframe: bool,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Fractal Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if !self.has_node {
            return;
        }

        let buffers = &self.fractal_buffers;
        let (pipeline, buffer, count) = if wireframe {
            (&self.wire_pipeline, buffers.wire_buffer(), buffers.wire_count())
        } else {
            (&self.fill_pipeline, buffers.fill_buffer(), buffers.fill_count())
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        render_pass.set_vertex_buffer(0, buffer.slice(..));
        render_pass.draw(0..count, 0..1);
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn light_uniform_packs_intensity_in_w() {
        let uniform = LightsUniform::from_lights(&PointLight::default_rig());
        assert_eq!(uniform.items[0].position, [0.0, 1000.0, 0.0, 10.0]);
        assert_eq!(uniform.items[1].position, [0.0, -1000.0, 0.0, 1.0]);
        assert_eq!(uniform.items[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn missing_lights_stay_dark() {
        let single = [PointLight {
            position: Vec3::Y,
            color: Vec3::ONE,
            intensity: 2.0,
        }];
        let uniform = LightsUniform::from_lights(&single);
        assert_eq!(uniform.items[1].position[3], 0.0);
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<NodeUniform>(), 96);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 64);
    }
}

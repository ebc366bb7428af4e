//! Rendering system with wgpu pipelines for the tunnel and the knot.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::CameraRig;
use crate::driver::{FrameUpdate, SceneSink};
use crate::error::{Result, VisualizerError};
use crate::params::RenderConfig;
use crate::scene::{SceneMeshes, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

/// Uniforms shared by both shaders (camera + point light)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz = position, w = range
    pub light_position: [f32; 4],
    /// rgb = color * intensity, w = decay
    pub light_color: [f32; 4],
}

/// Uniforms for the knot deformation shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct KnotShaderUniforms {
    pub model: [[f32; 4]; 4],
    /// x, y, z amplitudes, w = normal multiplier
    pub amplitude: [f32; 4],
}

impl SceneUniforms {
    pub fn from_frame(frame: &FrameUpdate, view_proj: Mat4) -> Self {
        let light = &frame.scene.light;
        let [r, g, b] = light.color.to_array();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: frame.camera.eye.extend(1.0).to_array(),
            light_position: light.position.extend(light.distance).to_array(),
            light_color: [
                r * light.intensity,
                g * light.intensity,
                b * light.intensity,
                light.decay,
            ],
        }
    }
}

impl KnotShaderUniforms {
    pub fn from_frame(frame: &FrameUpdate) -> Self {
        let knot = &frame.scene.knot;
        Self {
            model: knot.model_matrix().to_cols_array_2d(),
            amplitude: knot.uniforms.to_array(),
        }
    }
}

/// GPU buffers of one indexed mesh
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, label: &str, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    tunnel_pipeline: wgpu::RenderPipeline,
    knot_pipeline: wgpu::RenderPipeline,
    tunnel: GpuMesh,
    knot: GpuMesh,
    scene_uniform_buffer: wgpu::Buffer,
    knot_uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    camera: CameraRig,
}

impl Renderer {
    /// Create new rendering system and upload the static meshes
    pub async fn new(
        window: Arc<Window>,
        meshes: &SceneMeshes,
        render_config: RenderConfig,
    ) -> Result<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| VisualizerError::Render(format!("failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| VisualizerError::Render("no suitable GPU adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| VisualizerError::Render(format!("failed to request device: {}", e)))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| VisualizerError::Render("surface has no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("Surface: {:?} {}x{}", surface_format, width, height);

        // Load shaders
        let tunnel_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Tunnel Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/tunnel.wgsl").into()),
        });
        let knot_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Knot Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/knot.wgsl").into()),
        });

        // Static geometry: tunnel as wireframe lines, knot as triangles
        let tunnel = GpuMesh::new(
            &device,
            "Tunnel",
            &meshes.tunnel.vertices,
            &meshes.tunnel.wireframe_indices(),
        );
        let knot = GpuMesh::new(&device, "Knot", &meshes.knot.vertices, &meshes.knot.indices);

        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let knot_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Knot Uniform Buffer"),
            size: std::mem::size_of::<KnotShaderUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: knot_uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let tunnel_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &tunnel_shader,
            PipelineKind {
                label: "Tunnel Pipeline",
                format: surface_format,
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: None,
            },
        );
        let knot_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &knot_shader,
            PipelineKind {
                label: "Knot Pipeline",
                format: surface_format,
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            },
        );

        let depth_view = create_depth_view(&device, width, height);

        let mut camera = CameraRig::new(render_config);
        camera.resize(width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            tunnel_pipeline,
            knot_pipeline,
            tunnel,
            knot,
            scene_uniform_buffer,
            knot_uniform_buffer,
            bind_group,
            depth_view,
            camera,
        })
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Render the current uniforms into the next surface texture
    fn render(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(VisualizerError::Render("out of GPU memory".to_string()));
            }
            Err(e) => {
                // Lost or outdated: reconfigure and draw on the next frame
                log::warn!("Surface error: {:?}, reconfiguring", e);
                self.reconfigure();
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            // Opaque tunnel first, then the translucent knot
            render_pass.set_pipeline(&self.tunnel_pipeline);
            self.tunnel.draw(&mut render_pass);

            render_pass.set_pipeline(&self.knot_pipeline);
            self.knot.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl SceneSink for Renderer {
    fn submit(&mut self, frame: &FrameUpdate) -> Result<()> {
        let view_proj = self.camera.view_proj(&frame.camera)?;

        let scene = SceneUniforms::from_frame(frame, view_proj);
        self.queue
            .write_buffer(&self.scene_uniform_buffer, 0, bytemuck::cast_slice(&[scene]));

        let knot = KnotShaderUniforms::from_frame(frame);
        self.queue
            .write_buffer(&self.knot_uniform_buffer, 0, bytemuck::cast_slice(&[knot]));

        self.render()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return; // Minimized
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        self.depth_view = create_depth_view(&self.device, width, height);
        self.camera.resize(width, height);
    }
}

/// Per-pipeline differences
struct PipelineKind {
    label: &'static str,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: Option<wgpu::BlendState>,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(kind.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: kind.format,
                blend: kind.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: kind.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: kind.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
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

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layouts_match_wgsl() {
        // mat4 + 3 vec4 / mat4 + vec4, 16-byte aligned
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 112);
        assert_eq!(std::mem::size_of::<KnotShaderUniforms>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }
}

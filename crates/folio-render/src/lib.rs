//! wgpu rasterizer for folio scenes.
//!
//! One [`GpuState`] per mounted surface. It draws a fullscreen backdrop
//! gradient, then every node part: lit triangles (optionally displaced by
//! the distortion field) and instanced point sprites.

mod helpers;
mod mesh;
mod uniforms;

use fnv::FnvHashMap;
use folio_core::{Frame, MeshId, Rasterizer, SceneError, Shading, Topology, Viewport};
use helpers::{create_depth_view, make_pipeline, uniform_layout_entry, PipelineSpec};
use mesh::GpuMesh;
use uniforms::{DrawUniforms, Globals, Vertex, DRAW_STRIDE, MAX_DRAWS};

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,

    backdrop_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,

    meshes: FnvHashMap<MeshId, GpuMesh>,
    staging: Vec<u8>,
    overflow_reported: bool,
    released: bool,
}

struct DrawCall {
    mesh: MeshId,
    slot: u32,
    points: bool,
}

impl<'a> GpuState<'a> {
    /// Create the device and surface for `target`.
    ///
    /// Any failure here is a context-creation failure: the caller reports it
    /// once and leaves the scene unmounted.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'a>>,
        viewport: Viewport,
    ) -> Result<Self, SceneError> {
        let ctx_err = |what: &str, e: &dyn std::fmt::Debug| {
            SceneError::ContextCreation(format!("{what}: {e:?}"))
        };

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(target)
            .map_err(|e| ctx_err("create_surface", &e))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| SceneError::ContextCreation("no compatible GPU adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("folio_device"),
                },
                None,
            )
            .await
            .map_err(|e| ctx_err("request_device", &e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| SceneError::ContextCreation("surface reports no formats".into()))?;
        // Premultiplied alpha lets transparent backdrops show the page.
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|m| caps.alpha_modes.contains(m))
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, viewport.width, viewport.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[uniform_layout_entry(false)],
        });
        let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[uniform_layout_entry(true)],
        });
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draws"),
            size: DRAW_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bg"),
            layout: &draw_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        let backdrop_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("backdrop_pl"),
            bind_group_layouts: &[&globals_bgl],
            push_constant_ranges: &[],
        });
        let scene_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl],
            push_constant_ranges: &[],
        });
        let backdrop_pipeline = make_pipeline(
            &device,
            &backdrop_pl,
            &shader,
            format,
            &PipelineSpec {
                label: "backdrop_pipeline",
                vs_entry: "vs_fullscreen",
                fs_entry: "fs_backdrop",
                buffers: &[],
                blend: wgpu::BlendState::REPLACE,
                depth_compare: wgpu::CompareFunction::Always,
                depth_write: false,
            },
        );
        let mesh_pipeline = make_pipeline(
            &device,
            &scene_pl,
            &shader,
            format,
            &PipelineSpec {
                label: "mesh_pipeline",
                vs_entry: "vs_mesh",
                fs_entry: "fs_mesh",
                buffers: &[Vertex::mesh_layout()],
                blend: wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
                depth_compare: wgpu::CompareFunction::Less,
                depth_write: true,
            },
        );
        let points_pipeline = make_pipeline(
            &device,
            &scene_pl,
            &shader,
            format,
            &PipelineSpec {
                label: "points_pipeline",
                vs_entry: "vs_points",
                fs_entry: "fs_points",
                buffers: &[Vertex::point_layout()],
                blend: wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
                depth_compare: wgpu::CompareFunction::Less,
                depth_write: false,
            },
        );

        log::info!(
            "[surface] gpu ready: {:?} {}x{} alpha={:?}",
            format,
            viewport.width,
            viewport.height,
            alpha_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            globals_buffer,
            globals_bind_group,
            draw_buffer,
            draw_bind_group,
            backdrop_pipeline,
            mesh_pipeline,
            points_pipeline,
            meshes: FnvHashMap::default(),
            staging: Vec::with_capacity(DRAW_STRIDE as usize * MAX_DRAWS),
            overflow_reported: false,
            released: false,
        })
    }

    /// Upload meshes the GPU has not seen yet and pack per-draw uniforms.
    fn prepare(&mut self, frame: &Frame<'_>) -> Vec<DrawCall> {
        let graph = frame.scene.graph();
        let mut calls = Vec::new();
        self.staging.clear();

        'nodes: for node in graph.nodes() {
            let node_matrix = node.transform.matrix();
            for part in &node.parts {
                if calls.len() == MAX_DRAWS {
                    if !self.overflow_reported {
                        log::warn!("[surface] more than {MAX_DRAWS} draws, extra parts skipped");
                        self.overflow_reported = true;
                    }
                    break 'nodes;
                }
                let Some(data) = graph.mesh(part.mesh) else {
                    continue;
                };
                if !self.meshes.contains_key(&part.mesh) {
                    let gpu = GpuMesh::upload(&self.device, node.name, data);
                    self.meshes.insert(part.mesh, gpu);
                }

                let uniforms = DrawUniforms::new(node_matrix * part.local_matrix(), &part.material);
                let offset = self.staging.len();
                self.staging.extend_from_slice(bytemuck::bytes_of(&uniforms));
                self.staging.resize(offset + DRAW_STRIDE as usize, 0);

                calls.push(DrawCall {
                    mesh: part.mesh,
                    slot: calls.len() as u32,
                    points: matches!(part.material.shading, Shading::Points { .. }),
                });
            }
        }
        calls
    }
}

impl<'a> Rasterizer for GpuState<'a> {
    fn resize(&mut self, viewport: Viewport) {
        if viewport.width == self.config.width && viewport.height == self.config.height {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, viewport.width, viewport.height);
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), SceneError> {
        if self.released {
            return Err(SceneError::Frame("context released".into()));
        }
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(SceneError::Frame("surface lost, reconfigured".into()));
            }
            Err(e) => return Err(SceneError::Frame(format!("{e:?}"))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let globals = Globals::from_frame(frame, self.config.width, self.config.height);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        let calls = self.prepare(frame);
        if !self.staging.is_empty() {
            self.queue.write_buffer(&self.draw_buffer, 0, &self.staging);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.backdrop_pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            rpass.draw(0..3, 0..1);

            // opaque meshes first so sprites blend over them
            for pass_points in [false, true] {
                for call in calls.iter().filter(|c| c.points == pass_points) {
                    let Some(mesh) = self.meshes.get(&call.mesh) else {
                        continue;
                    };
                    if mesh.count == 0 {
                        continue;
                    }
                    let offset = (call.slot as u64 * DRAW_STRIDE) as u32;
                    rpass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                    match (mesh.topology, &mesh.indices) {
                        (Topology::Triangles, Some(indices)) if !pass_points => {
                            rpass.set_pipeline(&self.mesh_pipeline);
                            rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                            rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                            rpass.draw_indexed(0..mesh.count, 0, 0..1);
                        }
                        (Topology::Points, _) if pass_points => {
                            rpass.set_pipeline(&self.points_pipeline);
                            rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                            rpass.draw(0..6, 0..mesh.count);
                        }
                        _ => {}
                    }
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.meshes.clear();
        self.staging = Vec::new();
        self.device.destroy();
        log::info!("[surface] gpu device destroyed");
    }
}

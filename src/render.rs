use std::path::PathBuf;

use cgmath::{perspective, Deg, Matrix4};
use winit::window::Window;

use crate::export;
use crate::geometry;
use crate::scene::Session;
use crate::solid_pass::{SolidBindings, SolidPass, SolidUniformBufferInput};
use crate::surface_pass::{
    tess_segments, PatchKind, SurfaceBindings, SurfacePass, SurfaceUniformBufferInput,
};

const FOV_Y: Deg<f32> = Deg(45.0);
const NEAR_PLANE: f32 = 0.0001;
const FAR_PLANE: f32 = 1000.0;
const LIGHT_POSITION: [f32; 4] = [-10.0, 10.0, 0.0, 1.0];

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// cgmath builds clip space with z in [-1, 1]; the surface wants [0, 1].
#[rustfmt::skip]
const DEPTH_RANGE_CORRECTION: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Owns the device handshake and everything drawn with it: the three
/// passes, their uniform buffers, the constant floor/ocean patch buffers,
/// the replaceable solid mesh, and the CPU copy of that mesh kept for
/// export.
pub struct RenderContext<'window> {
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    solid_pass: SolidPass,
    solid_bindings: SolidBindings,
    solid_uniform_buffer: wgpu::Buffer,
    floor_pass: SurfacePass,
    floor_bindings: SurfaceBindings,
    floor_uniform_buffer: wgpu::Buffer,
    ocean_pass: SurfacePass,
    ocean_bindings: SurfaceBindings,
    ocean_uniform_buffer: wgpu::Buffer,
    solid_vertices: Vec<[f32; 4]>,
    solid_triangles: Vec<[u32; 3]>,
    export_path: PathBuf,
}

impl<'window> RenderContext<'window> {
    /// Device handshake and resource creation. Failures here are fatal;
    /// nothing is re-validated once the frame loop is running.
    pub async fn new(
        window: &'window Window,
        session: &mut Session,
        export_path: PathBuf,
    ) -> RenderContext<'window> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .expect("Failed to create rendering surface");
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .expect("Failed to find an appropriate adapter");
        log::info!("Rendering on {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::POLYGON_MODE_LINE,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .expect("Surface is incompatible with the adapter");
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let solid_uniform_buffer = create_uniform_buffer(
            &device,
            "Solid Uniform Buffer",
            &SolidUniformBufferInput::default(),
        );
        let floor_uniform_buffer = create_uniform_buffer(
            &device,
            "Floor Uniform Buffer",
            &SurfaceUniformBufferInput::default(),
        );
        let ocean_uniform_buffer = create_uniform_buffer(
            &device,
            "Ocean Uniform Buffer",
            &SurfaceUniformBufferInput::default(),
        );

        let (solid_vertices, solid_triangles) = match session.provider.as_mut() {
            Some(provider) => {
                let (vertices, triangles) = provider.generate_geometry();
                provider.set_clean();
                log::info!(
                    "Initial solid mesh: {} vertices, {} triangles",
                    vertices.len(),
                    triangles.len()
                );
                (vertices, triangles)
            }
            None => (Vec::new(), Vec::new()),
        };

        let solid_pass = SolidPass::new(&device, config.format);
        let solid_bindings = SolidBindings::new(
            &device,
            &solid_pass,
            &solid_vertices,
            &solid_triangles,
            &solid_uniform_buffer,
        );

        let floor_pass = SurfacePass::new(
            &device,
            config.format,
            wgpu::include_wgsl!("floor.wgsl"),
            PatchKind::Triangle,
            "Floor",
        );
        let (floor_vertices, floor_patches) = geometry::floor_patches();
        let floor_bindings = SurfaceBindings::new(
            &device,
            &floor_pass,
            "Floor",
            &floor_vertices,
            bytemuck::cast_slice(&floor_patches),
            &floor_uniform_buffer,
        );

        let ocean_pass = SurfacePass::new(
            &device,
            config.format,
            wgpu::include_wgsl!("ocean.wgsl"),
            PatchKind::Quad,
            "Ocean",
        );
        let (ocean_vertices, ocean_patches) = geometry::ocean_patches();
        let ocean_bindings = SurfaceBindings::new(
            &device,
            &ocean_pass,
            "Ocean",
            &ocean_vertices,
            bytemuck::cast_slice(&ocean_patches),
            &ocean_uniform_buffer,
        );

        RenderContext {
            surface,
            device,
            queue,
            config,
            depth_view,
            solid_pass,
            solid_bindings,
            solid_uniform_buffer,
            floor_pass,
            floor_bindings,
            floor_uniform_buffer,
            ocean_pass,
            ocean_bindings,
            ocean_uniform_buffer,
            solid_vertices,
            solid_triangles,
            export_path,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.config.width, self.config.height);
    }

    /// One frame: projection from the live aspect ratio, view from the
    /// camera, export snapshot, dirty-mesh replacement, then the three
    /// passes in fixed order with full rebinds each.
    pub fn render_frame(&mut self, session: &mut Session) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let projection =
            DEPTH_RANGE_CORRECTION * perspective(FOV_Y, aspect, NEAR_PLANE, FAR_PLANE);
        let view = session.camera.view_matrix();

        // Snapshot before any mesh mutation this frame, so the exported
        // geometry is exactly what the previous frame drew.
        if session.scene.take_export_request() {
            match export::save_obj(&self.export_path, &self.solid_vertices, &self.solid_triangles)
            {
                Ok(()) => log::info!(
                    "Exported {} vertices and {} triangles to {}",
                    self.solid_vertices.len(),
                    self.solid_triangles.len(),
                    self.export_path.display()
                ),
                Err(err) => {
                    log::error!("Export to {} failed: {err}", self.export_path.display())
                }
            }
        }

        if let Some(provider) = session.provider.as_mut() {
            if provider.is_dirty() {
                let (vertices, triangles) = provider.generate_geometry();
                provider.set_clean();
                log::info!(
                    "Rebuilt solid mesh: {} vertices, {} triangles",
                    vertices.len(),
                    triangles.len()
                );
                self.solid_bindings
                    .replace_mesh(&self.device, &self.solid_pass, &vertices, &triangles);
                self.solid_vertices = vertices;
                self.solid_triangles = triangles;
            }
        }

        let projection: [[f32; 4]; 4] = projection.into();
        let view: [[f32; 4]; 4] = view.into();
        self.queue.write_buffer(
            &self.solid_uniform_buffer,
            0,
            bytemuck::cast_slice(&[SolidUniformBufferInput {
                projection,
                view,
                light_position: LIGHT_POSITION,
            }]),
        );
        let surface_uniforms = SurfaceUniformBufferInput {
            projection,
            view,
            light_position: LIGHT_POSITION,
            wireframe: session.scene.wireframe as u32,
            tess_inner: session.scene.tess_inner,
            tess_outer: session.scene.tess_outer,
            _padding: 0,
        };
        self.queue.write_buffer(
            &self.floor_uniform_buffer,
            0,
            bytemuck::cast_slice(&[surface_uniforms]),
        );
        self.queue.write_buffer(
            &self.ocean_uniform_buffer,
            0,
            bytemuck::cast_slice(&[surface_uniforms]),
        );

        let frame = self
            .surface
            .get_current_texture()
            .expect("Failed to acquire next swap chain texture");
        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
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

            let segments = tess_segments(session.scene.tess_inner, session.scene.tess_outer);
            self.solid_pass.record(&mut rpass, &self.solid_bindings);
            self.floor_pass.record(
                &mut rpass,
                &self.floor_bindings,
                session.scene.fill_faces,
                segments,
            );
            self.ocean_pass.record(
                &mut rpass,
                &self.ocean_bindings,
                session.scene.fill_faces,
                segments,
            );
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    initial: &T,
) -> wgpu::Buffer {
    use wgpu::util::DeviceExt;
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(initial),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
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

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::DEPTH_FORMAT;

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, Pod, Zeroable)]
pub struct SolidUniformBufferInput {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub light_position: [f32; 4],
}

/// Draws the provider's triangle mesh with flat per-face shading. The
/// mesh lives in storage buffers the vertex stage pulls from, so a
/// wholesale replacement only swaps the mesh bind group.
pub struct SolidPass {
    pipeline: wgpu::RenderPipeline,
}

impl SolidPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let mesh_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Solid: Mesh Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Solid: Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Solid Pipeline Layout"),
            bind_group_layouts: &[&mesh_bind_group_layout, &uniform_bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::include_wgsl!("solid.wgsl"));
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Solid Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(format.into())],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: Default::default(),
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self { pipeline }
    }
}

pub struct SolidBindings {
    mesh: wgpu::BindGroup,
    uniform: wgpu::BindGroup,
    vertex_count: u32,
}

impl SolidBindings {
    pub fn new(
        device: &wgpu::Device,
        pass: &SolidPass,
        vertices: &[[f32; 4]],
        triangles: &[[u32; 3]],
        uniform_buffer: &wgpu::Buffer,
    ) -> Self {
        let (mesh, vertex_count) = create_mesh_bind_group(device, pass, vertices, triangles);
        let uniform = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Solid: Uniform Bind Group"),
            layout: &pass.pipeline.get_bind_group_layout(1),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            mesh,
            uniform,
            vertex_count,
        }
    }

    /// Swap in a freshly generated mesh. The old buffers drop with the
    /// previous bind group; the backend never sees an incremental diff.
    pub fn replace_mesh(
        &mut self,
        device: &wgpu::Device,
        pass: &SolidPass,
        vertices: &[[f32; 4]],
        triangles: &[[u32; 3]],
    ) {
        let (mesh, vertex_count) = create_mesh_bind_group(device, pass, vertices, triangles);
        self.mesh = mesh;
        self.vertex_count = vertex_count;
    }
}

fn create_mesh_bind_group(
    device: &wgpu::Device,
    SolidPass { pipeline }: &SolidPass,
    vertices: &[[f32; 4]],
    triangles: &[[u32; 3]],
) -> (wgpu::BindGroup, u32) {
    // A zero-sized binding is invalid, so an absent mesh binds one zeroed
    // element and draws nothing.
    let vertex_contents: &[[f32; 4]] = if vertices.is_empty() {
        &[[0.0; 4]]
    } else {
        vertices
    };
    let index_contents: &[[u32; 3]] = if triangles.is_empty() {
        &[[0; 3]]
    } else {
        triangles
    };
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Solid Vertex Buffer"),
        contents: bytemuck::cast_slice(vertex_contents),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Solid Index Buffer"),
        contents: bytemuck::cast_slice(index_contents),
        usage: wgpu::BufferUsages::STORAGE,
    });
    let mesh = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Solid: Mesh Bind Group"),
        layout: &pipeline.get_bind_group_layout(0),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: vertex_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: index_buffer.as_entire_binding(),
            },
        ],
    });
    (mesh, triangles.len() as u32 * 3)
}

impl<'a> SolidPass {
    pub fn record<'pass>(&'a self, rpass: &mut wgpu::RenderPass<'pass>, bindings: &'a SolidBindings)
    where
        'a: 'pass,
    {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bindings.mesh, &[]);
        rpass.set_bind_group(1, &bindings.uniform, &[]);
        rpass.draw(0..bindings.vertex_count, 0..1);
    }
}

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::DEPTH_FORMAT;

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, Pod, Zeroable)]
pub struct SurfaceUniformBufferInput {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub wireframe: u32,
    pub tess_inner: f32,
    pub tess_outer: f32,
    pub _padding: u32,
}

/// Control-point count of a tessellation patch and the vertex budget its
/// shader-side expansion needs. The vertex stage decodes `vertex_index`
/// into a sub-triangle of a uniform grid over the patch, so the draw call
/// must be sized with the same arithmetic the shader uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PatchKind {
    Triangle,
    Quad,
}

impl PatchKind {
    pub fn control_points(self) -> u32 {
        match self {
            PatchKind::Triangle => 3,
            PatchKind::Quad => 4,
        }
    }

    /// Expanded vertices per patch: a triangle splits into n^2 barycentric
    /// sub-triangles, a quad into n^2 bilinear cells of two triangles.
    pub fn vertices_per_patch(self, segments: u32) -> u32 {
        match self {
            PatchKind::Triangle => 3 * segments * segments,
            PatchKind::Quad => 6 * segments * segments,
        }
    }
}

/// Subdivision segments per patch edge for the current tessellation
/// levels. There is no fixed-function tessellation stage to hand the two
/// levels to, so both collapse onto one uniform grid size here and in the
/// shaders.
pub fn tess_segments(tess_inner: f32, tess_outer: f32) -> u32 {
    tess_inner.max(tess_outer).round().max(1.0) as u32
}

/// One tessellated surface: a fill and a line pipeline over the same
/// layout, selected per frame by the face-fill toggle.
pub struct SurfacePass {
    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    kind: PatchKind,
}

impl SurfacePass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        shader: wgpu::ShaderModuleDescriptor,
        kind: PatchKind,
        label: &str,
    ) -> Self {
        let patch_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label}: Patch Bind Group Layout")),
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
                label: Some(&format!("{label}: Uniform Bind Group Layout")),
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
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts: &[&patch_bind_group_layout, &uniform_bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(shader);

        let pipeline = |polygon_mode: wgpu::PolygonMode, variant: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{label} {variant} Pipeline")),
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
                    polygon_mode,
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
            })
        };

        Self {
            fill_pipeline: pipeline(wgpu::PolygonMode::Fill, "Fill"),
            line_pipeline: pipeline(wgpu::PolygonMode::Line, "Line"),
            kind,
        }
    }
}

pub struct SurfaceBindings {
    patch: wgpu::BindGroup,
    uniform: wgpu::BindGroup,
    patch_count: u32,
}

impl SurfaceBindings {
    pub fn new(
        device: &wgpu::Device,
        pass: &SurfacePass,
        label: &str,
        control_points: &[[f32; 4]],
        patch_indices: &[u32],
        uniform_buffer: &wgpu::Buffer,
    ) -> Self {
        let control_point_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Control Point Buffer")),
            contents: bytemuck::cast_slice(control_points),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let patch_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Patch Index Buffer")),
            contents: bytemuck::cast_slice(patch_indices),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let patch = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}: Patch Bind Group")),
            layout: &pass.fill_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: control_point_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: patch_index_buffer.as_entire_binding(),
                },
            ],
        });
        let uniform = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}: Uniform Bind Group")),
            layout: &pass.fill_pipeline.get_bind_group_layout(1),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            patch,
            uniform,
            patch_count: patch_indices.len() as u32 / pass.kind.control_points(),
        }
    }
}

impl<'a> SurfacePass {
    /// One patch per instance; the vertex budget must match the segment
    /// count the shader derives from the uniforms it was handed this
    /// frame.
    pub fn record<'pass>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'pass>,
        bindings: &'a SurfaceBindings,
        fill_faces: bool,
        segments: u32,
    ) where
        'a: 'pass,
    {
        if fill_faces {
            rpass.set_pipeline(&self.fill_pipeline);
        } else {
            rpass.set_pipeline(&self.line_pipeline);
        }
        rpass.set_bind_group(0, &bindings.patch, &[]);
        rpass.set_bind_group(1, &bindings.uniform, &[]);
        rpass.draw(
            0..self.kind.vertices_per_patch(segments),
            0..bindings.patch_count,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_round_and_stay_at_least_one() {
        assert_eq!(tess_segments(1.0, 1.0), 1);
        assert_eq!(tess_segments(3.0, 1.0), 3);
        assert_eq!(tess_segments(1.0, 7.4), 7);
        assert_eq!(tess_segments(1.0, 7.5), 8);
        assert_eq!(tess_segments(50.0, 50.0), 50);
    }

    #[test]
    fn triangle_patch_budget_covers_the_barycentric_grid() {
        // n^2 sub-triangles, three corners each.
        assert_eq!(PatchKind::Triangle.vertices_per_patch(1), 3);
        assert_eq!(PatchKind::Triangle.vertices_per_patch(4), 48);
        assert_eq!(PatchKind::Triangle.vertices_per_patch(50), 7500);
    }

    #[test]
    fn quad_patch_budget_covers_the_bilinear_grid() {
        // n^2 cells, two triangles each.
        assert_eq!(PatchKind::Quad.vertices_per_patch(1), 6);
        assert_eq!(PatchKind::Quad.vertices_per_patch(4), 96);
        assert_eq!(PatchKind::Quad.vertices_per_patch(50), 15000);
    }

    #[test]
    fn control_point_counts_match_patch_layout() {
        assert_eq!(PatchKind::Triangle.control_points(), 3);
        assert_eq!(PatchKind::Quad.control_points(), 4);
    }
}

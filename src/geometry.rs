//! Control meshes for the two tessellated surfaces. Both are built once
//! at startup and never mutated afterwards.

pub const FLOOR_Y: f32 = -3.0;
pub const FLOOR_EXTENT: f32 = 10.0;
pub const OCEAN_Y: f32 = -2.0;
pub const OCEAN_PATCHES_PER_SIDE: u32 = 16;
pub const OCEAN_PATCH_SIZE: f32 = 2.5;
const OCEAN_ORIGIN: f32 = -20.0;

/// A single quad at y = -3 spanning +-10, split into two triangle patches.
pub fn floor_patches() -> (Vec<[f32; 4]>, Vec<[u32; 3]>) {
    let vertices = vec![
        [-FLOOR_EXTENT, FLOOR_Y, -FLOOR_EXTENT, 1.0],
        [-FLOOR_EXTENT, FLOOR_Y, FLOOR_EXTENT, 1.0],
        [FLOOR_EXTENT, FLOOR_Y, -FLOOR_EXTENT, 1.0],
        [FLOOR_EXTENT, FLOOR_Y, FLOOR_EXTENT, 1.0],
    ];
    let patches = vec![[0, 1, 3], [0, 3, 2]];
    (vertices, patches)
}

/// A 16x16 grid of quad patches at y = -2, each with its own four corner
/// vertices. The index ring walks corner, +x neighbor, far corner, +z
/// neighbor, which is the order the bilinear expansion expects.
pub fn ocean_patches() -> (Vec<[f32; 4]>, Vec<[u32; 4]>) {
    let side = OCEAN_PATCHES_PER_SIDE;
    let mut vertices = Vec::with_capacity((side * side * 4) as usize);
    let mut patches = Vec::with_capacity((side * side) as usize);
    for i in 0..side {
        for k in 0..side {
            let offset = vertices.len() as u32;
            let x0 = OCEAN_ORIGIN + OCEAN_PATCH_SIZE * i as f32;
            let x1 = OCEAN_ORIGIN + OCEAN_PATCH_SIZE * (i + 1) as f32;
            let z0 = OCEAN_ORIGIN + OCEAN_PATCH_SIZE * k as f32;
            let z1 = OCEAN_ORIGIN + OCEAN_PATCH_SIZE * (k + 1) as f32;
            vertices.push([x0, OCEAN_Y, z0, 1.0]);
            vertices.push([x1, OCEAN_Y, z0, 1.0]);
            vertices.push([x0, OCEAN_Y, z1, 1.0]);
            vertices.push([x1, OCEAN_Y, z1, 1.0]);
            patches.push([offset, offset + 1, offset + 3, offset + 2]);
        }
    }
    (vertices, patches)
}

/// Source of the procedurally generated solid. The renderer polls the
/// dirty flag once per frame and swaps its buffers wholesale when new
/// geometry is available.
pub trait MeshSource {
    fn is_dirty(&self) -> bool;
    fn set_clean(&mut self);
    fn set_nesting_level(&mut self, level: u32);
    fn generate_geometry(&self) -> (Vec<[f32; 4]>, Vec<[u32; 3]>);
}

pub const MAX_NESTING_LEVEL: u32 = 4;

/// Menger sponge over the unit cube centered at the origin. Each recursion
/// step splits a cube 3x3x3 and discards the six face centers and the
/// core, leaving 20 children.
pub struct MengerSponge {
    nesting_level: u32,
    dirty: bool,
}

impl MengerSponge {
    pub fn new(nesting_level: u32) -> Self {
        MengerSponge {
            nesting_level: nesting_level.min(MAX_NESTING_LEVEL),
            dirty: true,
        }
    }

    pub fn nesting_level(&self) -> u32 {
        self.nesting_level
    }
}

impl MeshSource for MengerSponge {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_clean(&mut self) {
        self.dirty = false;
    }

    fn set_nesting_level(&mut self, level: u32) {
        let level = level.min(MAX_NESTING_LEVEL);
        if level != self.nesting_level {
            self.nesting_level = level;
            self.dirty = true;
        }
    }

    fn generate_geometry(&self) -> (Vec<[f32; 4]>, Vec<[u32; 3]>) {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        subdivide(
            [-0.5, -0.5, -0.5],
            1.0,
            self.nesting_level,
            &mut vertices,
            &mut triangles,
        );
        (vertices, triangles)
    }
}

fn subdivide(
    min: [f32; 3],
    size: f32,
    depth: u32,
    vertices: &mut Vec<[f32; 4]>,
    triangles: &mut Vec<[u32; 3]>,
) {
    if depth == 0 {
        emit_cube(min, size, vertices, triangles);
        return;
    }
    let child = size / 3.0;
    for x in 0..3u32 {
        for y in 0..3u32 {
            for z in 0..3u32 {
                let centered = (x == 1) as u32 + (y == 1) as u32 + (z == 1) as u32;
                if centered >= 2 {
                    continue;
                }
                subdivide(
                    [
                        min[0] + child * x as f32,
                        min[1] + child * y as f32,
                        min[2] + child * z as f32,
                    ],
                    child,
                    depth - 1,
                    vertices,
                    triangles,
                );
            }
        }
    }
}

fn emit_cube(min: [f32; 3], size: f32, vertices: &mut Vec<[f32; 4]>, triangles: &mut Vec<[u32; 3]>) {
    let base = vertices.len() as u32;
    for corner in 0..8u32 {
        vertices.push([
            min[0] + size * (corner & 1) as f32,
            min[1] + size * ((corner >> 1) & 1) as f32,
            min[2] + size * ((corner >> 2) & 1) as f32,
            1.0,
        ]);
    }
    // Corner bit layout: 1 = +x, 2 = +y, 4 = +z. Faces wind
    // counter-clockwise seen from outside the cube.
    const FACES: [[u32; 4]; 6] = [
        [4, 5, 7, 6], // +z
        [1, 0, 2, 3], // -z
        [0, 4, 6, 2], // -x
        [5, 1, 3, 7], // +x
        [6, 7, 3, 2], // +y
        [0, 1, 5, 4], // -y
    ];
    for face in FACES {
        triangles.push([base + face[0], base + face[1], base + face[2]]);
        triangles.push([base + face[0], base + face[2], base + face[3]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_is_a_single_cube() {
        let sponge = MengerSponge::new(0);
        let (vertices, triangles) = sponge.generate_geometry();
        assert_eq!(vertices.len(), 8);
        assert_eq!(triangles.len(), 12);
    }

    #[test]
    fn each_level_multiplies_cube_count_by_twenty() {
        for level in 0..3u32 {
            let sponge = MengerSponge::new(level);
            let (vertices, triangles) = sponge.generate_geometry();
            let cubes = 20usize.pow(level);
            assert_eq!(
                vertices.len(),
                cubes * 8,
                "level {level} should emit {cubes} cubes"
            );
            assert_eq!(triangles.len(), cubes * 12);
        }
    }

    #[test]
    fn geometry_stays_inside_the_unit_cube() {
        let sponge = MengerSponge::new(2);
        let (vertices, triangles) = sponge.generate_geometry();
        for v in &vertices {
            for axis in 0..3 {
                assert!(
                    v[axis] >= -0.5 - 1e-6 && v[axis] <= 0.5 + 1e-6,
                    "vertex component {} escapes the unit cube",
                    v[axis]
                );
            }
            assert_eq!(v[3], 1.0, "positions are homogeneous with w = 1");
        }
        let max_index = vertices.len() as u32;
        for t in &triangles {
            assert!(t.iter().all(|&i| i < max_index), "triangle index in range");
        }
    }

    #[test]
    fn dirty_flag_round_trips_with_nesting_changes() {
        let mut sponge = MengerSponge::new(1);
        assert!(sponge.is_dirty(), "a fresh sponge needs generating");

        let _ = sponge.generate_geometry();
        sponge.set_clean();
        assert!(!sponge.is_dirty());

        sponge.set_nesting_level(1);
        assert!(
            !sponge.is_dirty(),
            "re-setting the current level should not re-dirty"
        );

        sponge.set_nesting_level(2);
        assert!(sponge.is_dirty(), "a level change must mark dirty");
    }

    #[test]
    fn nesting_level_is_clamped_to_the_supported_range() {
        let mut sponge = MengerSponge::new(9);
        assert_eq!(sponge.nesting_level(), MAX_NESTING_LEVEL);
        sponge.set_clean();
        sponge.set_nesting_level(40);
        assert_eq!(sponge.nesting_level(), MAX_NESTING_LEVEL);
        assert!(!sponge.is_dirty(), "clamped-to-same level stays clean");
    }
}

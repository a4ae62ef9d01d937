use foundation::bounds::Aabb3;
use foundation::math::Vec3;

/// Triangle-list geometry in node-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Local-space bounds of `positions`.
    pub bounds: Aabb3,
}

impl MeshGeometry {
    /// Builds geometry, filling in sequential indices for non-indexed input and
    /// area-weighted vertex normals when `normals` does not match `positions`.
    pub fn new(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let indices = if indices.is_empty() {
            (0..positions.len() as u32).collect()
        } else {
            indices
        };
        let bounds = Aabb3::from_points(positions.iter().map(|p| Vec3::from_f32(*p)));
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            compute_vertex_normals(&positions, &indices)
        };

        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// Axis-aligned box mesh centered at the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let c = |x: f64, y: f64, z: f64| [(x * h.x) as f32, (y * h.y) as f32, (z * h.z) as f32];
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([1.0, 0.0, 0.0], [c(1., -1., 1.), c(1., -1., -1.), c(1., 1., -1.), c(1., 1., 1.)]),
            ([-1.0, 0.0, 0.0], [c(-1., -1., -1.), c(-1., -1., 1.), c(-1., 1., 1.), c(-1., 1., -1.)]),
            ([0.0, 1.0, 0.0], [c(-1., 1., 1.), c(1., 1., 1.), c(1., 1., -1.), c(-1., 1., -1.)]),
            ([0.0, -1.0, 0.0], [c(-1., -1., -1.), c(1., -1., -1.), c(1., -1., 1.), c(-1., -1., 1.)]),
            ([0.0, 0.0, 1.0], [c(-1., -1., 1.), c(1., -1., 1.), c(1., 1., 1.), c(-1., 1., 1.)]),
            ([0.0, 0.0, -1.0], [c(1., -1., -1.), c(-1., -1., -1.), c(-1., 1., -1.), c(1., 1., -1.)]),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, quad) in faces {
            let base = positions.len() as u32;
            positions.extend_from_slice(&quad);
            normals.extend_from_slice(&[normal; 4]);
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(positions, normals, indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_f32(positions[a]);
        let pb = Vec3::from_f32(positions[b]);
        let pc = Vec3::from_f32(positions[c]);
        // Unnormalized cross product weights by triangle area.
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO { [0.0, 1.0, 0.0] } else { n.to_f32() }
        })
        .collect()
}

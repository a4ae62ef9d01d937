//! Feature-edge extraction for the outline overlay.

use std::collections::HashMap;

use crate::components::MeshGeometry;
use foundation::math::Vec3;

/// Line segment in mesh-local space.
pub type EdgeSegment = [[f32; 3]; 2];

const QUANTIZE: f64 = 1e4;

type VertexKey = [i64; 3];

fn quantize(p: [f32; 3]) -> VertexKey {
    p.map(|c| (c as f64 * QUANTIZE).round() as i64)
}

struct OpenEdge {
    normal: Vec3,
    segment: EdgeSegment,
}

/// Edges where adjacent faces meet at more than `threshold_deg`, plus every
/// boundary edge that only one triangle uses.
///
/// Vertices are welded by position before comparing faces, so split-normal
/// meshes still produce one segment per crease. Degenerate triangles are skipped.
pub fn feature_edges(geometry: &MeshGeometry, threshold_deg: f64) -> Vec<EdgeSegment> {
    let threshold_dot = threshold_deg.to_radians().cos();
    let positions = &geometry.positions;

    let mut open: HashMap<(VertexKey, VertexKey), OpenEdge> = HashMap::new();
    let mut out = Vec::new();

    for tri in geometry.indices.chunks_exact(3) {
        let Some(corners) = tri
            .iter()
            .map(|&i| positions.get(i as usize).copied())
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };
        let keys = [quantize(corners[0]), quantize(corners[1]), quantize(corners[2])];
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }

        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_f32(corners[i]));
        let normal = (b - a).cross(c - a).normalize_or_zero();

        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            let edge_key = if keys[i] <= keys[j] {
                (keys[i], keys[j])
            } else {
                (keys[j], keys[i])
            };
            match open.remove(&edge_key) {
                Some(other) => {
                    if normal.dot(other.normal) <= threshold_dot {
                        out.push(other.segment);
                    }
                }
                None => {
                    open.insert(
                        edge_key,
                        OpenEdge {
                            normal,
                            segment: [corners[i], corners[j]],
                        },
                    );
                }
            }
        }
    }

    // Whatever is still open belongs to a single triangle.
    let mut boundary: Vec<_> = open.into_iter().collect();
    boundary.sort_by(|a, b| a.0.cmp(&b.0));
    out.extend(boundary.into_iter().map(|(_, edge)| edge.segment));
    out
}

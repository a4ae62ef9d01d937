//! Flattens a [`World`] into world-space vertex streams for the GPU.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use foundation::math::Vec3;
use scene::components::{Light, NodeKind, rgb_from_hex};
use scene::edges::feature_edges;
use scene::{NodeId, Room, RoomId, World};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// 1-based room slot, 0 for meshes outside every room.
    pub room: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

/// Per-frame shader constants. Laid out for a WGSL uniform block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// rgb + intensity
    pub sky: [f32; 4],
    /// rgb + unused
    pub ground: [f32; 4],
    /// rgb + highlighted room slot (0 = none)
    pub highlight: [f32; 4],
    pub edge_color: [f32; 4],
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hemisphere {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub intensity: f32,
}

impl Hemisphere {
    pub fn from_hex(sky: u32, ground: u32) -> Self {
        Self {
            sky: rgb_from_hex(sky),
            ground: rgb_from_hex(ground),
            intensity: 1.0,
        }
    }

    /// First hemisphere light in the scene, if any.
    pub fn find(world: &World) -> Option<Self> {
        world.lights().into_iter().find_map(|(_, light)| match light {
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => Some(Self {
                sky,
                ground,
                intensity,
            }),
            _ => None,
        })
    }
}

impl Globals {
    pub fn new(
        view_proj: [[f32; 4]; 4],
        light: Hemisphere,
        highlight_color: u32,
        highlight_slot: f32,
        edge_color: u32,
    ) -> Self {
        let [hr, hg, hb] = rgb_from_hex(highlight_color);
        let [er, eg, eb] = rgb_from_hex(edge_color);
        Self {
            view_proj,
            sky: [light.sky[0], light.sky[1], light.sky[2], light.intensity],
            ground: [light.ground[0], light.ground[1], light.ground[2], 0.0],
            highlight: [hr, hg, hb, highlight_slot],
            edge_color: [er, eg, eb, 1.0],
        }
    }
}

/// Everything the renderer draws for one installed model.
#[derive(Debug, Default, Clone)]
pub struct SceneBatch {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub edges: Vec<LineVertex>,
    room_slots: Vec<RoomId>,
}

impl SceneBatch {
    /// Bakes every visible mesh into world space. Meshes inside a room carry its slot;
    /// with nested rooms the innermost one wins. `edge_threshold_deg` of `None` skips
    /// edge extraction.
    pub fn build(world: &World, rooms: &[Room], edge_threshold_deg: Option<f64>) -> Self {
        let mut slot_of_mesh: HashMap<NodeId, f32> = HashMap::new();
        for (i, room) in rooms.iter().enumerate() {
            for &mesh in &room.meshes {
                slot_of_mesh.insert(mesh, (i + 1) as f32);
            }
        }

        let mut batch = SceneBatch {
            room_slots: rooms.iter().map(|r| r.id).collect(),
            ..SceneBatch::default()
        };

        for node in world.meshes_under(world.root()) {
            if !world.is_visible_in_hierarchy(node) {
                continue;
            }
            let Some(NodeKind::Mesh(geometry)) = world.kind(node) else {
                continue;
            };
            let matrix = world.world_matrix(node);
            let room = slot_of_mesh.get(&node).copied().unwrap_or(0.0);

            let base = batch.vertices.len() as u32;
            for (i, &p) in geometry.positions.iter().enumerate() {
                let normal = geometry
                    .normals
                    .get(i)
                    .map(|&n| matrix.transform_vector(Vec3::from_f32(n)).normalize_or_zero())
                    .unwrap_or(Vec3::ZERO);
                batch.vertices.push(MeshVertex {
                    position: matrix.transform_point(Vec3::from_f32(p)).to_f32(),
                    normal: normal.to_f32(),
                    room,
                });
            }
            batch.indices.extend(geometry.indices.iter().map(|&i| base + i));

            if let Some(threshold) = edge_threshold_deg {
                for [a, b] in feature_edges(geometry, threshold) {
                    for p in [a, b] {
                        batch.edges.push(LineVertex {
                            position: matrix.transform_point(Vec3::from_f32(p)).to_f32(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            vertices = batch.vertices.len(),
            triangles = batch.indices.len() / 3,
            edge_segments = batch.edges.len() / 2,
            "scene batch built"
        );
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Shader slot for `room`, 0 when it is absent or not part of this batch.
    pub fn slot_of(&self, room: Option<RoomId>) -> f32 {
        room.and_then(|id| self.room_slots.iter().position(|&r| r == id))
            .map(|i| (i + 1) as f32)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Globals, Hemisphere, SceneBatch};
    use foundation::math::Vec3;
    use scene::components::{Light, MeshGeometry, NodeKind, Transform};
    use scene::{World, extract_rooms};

    fn house() -> World {
        let mut world = World::new();
        let root = world.root();
        let model = world.spawn_group(root, "modelRoot");
        let hall = world.spawn_group(model, "r_hall");
        world.set_transform(hall, Transform::translate(Vec3::new(5.0, 0.0, 0.0)));
        world.spawn(hall, "floor", NodeKind::Mesh(MeshGeometry::cuboid(Vec3::splat(2.0))));
        world.spawn(model, "roof", NodeKind::Mesh(MeshGeometry::cuboid(Vec3::splat(1.0))));
        world
    }

    fn batch(world: &World, edges: Option<f64>) -> SceneBatch {
        let model = world.model_root().unwrap();
        SceneBatch::build(world, &extract_rooms(world, model), edges)
    }

    #[test]
    fn bakes_world_transforms_and_room_slots() {
        let world = house();
        let batch = batch(&world, None);

        assert_eq!(batch.vertices.len(), 48);
        assert_eq!(batch.indices.len(), 72);
        assert!(batch.edges.is_empty());

        let (hall, roof) = batch.vertices.split_at(24);
        assert!(hall.iter().all(|v| v.room == 1.0 && (v.position[0] - 5.0).abs() <= 1.0));
        assert!(roof.iter().all(|v| v.room == 0.0 && v.position[0].abs() <= 0.5));
        assert!(batch.indices[36..].iter().all(|&i| i >= 24));
    }

    #[test]
    fn hidden_meshes_are_skipped() {
        let mut world = house();
        let roof = world.find_by_name("roof").unwrap();
        world.set_visible(roof, false);
        assert_eq!(batch(&world, None).vertices.len(), 24);
    }

    #[test]
    fn feature_edges_are_emitted_as_segment_pairs() {
        let world = house();
        let batch = batch(&world, Some(0.1));
        assert_eq!(batch.edges.len(), 2 * 12 * 2);
    }

    #[test]
    fn highlight_slot_follows_room_order() {
        let world = house();
        let model = world.model_root().unwrap();
        let rooms = extract_rooms(&world, model);
        let batch = SceneBatch::build(&world, &rooms, None);

        assert_eq!(batch.slot_of(Some(rooms[0].id)), 1.0);
        assert_eq!(batch.slot_of(None), 0.0);
        assert_eq!(batch.slot_of(Some(scene::RoomId(model))), 0.0);
    }

    #[test]
    fn hemisphere_comes_from_the_scene_light() {
        let mut world = house();
        assert_eq!(Hemisphere::find(&world), None);
        let root = world.root();
        world.spawn(root, "hemi", NodeKind::Light(Light::hemisphere(0xff0000, 0x0000ff)));

        let light = Hemisphere::find(&world).unwrap();
        assert_eq!(light.sky, [1.0, 0.0, 0.0]);
        assert_eq!(light.ground, [0.0, 0.0, 1.0]);

        let globals = Globals::new([[0.0; 4]; 4], light, 0xffb347, 2.0, 0x000000);
        assert_eq!(globals.highlight[3], 2.0);
        assert_eq!(globals.edge_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(std::mem::size_of::<Globals>(), 128);
    }
}

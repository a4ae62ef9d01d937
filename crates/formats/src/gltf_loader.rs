use std::fs;
use std::path::Path;

use foundation::math::Mat4;
use gltf::khr_lights_punctual::Kind as LightKind;
use scene::components::{Light, MeshGeometry, NodeKind, Transform};
use scene::{MODEL_ROOT_NAME, NodeId, World};

use crate::error::ModelLoadError;

/// Builds a [`World`] from `.glb` or self-contained `.gltf` bytes.
///
/// External buffer URIs cannot be resolved from a slice; use
/// [`load_world_from_path`] for those.
pub fn load_world_from_slice(bytes: &[u8]) -> Result<World, ModelLoadError> {
    load_world(bytes, None)
}

pub fn load_world_from_path(path: impl AsRef<Path>) -> Result<World, ModelLoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_world(&bytes, path.parent())
}

fn load_world(bytes: &[u8], base: Option<&Path>) -> Result<World, ModelLoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;

    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ModelLoadError::NoScene)?;

    let mut world = World::new();
    let root = world.root();
    let model_root = world.spawn_group(root, MODEL_ROOT_NAME);
    for node in gltf_scene.nodes() {
        ingest_node(&mut world, model_root, &node, &buffers);
    }

    tracing::info!(nodes = world.len(), "loaded glTF scene");
    Ok(world)
}

fn ingest_node(
    world: &mut World,
    parent: NodeId,
    node: &gltf::Node<'_>,
    buffers: &[gltf::buffer::Data],
) {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let mut primitives = Vec::new();
    let kind = if node.camera().is_some() {
        NodeKind::Camera
    } else if let Some(light) = node.light() {
        NodeKind::Light(map_light(&light))
    } else if let Some(mesh) = node.mesh() {
        primitives = mesh
            .primitives()
            .filter_map(|p| read_primitive(&p, buffers))
            .collect();
        if primitives.len() == 1 {
            NodeKind::Mesh(primitives.remove(0))
        } else {
            NodeKind::Group
        }
    } else {
        NodeKind::Group
    };

    let id = world.spawn(parent, name.clone(), kind);
    let matrix = Mat4::from_cols_f32(node.transform().matrix());
    world.set_transform(id, Transform::from_matrix(matrix));

    // Multi-primitive meshes become a group with one child per primitive.
    for (i, geometry) in primitives.into_iter().enumerate() {
        world.spawn(id, format!("{name}_primitive_{i}"), NodeKind::Mesh(geometry));
    }

    for child in node.children() {
        ingest_node(world, id, &child, buffers);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshGeometry> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::debug!(mode = ?primitive.mode(), "skipping non-triangle primitive");
        return None;
    }

    let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| &data[..]));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|it| it.collect())
        .unwrap_or_default();
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|it| it.into_u32().collect())
        .unwrap_or_default();

    Some(MeshGeometry::new(positions, normals, indices))
}

fn map_light(light: &gltf::khr_lights_punctual::Light<'_>) -> Light {
    let color = light.color();
    let intensity = light.intensity();
    match light.kind() {
        LightKind::Directional => Light::Directional { color, intensity },
        LightKind::Point => Light::Point {
            color,
            intensity,
            range: light.range(),
        },
        LightKind::Spot { .. } => Light::Spot {
            color,
            intensity,
            range: light.range(),
        },
    }
}

//! Reports behind the `house` inspection CLI.

use anyhow::{Context, bail};
use formats::ViewerConfig;
use foundation::math::Vec3;
use scene::{Room, World, extract_rooms};
use serde::Serialize;
use view::{CameraKind, HeadlessSurface, ViewMode, Viewer, ViewportSize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomReport {
    pub id: String,
    pub name: String,
    pub mesh_count: usize,
    pub center: [f64; 3],
    pub size: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraReport {
    pub kind: &'static str,
    pub position: [f64; 3],
    pub up: [f64; 3],
    pub forward: [f64; 3],
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub view: String,
    pub room: Option<String>,
    pub camera: CameraReport,
    pub target: [f64; 3],
    pub framing_center: Option<[f64; 3]>,
    pub framing_size: Option<[f64; 3]>,
}

pub fn room_reports(world: &World) -> Vec<RoomReport> {
    let Some(model) = world.model_root() else {
        return Vec::new();
    };
    extract_rooms(world, model)
        .into_iter()
        .map(|room| {
            let bounds = world.union_bounds(&room.meshes);
            RoomReport {
                id: room.id.to_string(),
                name: room.name,
                mesh_count: room.meshes.len(),
                center: bounds.center().to_array(),
                size: bounds.size().to_array(),
            }
        })
        .collect()
}

/// Places the camera the way the viewer would for `view`, optionally entering `room`
/// (matched by display name, case-insensitively, or by id).
pub fn frame_report(
    world: World,
    config: ViewerConfig,
    view: ViewMode,
    room: Option<&str>,
    size: ViewportSize,
) -> anyhow::Result<FrameReport> {
    let mut viewer = Viewer::new(config, Box::new(HeadlessSurface::new(size)));
    viewer.install_model(world);
    if viewer.store().view() != view {
        viewer.set_view(view);
    }

    let mut entered = None;
    if let Some(query) = room {
        let found = find_room(viewer.store().rooms(), query)
            .with_context(|| format!("no room matches {query:?}"))?;
        let (id, name) = (found.id, found.name.clone());
        if !viewer.enter_room(id) {
            bail!("room {name:?} could not be entered");
        }
        entered = Some(name);
    }

    let camera = viewer.rig().active();
    let target = viewer
        .controls()
        .map(|c| c.target)
        .unwrap_or(Vec3::ZERO);
    let framing = viewer.framing();

    Ok(FrameReport {
        view: view.to_string(),
        room: entered,
        camera: CameraReport {
            kind: match camera.kind() {
                CameraKind::Perspective => "perspective",
                CameraKind::Orthographic => "orthographic",
            },
            position: camera.position.to_array(),
            up: camera.up.to_array(),
            forward: camera.forward().to_array(),
            zoom: camera.zoom(),
        },
        target: target.to_array(),
        framing_center: framing.map(|f| f.center.to_array()),
        framing_size: framing.map(|f| f.size.to_array()),
    })
}

fn find_room<'a>(rooms: &'a [Room], query: &str) -> Option<&'a Room> {
    rooms
        .iter()
        .find(|room| room.name.eq_ignore_ascii_case(query) || room.id.to_string() == query)
}

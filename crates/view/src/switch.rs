use scene::World;

use crate::camera::{CameraKind, CameraRig};
use crate::controls::{InputSurface, OrbitControls};
use crate::fit::{Framing, fit_camera_to_object};
use crate::store::ViewMode;

/// Activates the camera for `view` and hands it a fresh controller.
///
/// The previous controller's listeners are released before the new one binds.
/// The new camera is fitted to the model root when there is one; the returned
/// framing is `None` for a world with nothing loaded.
pub fn switch_camera(
    view: ViewMode,
    rig: &mut CameraRig,
    old_controls: Option<OrbitControls>,
    surface: &dyn InputSurface,
    world: &World,
) -> (OrbitControls, Option<Framing>) {
    if let Some(old) = old_controls {
        old.dispose();
    }

    let kind = CameraKind::for_view(view);
    rig.set_active(kind);
    let mut controls = OrbitControls::new(surface);

    let framing = world
        .model_root()
        .map(|model| fit_camera_to_object(rig.active_mut(), &mut controls, world, model));
    tracing::debug!(%view, fitted = framing.is_some(), "switched camera");

    (controls, framing)
}

#[cfg(test)]
mod tests {
    use super::switch_camera;
    use crate::camera::{CameraKind, ViewportSize, create_cameras};
    use crate::controls::{HeadlessSurface, OrbitControls};
    use crate::store::ViewMode;
    use formats::ViewerConfig;
    use foundation::math::Vec3;
    use scene::World;
    use scene::components::{MeshGeometry, NodeKind};

    fn world_with_model() -> World {
        let mut world = World::new();
        let root = world.root();
        let model = world.spawn_group(root, "modelRoot");
        world.spawn(model, "slab", NodeKind::Mesh(MeshGeometry::cuboid(Vec3::new(10.0, 1.0, 8.0))));
        world
    }

    #[test]
    fn round_trip_restores_perspective_with_fresh_controls() {
        let size = ViewportSize::new(800.0, 600.0);
        let surface = HeadlessSurface::new(size);
        let world = world_with_model();
        let config = ViewerConfig::default();
        let mut rig = create_cameras(size, ViewMode::ThreeD, &config);

        let initial = OrbitControls::new(&surface);
        let (controls, framing) =
            switch_camera(ViewMode::Floorplan, &mut rig, Some(initial), &surface, &world);
        assert_eq!(rig.active_kind(), CameraKind::Orthographic);
        assert!(framing.is_some());
        assert_eq!(surface.release_count(), 1);

        let (controls, _) = switch_camera(ViewMode::ThreeD, &mut rig, Some(controls), &surface, &world);
        assert_eq!(rig.active_kind(), CameraKind::Perspective);
        assert!(!controls.is_disposed());
        assert_eq!(surface.bind_count(), 3);
        assert_eq!(surface.release_count(), 2);

        drop(controls);
        assert_eq!(surface.release_count(), 3);
    }

    #[test]
    fn switching_refits_to_model_root() {
        let size = ViewportSize::new(800.0, 600.0);
        let surface = HeadlessSurface::new(size);
        let world = world_with_model();
        let mut rig = create_cameras(size, ViewMode::ThreeD, &ViewerConfig::default());

        let (controls, framing) = switch_camera(ViewMode::Floorplan, &mut rig, None, &surface, &world);
        let framing = framing.unwrap();
        assert_eq!(framing.size, Vec3::new(10.0, 1.0, 8.0));
        assert_eq!(controls.target, framing.center);
        assert!((rig.orthographic.position.y - 12.0).abs() < 1e-9);
    }

    #[test]
    fn empty_world_switches_without_fitting() {
        let size = ViewportSize::new(800.0, 600.0);
        let surface = HeadlessSurface::new(size);
        let mut rig = create_cameras(size, ViewMode::ThreeD, &ViewerConfig::default());
        let before = rig.orthographic.clone();

        let (_controls, framing) =
            switch_camera(ViewMode::Floorplan, &mut rig, None, &surface, &World::new());
        assert!(framing.is_none());
        assert_eq!(rig.orthographic, before);
    }
}

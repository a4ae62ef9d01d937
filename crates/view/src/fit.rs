use foundation::math::Vec3;
use scene::{NodeId, Room, World};

use crate::camera::{Camera, CameraKind};
use crate::controls::{MouseAction, OrbitControls, TouchAction, TouchBindings};

/// Sideways and upward offset of the overview camera, as a fraction of the largest extent.
pub const OVERVIEW_OFFSET_FACTOR: f64 = 0.3;
pub const FLOORPLAN_ZOOM: f64 = 0.95;
/// Height of the floorplan camera above the model center, as a multiple of the largest extent.
pub const FLOORPLAN_HEIGHT_FACTOR: f64 = 1.2;
/// Clearance above a room's bounding box for the top-down room view.
pub const ROOM_CLEARANCE: f64 = 5.0;
pub const DEFAULT_STANDING_HEIGHT: f64 = 2.0;

/// Center and size of the world-space box a camera was fitted to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Framing {
    pub center: Vec3,
    pub size: Vec3,
}

/// Frames `object` for an overview of the whole thing.
///
/// Perspective cameras are backed off far enough for the largest extent to fill
/// the vertical field of view; orthographic cameras look straight down from above.
pub fn fit_camera_to_object(
    camera: &mut Camera,
    controls: &mut OrbitControls,
    world: &World,
    object: NodeId,
) -> Framing {
    let bounds = world.world_bounds(object);
    let center = bounds.center();
    let size = bounds.size();
    let max_dim = size.max_element();
    if bounds.is_empty() {
        tracing::debug!("fitting camera to {object} without geometry");
    }

    match camera.kind() {
        CameraKind::Perspective => {
            let fov = camera.fov_y_deg().unwrap_or(75.0).to_radians();
            let distance = max_dim / (2.0 * (fov / 2.0).tan());
            camera.position = Vec3::new(
                center.x + max_dim * OVERVIEW_OFFSET_FACTOR,
                center.y + max_dim * OVERVIEW_OFFSET_FACTOR,
                center.z + distance,
            );
            camera.look_at(center);
            controls.mouse_buttons.left = MouseAction::Rotate;
            controls.touches = TouchBindings {
                one: TouchAction::Rotate,
                two: TouchAction::DollyPan,
            };
        }
        CameraKind::Orthographic => {
            camera.set_zoom(FLOORPLAN_ZOOM);
            camera.position = Vec3::new(center.x, center.y + max_dim * FLOORPLAN_HEIGHT_FACTOR, center.z);
            camera.up = Vec3::new(0.0, 0.0, -1.0);
            camera.look_at(center);
            camera.update_projection_matrix();
            controls.mouse_buttons.left = MouseAction::Pan;
            controls.touches = TouchBindings {
                one: TouchAction::Pan,
                two: TouchAction::DollyPan,
            };
        }
    }

    controls.enable_pan = true;
    controls.enable_rotate = true;
    controls.enable_zoom = true;
    controls.target = center;
    controls.update(camera);

    Framing { center, size }
}

/// Moves the camera into `room`: eye level looking along +Z for `Perspective`,
/// straight down from above the room for `Orthographic`.
///
/// Returns `None` and leaves camera and controls untouched for a room without meshes.
pub fn move_camera_to_room(
    camera: &mut Camera,
    controls: &mut OrbitControls,
    world: &World,
    room: &Room,
    mode: CameraKind,
    standing_height: f64,
) -> Option<Framing> {
    if room.is_degenerate() {
        tracing::debug!("room {:?} has no meshes, camera left in place", room.name);
        return None;
    }

    let bounds = world.union_bounds(&room.meshes);
    let center = bounds.center();
    let size = bounds.size();

    match mode {
        CameraKind::Perspective => {
            let eye = Vec3::new(center.x, center.y + standing_height, center.z);
            let look = Vec3::new(eye.x, eye.y, eye.z + 1.0);
            camera.position = eye;
            camera.look_at(look);
            controls.target = look;
            controls.enable_pan = false;
            controls.enable_zoom = false;
            controls.enable_rotate = true;
            controls.touches = TouchBindings {
                one: TouchAction::Rotate,
                two: TouchAction::None,
            };
            controls.mouse_buttons.left = MouseAction::Rotate;
            controls.update(camera);
        }
        CameraKind::Orthographic => {
            camera.position = Vec3::new(center.x, center.y + ROOM_CLEARANCE + size.y, center.z);
            camera.up = Vec3::new(0.0, 0.0, -1.0);
            camera.look_at(center);
            camera.update_projection_matrix();
            controls.target = center;
        }
    }

    Some(Framing { center, size })
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_STANDING_HEIGHT, FLOORPLAN_ZOOM, fit_camera_to_object, move_camera_to_room};
    use crate::camera::{Camera, CameraKind, ViewportSize};
    use crate::controls::{HeadlessSurface, MouseAction, OrbitControls, TouchAction};
    use foundation::math::Vec3;
    use scene::components::{MeshGeometry, NodeKind, Transform};
    use scene::{World, extract_rooms};

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    fn controls() -> OrbitControls {
        OrbitControls::new(&HeadlessSurface::new(ViewportSize::new(800.0, 600.0)))
    }

    fn unit_cube_world() -> (World, scene::NodeId) {
        let mut world = World::new();
        let root = world.root();
        let model = world.spawn_group(root, "modelRoot");
        world.spawn(model, "cube", NodeKind::Mesh(MeshGeometry::cuboid(Vec3::splat(1.0))));
        (world, model)
    }

    fn house() -> World {
        let mut world = World::new();
        let root = world.root();
        let model = world.spawn_group(root, "modelRoot");
        let kitchen = world.spawn_group(model, "r_kitchen");
        world.set_transform(kitchen, Transform::translate(Vec3::new(4.0, 0.0, -2.0)));
        let counter = world.spawn(
            kitchen,
            "counter",
            NodeKind::Mesh(MeshGeometry::cuboid(Vec3::new(2.0, 3.0, 2.0))),
        );
        world.set_transform(counter, Transform::translate(Vec3::new(0.0, 1.5, 0.0)));
        world.spawn_group(model, "r_empty");
        world
    }

    #[test]
    fn perspective_overview_of_unit_cube() {
        let (world, model) = unit_cube_world();
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        let mut controls = controls();

        let framing = fit_camera_to_object(&mut camera, &mut controls, &world, model);

        let d = 1.0 / (2.0 * 37.5f64.to_radians().tan());
        assert!(approx(framing.center, Vec3::ZERO));
        assert!(approx(framing.size, Vec3::splat(1.0)));
        assert!(approx(camera.position, Vec3::new(0.3, 0.3, d)), "{:?}", camera.position);
        assert!(approx(controls.target, Vec3::ZERO));
        assert!(approx(camera.forward(), (Vec3::ZERO - camera.position).normalize_or_zero()));
        assert!(controls.enable_pan && controls.enable_rotate && controls.enable_zoom);
        assert_eq!(controls.mouse_buttons.left, MouseAction::Rotate);
        assert_eq!(controls.touches.one, TouchAction::Rotate);
        assert_eq!(controls.touches.two, TouchAction::DollyPan);
    }

    #[test]
    fn orthographic_overview_looks_down() {
        let (world, model) = unit_cube_world();
        let mut camera = Camera::orthographic(-10.0, 10.0, 10.0, -10.0, 0.1, 1000.0);
        let mut controls = controls();

        fit_camera_to_object(&mut camera, &mut controls, &world, model);

        assert_eq!(camera.zoom(), FLOORPLAN_ZOOM);
        assert!(approx(camera.position, Vec3::new(0.0, 1.2, 0.0)), "{:?}", camera.position);
        assert_eq!(camera.up, Vec3::new(0.0, 0.0, -1.0));
        assert!(approx(camera.forward(), Vec3::new(0.0, -1.0, 0.0)));
        assert_eq!(controls.mouse_buttons.left, MouseAction::Pan);
        assert_eq!(controls.touches.one, TouchAction::Pan);
        assert_eq!(controls.touches.two, TouchAction::DollyPan);
    }

    #[test]
    fn empty_object_frames_origin() {
        let mut world = World::new();
        let root = world.root();
        let empty = world.spawn_group(root, "modelRoot");
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        let mut controls = controls();

        let framing = fit_camera_to_object(&mut camera, &mut controls, &world, empty);
        assert_eq!(framing.center, Vec3::ZERO);
        assert_eq!(framing.size, Vec3::ZERO);
        assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
    }

    #[test]
    fn walk_in_places_camera_at_standing_height() {
        let world = house();
        let rooms = extract_rooms(&world, world.model_root().unwrap());
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        let mut controls = controls();

        let framing = move_camera_to_room(
            &mut camera,
            &mut controls,
            &world,
            &rooms[0],
            CameraKind::Perspective,
            DEFAULT_STANDING_HEIGHT,
        )
        .unwrap();

        assert!(approx(framing.center, Vec3::new(4.0, 1.5, -2.0)));
        assert!(approx(camera.position, Vec3::new(4.0, 3.5, -2.0)), "{:?}", camera.position);
        assert!(approx(controls.target, Vec3::new(4.0, 3.5, -1.0)));
        assert!(approx(camera.forward(), Vec3::Z));
        assert!(!controls.enable_pan && !controls.enable_zoom && controls.enable_rotate);
        assert_eq!(controls.touches.two, TouchAction::None);
    }

    #[test]
    fn top_down_room_view_clears_the_room() {
        let world = house();
        let rooms = extract_rooms(&world, world.model_root().unwrap());
        let mut camera = Camera::orthographic(-10.0, 10.0, 10.0, -10.0, 0.1, 1000.0);
        let mut controls = controls();
        let touches = controls.touches;

        move_camera_to_room(
            &mut camera,
            &mut controls,
            &world,
            &rooms[0],
            CameraKind::Orthographic,
            DEFAULT_STANDING_HEIGHT,
        );

        assert!(approx(camera.position, Vec3::new(4.0, 1.5 + 5.0 + 3.0, -2.0)));
        assert_eq!(camera.up, Vec3::new(0.0, 0.0, -1.0));
        assert!(approx(controls.target, Vec3::new(4.0, 1.5, -2.0)));
        assert_eq!(controls.touches, touches);
    }

    #[test]
    fn empty_room_leaves_camera_and_controls_alone() {
        let world = house();
        let rooms = extract_rooms(&world, world.model_root().unwrap());
        let empty = rooms.iter().find(|r| r.meshes.is_empty()).unwrap();

        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        camera.position = Vec3::new(1.0, 2.0, 3.0);
        let before = camera.clone();
        let mut controls = controls();
        controls.target = Vec3::new(9.0, 9.0, 9.0);

        for mode in [CameraKind::Perspective, CameraKind::Orthographic] {
            let framing =
                move_camera_to_room(&mut camera, &mut controls, &world, empty, mode, 2.0);
            assert!(framing.is_none());
            assert_eq!(camera, before);
            assert_eq!(controls.target, Vec3::new(9.0, 9.0, 9.0));
            assert!(controls.enable_pan);
        }
    }
}

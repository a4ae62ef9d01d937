//! Orbit-style camera controller.
//!
//! Input is queued through [`OrbitControls::handle_input`] and applied to the
//! camera by [`OrbitControls::update`], once per frame.

use std::f64::consts::PI;

use foundation::math::{Mat4, Vec3};

use crate::camera::{Camera, CameraKind, Projection, ViewportSize};

/// Smallest polar angle kept between the camera and the orbit poles.
const POLE_EPSILON: f64 = 1e-6;

/// Dolly factor applied per wheel step.
pub const ZOOM_SCALE: f64 = 0.95;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseAction {
    Rotate,
    Dolly,
    Pan,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseBindings {
    pub left: MouseAction,
    pub middle: MouseAction,
    pub right: MouseAction,
}

impl Default for MouseBindings {
    fn default() -> Self {
        Self {
            left: MouseAction::Rotate,
            middle: MouseAction::Dolly,
            right: MouseAction::Pan,
        }
    }
}

impl MouseBindings {
    pub fn action(&self, button: MouseButton) -> MouseAction {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchAction {
    Rotate,
    Pan,
    DollyPan,
    DollyRotate,
    None,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TouchBindings {
    pub one: TouchAction,
    pub two: TouchAction,
}

impl Default for TouchBindings {
    fn default() -> Self {
        Self {
            one: TouchAction::Rotate,
            two: TouchAction::DollyPan,
        }
    }
}

/// Pointer, wheel and touch input in viewport pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlInput {
    PointerDown { button: MouseButton, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    Wheel { delta_y: f64 },
    TouchStart { points: Vec<[f64; 2]> },
    TouchMove { points: Vec<[f64; 2]> },
    TouchEnd,
}

/// Owns the event-listener registrations of one controller.
///
/// The release callback runs exactly once, on [`ListenerBinding::release`] or on drop.
pub struct ListenerBinding {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerBinding {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ListenerBinding {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ListenerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerBinding")
            .field("released", &self.is_released())
            .finish()
    }
}

/// The element controllers listen on.
pub trait InputSurface {
    /// Registers pointer, wheel and touch listeners for a new controller.
    fn bind_listeners(&self) -> ListenerBinding;

    fn viewport(&self) -> ViewportSize;
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum DragState {
    Idle,
    Rotate { last: [f64; 2] },
    Dolly { last: [f64; 2] },
    Pan { last: [f64; 2] },
    Touch {
        action: TouchAction,
        center: [f64; 2],
        spread: f64,
    },
}

#[derive(Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub rotate_speed: f64,
    pub pan_speed: f64,
    pub zoom_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub mouse_buttons: MouseBindings,
    pub touches: TouchBindings,

    theta_delta: f64,
    phi_delta: f64,
    pan_offset: Vec3,
    scale: f64,
    drag: DragState,
    binding: ListenerBinding,
}

impl OrbitControls {
    /// Creates a controller listening on `surface`.
    pub fn new(surface: &dyn InputSurface) -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
            mouse_buttons: MouseBindings::default(),
            touches: TouchBindings::default(),
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            drag: DragState::Idle,
            binding: surface.bind_listeners(),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.binding.is_released()
    }

    /// Removes this controller's listeners.
    pub fn dispose(mut self) {
        self.binding.release();
    }

    pub fn handle_input(&mut self, input: &ControlInput, camera: &Camera, viewport: ViewportSize) {
        if !self.enabled {
            return;
        }

        match input {
            ControlInput::PointerDown { button, x, y } => {
                let last = [*x, *y];
                self.drag = match self.mouse_buttons.action(*button) {
                    MouseAction::Rotate if self.enable_rotate => DragState::Rotate { last },
                    MouseAction::Dolly if self.enable_zoom => DragState::Dolly { last },
                    MouseAction::Pan if self.enable_pan => DragState::Pan { last },
                    _ => DragState::Idle,
                };
            }
            ControlInput::PointerMove { x, y } => {
                let pos = [*x, *y];
                match &mut self.drag {
                    DragState::Rotate { last } => {
                        let delta = [pos[0] - last[0], pos[1] - last[1]];
                        *last = pos;
                        self.rotate_by_pixels(delta, viewport);
                    }
                    DragState::Dolly { last } => {
                        let dy = pos[1] - last[1];
                        *last = pos;
                        if dy > 0.0 {
                            self.dolly_out(self.zoom_scale());
                        } else if dy < 0.0 {
                            self.dolly_in(self.zoom_scale());
                        }
                    }
                    DragState::Pan { last } => {
                        let delta = [pos[0] - last[0], pos[1] - last[1]];
                        *last = pos;
                        self.pan_by_pixels(delta, camera, viewport);
                    }
                    DragState::Idle | DragState::Touch { .. } => {}
                }
            }
            ControlInput::PointerUp | ControlInput::TouchEnd => {
                self.drag = DragState::Idle;
            }
            ControlInput::Wheel { delta_y } => {
                if !self.enable_zoom || self.drag != DragState::Idle {
                    return;
                }
                if *delta_y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if *delta_y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
            }
            ControlInput::TouchStart { points } => {
                let action = match points.len() {
                    1 => self.touches.one,
                    2 => self.touches.two,
                    _ => TouchAction::None,
                };
                let (center, spread) = touch_center_and_spread(points);
                self.drag = if self.touch_allowed(action) {
                    DragState::Touch {
                        action,
                        center,
                        spread,
                    }
                } else {
                    DragState::Idle
                };
            }
            ControlInput::TouchMove { points } => {
                let DragState::Touch {
                    action,
                    center,
                    spread,
                } = self.drag
                else {
                    return;
                };
                let (new_center, new_spread) = touch_center_and_spread(points);
                let delta = [new_center[0] - center[0], new_center[1] - center[1]];
                self.drag = DragState::Touch {
                    action,
                    center: new_center,
                    spread: new_spread,
                };

                match action {
                    TouchAction::Rotate => self.rotate_by_pixels(delta, viewport),
                    TouchAction::Pan => self.pan_by_pixels(delta, camera, viewport),
                    TouchAction::DollyPan | TouchAction::DollyRotate => {
                        if self.enable_zoom && spread > 0.0 && new_spread > 0.0 {
                            self.dolly_out((new_spread / spread).powf(self.zoom_speed));
                        }
                        if action == TouchAction::DollyPan && self.enable_pan {
                            self.pan_by_pixels(delta, camera, viewport);
                        } else if action == TouchAction::DollyRotate && self.enable_rotate {
                            self.rotate_by_pixels(delta, viewport);
                        }
                    }
                    TouchAction::None => {}
                }
            }
        }
    }

    /// Applies queued rotation, pan and dolly to `camera` and points it at `target`.
    pub fn update(&mut self, camera: &mut Camera) {
        // Orbit in a frame where the camera's up axis is +Y.
        let to_y_up = Mat4::from_rotation_arc(camera.up.normalize_or_zero(), Vec3::Y);
        let from_y_up = Mat4::from_rotation_arc(Vec3::Y, camera.up.normalize_or_zero());

        let offset = to_y_up.transform_vector(camera.position - self.target);
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, 0.0)
        };

        theta += self.theta_delta;
        phi = (phi + self.phi_delta).clamp(POLE_EPSILON, PI - POLE_EPSILON);

        match camera.kind() {
            CameraKind::Perspective => {
                radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
            }
            CameraKind::Orthographic => {
                if self.scale != 1.0 {
                    let zoom = (camera.zoom() / self.scale).clamp(self.min_zoom, self.max_zoom);
                    camera.set_zoom(zoom);
                    camera.update_projection_matrix();
                }
            }
        }

        self.target += self.pan_offset;

        let sin_phi_radius = phi.sin() * radius;
        let offset = Vec3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );
        camera.position = self.target + from_y_up.transform_vector(offset);
        camera.look_at(self.target);

        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    fn zoom_scale(&self) -> f64 {
        ZOOM_SCALE.powf(self.zoom_speed)
    }

    fn touch_allowed(&self, action: TouchAction) -> bool {
        match action {
            TouchAction::Rotate => self.enable_rotate,
            TouchAction::Pan => self.enable_pan,
            TouchAction::DollyPan => self.enable_zoom || self.enable_pan,
            TouchAction::DollyRotate => self.enable_zoom || self.enable_rotate,
            TouchAction::None => false,
        }
    }

    fn rotate_by_pixels(&mut self, delta: [f64; 2], viewport: ViewportSize) {
        if !self.enable_rotate || viewport.height <= 0.0 {
            return;
        }
        let per_pixel = 2.0 * PI * self.rotate_speed / viewport.height;
        self.theta_delta -= delta[0] * per_pixel;
        self.phi_delta -= delta[1] * per_pixel;
    }

    fn pan_by_pixels(&mut self, delta: [f64; 2], camera: &Camera, viewport: ViewportSize) {
        if !self.enable_pan || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return;
        }
        let (right, up) = camera.right_and_up();
        let (dx, dy) = match camera.projection {
            Projection::Perspective { fov_y_deg, .. } => {
                let distance = (camera.position - self.target).length()
                    * (fov_y_deg.to_radians() / 2.0).tan();
                (
                    2.0 * delta[0] * distance / viewport.height,
                    2.0 * delta[1] * distance / viewport.height,
                )
            }
            Projection::Orthographic {
                left,
                right: r,
                top,
                bottom,
                zoom,
                ..
            } => (
                delta[0] * (r - left) / zoom / viewport.width,
                delta[1] * (top - bottom) / zoom / viewport.height,
            ),
        };
        self.pan_offset += right * (-dx * self.pan_speed) + up * (dy * self.pan_speed);
    }

    fn dolly_in(&mut self, factor: f64) {
        self.scale *= factor;
    }

    fn dolly_out(&mut self, factor: f64) {
        self.scale /= factor;
    }
}

fn touch_center_and_spread(points: &[[f64; 2]]) -> ([f64; 2], f64) {
    match points {
        [] => ([0.0, 0.0], 0.0),
        [p] => (*p, 0.0),
        [a, b, ..] => {
            let center = [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
            let spread = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
            (center, spread)
        }
    }
}

/// Surface without real listeners. Counts binds and releases.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub size: ViewportSize,
    bound: std::rc::Rc<std::cell::Cell<usize>>,
    released: std::rc::Rc<std::cell::Cell<usize>>,
}

impl HeadlessSurface {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            bound: Default::default(),
            released: Default::default(),
        }
    }

    pub fn bind_count(&self) -> usize {
        self.bound.get()
    }

    pub fn release_count(&self) -> usize {
        self.released.get()
    }
}

impl InputSurface for HeadlessSurface {
    fn bind_listeners(&self) -> ListenerBinding {
        self.bound.set(self.bound.get() + 1);
        let released = self.released.clone();
        ListenerBinding::new(move || released.set(released.get() + 1))
    }

    fn viewport(&self) -> ViewportSize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ControlInput, HeadlessSurface, ListenerBinding, MouseAction, MouseButton, OrbitControls,
        TouchAction,
    };
    use crate::camera::{Camera, ViewportSize};
    use foundation::math::Vec3;
    use std::cell::Cell;
    use std::rc::Rc;

    fn viewport() -> ViewportSize {
        ViewportSize::new(800.0, 600.0)
    }

    fn perspective_at(position: Vec3) -> Camera {
        let mut camera = Camera::perspective(75.0, 800.0 / 600.0, 0.1, 1000.0);
        camera.position = position;
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn binding_releases_exactly_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let mut binding = ListenerBinding::new(move || c.set(c.get() + 1));
        binding.release();
        binding.release();
        drop(binding);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dispose_and_drop_release_listeners_once() {
        let surface = HeadlessSurface::new(viewport());
        let controls = OrbitControls::new(&surface);
        assert_eq!(surface.bind_count(), 1);
        controls.dispose();
        assert_eq!(surface.release_count(), 1);

        let dropped = OrbitControls::new(&surface);
        drop(dropped);
        assert_eq!(surface.bind_count(), 2);
        assert_eq!(surface.release_count(), 2);
    }

    #[test]
    fn update_without_input_keeps_pose() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        let mut camera = perspective_at(Vec3::new(3.0, 4.0, 5.0));
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(3.0, 4.0, 5.0)).length() < 1e-9);
    }

    #[test]
    fn wheel_dollies_perspective_distance() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        let mut camera = perspective_at(Vec3::new(0.0, 0.0, 10.0));

        controls.handle_input(&ControlInput::Wheel { delta_y: -100.0 }, &camera, viewport());
        controls.update(&mut camera);
        assert!((camera.position.length() - 9.5).abs() < 1e-9);

        controls.enable_zoom = false;
        controls.handle_input(&ControlInput::Wheel { delta_y: 100.0 }, &camera, viewport());
        controls.update(&mut camera);
        assert!((camera.position.length() - 9.5).abs() < 1e-9);
    }

    #[test]
    fn wheel_zooms_orthographic_camera() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        let mut camera = Camera::orthographic(-10.0, 10.0, 10.0, -10.0, 0.1, 1000.0);
        camera.position = Vec3::new(0.0, 10.0, 0.0);
        camera.up = Vec3::new(0.0, 0.0, -1.0);
        camera.look_at(Vec3::ZERO);

        controls.handle_input(&ControlInput::Wheel { delta_y: -1.0 }, &camera, viewport());
        controls.update(&mut camera);
        assert!((camera.zoom() - 1.0 / 0.95).abs() < 1e-12);
        assert!((camera.position - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn left_drag_rotates_around_target() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        let mut camera = perspective_at(Vec3::new(0.0, 0.0, 10.0));

        controls.handle_input(
            &ControlInput::PointerDown { button: MouseButton::Left, x: 100.0, y: 100.0 },
            &camera,
            viewport(),
        );
        controls.handle_input(&ControlInput::PointerMove { x: 250.0, y: 100.0 }, &camera, viewport());
        controls.handle_input(&ControlInput::PointerUp, &camera, viewport());
        controls.update(&mut camera);

        assert!((camera.position.length() - 10.0).abs() < 1e-9);
        assert!(camera.position.x.abs() > 1.0, "camera should have orbited: {:?}", camera.position);
        assert!(camera.position.y.abs() < 1e-9);
    }

    #[test]
    fn rotation_is_ignored_when_disabled() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        controls.enable_rotate = false;
        let mut camera = perspective_at(Vec3::new(0.0, 0.0, 10.0));

        controls.handle_input(
            &ControlInput::PointerDown { button: MouseButton::Left, x: 0.0, y: 0.0 },
            &camera,
            viewport(),
        );
        controls.handle_input(&ControlInput::PointerMove { x: 300.0, y: 0.0 }, &camera, viewport());
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-9);
    }

    #[test]
    fn left_pan_binding_moves_target() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        controls.mouse_buttons.left = MouseAction::Pan;
        let mut camera = perspective_at(Vec3::new(0.0, 0.0, 10.0));

        controls.handle_input(
            &ControlInput::PointerDown { button: MouseButton::Left, x: 400.0, y: 300.0 },
            &camera,
            viewport(),
        );
        controls.handle_input(&ControlInput::PointerMove { x: 300.0, y: 300.0 }, &camera, viewport());
        controls.update(&mut camera);

        // Dragging left moves the view content left, so the target moves right.
        assert!(controls.target.x > 0.0);
        assert!((camera.position.z - 10.0).abs() < 1e-9);
    }

    #[test]
    fn second_finger_none_ignores_pinch() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        controls.touches.two = TouchAction::None;
        let mut camera = perspective_at(Vec3::new(0.0, 0.0, 10.0));

        controls.handle_input(
            &ControlInput::TouchStart { points: vec![[100.0, 100.0], [200.0, 100.0]] },
            &camera,
            viewport(),
        );
        controls.handle_input(
            &ControlInput::TouchMove { points: vec![[50.0, 100.0], [250.0, 100.0]] },
            &camera,
            viewport(),
        );
        controls.update(&mut camera);
        assert!((camera.position.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn pinch_out_moves_closer() {
        let surface = HeadlessSurface::new(viewport());
        let mut controls = OrbitControls::new(&surface);
        let mut camera = perspective_at(Vec3::new(0.0, 0.0, 10.0));

        controls.handle_input(
            &ControlInput::TouchStart { points: vec![[100.0, 100.0], [200.0, 100.0]] },
            &camera,
            viewport(),
        );
        controls.handle_input(
            &ControlInput::TouchMove { points: vec![[50.0, 100.0], [250.0, 100.0]] },
            &camera,
            viewport(),
        );
        controls.update(&mut camera);
        assert!((camera.position.length() - 5.0).abs() < 1e-9);
    }
}

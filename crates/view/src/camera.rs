use foundation::math::{Mat4, Vec3};
use formats::ViewerConfig;

use crate::store::ViewMode;

/// Measured size of the drawing area in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when either side is not positive.
    pub fn aspect(&self) -> Option<f64> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.width / self.height)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraKind {
    Perspective,
    Orthographic,
}

impl CameraKind {
    pub fn for_view(view: ViewMode) -> Self {
        match view {
            ViewMode::ThreeD => CameraKind::Perspective,
            ViewMode::Floorplan => CameraKind::Orthographic,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y_deg: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
        zoom: f64,
    },
}

/// A posed camera. The projection matrix is cached and only recomputed by
/// [`Camera::update_projection_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    forward: Vec3,
    pub projection: Projection,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn perspective(fov_y_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::with_projection(Projection::Perspective {
            fov_y_deg,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self::with_projection(Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
            zoom: 1.0,
        })
    }

    fn with_projection(projection: Projection) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            up: Vec3::Y,
            forward: Vec3::new(0.0, 0.0, -1.0),
            projection,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn kind(&self) -> CameraKind {
        match self.projection {
            Projection::Perspective { .. } => CameraKind::Perspective,
            Projection::Orthographic { .. } => CameraKind::Orthographic,
        }
    }

    pub fn fov_y_deg(&self) -> Option<f64> {
        match self.projection {
            Projection::Perspective { fov_y_deg, .. } => Some(fov_y_deg),
            Projection::Orthographic { .. } => None,
        }
    }

    /// Orthographic zoom; always 1 for perspective cameras.
    pub fn zoom(&self) -> f64 {
        match self.projection {
            Projection::Orthographic { zoom, .. } => zoom,
            Projection::Perspective { .. } => 1.0,
        }
    }

    /// Sets the orthographic zoom. Has no effect on perspective cameras.
    /// Call [`Camera::update_projection_matrix`] afterwards.
    pub fn set_zoom(&mut self, value: f64) {
        if let Projection::Orthographic { zoom, .. } = &mut self.projection {
            *zoom = value;
        }
    }

    pub fn set_aspect(&mut self, value: f64) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = value;
        }
    }

    /// Orthographic frustum spanning `frustum_size` vertically, widened by `aspect`.
    pub fn set_frustum(&mut self, frustum_size: f64, aspect: f64) {
        if let Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            ..
        } = &mut self.projection
        {
            *left = -frustum_size * aspect / 2.0;
            *right = frustum_size * aspect / 2.0;
            *top = frustum_size / 2.0;
            *bottom = -frustum_size / 2.0;
        }
    }

    /// Turns the camera towards `target`, using the current `up`.
    /// A target at the camera position keeps the previous orientation.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.forward = forward;
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Camera-space +X and +Y axes in world space.
    pub fn right_and_up(&self) -> (Vec3, Vec3) {
        let mut right = self.forward.cross(self.up).normalize_or_zero();
        if right == Vec3::ZERO {
            right = self.forward.cross(Vec3::Z).normalize_or_zero();
        }
        (right, right.cross(self.forward))
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective {
                fov_y_deg,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_z0(fov_y_deg.to_radians(), aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
                zoom,
            } => {
                let dx = (right - left) / (2.0 * zoom);
                let dy = (top - bottom) / (2.0 * zoom);
                let cx = (right + left) / 2.0;
                let cy = (top + bottom) / 2.0;
                Mat4::orthographic_rh_z0(cx - dx, cx + dx, cy - dy, cy + dy, near, far)
            }
        };
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (_, up) = self.right_and_up();
        Mat4::look_at_rh(self.position, self.position + self.forward, up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }
}

/// The perspective/orthographic camera pair and which one is active.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub perspective: Camera,
    pub orthographic: Camera,
    active: CameraKind,
}

impl CameraRig {
    pub fn active_kind(&self) -> CameraKind {
        self.active
    }

    pub fn set_active(&mut self, kind: CameraKind) {
        self.active = kind;
    }

    pub fn active(&self) -> &Camera {
        self.camera(self.active)
    }

    pub fn active_mut(&mut self) -> &mut Camera {
        self.camera_mut(self.active)
    }

    pub fn camera(&self, kind: CameraKind) -> &Camera {
        match kind {
            CameraKind::Perspective => &self.perspective,
            CameraKind::Orthographic => &self.orthographic,
        }
    }

    pub fn camera_mut(&mut self, kind: CameraKind) -> &mut Camera {
        match kind {
            CameraKind::Perspective => &mut self.perspective,
            CameraKind::Orthographic => &mut self.orthographic,
        }
    }
}

/// Builds both cameras for a `width` x `height` container and activates the one
/// matching `view`. A degenerate size falls back to a square aspect.
pub fn create_cameras(size: ViewportSize, view: ViewMode, config: &ViewerConfig) -> CameraRig {
    let aspect = size.aspect().unwrap_or(1.0);
    let frustum = config.frustum_size;

    let perspective = Camera::perspective(config.fov_deg, aspect, config.near, config.far);
    let orthographic = Camera::orthographic(
        -frustum * aspect / 2.0,
        frustum * aspect / 2.0,
        frustum / 2.0,
        -frustum / 2.0,
        config.near,
        config.far,
    );

    CameraRig {
        perspective,
        orthographic,
        active: CameraKind::for_view(view),
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, CameraKind, Projection, ViewportSize, create_cameras};
    use crate::store::ViewMode;
    use formats::ViewerConfig;
    use foundation::math::Vec3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn create_cameras_matches_container() {
        let rig = create_cameras(
            ViewportSize::new(1600.0, 800.0),
            ViewMode::Floorplan,
            &ViewerConfig::default(),
        );
        assert_eq!(rig.active_kind(), CameraKind::Orthographic);
        assert_eq!(
            rig.perspective.projection,
            Projection::Perspective {
                fov_y_deg: 75.0,
                aspect: 2.0,
                near: 0.1,
                far: 1000.0
            }
        );
        match rig.orthographic.projection {
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                zoom,
                ..
            } => {
                assert_eq!((left, right, top, bottom), (-20.0, 20.0, 10.0, -10.0));
                assert_eq!(zoom, 1.0);
            }
            other => panic!("unexpected projection {other:?}"),
        }
    }

    #[test]
    fn degenerate_container_uses_square_aspect() {
        let rig = create_cameras(ViewportSize::new(0.0, 0.0), ViewMode::ThreeD, &ViewerConfig::default());
        assert_eq!(rig.active_kind(), CameraKind::Perspective);
        assert!(rig.perspective.projection_matrix().cols.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn look_at_puts_target_in_front() {
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        camera.look_at(Vec3::ZERO);
        let p = camera.view_matrix().transform_point(Vec3::ZERO);
        assert!(approx(p, Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn top_down_orthographic_camera_has_finite_view() {
        let mut camera = Camera::orthographic(-10.0, 10.0, 10.0, -10.0, 0.1, 1000.0);
        camera.position = Vec3::new(0.0, 12.0, 0.0);
        camera.up = Vec3::new(0.0, 0.0, -1.0);
        camera.look_at(Vec3::ZERO);
        // Screen-up points along world -Z when looking straight down.
        let (_, up) = camera.right_and_up();
        assert!(approx(up, Vec3::new(0.0, 0.0, -1.0)));
        let p = camera.view_proj().transform_point(Vec3::new(0.0, 0.0, -10.0));
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_narrows_orthographic_frustum_after_update() {
        let mut camera = Camera::orthographic(-10.0, 10.0, 10.0, -10.0, 0.1, 1000.0);
        let before = camera.projection_matrix();
        camera.set_zoom(2.0);
        assert_eq!(camera.projection_matrix(), before);
        camera.update_projection_matrix();
        assert_eq!(camera.projection_matrix().cols[0][0], before.cols[0][0] * 2.0);
    }

    #[test]
    fn look_at_own_position_keeps_orientation() {
        let mut camera = Camera::perspective(75.0, 1.0, 0.1, 1000.0);
        let forward = camera.forward();
        camera.look_at(camera.position);
        assert_eq!(camera.forward(), forward);
    }
}

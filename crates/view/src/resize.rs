use crate::camera::{CameraRig, ViewportSize};

/// Anything with a drawing buffer that follows the container size.
pub trait DrawingSurface {
    fn set_size(&mut self, width: u32, height: u32);
}

/// Syncs both camera projections and the drawing buffer with the container.
///
/// Returns `false` without touching anything when the container, the cameras or
/// the renderer is missing. A zero-sized container keeps the previous projections
/// and resizes the buffer to at least 1x1.
pub fn on_resize(
    container: Option<ViewportSize>,
    rig: Option<&mut CameraRig>,
    renderer: Option<&mut dyn DrawingSurface>,
    frustum_size: f64,
) -> bool {
    let (Some(size), Some(rig), Some(renderer)) = (container, rig, renderer) else {
        return false;
    };

    match size.aspect() {
        Some(aspect) => {
            rig.perspective.set_aspect(aspect);
            rig.perspective.update_projection_matrix();
            rig.orthographic.set_frustum(frustum_size, aspect);
            rig.orthographic.update_projection_matrix();
        }
        None => tracing::debug!(?size, "container has no area, keeping projections"),
    }

    let width = size.width.max(1.0).round() as u32;
    let height = size.height.max(1.0).round() as u32;
    renderer.set_size(width, height);
    true
}

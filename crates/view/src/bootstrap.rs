use foundation::math::{Mat4, Vec3};
use formats::ViewerConfig;
use scene::components::{Light, NodeKind, Transform};
use scene::{RoomId, World, extract_rooms};

use crate::camera::{CameraRig, ViewportSize, create_cameras};
use crate::controls::{ControlInput, InputSurface, OrbitControls};
use crate::fit::{Framing, fit_camera_to_object, move_camera_to_room};
use crate::resize::{DrawingSurface, on_resize};
use crate::store::{ViewMode, ViewerStore};
use crate::switch::switch_camera;

pub const LIGHT_NODE_NAME: &str = "hemisphereLight";

/// Application root: owns the scene, cameras, controller and store.
pub struct Viewer {
    config: ViewerConfig,
    world: World,
    rig: CameraRig,
    controls: Option<OrbitControls>,
    store: ViewerStore,
    surface: Box<dyn InputSurface>,
    framing: Option<Framing>,
}

impl Viewer {
    pub fn new(config: ViewerConfig, surface: Box<dyn InputSurface>) -> Self {
        let view = config.initial_view.parse::<ViewMode>().unwrap_or_else(|err| {
            tracing::warn!("{err}, starting in 3D");
            ViewMode::ThreeD
        });

        let rig = create_cameras(surface.viewport(), view, &config);
        let controls = OrbitControls::new(surface.as_ref());
        let mut world = World::new();
        add_lights(&mut world, &config);

        Self {
            config,
            world,
            rig,
            controls: Some(controls),
            store: ViewerStore::new(view),
            surface,
            framing: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.controls.as_ref()
    }

    pub fn store(&self) -> &ViewerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ViewerStore {
        &mut self.store
    }

    pub fn framing(&self) -> Option<Framing> {
        self.framing
    }

    /// Replaces the scene with a freshly loaded model, republishes its rooms
    /// and frames it with the active camera.
    pub fn install_model(&mut self, mut world: World) {
        add_lights(&mut world, &self.config);
        self.world = world;

        self.store.clear_rooms();
        let Some(model) = self.world.model_root() else {
            tracing::warn!("loaded scene has no model root");
            return;
        };
        let rooms = extract_rooms(&self.world, model);
        tracing::info!(rooms = rooms.len(), "model installed");
        self.store.set_rooms(rooms);

        if let Some(controls) = self.controls.as_mut() {
            self.framing = Some(fit_camera_to_object(
                self.rig.active_mut(),
                controls,
                &self.world,
                model,
            ));
        }
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.store.set_view(view);
        let (controls, framing) = switch_camera(
            view,
            &mut self.rig,
            self.controls.take(),
            self.surface.as_ref(),
            &self.world,
        );
        self.controls = Some(controls);
        if framing.is_some() {
            self.framing = framing;
        }
    }

    pub fn toggle_view(&mut self) {
        self.set_view(self.store.view().toggled());
    }

    /// Moves the camera into a room using the current view's camera and selects it.
    /// Returns `false` for an unknown room.
    pub fn enter_room(&mut self, id: RoomId) -> bool {
        let Some(room) = self.store.room(id).cloned() else {
            tracing::debug!("cannot enter unknown room {id}");
            return false;
        };

        let mode = self.rig.active_kind();
        if let Some(controls) = self.controls.as_mut() {
            let framing = move_camera_to_room(
                self.rig.active_mut(),
                controls,
                &self.world,
                &room,
                mode,
                self.config.standing_height,
            );
            if framing.is_some() {
                self.framing = framing;
            }
        }
        self.store.set_selected_room(id)
    }

    pub fn handle_input(&mut self, input: &ControlInput) {
        let viewport = self.surface.viewport();
        if let Some(controls) = self.controls.as_mut() {
            controls.handle_input(input, self.rig.active(), viewport);
        }
    }

    /// Per-frame controller step; runs before drawing.
    pub fn update_controls(&mut self) {
        if let Some(controls) = self.controls.as_mut() {
            controls.update(self.rig.active_mut());
        }
    }

    pub fn resize(&mut self, container: Option<ViewportSize>, renderer: Option<&mut dyn DrawingSurface>) -> bool {
        on_resize(container, Some(&mut self.rig), renderer, self.config.frustum_size)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.rig.active().view_proj()
    }
}

/// Adds the scene's hemisphere light above the origin.
pub fn add_lights(world: &mut World, config: &ViewerConfig) {
    let root = world.root();
    let light = world.spawn(
        root,
        LIGHT_NODE_NAME,
        NodeKind::Light(Light::hemisphere(config.sky_color, config.ground_color)),
    );
    world.set_transform(light, Transform::translate(Vec3::from_array(config.light_position)));
}

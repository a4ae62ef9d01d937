use console_error_panic_hook::set_once;
use gloo_events::EventListener;
use gloo_net::http::Request;
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use formats::{ModelLoadError, ViewerConfig};
use runtime::{EventBus, Frame, Job, Scheduler};
use scene::components::rgb_from_hex;
use scene::{RoomId, World};
use view::{StoreChange, ViewMode, Viewer, ViewerStore};

mod batch;
mod dom;
mod render_loop;
mod wgpu;

use batch::{Globals, Hemisphere, SceneBatch};
use dom::CanvasSurface;
use wgpu::{WgpuContext, init_wgpu, render_frame, upload_scene};

struct App {
    viewer: Viewer,
    surface: CanvasSurface,
    gpu: Option<WgpuContext>,
    batch: SceneBatch,
    scene_dirty: bool,
    _resize_listener: EventListener,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|app| app.borrow_mut().as_mut().map(f))
}

impl App {
    fn resize(&mut self) -> bool {
        let container = self.surface.container_size();
        let renderer = self
            .gpu
            .as_mut()
            .map(|gpu| gpu as &mut dyn view::DrawingSurface);
        self.viewer.resize(container, renderer)
    }

    fn install(&mut self, world: World) {
        self.viewer.install_model(world);
        self.scene_dirty = true;
    }

    fn sync_scene(&mut self) {
        if !self.scene_dirty {
            return;
        }
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let config = self.viewer.config();
        let edges = config.show_edges.then_some(config.edge_threshold_deg);
        self.batch = SceneBatch::build(self.viewer.world(), self.viewer.store().rooms(), edges);
        upload_scene(gpu, &self.batch);
        self.scene_dirty = false;
    }

    fn globals(&self) -> Globals {
        let config = self.viewer.config();
        let light = Hemisphere::find(self.viewer.world())
            .unwrap_or_else(|| Hemisphere::from_hex(config.sky_color, config.ground_color));
        Globals::new(
            self.viewer.view_proj().to_cols_f32(),
            light,
            config.highlight_color,
            self.batch.slot_of(self.viewer.store().highlighted_room_id()),
            config.edge_color,
        )
    }

    fn render(&mut self) -> Result<(), JsValue> {
        self.sync_scene();
        let Some(gpu) = self.gpu.as_ref() else {
            return Ok(());
        };
        render_frame(gpu, &self.globals())
    }
}

fn controls_job(_frame: Frame, _bus: &mut EventBus) {
    with_app(|app| {
        for input in app.surface.drain_inputs() {
            app.viewer.handle_input(&input);
        }
        app.viewer.update_controls();
    });
}

fn render_job(frame: Frame, bus: &mut EventBus) {
    let result = with_app(App::render).unwrap_or(Ok(()));
    if let Err(err) = result {
        bus.emit(frame, "render", js_error_message(&err));
    }
}

fn log_store_change(store: &ViewerStore, change: &StoreChange) {
    match change {
        StoreChange::View(view) => tracing::info!(%view, "view changed"),
        StoreChange::Rooms => tracing::info!(rooms = store.rooms().len(), "rooms changed"),
        StoreChange::Highlight(id) => tracing::debug!(?id, "highlight changed"),
        StoreChange::Selection(id) => tracing::debug!(?id, "selection changed"),
    }
}

fn js_error_message(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    console_log::init_with_level(log::Level::Info).ok();
    Ok(())
}

/// Mounts the viewer into its container and starts loading the configured model.
///
/// `config_json` is an optional `ViewerConfig` JSON object; missing fields take defaults.
#[wasm_bindgen]
pub fn init_viewer(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(payload) => ViewerConfig::from_json_str(payload).map_err(to_js)?,
        None => ViewerConfig::default(),
    };

    let surface = CanvasSurface::mount(&config.container_id)?;
    let model_url = config.model_url.clone();
    let background = rgb_from_hex(config.background);
    let mut viewer = Viewer::new(config, Box::new(surface.clone()));
    viewer.store_mut().subscribe(log_store_change);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resize_listener = EventListener::new(&window, "resize", |_| {
        with_app(App::resize);
    });

    let canvas = surface.canvas().clone();
    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            viewer,
            surface,
            gpu: None,
            batch: SceneBatch::default(),
            scene_dirty: true,
            _resize_listener: resize_listener,
        });
    });

    let mut scheduler = Scheduler::new();
    scheduler.add_job(Job::with_priority("controls", -1, controls_job));
    scheduler.add_job(Job::new("render", render_job));
    render_loop::start(scheduler);

    spawn_local(async move {
        match init_wgpu(canvas, background).await {
            Ok(ctx) => {
                with_app(|app| {
                    app.gpu = Some(ctx);
                    app.scene_dirty = true;
                    app.resize();
                });
            }
            Err(err) => tracing::error!("wgpu init error: {}", js_error_message(&err)),
        }
    });

    load_model(model_url);
    Ok(())
}

/// Fetches a glTF model and replaces the current one. Failures are logged and
/// leave the scene as it was.
#[wasm_bindgen]
pub fn load_model(url: String) {
    spawn_local(async move {
        match fetch_model(&url).await {
            Ok(world) => {
                with_app(|app| app.install(world));
            }
            Err(err) => tracing::error!("failed to load model: {err}"),
        }
    });
}

async fn fetch_model(url: &str) -> Result<World, ModelLoadError> {
    let fetch_error = |e: gloo_net::Error| ModelLoadError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    };
    let resp = Request::get(url).send().await.map_err(fetch_error)?;
    if !resp.ok() {
        return Err(ModelLoadError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let bytes = resp.binary().await.map_err(fetch_error)?;
    tracing::info!(url, bytes = bytes.len(), "model fetched");
    formats::load_world_from_slice(&bytes)
}

#[wasm_bindgen(js_name = view)]
pub fn current_view() -> String {
    with_app(|app| app.viewer.store().view().to_string()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn toggle_view() {
    with_app(|app| app.viewer.toggle_view());
}

/// Accepts `"3D"` or `"Floorplan"`, case-insensitively.
#[wasm_bindgen]
pub fn set_view(view: &str) -> Result<(), JsValue> {
    let view: ViewMode = view.parse().map_err(to_js)?;
    with_app(|app| app.viewer.set_view(view));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomEntry {
    id: String,
    name: String,
    mesh_count: usize,
}

/// Rooms of the current model as `[{ id, name, meshCount }]`.
#[wasm_bindgen]
pub fn rooms() -> Result<JsValue, JsValue> {
    let entries = with_app(|app| {
        app.viewer
            .store()
            .rooms()
            .iter()
            .map(|room| RoomEntry {
                id: room.id.to_string(),
                name: room.name.clone(),
                mesh_count: room.meshes.len(),
            })
            .collect::<Vec<_>>()
    })
    .unwrap_or_default();
    let json = serde_json::to_string(&entries).map_err(to_js)?;
    js_sys::JSON::parse(&json)
}

fn parse_room(id: &str) -> Result<RoomId, JsValue> {
    id.parse().map_err(to_js)
}

#[wasm_bindgen]
pub fn highlight_room(id: &str) -> Result<bool, JsValue> {
    let id = parse_room(id)?;
    Ok(with_app(|app| app.viewer.store_mut().highlight_room(id)).unwrap_or(false))
}

#[wasm_bindgen]
pub fn clear_highlight() {
    with_app(|app| app.viewer.store_mut().clear_highlight());
}

#[wasm_bindgen]
pub fn highlighted_room() -> Option<String> {
    with_app(|app| app.viewer.store().highlighted_room_id())
        .flatten()
        .map(|id| id.to_string())
}

/// Marks a room as selected without moving the camera.
#[wasm_bindgen]
pub fn select_room(id: &str) -> Result<bool, JsValue> {
    let id = parse_room(id)?;
    Ok(with_app(|app| app.viewer.store_mut().set_selected_room(id)).unwrap_or(false))
}

/// Moves the camera into a room and selects it.
#[wasm_bindgen]
pub fn enter_room(id: &str) -> Result<bool, JsValue> {
    let id = parse_room(id)?;
    Ok(with_app(|app| app.viewer.enter_room(id)).unwrap_or(false))
}

#[wasm_bindgen]
pub fn clear_selected_room() {
    with_app(|app| app.viewer.store_mut().clear_selected_room());
}

#[wasm_bindgen]
pub fn selected_room() -> Option<String> {
    with_app(|app| app.viewer.store().selected_room_id())
        .flatten()
        .map(|id| id.to_string())
}

/// Re-measures the container; for layouts that change without a window resize.
#[wasm_bindgen]
pub fn resize() -> bool {
    with_app(App::resize).unwrap_or(false)
}

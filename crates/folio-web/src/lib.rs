#![cfg(target_arch = "wasm32")]
//! Browser front-end: mounts folio scenes onto `<canvas>` elements.
//!
//! Canvases tagged `data-folio-scene="hero|showcase|background"` are mounted
//! automatically at startup. Pages can also call [`mount`] themselves and keep
//! the returned [`SceneHandle`] to unmount later.

mod asset;
mod dom;
mod events;
mod frame;
mod theme;

use crate::events::WindowListener;
use crate::frame::FrameLoop;
use folio_core::{
    compose, ModelLoad, PointerTracker, RenderSurface, SceneConfig, SceneKind, ThemeSignal,
    ThemeSourceLease, TickOutcome,
};
use folio_render::GpuState;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

thread_local! {
    static POINTER: PointerTracker = PointerTracker::new();
    static THEME: ThemeSignal = ThemeSignal::default();
    static AUTO_MOUNTED: RefCell<Vec<SceneHandle>> = const { RefCell::new(Vec::new()) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("folio-web starting");

    spawn_local(async move {
        if let Err(e) = auto_mount().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn auto_mount() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let nodes = document
        .query_selector_all("canvas[data-folio-scene]")
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    for i in 0..nodes.length() {
        let Some(canvas) = nodes
            .item(i)
            .and_then(|n| n.dyn_into::<web::HtmlCanvasElement>().ok())
        else {
            continue;
        };
        let scene = canvas.get_attribute("data-folio-scene").unwrap_or_default();
        let model = canvas.get_attribute("data-model");
        let manual_theme = canvas.get_attribute("data-theme-source").as_deref() == Some("manual");
        match mount_canvas(canvas, &scene, model, !manual_theme).await {
            Ok(handle) => AUTO_MOUNTED.with(|m| m.borrow_mut().push(handle)),
            // Already logged; a canvas that failed stays blank.
            Err(_) => continue,
        }
    }
    Ok(())
}

/// Mount `scene` onto `canvas`. `model` is an optional glTF/GLB URL for the
/// showcase scene.
#[wasm_bindgen]
pub async fn mount(
    canvas: web::HtmlCanvasElement,
    scene: String,
    model: Option<String>,
) -> Result<SceneHandle, JsValue> {
    mount_canvas(canvas, &scene, model, true)
        .await
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

/// Drive the theme from script instead of the `<html>` class list.
#[wasm_bindgen]
pub fn set_dark_theme(dark: bool) {
    THEME.with(|t| t.set(dark));
}

async fn mount_canvas(
    canvas: web::HtmlCanvasElement,
    scene: &str,
    model: Option<String>,
    follow_document_theme: bool,
) -> anyhow::Result<SceneHandle> {
    let kind =
        SceneKind::parse(scene).ok_or_else(|| anyhow::anyhow!("unknown scene kind {scene:?}"))?;
    // Held by the mount; the observer goes with the last mounted scene.
    let theme_source = follow_document_theme
        .then(|| THEME.with(|signal| signal.lease_source(theme::install_bridge)));

    let viewport = dom::sync_canvas_backing_size(&canvas);
    let gpu = match GpuState::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), viewport).await {
        Ok(gpu) => gpu,
        Err(e) => {
            log::error!("[mount] {} scene not mounted: {e}", kind.as_str());
            return Err(e.into());
        }
    };

    let mut config = SceneConfig::new(kind);
    config.seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    config.model_path = model;
    let load = config.model_path.as_deref().map(ModelLoad::new);
    if let Some(load) = &load {
        asset::spawn_fetch(load.clone());
    }
    let composed = THEME.with(|theme| compose(&config, theme, load));

    let surface = POINTER.with(|pointer| {
        RenderSurface::mount(
            gpu,
            viewport,
            composed,
            pointer,
            events::install_pointer_listener,
            instant::now() / 1000.0,
        )
    });
    let surface = Rc::new(RefCell::new(surface));

    let surface_resize = surface.clone();
    let canvas_resize = canvas.clone();
    let resize = WindowListener::attach("resize", move |_ev: web::Event| {
        let viewport = dom::sync_canvas_backing_size(&canvas_resize);
        if let Ok(mut s) = surface_resize.try_borrow_mut() {
            s.resize(viewport);
        }
    })
    .map_err(|e| log::warn!("[mount] resize listener unavailable: {e}"))
    .ok();

    let surface_tick = surface.clone();
    let frame_loop = FrameLoop::start(move |now_sec| match surface_tick.try_borrow_mut() {
        Ok(mut s) => s.tick(now_sec) != TickOutcome::Stopped,
        Err(_) => true,
    });

    Ok(SceneHandle {
        inner: Rc::new(Mounted {
            kind,
            surface,
            frame_loop: RefCell::new(Some(frame_loop)),
            resize: RefCell::new(resize),
            theme_source: RefCell::new(theme_source),
        }),
    })
}

struct Mounted {
    kind: SceneKind,
    surface: Rc<RefCell<RenderSurface<GpuState<'static>>>>,
    frame_loop: RefCell<Option<FrameLoop>>,
    resize: RefCell<Option<WindowListener>>,
    theme_source: RefCell<Option<ThemeSourceLease>>,
}

impl Mounted {
    fn unmount(&self) {
        if let Some(frame_loop) = self.frame_loop.borrow_mut().take() {
            frame_loop.stop();
        }
        self.resize.borrow_mut().take();
        self.theme_source.borrow_mut().take();
        // Ticks never call back into script, so no frame holds the surface here.
        self.surface.borrow_mut().unmount();
    }

    fn is_mounted(&self) -> bool {
        self.frame_loop
            .borrow()
            .as_ref()
            .is_some_and(FrameLoop::is_running)
            && self.surface.try_borrow().map(|s| s.is_mounted()).unwrap_or(true)
    }
}

/// Handle to a mounted scene.
#[wasm_bindgen]
pub struct SceneHandle {
    inner: Rc<Mounted>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Stop the frame loop and release the scene. Safe to call twice.
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    #[wasm_bindgen(getter)]
    pub fn scene(&self) -> String {
        self.inner.kind.as_str().to_string()
    }
}

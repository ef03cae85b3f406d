//! Native viewer: `folio-native [hero|showcase|background] [model.glb]`.
//!
//! Press `T` to flip the backdrop theme.
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use folio_core::{
    compose, AssetLoadError, ListenerBinding, ModelAsset, ModelLoad, PointerTracker,
    PointerWriter, RenderSurface, SceneConfig, SceneKind, ThemeSignal, TickOutcome, Viewport,
};
use folio_render::GpuState;
use instant::Instant;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

type CursorSlot = Rc<RefCell<Option<PointerWriter>>>;

/// Cursor events are pushed by the event loop, so the "listener" is just the
/// slot the loop writes through.
struct CursorBinding(CursorSlot);

impl ListenerBinding for CursorBinding {
    fn remove(&mut self) {
        self.0.borrow_mut().take();
    }
}

fn load_model(path: &str) -> ModelLoad {
    let load = ModelLoad::new(path);
    let result = std::fs::read(path)
        .map_err(|e| AssetLoadError::Fetch {
            path: path.to_string(),
            reason: e.to_string(),
        })
        .and_then(|bytes| ModelAsset::from_gltf_bytes(&bytes));
    load.resolve(result);
    load
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let kind = args
        .next()
        .map(|s| SceneKind::parse(&s).unwrap_or_else(|| {
            log::warn!("unknown scene {s:?}, showing hero");
            SceneKind::Hero
        }))
        .unwrap_or(SceneKind::Background);
    let mut config = SceneConfig::new(kind);
    config.model_path = args.next();
    let load = config.model_path.as_deref().map(load_model);

    let event_loop = EventLoop::new().expect("event loop");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(format!("folio ({})", kind.as_str()))
            .build(&event_loop)
            .expect("window"),
    );
    let size = window.inner_size();
    let viewport = Viewport::new(size.width, size.height);

    let gpu = pollster::block_on(GpuState::new(window.clone(), viewport)).expect("gpu");

    let theme = ThemeSignal::default();
    let pointer = PointerTracker::new();
    let cursor: CursorSlot = Rc::new(RefCell::new(None));
    let cursor_install = cursor.clone();
    let start = Instant::now();
    let now_sec = move || start.elapsed().as_secs_f64();

    let scene = compose(&config, &theme, load);
    let mut surface = RenderSurface::mount(
        gpu,
        viewport,
        scene,
        &pointer,
        move |writer| {
            *cursor_install.borrow_mut() = Some(writer);
            Box::new(CursorBinding(cursor_install)) as Box<dyn ListenerBinding>
        },
        now_sec(),
    );

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => surface.resize(Viewport::new(size.width, size.height)),
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { position, .. },
                ..
            } => {
                let size = window.inner_size();
                if let Some(writer) = cursor.borrow().as_ref() {
                    writer.on_pointer_move(
                        position.x as f32,
                        position.y as f32,
                        size.width as f32,
                        size.height as f32,
                    );
                }
            }
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    },
                ..
            } => match logical_key {
                Key::Character(c) if c.eq_ignore_ascii_case("t") => theme.toggle(),
                Key::Named(NamedKey::Escape) => {
                    surface.unmount();
                    elwt.exit();
                }
                _ => {}
            },
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                surface.unmount();
                elwt.exit();
            }
            Event::AboutToWait => match surface.tick(now_sec()) {
                TickOutcome::Stopped => elwt.exit(),
                _ => window.request_redraw(),
            },
            _ => {}
        })
        .unwrap();
}

// Host-side tests for the render surface lifecycle, using a recording
// rasterizer instead of a GPU.

use folio_core::{
    compose, Backdrop, Frame, ListenerBinding, PointerTracker, PointerWriter, Rasterizer,
    RenderSurface, SceneConfig, SceneError, SceneKind, ThemeSignal, TickOutcome, Transform,
    Viewport,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct Recording {
    resizes: Vec<Viewport>,
    draws: usize,
    releases: usize,
    backdrops: Vec<Backdrop>,
    fail_draws: bool,
}

#[derive(Clone, Default)]
struct RecordingRasterizer {
    log: Rc<RefCell<Recording>>,
}

impl Rasterizer for RecordingRasterizer {
    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().resizes.push(viewport);
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), SceneError> {
        let mut log = self.log.borrow_mut();
        if log.fail_draws {
            return Err(SceneError::Frame("surface lost".into()));
        }
        log.draws += 1;
        log.backdrops.push(frame.backdrop);
        Ok(())
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}

struct Listener {
    removed: Rc<Cell<u32>>,
}

impl ListenerBinding for Listener {
    fn remove(&mut self) {
        self.removed.set(self.removed.get() + 1);
    }
}

struct Fixture {
    pointer: PointerTracker,
    theme: ThemeSignal,
    raster: RecordingRasterizer,
    installs: Rc<Cell<u32>>,
    removed: Rc<Cell<u32>>,
    writer: Rc<RefCell<Option<PointerWriter>>>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            pointer: PointerTracker::new(),
            theme: ThemeSignal::new(true),
            raster: RecordingRasterizer::default(),
            installs: Rc::default(),
            removed: Rc::default(),
            writer: Rc::default(),
        }
    }

    fn mount(&self, kind: SceneKind) -> RenderSurface<RecordingRasterizer> {
        let scene = compose(&SceneConfig::new(kind), &self.theme, None);
        let installs = self.installs.clone();
        let removed = self.removed.clone();
        let slot = self.writer.clone();
        RenderSurface::mount(
            self.raster.clone(),
            Viewport::new(800, 600),
            scene,
            &self.pointer,
            move |writer| {
                installs.set(installs.get() + 1);
                *slot.borrow_mut() = Some(writer);
                Box::new(Listener { removed }) as Box<dyn ListenerBinding>
            },
            100.0,
        )
    }

    fn move_pointer(&self, x: f32, y: f32) -> bool {
        let writer = self.writer.borrow().clone();
        writer.is_some_and(|w| w.on_pointer_move(x, y, 800.0, 600.0))
    }
}

fn transforms(surface: &RenderSurface<RecordingRasterizer>) -> Vec<Transform> {
    surface
        .scene()
        .graph()
        .nodes()
        .iter()
        .map(|n| n.transform)
        .collect()
}

#[test]
fn mount_sizes_context_and_ticks_render() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Hero);
    assert_eq!(fx.raster.log.borrow().resizes, vec![Viewport::new(800, 600)]);
    assert!((surface.scene().camera().aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(fx.installs.get(), 1);

    assert_eq!(surface.tick(100.016), TickOutcome::Rendered);
    assert_eq!(surface.tick(100.033), TickOutcome::Rendered);
    assert_eq!(fx.raster.log.borrow().draws, 2);
    assert_eq!(surface.frames_rendered(), 2);
    assert!((surface.clock().elapsed - 0.033).abs() < 1e-4);
}

#[test]
fn pointer_moves_reach_the_drivers() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Hero);
    surface.tick(100.0);
    let at_rest = transforms(&surface);
    assert!(fx.move_pointer(800.0, 0.0)); // top-right
    surface.tick(100.016);
    let moved = transforms(&surface);
    assert!(moved[0].position.x > at_rest[0].position.x);
    assert!(moved[0].position.y > at_rest[0].position.y);
}

#[test]
fn unmount_then_advance_mutates_nothing() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Background);
    for i in 1..10 {
        surface.tick(100.0 + i as f64 / 60.0);
    }
    surface.unmount();
    let frozen = transforms(&surface);
    let draws = fx.raster.log.borrow().draws;

    assert!(!fx.move_pointer(0.0, 0.0)); // stale listener
    for i in 10..40 {
        assert_eq!(surface.tick(100.0 + i as f64 / 60.0), TickOutcome::Stopped);
    }
    assert_eq!(transforms(&surface), frozen);
    assert_eq!(fx.raster.log.borrow().draws, draws);
    assert_eq!(fx.pointer.current_sample(), folio_core::PointerSample::ZERO);
}

#[test]
fn unmount_is_idempotent_and_safe_before_first_frame() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Showcase);
    surface.unmount();
    surface.unmount();
    assert!(!surface.is_mounted());
    drop(surface);
    assert_eq!(fx.raster.log.borrow().releases, 1);
    assert_eq!(fx.raster.log.borrow().draws, 0);
    assert_eq!(fx.removed.get(), 1);
}

#[test]
fn listener_detached_on_unmount_and_on_drop() {
    let fx = Fixture::new();
    {
        let mut surface = fx.mount(SceneKind::Hero);
        surface.tick(100.1);
        surface.unmount();
        assert!(!fx.pointer.is_listening());
        assert_eq!(fx.removed.get(), 1);
    }
    {
        let _surface = fx.mount(SceneKind::Hero);
        assert!(fx.pointer.is_listening());
    }
    assert!(!fx.pointer.is_listening());
    assert_eq!(fx.installs.get(), 2);
    assert_eq!(fx.removed.get(), 2);
}

#[test]
fn surfaces_share_one_listener() {
    let fx = Fixture::new();
    let mut hero = fx.mount(SceneKind::Hero);
    let mut background = fx.mount(SceneKind::Background);
    assert_eq!(fx.installs.get(), 1);
    hero.unmount();
    assert!(fx.pointer.is_listening());
    assert!(fx.move_pointer(400.0, 300.0));
    background.unmount();
    assert!(!fx.pointer.is_listening());
    assert_eq!(fx.removed.get(), 1);
}

#[test]
fn resize_keeps_smoothed_transforms() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Hero);
    fx.move_pointer(700.0, 100.0);
    for i in 1..20 {
        surface.tick(100.0 + i as f64 / 60.0);
    }
    let before = transforms(&surface);
    let elapsed = surface.clock().elapsed;

    surface.resize(Viewport::new(1920, 1080));
    assert_eq!(transforms(&surface), before);
    assert_eq!(surface.clock().elapsed, elapsed);
    assert!((surface.scene().camera().aspect - 1920.0 / 1080.0).abs() < 1e-6);
    assert_eq!(fx.raster.log.borrow().resizes.len(), 2);

    // same size again is not a reconfigure
    surface.resize(Viewport::new(1920, 1080));
    assert_eq!(fx.raster.log.borrow().resizes.len(), 2);
}

#[test]
fn theme_swap_changes_backdrop_only() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Background);
    fx.move_pointer(100.0, 500.0);
    for i in 1..15 {
        surface.tick(100.0 + i as f64 / 60.0);
    }
    let before = transforms(&surface);
    assert_eq!(surface.scene().backdrop(), Backdrop::for_theme(true));

    fx.theme.set(false);
    assert_eq!(transforms(&surface), before);
    assert_eq!(surface.scene().backdrop(), Backdrop::for_theme(false));

    surface.tick(100.5);
    let last = *fx.raster.log.borrow().backdrops.last().expect("drawn");
    assert_eq!(last, Backdrop::for_theme(false));
}

#[test]
fn theme_subscription_dropped_on_unmount() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Background);
    assert_eq!(fx.theme.subscriber_count(), 1);
    surface.unmount();
    assert_eq!(fx.theme.subscriber_count(), 0);
    fx.theme.toggle();
    assert_eq!(surface.scene().backdrop(), Backdrop::for_theme(true));
}

#[test]
fn frame_errors_skip_but_keep_running() {
    let fx = Fixture::new();
    let mut surface = fx.mount(SceneKind::Hero);
    fx.raster.log.borrow_mut().fail_draws = true;
    assert_eq!(surface.tick(100.1), TickOutcome::Skipped);
    assert_eq!(surface.tick(100.2), TickOutcome::Skipped);
    assert!(surface.is_mounted());
    fx.raster.log.borrow_mut().fail_draws = false;
    assert_eq!(surface.tick(100.3), TickOutcome::Rendered);
}

struct ContextFlag(Rc<Cell<bool>>);

impl Drop for ContextFlag {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

struct OwningRasterizer {
    _context: ContextFlag,
}

impl Rasterizer for OwningRasterizer {
    fn resize(&mut self, _viewport: Viewport) {}

    fn draw(&mut self, _frame: &Frame<'_>) -> Result<(), SceneError> {
        Ok(())
    }
}

#[test]
fn unmount_drops_the_context() {
    let theme = ThemeSignal::new(true);
    let pointer = PointerTracker::new();
    let alive = Rc::new(Cell::new(true));
    let scene = compose(&SceneConfig::new(SceneKind::Hero), &theme, None);
    let mut surface = RenderSurface::mount(
        OwningRasterizer {
            _context: ContextFlag(alive.clone()),
        },
        Viewport::new(640, 480),
        scene,
        &pointer,
        |_writer| Box::new(Listener { removed: Rc::default() }) as Box<dyn ListenerBinding>,
        0.0,
    );
    assert_eq!(surface.tick(0.016), TickOutcome::Rendered);
    assert!(surface.rasterizer().is_some());

    surface.unmount();
    assert!(!alive.get()); // released while the surface itself lives on
    assert!(surface.rasterizer().is_none());
    assert_eq!(surface.tick(0.033), TickOutcome::Stopped);
    surface.resize(Viewport::new(1024, 768)); // no context, no panic
}

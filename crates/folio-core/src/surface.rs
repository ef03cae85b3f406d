//! Render surface lifetime: mount, tick, resize, unmount.
//!
//! The surface is the only thing that advances a scene. Front-ends call
//! [`RenderSurface::tick`] from their frame callback and
//! [`RenderSurface::unmount`] when the host element goes away; after that
//! every call is a no-op and the pointer listener lease is gone.

use crate::clock::{Clock, ClockState};
use crate::error::SceneError;
use crate::pointer::{ListenerBinding, PointerLease, PointerTracker, PointerWriter};
use crate::scene::Scene;
use crate::theme::Backdrop;

/// Drawable size in physical pixels; never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Everything a rasterizer needs for one frame.
pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub clock: ClockState,
    pub backdrop: Backdrop,
}

/// GPU (or test) backend behind a surface.
pub trait Rasterizer {
    fn resize(&mut self, viewport: Viewport);
    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), SceneError>;
    /// Free context resources. Called once, on unmount.
    fn release(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// Scene advanced but the frame could not be drawn.
    Skipped,
    /// Surface is unmounted; nothing happened.
    Stopped,
}

pub struct RenderSurface<R: Rasterizer> {
    /// Dropped on unmount so the context does not outlive the scene.
    rasterizer: Option<R>,
    scene: Scene,
    pointer: PointerTracker,
    lease: PointerLease,
    clock: Clock,
    viewport: Viewport,
    mounted: bool,
    frames: u64,
    frame_error_reported: bool,
}

impl<R: Rasterizer> RenderSurface<R> {
    /// Size the context, lease the pointer listener and start the clock.
    ///
    /// `install_listener` runs only if no other surface already holds the
    /// listener.
    pub fn mount<F>(
        mut rasterizer: R,
        viewport: Viewport,
        mut scene: Scene,
        pointer: &PointerTracker,
        install_listener: F,
        now_sec: f64,
    ) -> Self
    where
        F: FnOnce(PointerWriter) -> Box<dyn ListenerBinding>,
    {
        rasterizer.resize(viewport);
        scene.resize(viewport.aspect());
        let lease = pointer.lease(install_listener);
        log::info!(
            "[surface] mounted {} scene at {}x{}",
            scene.kind().as_str(),
            viewport.width,
            viewport.height
        );
        Self {
            rasterizer: Some(rasterizer),
            scene,
            pointer: pointer.clone(),
            lease,
            clock: Clock::start(now_sec),
            viewport,
            mounted: true,
            frames: 0,
            frame_error_reported: false,
        }
    }

    pub fn tick(&mut self, now_sec: f64) -> TickOutcome {
        if !self.mounted {
            return TickOutcome::Stopped;
        }
        let Some(rasterizer) = self.rasterizer.as_mut() else {
            return TickOutcome::Stopped;
        };
        let clock = self.clock.advance(now_sec);
        let pointer = self.pointer.current_sample();
        self.scene.update(pointer, clock);

        let frame = Frame {
            scene: &self.scene,
            clock,
            backdrop: self.scene.backdrop(),
        };
        match rasterizer.draw(&frame) {
            Ok(()) => {
                self.frames += 1;
                TickOutcome::Rendered
            }
            Err(e) => {
                if !self.frame_error_reported {
                    log::warn!("[surface] frame skipped: {e}");
                    self.frame_error_reported = true;
                }
                TickOutcome::Skipped
            }
        }
    }

    /// Reconfigure projection and render targets. Node transforms and the
    /// clock carry on untouched.
    pub fn resize(&mut self, viewport: Viewport) {
        if !self.mounted || viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if let Some(rasterizer) = self.rasterizer.as_mut() {
            rasterizer.resize(viewport);
        }
        self.scene.resize(viewport.aspect());
    }

    /// Stop ticking and release listener, theme subscription and context.
    /// Safe to call repeatedly and before the first frame.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.lease.release();
        self.scene.release();
        if let Some(mut rasterizer) = self.rasterizer.take() {
            rasterizer.release();
        }
        log::info!(
            "[surface] unmounted {} scene after {} frames",
            self.scene.kind().as_str(),
            self.frames
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clock(&self) -> ClockState {
        self.clock.state()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// `None` once unmounted.
    pub fn rasterizer(&self) -> Option<&R> {
        self.rasterizer.as_ref()
    }
}

impl<R: Rasterizer> Drop for RenderSurface<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

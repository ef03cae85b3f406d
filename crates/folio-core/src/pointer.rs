//! Shared pointer state with last-value-wins semantics.
//!
//! One [`PointerTracker`] is shared by every mounted scene. Input events
//! overwrite the stored sample; render ticks read whatever is there. No
//! history or queue is kept, so a burst of moves between two ticks collapses
//! to the latest position.
//!
//! The platform listener is reference counted through [`PointerLease`]s: the
//! first lease installs it, the last release removes it. Writers handed to a
//! removed listener go stale and their writes are dropped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Pointer position normalized to `[-1, 1]` on both axes, `y` pointing up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Normalize raw device coordinates against the viewport size.
    ///
    /// Returns `None` for a degenerate viewport.
    pub fn from_viewport(
        raw_x: f32,
        raw_y: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Option<Self> {
        if !(viewport_width > 0.0 && viewport_height > 0.0) {
            return None;
        }
        let x = (raw_x / viewport_width) * 2.0 - 1.0;
        let y = -((raw_y / viewport_height) * 2.0 - 1.0);
        Some(Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        })
    }
}

/// Platform hook owning an installed input listener.
pub trait ListenerBinding {
    /// Detach the listener. The tracker calls this exactly once.
    fn remove(&mut self);
}

struct Shared {
    sample: Cell<PointerSample>,
    leases: Cell<usize>,
    generation: Cell<u64>,
    binding: RefCell<Option<Box<dyn ListenerBinding>>>,
}

impl Shared {
    fn store(&self, raw_x: f32, raw_y: f32, viewport_width: f32, viewport_height: f32) -> bool {
        match PointerSample::from_viewport(raw_x, raw_y, viewport_width, viewport_height) {
            Some(sample) => {
                self.sample.set(sample);
                true
            }
            None => false,
        }
    }
}

/// Cheap handle to the shared pointer state; clones see the same sample.
#[derive(Clone)]
pub struct PointerTracker {
    shared: Rc<Shared>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                sample: Cell::new(PointerSample::ZERO),
                leases: Cell::new(0),
                generation: Cell::new(0),
                binding: RefCell::new(None),
            }),
        }
    }

    /// Overwrite the stored sample. Degenerate viewports are ignored.
    pub fn on_pointer_move(
        &self,
        raw_x: f32,
        raw_y: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) {
        self.shared.store(raw_x, raw_y, viewport_width, viewport_height);
    }

    /// Latest sample, or [`PointerSample::ZERO`] before the first move.
    pub fn current_sample(&self) -> PointerSample {
        self.shared.sample.get()
    }

    /// Acquire the input listener for the lifetime of the returned lease.
    ///
    /// `install` runs only when no listener is attached yet; it receives the
    /// writer the platform callback should feed.
    pub fn lease<F>(&self, install: F) -> PointerLease
    where
        F: FnOnce(PointerWriter) -> Box<dyn ListenerBinding>,
    {
        let shared = &self.shared;
        let previous = shared.leases.get();
        shared.leases.set(previous + 1);
        if previous == 0 {
            let writer = PointerWriter {
                shared: Rc::downgrade(shared),
                generation: shared.generation.get(),
            };
            let binding = install(writer);
            *shared.binding.borrow_mut() = Some(binding);
            log::debug!("[pointer] listener attached");
        }
        PointerLease {
            tracker: Some(self.clone()),
        }
    }

    pub fn active_leases(&self) -> usize {
        self.shared.leases.get()
    }

    pub fn is_listening(&self) -> bool {
        self.shared.binding.borrow().is_some()
    }

    fn release_one(&self) {
        let shared = &self.shared;
        let remaining = shared.leases.get().saturating_sub(1);
        shared.leases.set(remaining);
        if remaining > 0 {
            return;
        }
        shared.generation.set(shared.generation.get() + 1);
        let binding = shared.binding.borrow_mut().take();
        if let Some(mut binding) = binding {
            binding.remove();
            log::debug!("[pointer] listener detached");
        }
    }
}

/// Write side handed to a platform listener.
///
/// Goes stale once the listener it was issued to has been released, so a
/// late event can never mutate the shared sample.
#[derive(Clone)]
pub struct PointerWriter {
    shared: Weak<Shared>,
    generation: u64,
}

impl PointerWriter {
    /// Returns `true` when the sample was stored.
    pub fn on_pointer_move(
        &self,
        raw_x: f32,
        raw_y: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        if shared.generation.get() != self.generation || shared.leases.get() == 0 {
            return false;
        }
        shared.store(raw_x, raw_y, viewport_width, viewport_height)
    }

    pub fn is_live(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|s| s.generation.get() == self.generation && s.leases.get() > 0)
    }
}

/// Scoped hold on the pointer listener; releases on drop.
pub struct PointerLease {
    tracker: Option<PointerTracker>,
}

impl PointerLease {
    /// Give the lease back. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.release_one();
        }
    }

    pub fn is_active(&self) -> bool {
        self.tracker.is_some()
    }
}

impl Drop for PointerLease {
    fn drop(&mut self) {
        self.release();
    }
}

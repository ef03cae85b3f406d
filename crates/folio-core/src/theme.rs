//! Observable dark/light flag and the backdrop values derived from it.

use crate::constants::*;
use crate::pointer::ListenerBinding;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener = Rc<dyn Fn(bool)>;

struct SignalInner {
    is_dark: Cell<bool>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    source_leases: Cell<usize>,
    source: RefCell<Option<Box<dyn ListenerBinding>>>,
}

/// Boolean theme value with change notification. Clones share state.
#[derive(Clone)]
pub struct ThemeSignal {
    inner: Rc<SignalInner>,
}

impl ThemeSignal {
    pub fn new(is_dark: bool) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                is_dark: Cell::new(is_dark),
                next_id: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
                source_leases: Cell::new(0),
                source: RefCell::new(None),
            }),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.inner.is_dark.get()
    }

    /// Store a new value; listeners run only when it actually changed.
    pub fn set(&self, is_dark: bool) {
        if self.inner.is_dark.replace(is_dark) == is_dark {
            return;
        }
        log::info!("[theme] {}", if is_dark { "dark" } else { "light" });
        // Snapshot so a listener may subscribe or cancel while being notified.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(is_dark);
        }
    }

    pub fn toggle(&self) {
        self.set(!self.is_dark());
    }

    pub fn subscribe(&self, listener: impl Fn(bool) + 'static) -> ThemeSubscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        ThemeSubscription {
            signal: Rc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Keep the platform source that drives this signal (the page's theme
    /// class observer, say) attached for the lifetime of the returned lease.
    ///
    /// `install` runs only for the first lease and may decline with `None`.
    /// The source is removed when the last lease is released.
    pub fn lease_source<F>(&self, install: F) -> ThemeSourceLease
    where
        F: FnOnce(ThemeSignal) -> Option<Box<dyn ListenerBinding>>,
    {
        let inner = &self.inner;
        let previous = inner.source_leases.get();
        inner.source_leases.set(previous + 1);
        if previous == 0 {
            let source = install(self.clone());
            *inner.source.borrow_mut() = source;
        }
        ThemeSourceLease {
            signal: Some(self.clone()),
        }
    }

    pub fn has_source(&self) -> bool {
        self.inner.source.borrow().is_some()
    }

    fn release_source(&self) {
        let inner = &self.inner;
        let remaining = inner.source_leases.get().saturating_sub(1);
        inner.source_leases.set(remaining);
        if remaining > 0 {
            return;
        }
        let source = inner.source.borrow_mut().take();
        if let Some(mut source) = source {
            source.remove();
            log::debug!("[theme] source detached");
        }
    }
}

/// Scoped hold on the theme source; releases on drop.
pub struct ThemeSourceLease {
    signal: Option<ThemeSignal>,
}

impl ThemeSourceLease {
    pub fn release(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.release_source();
        }
    }
}

impl Drop for ThemeSourceLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl Default for ThemeSignal {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Removes its listener on drop.
pub struct ThemeSubscription {
    signal: Weak<SignalInner>,
    id: Option<u64>,
}

impl ThemeSubscription {
    pub fn cancel(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(inner) = self.signal.upgrade() {
            inner.listeners.borrow_mut().retain(|(i, _)| *i != id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }
}

impl Drop for ThemeSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Clear colour gradient and light intensities behind a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backdrop {
    /// Linear RGBA at the centre of the radial gradient.
    pub gradient_inner: [f32; 4],
    /// Linear RGBA at the edge.
    pub gradient_outer: [f32; 4],
    pub ambient: f32,
    pub directional: f32,
}

impl Backdrop {
    pub fn for_theme(is_dark: bool) -> Self {
        let (hex, ambient, directional) = if is_dark {
            (DARK_GRADIENT_HEX, DARK_AMBIENT, DARK_DIRECTIONAL)
        } else {
            (LIGHT_GRADIENT_HEX, LIGHT_AMBIENT, LIGHT_DIRECTIONAL)
        };
        Self {
            gradient_inner: srgb_hex(hex[0], 1.0),
            gradient_outer: srgb_hex(hex[1], 1.0),
            ambient,
            directional,
        }
    }

    /// Bright rig over a transparent clear so the page shows through.
    pub fn studio() -> Self {
        Self {
            gradient_inner: [0.0; 4],
            gradient_outer: [0.0; 4],
            ambient: STUDIO_AMBIENT,
            directional: STUDIO_DIRECTIONAL,
        }
    }
}

/// Backdrop that follows a [`ThemeSignal`] until detached.
///
/// Only the backdrop cell is touched on a theme change; node transforms and
/// the tick loop are unaffected.
pub struct ThemeBackdrop {
    current: Rc<Cell<Backdrop>>,
    subscription: ThemeSubscription,
}

impl ThemeBackdrop {
    pub fn observe(signal: &ThemeSignal) -> Self {
        let current = Rc::new(Cell::new(Backdrop::for_theme(signal.is_dark())));
        let cell = Rc::clone(&current);
        let subscription = signal.subscribe(move |is_dark| cell.set(Backdrop::for_theme(is_dark)));
        Self {
            current,
            subscription,
        }
    }

    pub fn current(&self) -> Backdrop {
        self.current.get()
    }

    pub fn detach(&mut self) {
        self.subscription.cancel();
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }
}

pub enum BackdropSource {
    Fixed(Backdrop),
    Themed(ThemeBackdrop),
}

impl BackdropSource {
    pub fn current(&self) -> Backdrop {
        match self {
            BackdropSource::Fixed(b) => *b,
            BackdropSource::Themed(t) => t.current(),
        }
    }

    pub fn detach(&mut self) {
        if let BackdropSource::Themed(t) = self {
            t.detach();
        }
    }
}

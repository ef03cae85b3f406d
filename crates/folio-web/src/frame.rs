use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

struct LoopState {
    stopped: Cell<bool>,
    pending: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl LoopState {
    fn schedule(&self) {
        let Some(window) = web::window() else {
            return;
        };
        let callback = self.callback.borrow();
        if let Some(cb) = callback.as_ref() {
            match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => self.pending.set(Some(id)),
                Err(e) => log::error!("[surface] requestAnimationFrame failed: {:?}", e),
            }
        }
    }
}

/// `requestAnimationFrame` loop that can be cancelled from anywhere,
/// including from inside its own callback.
pub struct FrameLoop {
    state: Rc<LoopState>,
}

impl FrameLoop {
    /// Call `on_frame(now_sec)` every animation frame until it returns
    /// `false` or [`FrameLoop::stop`] is called.
    pub fn start(mut on_frame: impl FnMut(f64) -> bool + 'static) -> Self {
        let state = Rc::new(LoopState {
            stopped: Cell::new(false),
            pending: Cell::new(None),
            callback: RefCell::new(None),
        });
        let weak: Weak<LoopState> = Rc::downgrade(&state);
        let closure = Closure::wrap(Box::new(move |_ts_ms: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.pending.set(None);
            if state.stopped.get() {
                return;
            }
            if on_frame(instant::now() / 1000.0) && !state.stopped.get() {
                state.schedule();
            } else {
                state.stopped.set(true);
            }
        }) as Box<dyn FnMut(f64)>);
        *state.callback.borrow_mut() = Some(closure);
        state.schedule();
        Self { state }
    }

    /// Cancel the pending frame. Idempotent.
    pub fn stop(&self) {
        let state = &self.state;
        state.stopped.set(true);
        if let Some(id) = state.pending.take() {
            if let Some(window) = web::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        // The callback may be the caller; free it once the current task ends.
        if let Some(cb) = state.callback.borrow_mut().take() {
            spawn_local(async move {
                drop(cb);
            });
        }
    }

    pub fn is_running(&self) -> bool {
        !self.state.stopped.get()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

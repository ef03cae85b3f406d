use crate::dom;
use folio_core::{ListenerBinding, PointerWriter};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A window event listener that is removed again on [`WindowListener::remove`]
/// or drop.
pub struct WindowListener {
    window: web::Window,
    event: &'static str,
    closure: Option<Closure<dyn FnMut(web::Event)>>,
}

impl WindowListener {
    pub fn attach(
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        window
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(Self {
            window,
            event,
            closure: Some(closure),
        })
    }

    pub fn remove(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback(self.event, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        self.remove();
    }
}

struct PointerBinding(Option<WindowListener>);

impl ListenerBinding for PointerBinding {
    fn remove(&mut self) {
        if let Some(mut listener) = self.0.take() {
            listener.remove();
            log::info!("[mount] pointer listener removed");
        }
    }
}

/// Install the window `pointermove` listener feeding `writer`.
///
/// Passed to `RenderSurface::mount`, which only calls it for the first
/// mounted scene.
pub fn install_pointer_listener(writer: PointerWriter) -> Box<dyn ListenerBinding> {
    let listener = WindowListener::attach("pointermove", move |ev: web::Event| {
        let Some(mouse) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        let Some((w, h)) = web::window().as_ref().and_then(dom::window_inner_size) else {
            return;
        };
        writer.on_pointer_move(mouse.client_x() as f32, mouse.client_y() as f32, w, h);
    });
    match listener {
        Ok(l) => {
            log::info!("[mount] pointer listener installed");
            Box::new(PointerBinding(Some(l)))
        }
        Err(e) => {
            log::warn!("[mount] pointer listener unavailable: {e}");
            Box::new(PointerBinding(None))
        }
    }
}

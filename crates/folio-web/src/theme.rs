use crate::dom;
use folio_core::{ListenerBinding, ThemeSignal};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub const DARK_CLASS: &str = "dark-theme";

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, web::MutationObserver)>;

/// Mirrors the `dark-theme` class on `<html>` into a [`ThemeSignal`].
pub struct ThemeBridge {
    observer: web::MutationObserver,
    callback: Option<ObserverCallback>,
}

impl ThemeBridge {
    pub fn install(signal: ThemeSignal) -> anyhow::Result<Self> {
        let root = dom::window_document()
            .and_then(|d| d.document_element())
            .ok_or_else(|| anyhow::anyhow!("no document element"))?;
        signal.set(root.class_list().contains(DARK_CLASS));

        let callback: ObserverCallback = Closure::wrap(Box::new(
            move |_records: js_sys::Array, _obs: web::MutationObserver| {
                signal.set(dom::has_root_class(DARK_CLASS));
            },
        ) as Box<dyn FnMut(js_sys::Array, web::MutationObserver)>);
        let observer = web::MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let init = web::MutationObserverInit::new();
        init.set_attributes(true);
        init.set_attribute_filter(&js_sys::Array::of1(&"class".into()));
        observer
            .observe_with_options(&root, &init)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        log::info!("[theme] observing <html> class list");
        Ok(Self {
            observer,
            callback: Some(callback),
        })
    }
}

impl ListenerBinding for ThemeBridge {
    fn remove(&mut self) {
        if self.callback.take().is_some() {
            self.observer.disconnect();
            log::info!("[theme] class observer disconnected");
        }
    }
}

impl Drop for ThemeBridge {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Theme source installer for [`ThemeSignal::lease_source`].
pub fn install_bridge(signal: ThemeSignal) -> Option<Box<dyn ListenerBinding>> {
    match ThemeBridge::install(signal) {
        Ok(bridge) => Some(Box::new(bridge)),
        Err(e) => {
            log::warn!("[theme] class observer unavailable: {e}");
            None
        }
    }
}

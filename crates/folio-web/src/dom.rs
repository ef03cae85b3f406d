use folio_core::Viewport;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Match the canvas backing store to its CSS size times devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> Viewport {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
    Viewport::new(canvas.width(), canvas.height())
}

/// Layout viewport in CSS pixels, the space pointer coordinates arrive in.
pub fn window_inner_size(window: &web::Window) -> Option<(f32, f32)> {
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w as f32, h as f32))
}

#[inline]
pub fn has_root_class(class: &str) -> bool {
    window_document()
        .and_then(|d| d.document_element())
        .is_some_and(|root| root.class_list().contains(class))
}

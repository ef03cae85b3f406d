use folio_core::{AssetLoadError, ModelAsset, ModelLoad};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Fetch and parse the model in the background, then settle `load`.
pub fn spawn_fetch(load: ModelLoad) {
    spawn_local(async move {
        log::info!("[asset] fetching {}", load.path());
        let result = fetch_model(load.path()).await;
        load.resolve(result);
    });
}

async fn fetch_model(path: &str) -> Result<ModelAsset, AssetLoadError> {
    let fetch_err = |reason: String| AssetLoadError::Fetch {
        path: path.to_string(),
        reason,
    };
    let window = web::window().ok_or_else(|| fetch_err("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(|e| fetch_err(format!("{:?}", e)))?;
    let response: web::Response = response
        .dyn_into()
        .map_err(|e| fetch_err(format!("{:?}", e)))?;
    if !response.ok() {
        return Err(fetch_err(format!("HTTP {}", response.status())));
    }
    let body = response
        .array_buffer()
        .map_err(|e| fetch_err(format!("{:?}", e)))?;
    let buffer = JsFuture::from(body)
        .await
        .map_err(|e| fetch_err(format!("{:?}", e)))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    ModelAsset::from_gltf_bytes(&bytes)
}

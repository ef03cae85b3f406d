use thiserror::Error;

/// Why a model resource could not be turned into geometry.
///
/// Every variant is recovered locally: the scene falls back to the
/// procedural shapes and the page never sees the error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AssetLoadError {
    #[error("fetching {path} failed: {reason}")]
    Fetch { path: String, reason: String },
    #[error("malformed model: {0}")]
    Parse(String),
    #[error("model contains no triangle geometry")]
    NoGeometry,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("asset load failed: {0}")]
    AssetLoad(#[from] AssetLoadError),
    /// Fatal for the scene that hit it; reported once and never retried.
    #[error("rendering context unavailable: {0}")]
    ContextCreation(String),
    #[error("frame failed: {0}")]
    Frame(String),
}

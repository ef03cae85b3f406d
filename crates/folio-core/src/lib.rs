//! Platform-free animation core for the folio backdrop.
//!
//! Everything here is plain Rust with no browser or GPU types, so the same
//! scenes drive the WASM front-end, the native viewer and the host-side tests.
//! Front-ends provide three things: a [`Rasterizer`], a platform pointer
//! listener (see [`ListenerBinding`]) and a monotonic time source.

pub mod asset;
pub mod camera;
pub mod clock;
pub mod constants;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod pointer;
pub mod scene;
pub mod smoothing;
pub mod surface;
pub mod theme;
pub mod transform;

pub use asset::*;
pub use camera::*;
pub use clock::*;
pub use driver::*;
pub use error::*;
pub use geometry::{MeshData, Topology};
pub use graph::*;
pub use pointer::*;
pub use scene::*;
pub use smoothing::*;
pub use surface::*;
pub use theme::*;
pub use transform::*;

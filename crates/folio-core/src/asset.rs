//! Imported model parsing and the three-state load slot.

use crate::error::AssetLoadError;
use crate::geometry::{MeshData, Topology};
use glam::{Mat3, Mat4, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Parsed model geometry, flattened and normalized to unit radius.
#[derive(Debug)]
pub struct ModelAsset {
    pub mesh: MeshData,
}

impl ModelAsset {
    /// Parse `.gltf` (embedded buffers) or `.glb` bytes.
    ///
    /// Every triangle primitive reachable from the default scene is baked
    /// into one indexed mesh with its node transforms applied.
    pub fn from_gltf_bytes(bytes: &[u8]) -> Result<Self, AssetLoadError> {
        let (doc, buffers, _images) =
            gltf::import_slice(bytes).map_err(|e| AssetLoadError::Parse(e.to_string()))?;

        let mut out = MeshData {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            topology: Topology::Triangles,
        };
        let mut missing_normals = false;

        match doc.default_scene().or_else(|| doc.scenes().next()) {
            Some(scene) => {
                for node in scene.nodes() {
                    bake_node(&node, Mat4::IDENTITY, &buffers, &mut out, &mut missing_normals);
                }
            }
            None => {
                for mesh in doc.meshes() {
                    bake_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut out, &mut missing_normals);
                }
            }
        }

        if out.indices.is_empty() {
            return Err(AssetLoadError::NoGeometry);
        }
        if missing_normals {
            out.compute_normals();
        }
        out.normalize_to_unit();
        log::info!(
            "[asset] parsed model: {} vertices, {} triangles",
            out.vertex_count(),
            out.triangle_count()
        );
        Ok(Self { mesh: out })
    }
}

fn bake_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut MeshData,
    missing_normals: &mut bool,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        bake_mesh(&mesh, world, buffers, out, missing_normals);
    }
    for child in node.children() {
        bake_node(&child, world, buffers, out, missing_normals);
    }
}

fn bake_mesh(
    mesh: &gltf::Mesh,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut MeshData,
    missing_normals: &mut bool,
) {
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let base = out.positions.len() as u32;
        out.positions.extend(
            positions.map(|p| world.transform_point3(Vec3::from(p)).to_array()),
        );
        let added = out.positions.len() as u32 - base;

        match reader.read_normals() {
            Some(normals) => out.normals.extend(
                normals.map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array()),
            ),
            None => {
                *missing_normals = true;
                out.normals.extend((0..added).map(|_| [0.0; 3]));
            }
        }
        // Positions and normals may disagree in a malformed file.
        out.normals.resize(out.positions.len(), [0.0; 3]);

        match reader.read_indices() {
            Some(indices) => out.indices.extend(
                indices
                    .into_u32()
                    .filter(|&i| i < added)
                    .map(|i| base + i),
            ),
            None => out.indices.extend(base..base + added - added % 3),
        }
        // A filtered index may have broken the triangle list.
        let whole = out.indices.len() - out.indices.len() % 3;
        out.indices.truncate(whole);
    }
}

/// Load state of the model slot.
#[derive(Clone, Debug)]
pub enum AssetState {
    Pending,
    Ready(Rc<ModelAsset>),
    Failed(AssetLoadError),
}

impl AssetState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AssetState::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetState::Failed(_))
    }
}

/// Shared handle to an in-flight model load.
///
/// The loader keeps one clone and calls [`ModelLoad::resolve`]; the scene
/// keeps another and polls [`ModelLoad::state`] each tick.
#[derive(Clone, Debug)]
pub struct ModelLoad {
    path: Rc<str>,
    state: Rc<RefCell<AssetState>>,
}

impl ModelLoad {
    pub fn new(path: &str) -> Self {
        Self {
            path: Rc::from(path),
            state: Rc::new(RefCell::new(AssetState::Pending)),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Settle the load. Ignored once the slot has left `Pending`.
    pub fn resolve(&self, result: Result<ModelAsset, AssetLoadError>) {
        let mut state = self.state.borrow_mut();
        if !state.is_pending() {
            log::warn!("[asset] {} already resolved, ignoring", self.path);
            return;
        }
        *state = match result {
            Ok(asset) => AssetState::Ready(Rc::new(asset)),
            Err(e) => {
                log::warn!("[asset] {} failed: {}", self.path, e);
                AssetState::Failed(e)
            }
        };
    }

    pub fn state(&self) -> AssetState {
        self.state.borrow().clone()
    }
}

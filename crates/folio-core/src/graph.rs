//! Flat node store for a composed scene.
//!
//! Nodes are addressed through [`NodeHandle`]s. A handle is neither `Clone`
//! nor `Copy`, so the driver that receives one is the only code path that can
//! ever mutate that node's transform.

use crate::geometry::MeshData;
use crate::transform::Transform;
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Exclusive write access to one node. Deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeHandle(usize);

impl NodeHandle {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shading {
    /// Lambert against the scene light rig.
    Lit,
    /// Lit, with vertices pushed along the normal by a time-driven noise field.
    Distort { amount: f32, speed: f32 },
    /// Unlit round sprites of the given world size.
    Points { size: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Linear RGBA.
    pub color: [f32; 4],
    pub shading: Shading,
}

impl Material {
    pub fn lit(color: [f32; 4]) -> Self {
        Self {
            color,
            shading: Shading::Lit,
        }
    }

    pub fn points(color: [f32; 4], size: f32) -> Self {
        Self {
            color,
            shading: Shading::Points { size },
        }
    }
}

/// One drawable under a node, placed at a fixed local offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub mesh: MeshId,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub material: Material,
}

impl Part {
    pub fn new(mesh: MeshId, material: Material) -> Self {
        Self {
            mesh,
            offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
            material,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Part-local to node-local.
    pub fn local_matrix(&self) -> Mat4 {
        Transform {
            rotation: self.rotation,
            position: self.offset,
            ..Transform::default()
        }
        .matrix()
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: &'static str,
    pub transform: Transform,
    pub parts: SmallVec<[Part; 3]>,
}

impl Node {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            transform: Transform::default(),
            parts: SmallVec::new(),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }
}

#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    meshes: Vec<MeshData>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    /// Insert a node that a driver will own.
    #[must_use = "dropping the handle leaves the node without a driver"]
    pub fn insert(&mut self, node: Node) -> NodeHandle {
        NodeHandle(self.push(node))
    }

    /// Insert a node nobody animates (ground plane, props).
    pub fn insert_static(&mut self, node: Node) {
        self.push(node);
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn transform(&self, handle: &NodeHandle) -> &Transform {
        &self.nodes[handle.0].transform
    }

    pub fn transform_mut(&mut self, handle: &NodeHandle) -> &mut Transform {
        &mut self.nodes[handle.0].transform
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.index())
    }

    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

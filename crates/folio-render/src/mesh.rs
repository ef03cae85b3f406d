use crate::uniforms::Vertex;
use folio_core::{MeshData, Topology};
use wgpu::util::DeviceExt;

/// GPU copy of one [`MeshData`].
pub(crate) struct GpuMesh {
    pub(crate) vertices: wgpu::Buffer,
    pub(crate) indices: Option<wgpu::Buffer>,
    /// Index count for triangles, instance count for points.
    pub(crate) count: u32,
    pub(crate) topology: Topology,
}

impl GpuMesh {
    pub(crate) fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .zip(mesh.normals.iter().chain(std::iter::repeat(&[0.0; 3])))
            .map(|(p, n)| Vertex {
                position: *p,
                normal: *n,
            })
            .collect();
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let (indices, count) = match mesh.topology {
            Topology::Triangles => {
                let buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                (Some(buf), mesh.indices.len() as u32)
            }
            Topology::Points => (None, vertices.len() as u32),
        };
        Self {
            vertices: vertex_buf,
            indices,
            count,
            topology: mesh.topology,
        }
    }
}

//! Procedural meshes and point sets used by the scenes.
//!
//! Everything is generated on the CPU once at composition time; the
//! rasterizer uploads each mesh the first time it sees it.

use glam::Vec3;
use rand::prelude::*;
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Points,
}

/// CPU-side vertex data. `indices` is empty for point sets.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Points => 0,
        }
    }

    /// Area-weighted smooth normals from the index buffer.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (
                Vec3::from(self.positions[a]),
                Vec3::from(self.positions[b]),
                Vec3::from(self.positions[c]),
            );
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }

    /// Center on the bounding-box midpoint and scale to unit bounding radius.
    pub fn normalize_to_unit(&mut self) {
        if self.positions.is_empty() {
            return;
        }
        let (mut min, mut max) = (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
        for p in &self.positions {
            let p = Vec3::from(*p);
            min = min.min(p);
            max = max.max(p);
        }
        let center = (min + max) * 0.5;
        let radius = self
            .positions
            .iter()
            .map(|p| (Vec3::from(*p) - center).length())
            .fold(0.0_f32, f32::max);
        let inv = if radius > 1e-6 { 1.0 / radius } else { 1.0 };
        for p in &mut self.positions {
            *p = ((Vec3::from(*p) - center) * inv).to_array();
        }
    }

    fn triangles(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            indices,
            topology: Topology::Triangles,
        }
    }

    fn points(positions: Vec<[f32; 3]>) -> Self {
        let normals = vec![[0.0; 3]; positions.len()];
        Self {
            positions,
            normals,
            indices: Vec::new(),
            topology: Topology::Points,
        }
    }
}

pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut positions = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        let theta = v * PI;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let phi = u * TAU;
            let n = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            positions.push((n * radius).to_array());
            normals.push(n.to_array());
        }
    }
    let stride = ws + 1;
    let mut indices = Vec::with_capacity((ws * hs * 6) as usize);
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    MeshData::triangles(positions, normals, indices)
}

pub fn cube(size: f32) -> MeshData {
    let h = size * 0.5;
    // (normal, tangent u, tangent v) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in faces {
        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            positions.push(((n + u * su + v * sv) * h).to_array());
            normals.push(n.to_array());
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshData::triangles(positions, normals, indices)
}

pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let rs = radial_segments.max(3);
    let ts = tubular_segments.max(3);
    let mut positions = Vec::with_capacity(((rs + 1) * (ts + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    for j in 0..=rs {
        let v = j as f32 / rs as f32 * TAU;
        for i in 0..=ts {
            let u = i as f32 / ts as f32 * TAU;
            let p = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            positions.push(p.to_array());
            normals.push((p - center).normalize_or_zero().to_array());
        }
    }
    let mut indices = Vec::with_capacity((rs * ts * 6) as usize);
    for j in 1..=rs {
        for i in 1..=ts {
            let a = (ts + 1) * j + i - 1;
            let b = (ts + 1) * (j - 1) + i - 1;
            let c = (ts + 1) * (j - 1) + i;
            let d = (ts + 1) * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    MeshData::triangles(positions, normals, indices)
}

/// Flat-shaded octahedron: every face gets its own three vertices.
pub fn octahedron(radius: f32) -> MeshData {
    let v = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let faces: [[usize; 3]; 8] = [
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 2, 5],
        [1, 5, 3],
        [1, 3, 4],
        [1, 4, 2],
    ];
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    for f in faces {
        let (a, b, c) = (v[f[0]], v[f[1]], v[f[2]]);
        let n = (b - a).cross(c - a).normalize();
        for p in [a, b, c] {
            positions.push((p * radius).to_array());
            normals.push(n.to_array());
        }
    }
    let indices = (0..positions.len() as u32).collect();
    MeshData::triangles(positions, normals, indices)
}

/// Horizontal square in the XZ plane facing +Y.
pub fn ground_plane(size: f32) -> MeshData {
    let h = size * 0.5;
    let positions = vec![[-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h], [-h, 0.0, -h]];
    let normals = vec![[0.0, 1.0, 0.0]; 4];
    MeshData::triangles(positions, normals, vec![0, 1, 2, 0, 2, 3])
}

/// Stars scattered uniformly over a spherical shell `[radius, radius + depth]`.
pub fn starfield(count: usize, radius: f32, depth: f32, rng: &mut impl Rng) -> MeshData {
    let positions = (0..count)
        .map(|_| {
            let r = radius + depth * rng.gen::<f32>();
            let cos_theta = 1.0 - 2.0 * rng.gen::<f32>();
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
            let phi = TAU * rng.gen::<f32>();
            [
                r * sin_theta * phi.cos(),
                r * cos_theta,
                r * sin_theta * phi.sin(),
            ]
        })
        .collect();
    MeshData::points(positions)
}

/// Points scattered uniformly inside an axis-aligned cube of edge `extent`.
pub fn particle_cloud(count: usize, extent: f32, rng: &mut impl Rng) -> MeshData {
    let positions = (0..count)
        .map(|_| {
            [
                (rng.gen::<f32>() - 0.5) * extent,
                (rng.gen::<f32>() - 0.5) * extent,
                (rng.gen::<f32>() - 0.5) * extent,
            ]
        })
        .collect();
    MeshData::points(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn primitive_counts() {
        let c = cube(1.0);
        assert_eq!(c.vertex_count(), 24);
        assert_eq!(c.triangle_count(), 12);
        let o = octahedron(1.0);
        assert_eq!(o.triangle_count(), 8);
        let s = uv_sphere(1.0, 16, 8);
        assert!(s.indices.iter().all(|&i| (i as usize) < s.vertex_count()));
        let t = torus(1.0, 0.3, 8, 16);
        assert_eq!(t.triangle_count(), 8 * 16 * 2);
    }

    #[test]
    fn starfield_stays_inside_shell() {
        let mut rng = StdRng::seed_from_u64(7);
        let stars = starfield(500, 100.0, 50.0, &mut rng);
        assert_eq!(stars.topology, Topology::Points);
        for p in &stars.positions {
            let r = Vec3::from(*p).length();
            assert!((99.9..=150.1).contains(&r), "r = {r}");
        }
    }

    #[test]
    fn normalize_to_unit_bounds_radius() {
        let mut m = cube(10.0);
        m.normalize_to_unit();
        let max_r = m
            .positions
            .iter()
            .map(|p| Vec3::from(*p).length())
            .fold(0.0_f32, f32::max);
        assert!((max_r - 1.0).abs() < 1e-5);
    }
}

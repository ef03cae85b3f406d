use folio_core::{Frame, Material, Shading};
use glam::Mat4;

/// Per-frame values shared by every pass (group 0).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Globals {
    pub(crate) view_proj: [[f32; 4]; 4],
    pub(crate) camera_pos: [f32; 4],
    pub(crate) light_dir: [f32; 4],
    pub(crate) ambient_time: [f32; 4],
    pub(crate) point_pos: [[f32; 4]; 2],
    pub(crate) point_color: [[f32; 4]; 2],
    pub(crate) gradient_inner: [f32; 4],
    pub(crate) gradient_outer: [f32; 4],
    pub(crate) resolution: [f32; 4],
}

impl Globals {
    pub(crate) fn from_frame(frame: &Frame<'_>, width: u32, height: u32) -> Self {
        let scene = frame.scene;
        let camera = scene.camera();
        let lights = scene.lights();
        let key = lights.key_light_position.normalize_or_zero();

        let mut point_pos = [[0.0; 4]; 2];
        let mut point_color = [[0.0; 4]; 2];
        for (i, p) in lights.points.iter().take(2).enumerate() {
            point_pos[i] = p.position.extend(p.intensity).to_array();
            point_color[i] = [p.color[0], p.color[1], p.color[2], 1.0];
        }

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            light_dir: key.extend(frame.backdrop.directional).to_array(),
            ambient_time: [
                frame.backdrop.ambient,
                frame.clock.elapsed,
                lights.points.len().min(2) as f32,
                0.0,
            ],
            point_pos,
            point_color,
            gradient_inner: frame.backdrop.gradient_inner,
            gradient_outer: frame.backdrop.gradient_outer,
            resolution: [width as f32, height as f32, 0.0, 0.0],
        }
    }
}

/// One draw call's model matrix and material (group 1, dynamic offset).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DrawUniforms {
    pub(crate) model: [[f32; 4]; 4],
    pub(crate) color: [f32; 4],
    pub(crate) params: [f32; 4],
}

impl DrawUniforms {
    pub(crate) fn new(model: Mat4, material: &Material) -> Self {
        let params = match material.shading {
            Shading::Lit => [0.0; 4],
            Shading::Distort { amount, speed } => [amount, speed, 0.0, 0.0],
            Shading::Points { size } => [0.0, 0.0, size, 0.0],
        };
        Self {
            model: model.to_cols_array_2d(),
            color: material.color,
            params,
        }
    }
}

pub(crate) const DRAW_STRIDE: u64 = 256; // min_uniform_buffer_offset_alignment
pub(crate) const MAX_DRAWS: usize = 64;

/// Interleaved position + normal.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 3],
    pub(crate) normal: [f32; 3],
}

impl Vertex {
    pub(crate) const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub(crate) fn mesh_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Same buffer read once per sprite instance, position only.
    pub(crate) fn point_layout() -> wgpu::VertexBufferLayout<'static> {
        const POSITION_ONLY: [wgpu::VertexAttribute; 1] =
            wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &POSITION_ONLY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Globals>(), 224);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 96);
        assert!(std::mem::size_of::<DrawUniforms>() as u64 <= DRAW_STRIDE);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn distort_params_reach_the_shader() {
        let m = Material {
            color: [1.0; 4],
            shading: Shading::Distort {
                amount: 0.3,
                speed: 1.5,
            },
        };
        let d = DrawUniforms::new(Mat4::from_translation(Vec3::X), &m);
        assert_eq!(d.params, [0.3, 1.5, 0.0, 0.0]);
        assert_eq!(d.model[3][0], 1.0);
    }
}

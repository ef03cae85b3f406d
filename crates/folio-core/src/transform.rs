use glam::{EulerRot, Mat4, Quat, Vec3};

/// Rotation (XYZ Euler radians), per-axis scale and position of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub rotation: Vec3,
    pub scale: Vec3,
    pub position: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            position: Vec3::ZERO,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    /// Local-to-parent matrix: scale, then X, Y, Z rotation, then translation.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            euler_xyz(self.rotation),
            self.position,
        )
    }
}

#[inline]
pub fn euler_xyz(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

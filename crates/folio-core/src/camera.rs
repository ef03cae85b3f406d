//! Fixed-pose perspective camera and orbit-control settings.

use crate::constants::*;
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::TAU;

/// Right-handed camera with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: CAMERA_EYE,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Only the projection changes on resize; the pose is left alone.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Advance the orbit azimuth about the target's Y axis.
    ///
    /// One unit of `auto_rotate_speed` is a full turn per minute.
    pub fn auto_rotate(&mut self, orbit: &OrbitSettings, delta: f32) {
        if !orbit.auto_rotate || delta <= 0.0 {
            return;
        }
        let angle = TAU / 60.0 * orbit.auto_rotate_speed * delta;
        let offset = self.eye - self.target;
        self.eye = self.target + Quat::from_rotation_y(angle) * offset;
    }
}

/// Which orbit interactions a scene allows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSettings {
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
}

impl OrbitSettings {
    /// Everything off; the camera never moves.
    pub const LOCKED: Self = Self {
        enable_rotate: false,
        enable_zoom: false,
        enable_pan: false,
        auto_rotate: false,
        auto_rotate_speed: 0.0,
    };

    pub fn auto_rotate_only(speed: f32) -> Self {
        Self {
            auto_rotate: true,
            auto_rotate_speed: speed,
            ..Self::LOCKED
        }
    }
}

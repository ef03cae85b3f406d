use glam::Vec3;

// Shared tuning constants for scene layout, lighting and palette.
// Per-node formula gains live next to the formulas in `driver.rs`.

// Camera
pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 0.0, 5.0);
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;
pub const HERO_AUTO_ROTATE_SPEED: f32 = 2.0; // one revolution per 30 s
pub const SHOWCASE_AUTO_ROTATE_SPEED: f32 = 1.0;

// Smoothing
pub const DEFAULT_SMOOTHING: f32 = 0.05; // fraction of the remaining distance closed per tick

// Starfield
pub const STAR_COUNT: usize = 8000;
pub const STAR_RADIUS: f32 = 100.0; // inner radius of the shell
pub const STAR_DEPTH: f32 = 50.0; // shell thickness
pub const STAR_COLOR: [f32; 4] = [0.85, 0.85, 0.9, 1.0];
pub const STAR_SIZE: f32 = 0.4; // world units at the shell

// Particle cloud
pub const PARTICLE_COUNT: usize = 1000;
pub const PARTICLE_EXTENT: f32 = 20.0; // edge of the cube particles are scattered in
pub const PARTICLE_SIZE: f32 = 0.1;
pub const PARTICLE_OPACITY: f32 = 0.6;

// Distorted sphere
pub const SPHERE_WIDTH_SEGMENTS: u32 = 100;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 200;
pub const SPHERE_DISTORT: f32 = 0.3;
pub const SPHERE_DISTORT_SPEED: f32 = 1.5;

// Showcase layout
pub const MODEL_BASE_POSITION: Vec3 = Vec3::new(0.0, -0.5, 0.0);
pub const GROUND_Y: f32 = -1.5;
pub const GROUND_SIZE: f32 = 12.0;
pub const SHAPE_OFFSETS: [Vec3; 3] = [
    Vec3::new(-1.6, 0.0, 0.0), // cube
    Vec3::new(0.0, 0.0, 0.0),  // torus
    Vec3::new(1.6, 0.0, 0.0),  // octahedron
];
pub const CUBE_SIZE: f32 = 0.9;
pub const TORUS_RADIUS: f32 = 0.5;
pub const TORUS_TUBE: f32 = 0.2;
pub const OCTAHEDRON_RADIUS: f32 = 0.6;

// Accent palette (sRGB hex)
pub const ACCENT_HEX: u32 = 0x667eea;
pub const SECONDARY_HEX: u32 = 0x764ba2;
pub const TERTIARY_HEX: u32 = 0xf093fb;
pub const GROUND_HEX: u32 = 0x2d3748;

// Backdrop gradients (centre, edge)
pub const DARK_GRADIENT_HEX: [u32; 2] = [0x0a0a0a, 0x000000];
pub const LIGHT_GRADIENT_HEX: [u32; 2] = [0xffffff, 0xf8f9fa];

// Light rigs
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 5.0);
pub const RIM_LIGHT_POSITION: Vec3 = Vec3::new(-6.0, 4.0, -4.0);
pub const RIM_LIGHT_INTENSITY: f32 = 0.6;
pub const FILL_LIGHT_POSITION: Vec3 = Vec3::new(0.0, -3.0, 6.0);
pub const FILL_LIGHT_INTENSITY: f32 = 0.3;
pub const STUDIO_AMBIENT: f32 = 0.5;
pub const STUDIO_DIRECTIONAL: f32 = 1.0;
pub const DARK_AMBIENT: f32 = 0.1;
pub const DARK_DIRECTIONAL: f32 = 0.3;
pub const LIGHT_AMBIENT: f32 = 0.3;
pub const LIGHT_DIRECTIONAL: f32 = 0.5;

/// Convert an sRGB hex colour into linear RGBA with the given alpha.
pub fn srgb_hex(hex: u32, alpha: f32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), alpha]
}

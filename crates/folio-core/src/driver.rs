//! Per-node update rules.
//!
//! Every animated node runs the same template each tick:
//!
//! ```text
//! rot_x = p.y * gain + sin(t * wx) * ax
//! rot_y = p.x * gain + cos(t * wy) * ay
//! scale = base + (|p.x| + |p.y|) * scale_gain
//! pos_x = base_x + p.x * drift
//! pos_y = base_y + p.y * drift
//! ```
//!
//! A [`FormulaVariant`] says which of those terms a node kind uses, plus the
//! kind-specific extras (particle bob, continuous spins). Targets are blended
//! channel by channel with the node's smoothing factor; the continuous spin
//! channels are written directly from elapsed time.

use crate::clock::ClockState;
use crate::graph::{NodeHandle, SceneGraph};
use crate::pointer::PointerSample;
use crate::smoothing::SmoothingFactor;
use crate::transform::Transform;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Starfield,
    ParticleCloud,
    DistortedSphere,
    ImportedModel,
    ProceduralShapes,
}

impl NodeKind {
    pub fn variant(self) -> &'static FormulaVariant {
        FormulaVariant::for_kind(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Starfield => "starfield",
            NodeKind::ParticleCloud => "particles",
            NodeKind::DistortedSphere => "sphere",
            NodeKind::ImportedModel => "model",
            NodeKind::ProceduralShapes => "shapes",
        }
    }
}

/// Pointer tilt plus a slow sinusoidal sway on the X and Y rotations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wobble {
    pub pointer_gain: f32,
    pub freq: [f32; 2], // (wx, wy) rad/s
    pub amp: [f32; 2],  // (ax, ay) rad
}

/// Uniform scale that swells with pointer distance from centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleResponse {
    pub base: f32,
    pub gain: f32,
}

/// Smoothed Z oscillation around the base position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bob {
    pub freq: f32,
    pub amp: f32,
}

/// Rotation written straight from elapsed time, never smoothed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spin {
    /// `rot = (t * rate[0], t * rate[1], 0)`
    Tumble { rate: [f32; 2] },
    /// `rot = (0, t * rate + p.x * pointer_gain, 0)`
    Yaw { rate: f32, pointer_gain: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormulaVariant {
    pub wobble: Option<Wobble>,
    pub scale: Option<ScaleResponse>,
    /// Pointer-follow gain for X/Y position.
    pub drift: Option<f32>,
    pub bob: Option<Bob>,
    pub spin: Option<Spin>,
}

pub const STARFIELD: FormulaVariant = FormulaVariant {
    wobble: Some(Wobble {
        pointer_gain: 0.1,
        freq: [0.5, 0.3],
        amp: [0.1, 0.1],
    }),
    scale: Some(ScaleResponse {
        base: 1.0,
        gain: 0.1,
    }),
    drift: None,
    bob: None,
    spin: None,
};

pub const PARTICLE_CLOUD: FormulaVariant = FormulaVariant {
    wobble: None,
    scale: None,
    drift: Some(2.0),
    bob: Some(Bob {
        freq: 0.5,
        amp: 2.0,
    }),
    spin: Some(Spin::Tumble { rate: [0.1, 0.15] }),
};

pub const DISTORTED_SPHERE: FormulaVariant = FormulaVariant {
    wobble: Some(Wobble {
        pointer_gain: 0.2,
        freq: [0.3, 0.2],
        amp: [0.1, 0.1],
    }),
    scale: Some(ScaleResponse {
        base: 2.0,
        gain: 0.1,
    }),
    drift: Some(0.3),
    bob: None,
    spin: None,
};

pub const IMPORTED_MODEL: FormulaVariant = FormulaVariant {
    wobble: None,
    scale: Some(ScaleResponse {
        base: 1.0,
        gain: 0.1,
    }),
    drift: Some(0.3),
    bob: None,
    spin: Some(Spin::Yaw {
        rate: 0.5,
        pointer_gain: 0.2,
    }),
};

pub const PROCEDURAL_SHAPES: FormulaVariant = FormulaVariant {
    scale: Some(ScaleResponse {
        base: 1.0,
        gain: 0.1,
    }),
    ..DISTORTED_SPHERE
};

impl FormulaVariant {
    pub fn for_kind(kind: NodeKind) -> &'static Self {
        match kind {
            NodeKind::Starfield => &STARFIELD,
            NodeKind::ParticleCloud => &PARTICLE_CLOUD,
            NodeKind::DistortedSphere => &DISTORTED_SPHERE,
            NodeKind::ImportedModel => &IMPORTED_MODEL,
            NodeKind::ProceduralShapes => &PROCEDURAL_SHAPES,
        }
    }

    /// One tick of the update rule. `previous` must already be seeded.
    pub fn step(
        &self,
        previous: &Transform,
        base: Vec3,
        pointer: PointerSample,
        elapsed: f32,
        smoothing: SmoothingFactor,
    ) -> Transform {
        let mut next = *previous;
        let (p, t) = (pointer, elapsed);

        if let Some(w) = self.wobble {
            let tx = p.y * w.pointer_gain + (t * w.freq[0]).sin() * w.amp[0];
            let ty = p.x * w.pointer_gain + (t * w.freq[1]).cos() * w.amp[1];
            next.rotation.x = smoothing.apply(previous.rotation.x, tx);
            next.rotation.y = smoothing.apply(previous.rotation.y, ty);
        }

        if let Some(s) = self.scale {
            let target = s.base + (p.x.abs() + p.y.abs()) * s.gain;
            next.scale = Vec3::new(
                smoothing.apply(previous.scale.x, target),
                smoothing.apply(previous.scale.y, target),
                smoothing.apply(previous.scale.z, target),
            );
        }

        if let Some(gain) = self.drift {
            next.position.x = smoothing.apply(previous.position.x, base.x + p.x * gain);
            next.position.y = smoothing.apply(previous.position.y, base.y + p.y * gain);
        }

        if let Some(b) = self.bob {
            let tz = base.z + (t * b.freq).sin() * b.amp;
            next.position.z = smoothing.apply(previous.position.z, tz);
        }

        match self.spin {
            Some(Spin::Tumble { rate }) => {
                next.rotation = Vec3::new(t * rate[0], t * rate[1], 0.0);
            }
            Some(Spin::Yaw { rate, pointer_gain }) => {
                next.rotation = Vec3::new(0.0, t * rate + p.x * pointer_gain, 0.0);
            }
            None => {}
        }

        next
    }
}

/// Whether a node carries a single drawable or a group of static children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeContents {
    Single,
    /// Children keep fixed local offsets; only the group transform animates.
    StaticGroup,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedNodeSpec {
    pub kind: NodeKind,
    pub base_position: Vec3,
    pub smoothing: SmoothingFactor,
    pub contents: NodeContents,
}

impl AnimatedNodeSpec {
    pub fn new(kind: NodeKind) -> Self {
        let contents = match kind {
            NodeKind::ProceduralShapes => NodeContents::StaticGroup,
            _ => NodeContents::Single,
        };
        Self {
            kind,
            base_position: Vec3::ZERO,
            smoothing: SmoothingFactor::default(),
            contents,
        }
    }

    pub fn at(mut self, base_position: Vec3) -> Self {
        self.base_position = base_position;
        self
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingFactor) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn variant(&self) -> &'static FormulaVariant {
        self.kind.variant()
    }
}

/// Replace an all-zero position with the base position.
///
/// Returns `true` when the transform was changed.
pub fn seed_transform(spec: &AnimatedNodeSpec, transform: &mut Transform) -> bool {
    if transform.position == Vec3::ZERO && spec.base_position != Vec3::ZERO {
        transform.position = spec.base_position;
        true
    } else {
        false
    }
}

/// Next transform for a node of `spec` given last tick's transform.
pub fn next_transform(
    spec: &AnimatedNodeSpec,
    previous: &Transform,
    pointer: PointerSample,
    elapsed: f32,
) -> Transform {
    spec.variant().step(
        previous,
        spec.base_position,
        pointer,
        elapsed,
        spec.smoothing,
    )
}

/// Owns one node and moves it every tick.
pub struct AnimatedNodeDriver {
    node: NodeHandle,
    spec: AnimatedNodeSpec,
    seeded: bool,
}

impl AnimatedNodeDriver {
    pub fn new(node: NodeHandle, spec: AnimatedNodeSpec) -> Self {
        Self {
            node,
            spec,
            seeded: false,
        }
    }

    pub fn spec(&self) -> &AnimatedNodeSpec {
        &self.spec
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    pub fn update(&mut self, graph: &mut SceneGraph, pointer: PointerSample, clock: ClockState) {
        let transform = graph.transform_mut(&self.node);
        if !self.seeded {
            seed_transform(&self.spec, transform);
            self.seeded = true;
        }
        *transform = next_transform(&self.spec, transform, pointer, clock.elapsed);
    }
}

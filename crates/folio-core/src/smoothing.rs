use crate::constants::DEFAULT_SMOOTHING;

/// Exponential approach of `current` toward `target`.
///
/// Applied to one scalar at a time. Callers blend x, y and z separately,
/// never as a vector, which gives the slightly anisotropic easing the
/// scenes are tuned around.
#[inline]
pub fn lerp(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Blend coefficient in `(0, 1]`; `1` snaps straight to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothingFactor(f32);

impl SmoothingFactor {
    pub const SNAP: Self = Self(1.0);

    /// Returns `None` when `factor` is outside `(0, 1]` or not finite.
    pub fn new(factor: f32) -> Option<Self> {
        (factor.is_finite() && factor > 0.0 && factor <= 1.0).then_some(Self(factor))
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn apply(self, current: f32, target: f32) -> f32 {
        lerp(current, target, self.0)
    }
}

impl Default for SmoothingFactor {
    fn default() -> Self {
        Self(DEFAULT_SMOOTHING)
    }
}

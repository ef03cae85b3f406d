/// Time as seen by node drivers during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockState {
    /// Seconds since the surface was mounted.
    pub elapsed: f32,
    /// Seconds since the previous tick.
    pub delta: f32,
}

/// Monotonic mount clock owned by the render surface.
///
/// Timestamps come from the front-end (`requestAnimationFrame`, `Instant`)
/// in seconds from any fixed origin. A timestamp older than the last one is
/// treated as "no time passed" so elapsed never runs backwards.
#[derive(Clone, Debug)]
pub struct Clock {
    origin: f64,
    last: f64,
    state: ClockState,
}

impl Clock {
    pub fn start(now_sec: f64) -> Self {
        Self {
            origin: now_sec,
            last: now_sec,
            state: ClockState::default(),
        }
    }

    pub fn advance(&mut self, now_sec: f64) -> ClockState {
        let now = now_sec.max(self.last);
        let delta = (now - self.last) as f32;
        self.last = now;
        self.state = ClockState {
            elapsed: (now - self.origin) as f32,
            delta,
        };
        self.state
    }

    pub fn state(&self) -> ClockState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_relative_to_mount_and_never_decreases() {
        let mut clock = Clock::start(10.0);
        let s = clock.advance(10.5);
        assert!((s.elapsed - 0.5).abs() < 1e-6);
        assert!((s.delta - 0.5).abs() < 1e-6);
        let s = clock.advance(10.25);
        assert!((s.elapsed - 0.5).abs() < 1e-6);
        assert_eq!(s.delta, 0.0);
        let s = clock.advance(11.0);
        assert!((s.elapsed - 1.0).abs() < 1e-6);
        assert!((s.delta - 0.5).abs() < 1e-6);
    }
}

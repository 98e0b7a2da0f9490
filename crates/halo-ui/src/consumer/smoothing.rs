use halo_engine::coords::Vec2;
use halo_engine::input::Environment;

/// Distance (logical px) under which a follower snaps onto its target.
pub const SNAP_DISTANCE: f32 = 0.01;

/// How a consumer approaches its target each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Smoothing {
    /// Jump straight to the target.
    Instant,
    /// Frame-rate independent exponential approach:
    /// `alpha = 1 - exp(-rate * dt)`.
    Exponential { rate: f32 },
}

impl Smoothing {
    pub fn exponential(rate: f32) -> Self {
        Smoothing::Exponential { rate }
    }

    /// Exponential at `rate`, or `Instant` when the user prefers reduced
    /// motion.
    pub fn for_environment(env: Environment, rate: f32) -> Self {
        if env.prefers_reduced_motion {
            Smoothing::Instant
        } else {
            Smoothing::exponential(rate)
        }
    }

    /// Fraction of the remaining distance covered in `dt` seconds.
    ///
    /// A non-finite or non-positive rate degrades to `Instant`.
    pub fn alpha(self, dt: f32) -> f32 {
        match self {
            Smoothing::Instant => 1.0,
            Smoothing::Exponential { rate } if !rate.is_finite() || rate <= 0.0 => 1.0,
            Smoothing::Exponential { rate } => {
                if !dt.is_finite() || dt <= 0.0 {
                    return 0.0;
                }
                (1.0 - (-rate * dt).exp()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn step(self, current: Vec2, target: Vec2, dt: f32) -> Vec2 {
        current.lerp(target, self.alpha(dt))
    }
}

/// A smoothed 2D position chasing a target.
///
/// The first target primes the follower: it snaps there instead of sliding
/// in from the origin.
#[derive(Debug, Clone)]
pub struct Follower {
    smoothing: Smoothing,
    position: Vec2,
    target: Vec2,
    primed: bool,
    fresh: bool,
}

impl Follower {
    pub fn new(smoothing: Smoothing) -> Self {
        Self {
            smoothing,
            position: Vec2::zero(),
            target: Vec2::zero(),
            primed: false,
            fresh: false,
        }
    }

    pub fn set_target(&mut self, target: Vec2) {
        if !target.is_finite() {
            return;
        }
        if !self.primed {
            self.primed = true;
            self.fresh = true;
            self.position = target;
        }
        self.target = target;
    }

    /// Advances by `dt` seconds. Returns `true` if the position changed
    /// since the previous step.
    pub fn step(&mut self, dt: f32) -> bool {
        if !self.primed {
            return false;
        }
        if std::mem::take(&mut self.fresh) {
            return true;
        }
        if self.position == self.target {
            return false;
        }

        let next = self.smoothing.step(self.position, self.target, dt);
        self.position = if next.distance(self.target) <= SNAP_DISTANCE {
            self.target
        } else {
            next
        };
        true
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    // ── Smoothing ─────────────────────────────────────────────────────────

    #[test]
    fn exponential_alpha_is_frame_rate_independent() {
        let s = Smoothing::exponential(12.0);

        let one = s.alpha(2.0 * DT);
        let two = 1.0 - (1.0 - s.alpha(DT)).powi(2);

        assert!((one - two).abs() < 1e-5, "{one} vs {two}");
    }

    #[test]
    fn degenerate_inputs_stay_bounded() {
        assert_eq!(Smoothing::exponential(12.0).alpha(0.0), 0.0);
        assert_eq!(Smoothing::exponential(12.0).alpha(f32::NAN), 0.0);
        assert_eq!(Smoothing::exponential(-1.0).alpha(DT), 1.0);
        assert_eq!(Smoothing::exponential(12.0).alpha(1.0e6), 1.0);
    }

    #[test]
    fn reduced_motion_is_instant() {
        let env = Environment::desktop().with_reduced_motion(true);
        assert_eq!(Smoothing::for_environment(env, 12.0), Smoothing::Instant);
        assert_eq!(
            Smoothing::for_environment(Environment::desktop(), 12.0),
            Smoothing::exponential(12.0)
        );
    }

    // ── Follower ──────────────────────────────────────────────────────────

    #[test]
    fn first_target_snaps() {
        let mut f = Follower::new(Smoothing::exponential(10.0));
        assert!(!f.step(DT));

        f.set_target(Vec2::new(300.0, 200.0));
        assert!(f.step(DT));
        assert_eq!(f.position(), Vec2::new(300.0, 200.0));
        assert!(!f.step(DT));
    }

    #[test]
    fn converges_and_settles_exactly() {
        let mut f = Follower::new(Smoothing::exponential(20.0));
        f.set_target(Vec2::zero());
        f.step(DT);
        f.set_target(Vec2::new(100.0, 0.0));

        let mut last = 0.0;
        for _ in 0..600 {
            f.step(DT);
            assert!(f.position().x >= last);
            last = f.position().x;
        }

        assert!(f.is_settled());
        assert_eq!(f.position(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn long_frame_gap_does_not_overshoot() {
        let mut f = Follower::new(Smoothing::exponential(20.0));
        f.set_target(Vec2::zero());
        f.step(DT);
        f.set_target(Vec2::new(50.0, 50.0));

        f.step(0.25);
        assert!(f.position().x <= 50.0);
    }

    #[test]
    fn non_finite_targets_are_ignored() {
        let mut f = Follower::new(Smoothing::Instant);
        f.set_target(Vec2::new(f32::NAN, 1.0));
        assert!(!f.is_primed());
    }
}

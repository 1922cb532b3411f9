/// Scalar that eases toward a target instead of snapping.
///
/// `advance` applies one step of exponential smoothing:
/// `value += (target - value) * rate * dt_norm`. The blend factor is capped
/// at 1.0 so a long frame gap lands on the target instead of overshooting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Smoothed {
    value: f64,
    target: f64,
}

impl Smoothed {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            target: value,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Hard reset: jumps both the live value and the target.
    pub fn snap(&mut self, value: f64) {
        self.value = value;
        self.target = value;
    }

    pub fn advance(&mut self, rate: f64, dt_norm: f64) {
        let k = (rate * dt_norm).clamp(0.0, 1.0);
        self.value += (self.target - self.value) * k;
    }
}

/// The choreography scalars and flags every engine reads each frame.
///
/// Owned by the story sequencer and passed by reference into the engines'
/// per-frame update calls. Nothing animated is read from ambient globals.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Starfield speed scalar; also selects dot vs streak rendering.
    pub warp_factor: Smoothed,
    /// Global star opacity.
    pub star_alpha: Smoothed,
    /// Fade-in factor for globe data points after the zoom settles.
    pub dot_transition: Smoothed,
    pub earth_visible: bool,
    pub zooming: bool,
    pub cinematic: bool,
}

impl AnimationState {
    /// State outside the story: idle warp drift, fully lit stars, globe shown.
    pub fn resting() -> Self {
        Self {
            warp_factor: Smoothed::new(0.25),
            star_alpha: Smoothed::new(1.0),
            dot_transition: Smoothed::new(1.0),
            earth_visible: true,
            zooming: false,
            cinematic: false,
        }
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::resting()
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimationState, Smoothed};

    #[test]
    fn advance_moves_toward_target() {
        let mut s = Smoothed::new(0.25);
        s.set_target(40.0);
        s.advance(0.1, 1.0);
        assert!((s.value() - 4.225).abs() < 1e-12);
    }

    #[test]
    fn approach_is_monotone_for_fixed_target() {
        let mut s = Smoothed::new(0.0);
        s.set_target(1.0);
        let mut prev_gap = (s.value() - s.target()).abs();
        for _ in 0..50 {
            s.advance(0.08, 1.0);
            let gap = (s.value() - s.target()).abs();
            assert!(gap < prev_gap);
            prev_gap = gap;
        }
    }

    #[test]
    fn huge_delta_lands_on_target_without_overshoot() {
        let mut s = Smoothed::new(0.0);
        s.set_target(2.0);
        s.advance(0.1, 1000.0);
        assert_eq!(s.value(), 2.0);
    }

    #[test]
    fn snap_is_a_hard_reset() {
        let mut s = Smoothed::new(0.0);
        s.set_target(5.0);
        s.snap(1.0);
        assert_eq!(s.value(), 1.0);
        assert_eq!(s.target(), 1.0);
    }

    #[test]
    fn resting_state_idles() {
        let state = AnimationState::resting();
        assert_eq!(state.warp_factor.value(), 0.25);
        assert_eq!(state.star_alpha.value(), 1.0);
        assert!(state.earth_visible);
        assert!(!state.zooming);
    }
}

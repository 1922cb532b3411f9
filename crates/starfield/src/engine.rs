use foundation::arena::Arena;
use rand::Rng;
use render::color::Rgba;
use render::commands::{DrawCommand, RenderFrame, Stroke, Viewport};
use runtime::animation::AnimationState;
use runtime::frame::Frame;

use crate::star::Star;

/// Fixed particle count; the arena never grows or shrinks.
pub const STAR_COUNT: usize = 260;

/// Warp targets used by the story choreography.
pub const WARP_IDLE: f64 = 0.25;
pub const WARP_CRUISE: f64 = 0.6;
pub const WARP_BURST: f64 = 40.0;

/// Above this warp factor stars render as motion streaks instead of dots.
pub const STREAK_THRESHOLD: f64 = 1.5;

/// Smoothing rates, per normalized frame (1.0 = one frame at 60 Hz).
const WARP_RATE: f64 = 0.1;
const ALPHA_RATE: f64 = 0.08;
const HUE_RATE: f64 = 0.12;

/// Stars are recycled once they cross this margin beyond the viewport.
const EDGE_MARGIN: f64 = 80.0;

const BACKDROP: Rgba = Rgba::new(2.0 / 255.0, 6.0 / 255.0, 23.0 / 255.0, 0.9);
const DOT_CORE: Rgba = Rgba::new(249.0 / 255.0, 250.0 / 255.0, 251.0 / 255.0, 1.0);
const DOT_GLOW: Rgba = Rgba::new(148.0 / 255.0, 163.0 / 255.0, 184.0 / 255.0, 1.0);

/// The warp starfield.
///
/// Pure animation: it cannot fail, and a warp factor near zero is the idle
/// state, not an error. Each frame the engine smooths the shared warp/alpha
/// scalars toward their targets, advances every particle radially outward,
/// and recycles particles that left the extended viewport bounds.
pub struct Starfield {
    viewport: Viewport,
    stars: Arena<Star>,
    hue_phase: f64,
}

impl Starfield {
    pub fn new(width: f64, height: f64, rng: &mut impl Rng) -> Self {
        let viewport = Viewport::new(width, height);
        let center = viewport.center();
        let mut field = Self {
            stars: Arena::from_fn(STAR_COUNT, |_| Star::fresh(center, rng)),
            viewport,
            hue_phase: 0.0,
        };
        field.scatter(rng);
        field
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn hue_phase(&self) -> f64 {
        self.hue_phase
    }

    pub fn stars(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }

    /// Re-seeds every star: reset to center, then pushed a random distance
    /// along its direction so the field does not start as a single point.
    pub fn scatter(&mut self, rng: &mut impl Rng) {
        let center = self.viewport.center();
        let spread = self.viewport.width.max(self.viewport.height);
        for star in self.stars.iter_mut() {
            star.reset(center, rng);
            let distance = rng.gen_range(0.0..spread);
            star.position = star.position + star.direction * distance;
        }
    }

    /// Advances smoothing, hue cycling, and particle motion for one frame.
    pub fn advance(&mut self, frame: Frame, state: &mut AnimationState, rng: &mut impl Rng) {
        let dt = frame.dt_norm();
        state.warp_factor.advance(WARP_RATE, dt);
        state.star_alpha.advance(ALPHA_RATE, dt);

        let warp = state.warp_factor.value();
        self.hue_phase += warp * HUE_RATE * dt;

        let limit = self.viewport.bounds().expanded(EDGE_MARGIN);
        let center = self.viewport.center();
        for star in self.stars.iter_mut() {
            star.position = star.position + star.direction * (star.speed * warp * dt);
            star.twinkle_phase += star.twinkle_speed * dt;
            if !limit.contains(star.position) {
                star.reset(center, rng);
            }
        }
    }

    /// Emits this frame's draw commands: fade wash, then one dot or streak
    /// per star depending on the current warp factor.
    pub fn render(&self, state: &AnimationState, out: &mut RenderFrame) {
        out.push(DrawCommand::Clear { color: BACKDROP });

        let warp = state.warp_factor.value();
        let alpha = state.star_alpha.value();

        for star in self.stars.iter() {
            if warp < STREAK_THRESHOLD {
                let twinkle = 0.7 + 0.3 * star.twinkle_phase.sin();
                let a = alpha * twinkle;
                out.push(DrawCommand::Disc {
                    center: star.position,
                    radius: star.base_size,
                    color: DOT_CORE.with_alpha(a),
                });
                out.push(DrawCommand::Disc {
                    center: star.position,
                    radius: star.base_size * 2.2,
                    color: DOT_GLOW.with_alpha(a * 0.45),
                });
            } else {
                let intensity = warp.min(10.0);
                let trail = intensity * star.speed * 0.9;
                let tail = star.position - star.direction * trail;

                let base_hue = 220.0 + 80.0 * (self.hue_phase * 0.5).sin();
                let hue = base_hue + star.hue_offset;
                let lightness = (55.0 + intensity.min(5.0) * 7.0) / 100.0;
                let width = star.base_size * (0.7 + intensity * 0.04);

                out.push(DrawCommand::Segment {
                    from: tail,
                    to: star.position,
                    stroke: Stroke {
                        color: Rgba::from_hsl(hue, 0.8, lightness).with_alpha(alpha),
                        width,
                    },
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Starfield, STAR_COUNT, STREAK_THRESHOLD, WARP_BURST};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use render::commands::{DrawCommand, RenderFrame};
    use runtime::animation::AnimationState;
    use runtime::clock::FrameClock;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn burst_smoothing_matches_reference_step() {
        let mut rng = rng();
        let mut field = Starfield::new(640.0, 480.0, &mut rng);
        let mut state = AnimationState::resting();
        state.warp_factor.set_target(WARP_BURST);

        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let frame = clock.tick(1.0 / 60.0);
        field.advance(frame, &mut state, &mut rng);
        // 0.25 + (40 - 0.25) * 0.1 * 1.0
        assert!((state.warp_factor.value() - 4.225).abs() < 1e-9);
    }

    #[test]
    fn particles_never_escape_extended_bounds() {
        let mut rng = rng();
        let mut field = Starfield::new(200.0, 100.0, &mut rng);
        let mut state = AnimationState::resting();
        state.warp_factor.snap(WARP_BURST);
        state.warp_factor.set_target(WARP_BURST);

        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let limit = field.viewport().bounds().expanded(80.0);
        for _ in 0..300 {
            let frame = clock.tick(1.0 / 60.0);
            field.advance(frame, &mut state, &mut rng);
            for star in field.stars() {
                assert!(limit.contains(star.position), "star escaped: {:?}", star.position);
            }
        }
    }

    #[test]
    fn set_size_is_fixed_at_initialization() {
        let mut rng = rng();
        let mut field = Starfield::new(640.0, 480.0, &mut rng);
        assert_eq!(field.stars().count(), STAR_COUNT);

        let mut state = AnimationState::resting();
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        for _ in 0..10 {
            let frame = clock.tick(1.0 / 60.0);
            field.advance(frame, &mut state, &mut rng);
        }
        assert_eq!(field.stars().count(), STAR_COUNT);
    }

    #[test]
    fn hue_phase_advances_with_warp() {
        let mut rng = rng();
        let mut field = Starfield::new(640.0, 480.0, &mut rng);
        let mut state = AnimationState::resting();
        state.warp_factor.snap(2.0);

        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let frame = clock.tick(1.0 / 60.0);
        field.advance(frame, &mut state, &mut rng);
        // 2.0 * 0.12 * 1.0
        assert!((field.hue_phase() - 0.24).abs() < 1e-9);
    }

    #[test]
    fn low_warp_renders_dots_high_warp_renders_streaks() {
        let mut rng = rng();
        let field = Starfield::new(640.0, 480.0, &mut rng);

        let mut state = AnimationState::resting();
        state.warp_factor.snap(STREAK_THRESHOLD - 0.1);
        let mut out = RenderFrame::new();
        field.render(&state, &mut out);
        // wash + core and glow discs per star
        assert_eq!(out.len(), 1 + STAR_COUNT * 2);
        assert!(out.commands[1..]
            .iter()
            .all(|c| matches!(c, DrawCommand::Disc { .. })));

        state.warp_factor.snap(STREAK_THRESHOLD + 0.1);
        let mut out = RenderFrame::new();
        field.render(&state, &mut out);
        assert_eq!(out.len(), 1 + STAR_COUNT);
        assert!(out.commands[1..]
            .iter()
            .all(|c| matches!(c, DrawCommand::Segment { .. })));
    }

    #[test]
    fn scatter_spreads_stars_away_from_center() {
        let mut rng = rng();
        let field = Starfield::new(640.0, 480.0, &mut rng);
        let center = field.viewport().center();
        let off_center = field
            .stars()
            .filter(|s| s.position.distance_squared(center) > 1.0)
            .count();
        // All but the statistically rare near-zero scatter distances.
        assert!(off_center > STAR_COUNT / 2);
    }
}

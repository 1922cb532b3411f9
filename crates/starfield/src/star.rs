use std::f64::consts::TAU;

use foundation::math::Vec2;
use rand::Rng;

/// One particle of the warp field.
///
/// Stars are never destroyed: a star leaving the viewport is reset in place
/// back to the screen center with fresh random parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Star {
    pub position: Vec2,
    /// Unit vector pointing radially outward from the screen center.
    pub direction: Vec2,
    pub base_size: f64,
    pub speed: f64,
    pub twinkle_phase: f64,
    pub twinkle_speed: f64,
    /// Per-star hue spread around the shared streak hue, in degrees.
    pub hue_offset: f64,
}

impl Star {
    pub fn reset(&mut self, center: Vec2, rng: &mut impl Rng) {
        let angle = rng.gen_range(0.0..TAU);
        self.position = center;
        self.direction = Vec2::from_angle(angle);
        self.base_size = 0.7 + rng.gen_range(0.0..1.4);
        self.speed = 0.6 + rng.gen_range(0.0..2.1);
        self.twinkle_phase = rng.gen_range(0.0..TAU);
        self.twinkle_speed = 0.015 + rng.gen_range(0.0..0.025);
        self.hue_offset = rng.gen_range(-30.0..30.0);
    }

    pub(crate) fn fresh(center: Vec2, rng: &mut impl Rng) -> Self {
        let mut star = Self {
            position: center,
            direction: Vec2::new(1.0, 0.0),
            base_size: 1.0,
            speed: 1.0,
            twinkle_phase: 0.0,
            twinkle_speed: 0.02,
            hue_offset: 0.0,
        };
        star.reset(center, rng);
        star
    }
}

#[cfg(test)]
mod tests {
    use super::Star;
    use foundation::math::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn reset_returns_star_to_center_with_unit_direction() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let center = Vec2::new(320.0, 240.0);
        let mut star = Star::fresh(center, &mut rng);
        star.position = Vec2::new(-500.0, 900.0);

        star.reset(center, &mut rng);
        assert_eq!(star.position, center);
        assert!((star.direction.length() - 1.0).abs() < 1e-12);
        assert!(star.base_size >= 0.7 && star.base_size < 2.1);
        assert!(star.speed >= 0.6 && star.speed < 2.7);
        assert!(star.hue_offset >= -30.0 && star.hue_offset < 30.0);
    }
}

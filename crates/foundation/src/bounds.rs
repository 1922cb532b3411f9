use crate::math::Vec2;

/// Axis-aligned bounding box in screen space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// Grows the box outward on every side.
    pub fn expanded(self, margin: f64) -> Self {
        Self::new(
            Vec2::new(self.min.x - margin, self.min.y - margin),
            Vec2::new(self.max.x + margin, self.max.y + margin),
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Bounds2;
    use crate::math::Vec2;

    #[test]
    fn contains_is_inclusive() {
        let b = Bounds2::from_size(10.0, 20.0);
        assert!(b.contains(Vec2::new(0.0, 0.0)));
        assert!(b.contains(Vec2::new(10.0, 20.0)));
        assert!(!b.contains(Vec2::new(10.1, 5.0)));
    }

    #[test]
    fn expanded_grows_every_side() {
        let b = Bounds2::from_size(10.0, 10.0).expanded(80.0);
        assert_eq!(b.min, Vec2::new(-80.0, -80.0));
        assert_eq!(b.max, Vec2::new(90.0, 90.0));
        assert_eq!(b.center(), Vec2::new(5.0, 5.0));
    }
}

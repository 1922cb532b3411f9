use render::color::Rgba;

use crate::domain::ColorDomain;

/// Piecewise-linear three-stop color ramp, clamped at both ends.
///
/// Stops map onto a `ColorDomain`: stop 0 at `min`, stop 1 at `mid`,
/// stop 2 at `high`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorRamp {
    pub stops: [Rgba; 3],
}

impl ColorRamp {
    pub const fn new(stops: [Rgba; 3]) -> Self {
        Self { stops }
    }

    /// Green through yellow to red, the emission-intensity ramp.
    pub fn emissions() -> Self {
        Self::new([
            Rgba::from_u8(0, 128, 0, 1.0),
            Rgba::from_u8(255, 255, 0, 1.0),
            Rgba::from_u8(255, 0, 0, 1.0),
        ])
    }

    pub fn color_for(&self, domain: ColorDomain, value: f64) -> Rgba {
        if value <= domain.min {
            return self.stops[0];
        }
        if value <= domain.mid {
            let span = domain.mid - domain.min;
            let t = if span > 0.0 { (value - domain.min) / span } else { 1.0 };
            return Rgba::lerp(self.stops[0], self.stops[1], t);
        }
        let span = domain.high - domain.mid;
        let t = if span > 0.0 { (value - domain.mid) / span } else { 1.0 };
        Rgba::lerp(self.stops[1], self.stops[2], t)
    }
}

#[cfg(test)]
mod tests {
    use super::ColorRamp;
    use crate::domain::ColorDomain;
    use render::color::Rgba;

    fn domain() -> ColorDomain {
        ColorDomain::new(0.0, 10.0, 20.0)
    }

    #[test]
    fn endpoints_hit_stops() {
        let ramp = ColorRamp::emissions();
        assert_eq!(ramp.color_for(domain(), 0.0), ramp.stops[0]);
        assert_eq!(ramp.color_for(domain(), 10.0), ramp.stops[1]);
        assert_eq!(ramp.color_for(domain(), 20.0), ramp.stops[2]);
    }

    #[test]
    fn values_beyond_high_clamp_to_last_stop() {
        let ramp = ColorRamp::emissions();
        assert_eq!(ramp.color_for(domain(), 500.0), ramp.stops[2]);
        assert_eq!(ramp.color_for(domain(), -3.0), ramp.stops[0]);
    }

    #[test]
    fn midpoints_interpolate() {
        let ramp = ColorRamp::emissions();
        let c = ramp.color_for(domain(), 5.0);
        let expected = Rgba::lerp(ramp.stops[0], ramp.stops[1], 0.5);
        assert_eq!(c, expected);
    }

    #[test]
    fn degenerate_span_does_not_divide_by_zero() {
        let ramp = ColorRamp::emissions();
        let flat = ColorDomain::new(0.0, 0.0, 0.0);
        let c = ramp.color_for(flat, 1.0);
        assert_eq!(c, ramp.stops[2]);
    }
}

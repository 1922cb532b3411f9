use foundation::math::Vec2;

/// Globe orientation as `[longitude, latitude, roll]` in degrees.
///
/// To center a coordinate `(lon, lat)` on screen, rotate to
/// `[-lon, -lat, roll]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rotation {
    pub lon: f64,
    pub lat: f64,
    pub roll: f64,
}

impl Rotation {
    pub const fn new(lon: f64, lat: f64, roll: f64) -> Self {
        Self { lon, lat, roll }
    }

    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0);

    /// The rotation that brings `(lon, lat)` to the screen center,
    /// preserving the current roll.
    pub fn facing(lon: f64, lat: f64, roll: f64) -> Self {
        Self::new(-lon, -lat, roll)
    }

    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self::new(
            a.lon + (b.lon - a.lon) * t,
            a.lat + (b.lat - a.lat) * t,
            a.roll + (b.roll - a.roll) * t,
        )
    }
}

/// Orthographic projection of the unit sphere onto screen space.
///
/// Points on the far hemisphere are clipped (clip angle 90°): `project`
/// returns `None` for them, and visible points always land inside the
/// sphere's screen-space circle of radius `scale` around `translate`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orthographic {
    pub rotation: Rotation,
    pub scale: f64,
    pub translate: Vec2,
}

impl Orthographic {
    pub fn new(rotation: Rotation, scale: f64, translate: Vec2) -> Self {
        Self {
            rotation,
            scale,
            translate,
        }
    }

    /// Applies the rotation triple to a coordinate, returning rotated
    /// `(lambda, phi)` in radians.
    fn rotate(&self, lon_rad: f64, lat_rad: f64) -> (f64, f64) {
        let lam = lon_rad + self.rotation.lon.to_radians();
        let (sin_dphi, cos_dphi) = self.rotation.lat.to_radians().sin_cos();
        let (sin_dgam, cos_dgam) = self.rotation.roll.to_radians().sin_cos();

        let cos_phi = lat_rad.cos();
        let x = lam.cos() * cos_phi;
        let y = lam.sin() * cos_phi;
        let z = lat_rad.sin();
        let k = z * cos_dphi + x * sin_dphi;

        (
            (y * cos_dgam - k * sin_dgam).atan2(x * cos_dphi - z * sin_dphi),
            (k * cos_dgam + y * sin_dgam).clamp(-1.0, 1.0).asin(),
        )
    }

    /// Projects a `(lon, lat)` coordinate in degrees to screen space.
    /// `None` means the point is behind the visible hemisphere.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<Vec2> {
        let (lam, phi) = self.rotate(lon_deg.to_radians(), lat_deg.to_radians());
        if lam.cos() * phi.cos() < 0.0 {
            return None;
        }
        Some(Vec2::new(
            self.translate.x + self.scale * phi.cos() * lam.sin(),
            self.translate.y - self.scale * phi.sin(),
        ))
    }
}

use foundation::math::Vec2;
use rand::Rng;
use render::color::Rgba;
use render::commands::{DrawCommand, RenderFrame, Stroke, TextAnchor, Viewport};
use runtime::animation::AnimationState;
use streaming::rows::GeoPoint;
use symbology::domain::ColorDomain;
use symbology::ramp::ColorRamp;

use crate::geometry::{graticule10, FeatureSet};
use crate::projection::{Orthographic, Rotation};

/// Resting projection scale as a fraction of the viewport's short side.
const SCALE_DIVISOR: f64 = 2.2;

/// Data points inside this inset from the sphere edge are drawn.
const DISC_INSET: f64 = 3.0;

/// Side length of a data-point square.
const DOT_SIZE: f64 = 6.0;

/// Per-frame shimmer amplitude for data points.
const DOT_JITTER: f64 = 0.75;

const HALO_RADIUS_FRACTION: f64 = 0.22;

const ATMOSPHERE: Rgba = Rgba::new(147.0 / 255.0, 197.0 / 255.0, 253.0 / 255.0, 0.22);
const HALO_STROKE: Rgba = Rgba::new(248.0 / 255.0, 250.0 / 255.0, 252.0 / 255.0, 0.85);

/// The coordinate and label highlighted for the current narrative step.
#[derive(Debug, Clone, PartialEq)]
pub struct Focus {
    pub lon: f64,
    pub lat: f64,
    pub label: String,
}

struct LandStyle {
    fill: Rgba,
    stroke: Stroke,
}

fn land_style(cinematic: bool) -> LandStyle {
    if cinematic {
        LandStyle {
            fill: Rgba::from_u8(15, 23, 42, 1.0),
            stroke: Stroke {
                color: Rgba::from_u8(255, 255, 255, 0.95),
                width: 1.2,
            },
        }
    } else {
        LandStyle {
            fill: Rgba::from_u8(255, 255, 255, 0.03),
            stroke: Stroke {
                color: Rgba::from_u8(0, 0, 0, 1.0),
                width: 0.6,
            },
        }
    }
}

fn graticule_stroke(cinematic: bool) -> Stroke {
    if cinematic {
        Stroke {
            color: Rgba::from_u8(255, 255, 255, 0.08),
            width: 0.4,
        }
    } else {
        Stroke {
            color: Rgba::from_u8(0, 0, 0, 0.06),
            width: 0.4,
        }
    }
}

/// The globe draw pass.
///
/// Owns the current snapshot wholesale: a data update replaces the point
/// set and domain together. Tolerates missing countries, data, or focus by
/// skipping the corresponding draw step.
pub struct GlobeRenderer {
    viewport: Viewport,
    projection: Orthographic,
    resting_scale: f64,
    graticule: Vec<Vec<[f64; 2]>>,
    countries: Option<FeatureSet>,
    points: Vec<GeoPoint>,
    domain: ColorDomain,
    ramp: ColorRamp,
    focus: Option<Focus>,
}

impl GlobeRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        let viewport = Viewport::new(width, height);
        let resting_scale = viewport.min_dim() / SCALE_DIVISOR;
        Self {
            projection: Orthographic::new(
                Rotation::new(-80.0, -10.0, 0.0),
                resting_scale,
                viewport.center(),
            ),
            viewport,
            resting_scale,
            graticule: graticule10(),
            countries: None,
            points: Vec::new(),
            domain: ColorDomain::UNIT,
            ramp: ColorRamp::emissions(),
            focus: None,
        }
    }

    /// Recomputes scale and translation for a new viewport, preserving the
    /// current rotation.
    pub fn resize(&mut self, width: f64, height: f64) {
        let rotation = self.projection.rotation;
        self.viewport.resize(width, height);
        self.resting_scale = self.viewport.min_dim() / SCALE_DIVISOR;
        self.projection =
            Orthographic::new(rotation, self.resting_scale, self.viewport.center());
    }

    pub fn resting_scale(&self) -> f64 {
        self.resting_scale
    }

    pub fn projection(&self) -> &Orthographic {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut Orthographic {
        &mut self.projection
    }

    pub fn set_countries(&mut self, countries: FeatureSet) {
        self.countries = Some(countries);
    }

    pub fn has_countries(&self) -> bool {
        self.countries.is_some()
    }

    /// Replaces the active snapshot wholesale.
    pub fn set_snapshot(&mut self, points: Vec<GeoPoint>, domain: ColorDomain) {
        self.points = points;
        self.domain = domain;
    }

    pub fn domain(&self) -> ColorDomain {
        self.domain
    }

    pub fn set_focus(&mut self, focus: Option<Focus>) {
        self.focus = focus;
    }

    /// Emits this frame's draw commands.
    ///
    /// Order: ocean disc, atmosphere glow, data points, focus halo and
    /// label, then graticule and country outlines on top. While zooming only
    /// the background and outlines are drawn. The label waits for
    /// `rotation_settled` so it never slides with an in-flight tween.
    pub fn render(
        &self,
        state: &AnimationState,
        rotation_settled: bool,
        rng: &mut impl Rng,
        out: &mut RenderFrame,
    ) {
        if !state.earth_visible {
            return;
        }

        let center = self.projection.translate;
        let radius = self.projection.scale;

        out.push(DrawCommand::Disc {
            center,
            radius,
            color: self.ramp.color_for(self.domain, self.domain.min),
        });
        out.push(DrawCommand::RadialGradient {
            center,
            radius: radius * 1.12,
            inner: ATMOSPHERE,
            outer: ATMOSPHERE.with_alpha(0.0),
        });

        if state.zooming {
            self.push_countries(state.cinematic, out);
            return;
        }

        self.push_points(state, rng, out);
        self.push_focus(state.cinematic, rotation_settled, out);
        self.push_graticule(state.cinematic, out);
        self.push_countries(state.cinematic, out);
    }

    fn push_points(&self, state: &AnimationState, rng: &mut impl Rng, out: &mut RenderFrame) {
        if self.points.is_empty() {
            return;
        }
        let center = self.projection.translate;
        let r = self.projection.scale - DISC_INSET;
        let r2 = r * r;
        let dot_transition = state.dot_transition.value();

        for point in &self.points {
            let Some(projected) = self.projection.project(point.lon, point.lat) else {
                continue;
            };
            if projected.distance_squared(center) > r2 {
                continue;
            }

            let intensity = if self.domain.high > 0.0 {
                (point.value / self.domain.high).min(1.0)
            } else {
                0.0
            };
            let alpha = (0.25 + 0.75 * intensity) * dot_transition * point.weight;
            if alpha <= 0.0 {
                continue;
            }

            let jitter = Vec2::new(
                rng.gen_range(-DOT_JITTER..DOT_JITTER),
                rng.gen_range(-DOT_JITTER..DOT_JITTER),
            );
            let at = projected + jitter;
            out.push(DrawCommand::Rect {
                min: Vec2::new(at.x - DOT_SIZE / 2.0, at.y - DOT_SIZE / 2.0),
                size: Vec2::new(DOT_SIZE, DOT_SIZE),
                color: self
                    .ramp
                    .color_for(self.domain, point.value)
                    .with_alpha(alpha),
            });
        }
    }

    fn push_focus(&self, cinematic: bool, rotation_settled: bool, out: &mut RenderFrame) {
        let Some(focus) = &self.focus else {
            return;
        };
        let Some(center) = self.projection.project(focus.lon, focus.lat) else {
            return;
        };
        let radius = self.projection.scale * HALO_RADIUS_FRACTION;
        out.push(DrawCommand::Circle {
            center,
            radius,
            stroke: Stroke {
                color: HALO_STROKE,
                width: 1.5,
            },
        });

        if rotation_settled {
            let color = if cinematic {
                Rgba::from_u8(248, 250, 252, 0.95)
            } else {
                Rgba::from_u8(15, 23, 42, 0.95)
            };
            out.push(DrawCommand::Text {
                origin: Vec2::new(center.x, center.y - radius - 10.0),
                content: focus.label.clone(),
                size_px: 14.0,
                color,
                anchor: TextAnchor::Middle,
            });
        }
    }

    fn push_graticule(&self, cinematic: bool, out: &mut RenderFrame) {
        let stroke = graticule_stroke(cinematic);
        for line in &self.graticule {
            self.push_polyline(line, stroke, out);
        }
    }

    fn push_countries(&self, cinematic: bool, out: &mut RenderFrame) {
        let Some(countries) = &self.countries else {
            return;
        };
        let style = land_style(cinematic);
        for feature in &countries.features {
            for ring in &feature.rings {
                self.push_ring(ring, &style, out);
            }
        }
    }

    /// A fully visible ring is filled and closed; a partially clipped ring
    /// degrades to stroked runs of its visible vertices.
    fn push_ring(&self, ring: &[[f64; 2]], style: &LandStyle, out: &mut RenderFrame) {
        let projected: Vec<Option<Vec2>> = ring
            .iter()
            .map(|v| self.projection.project(v[0], v[1]))
            .collect();

        if !projected.is_empty() && projected.iter().all(Option::is_some) {
            out.push(DrawCommand::Path {
                points: projected.into_iter().flatten().collect(),
                closed: true,
                fill: Some(style.fill),
                stroke: Some(style.stroke),
            });
            return;
        }

        let mut run: Vec<Vec2> = Vec::new();
        for p in projected {
            match p {
                Some(v) => run.push(v),
                None => {
                    if run.len() >= 2 {
                        out.push(DrawCommand::Path {
                            points: std::mem::take(&mut run),
                            closed: false,
                            fill: None,
                            stroke: Some(style.stroke),
                        });
                    } else {
                        run.clear();
                    }
                }
            }
        }
        if run.len() >= 2 {
            out.push(DrawCommand::Path {
                points: run,
                closed: false,
                fill: None,
                stroke: Some(style.stroke),
            });
        }
    }

    fn push_polyline(&self, line: &[[f64; 2]], stroke: Stroke, out: &mut RenderFrame) {
        let mut run: Vec<Vec2> = Vec::new();
        for v in line {
            match self.projection.project(v[0], v[1]) {
                Some(p) => run.push(p),
                None => {
                    if run.len() >= 2 {
                        out.push(DrawCommand::Path {
                            points: std::mem::take(&mut run),
                            closed: false,
                            fill: None,
                            stroke: Some(stroke),
                        });
                    } else {
                        run.clear();
                    }
                }
            }
        }
        if run.len() >= 2 {
            out.push(DrawCommand::Path {
                points: run,
                closed: false,
                fill: None,
                stroke: Some(stroke),
            });
        }
    }
}

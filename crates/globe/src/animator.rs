use foundation::easing::cubic_in_out;
use foundation::time::{Time, TimeSpan};

use crate::projection::{Orthographic, Rotation};

/// Handle for a started tween, used to observe cancellation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenId(pub u64);

#[derive(Debug)]
struct RotationTween {
    id: TweenId,
    start: Rotation,
    end: Rotation,
    span: TimeSpan,
    cancelled: bool,
}

#[derive(Debug)]
struct ScaleTween {
    id: TweenId,
    start: f64,
    end: f64,
    span: TimeSpan,
    cancelled: bool,
}

/// Cancelable rotation/scale tweens over the orthographic projection.
///
/// At most one tween of each kind is live: starting a new one sets the
/// cancellation flag on the old (last-writer-wins, no queueing). Cancellation
/// is cooperative: a cancelled tween's next `advance` visit drops it without
/// writing to the projection, and the flag is never cleared. Spans are
/// wall-time (`Time`), so durations hold under uneven frame rates.
#[derive(Debug, Default)]
pub struct Animator {
    next_id: u64,
    rotations: Vec<RotationTween>,
    scales: Vec<ScaleTween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Starts rotating toward `(lon, lat)`, cancelling any in-flight
    /// rotation tween. Roll is preserved.
    pub fn tween_rotation(
        &mut self,
        projection: &Orthographic,
        lon: f64,
        lat: f64,
        duration_s: f64,
        now: Time,
    ) -> TweenId {
        for tween in &mut self.rotations {
            tween.cancelled = true;
        }
        let id = self.fresh_id();
        let start = projection.rotation;
        self.rotations.push(RotationTween {
            id,
            start,
            end: Rotation::facing(lon, lat, start.roll),
            span: TimeSpan::starting_at(now, duration_s),
            cancelled: false,
        });
        id
    }

    /// Starts the zoom tween, snapping the projection to `start_scale`
    /// immediately and cancelling any in-flight scale tween.
    pub fn tween_scale(
        &mut self,
        projection: &mut Orthographic,
        start_scale: f64,
        end_scale: f64,
        duration_s: f64,
        now: Time,
    ) -> TweenId {
        for tween in &mut self.scales {
            tween.cancelled = true;
        }
        let id = self.fresh_id();
        projection.scale = start_scale;
        self.scales.push(ScaleTween {
            id,
            start: start_scale,
            end: end_scale,
            span: TimeSpan::starting_at(now, duration_s),
            cancelled: false,
        });
        id
    }

    /// Applies live tweens for this frame. Cancelled tweens are dropped
    /// without touching the projection; completed tweens apply their end
    /// state and clear.
    pub fn advance(&mut self, now: Time, projection: &mut Orthographic) {
        let mut rotation_write: Option<Rotation> = None;
        self.rotations.retain(|tween| {
            if tween.cancelled {
                return false;
            }
            let k = cubic_in_out(tween.span.progress(now));
            rotation_write = Some(Rotation::lerp(tween.start, tween.end, k));
            !tween.span.is_complete(now)
        });
        if let Some(rotation) = rotation_write {
            projection.rotation = rotation;
        }

        let mut scale_write: Option<f64> = None;
        self.scales.retain(|tween| {
            if tween.cancelled {
                return false;
            }
            let k = cubic_in_out(tween.span.progress(now));
            scale_write = Some(tween.start + (tween.end - tween.start) * k);
            !tween.span.is_complete(now)
        });
        if let Some(scale) = scale_write {
            projection.scale = scale;
        }
    }

    /// True once no rotation tween is live. Gates the focus label so it
    /// never slides across the screen.
    pub fn rotation_settled(&self) -> bool {
        !self.rotations.iter().any(|t| !t.cancelled)
    }

    pub fn zoom_active(&self) -> bool {
        self.scales.iter().any(|t| !t.cancelled)
    }

    /// Reports whether the given tween has been cancelled. `None` once the
    /// tween has been dropped from the animator entirely.
    pub fn is_cancelled(&self, id: TweenId) -> Option<bool> {
        self.rotations
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.cancelled)
            .or_else(|| self.scales.iter().find(|t| t.id == id).map(|t| t.cancelled))
    }
}

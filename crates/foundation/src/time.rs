/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Self = Self(0.0);

    pub fn after(self, seconds: f64) -> Self {
        Self(self.0 + seconds)
    }

    pub fn since(self, earlier: Self) -> f64 {
        self.0 - earlier.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn starting_at(start: Time, duration_s: f64) -> Self {
        Self {
            start,
            end: start.after(duration_s.max(0.0)),
        }
    }

    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    /// Normalized position of `t` in the span, clamped to [0, 1].
    ///
    /// Zero-duration spans report 1.0 for any `t >= start` so an instant span
    /// completes on the frame it was created.
    pub fn progress(&self, t: Time) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            if t.0 >= self.start.0 { 1.0 } else { 0.0 }
        } else {
            ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self, t: Time) -> bool {
        self.progress(t) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};

    #[test]
    fn progress_is_clamped() {
        let span = TimeSpan::starting_at(Time(1.0), 2.0);
        assert_eq!(span.progress(Time(0.0)), 0.0);
        assert_eq!(span.progress(Time(2.0)), 0.5);
        assert_eq!(span.progress(Time(10.0)), 1.0);
    }

    #[test]
    fn instant_span_completes_immediately() {
        let span = TimeSpan::instant(Time(3.0));
        assert_eq!(span.duration(), 0.0);
        assert!(span.is_complete(Time(3.0)));
        assert!(!span.is_complete(Time(2.9)));
    }

    #[test]
    fn time_since_is_signed() {
        assert_eq!(Time(5.0).since(Time(2.0)), 3.0);
        assert_eq!(Time(2.0).since(Time(5.0)), -3.0);
    }
}

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// 0° on a circular track sits at 12 o'clock.
pub const TWELVE_O_CLOCK: f64 = -PI / 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAngle {
    /// In `[0, 360)`.
    pub degrees: f64,
    /// In `[0, 2π)`, with 0° mapped to 12 o'clock.
    pub radians: f64,
}

/// Floors `degrees` into `[0, 360)` and converts it to screen radians where
/// 0° is at the top of the circle. Non-finite input reads as 0°.
pub fn normalize_degrees(degrees: f64) -> NormalizedAngle {
    let mut degrees = if degrees.is_finite() {
        degrees.rem_euclid(360.0)
    } else {
        0.0
    };
    if degrees >= 360.0 {
        degrees = 0.0;
    }

    let mut radians = degrees / 180.0 * PI + TWELVE_O_CLOCK;
    if radians < 0.0 {
        radians += TAU;
    }

    NormalizedAngle { degrees, radians }
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_radians(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid may round up to the divisor
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest distance between two angles, in `[0, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}

/// Angle of `point` around `center`, in `[0, 2π)` and growing clockwise on screen.
pub fn pointer_angle(point: Point, center: Point) -> f64 {
    let (dx, dy) = (point.x - center.x, point.y - center.y);
    normalize_radians(dy.atan2(dx))
}

/// Resolved track parameters. Recomputed whenever the widget's configuration
/// changes and read by every mapping function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackGeometry {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrackKind {
    Linear(LinearTrack),
    Angular(AngularTrack),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrack {
    pub length_px: f64,
    pub knob_size_px: f64,
}

impl LinearTrack {
    /// Distance the knob's leading edge can travel along the track.
    pub fn travel_px(&self) -> f64 {
        (self.length_px - self.knob_size_px).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngularTrack {
    pub zero_radians: f64,
    /// Swept range in the direction of travel, in `(0, 2π]`.
    pub span_radians: f64,
    pub counter_clockwise: bool,
    pub radius: f64,
    pub margin: f64,
}

impl AngularTrack {
    /// Widget-local coordinate of the track center (same on both axes).
    pub fn center(&self) -> f64 {
        self.radius + self.margin
    }

    pub fn is_full_circle(&self) -> bool {
        self.span_radians >= TAU
    }

    pub fn point_at(&self, radians: f64) -> Point {
        let c = self.center();
        Point::new(
            c + radians.cos() * self.radius,
            c + radians.sin() * self.radius,
        )
    }

    /// How far `radians` lies past the zero point, measured in the direction of travel.
    pub fn offset_from_zero(&self, radians: f64) -> f64 {
        let delta = if self.counter_clockwise {
            self.zero_radians - radians
        } else {
            radians - self.zero_radians
        };
        normalize_radians(delta)
    }

    pub fn radians_at_percent(&self, percent: f64) -> f64 {
        let swept = percent * self.span_radians;
        normalize_radians(if self.counter_clockwise {
            self.zero_radians - swept
        } else {
            self.zero_radians + swept
        })
    }
}

impl TrackGeometry {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` within the range; 0 for an empty range.
    pub fn percent_for(&self, value: f64) -> f64 {
        let range = self.range();
        if range > 0.0 {
            (value - self.min) / range
        } else {
            0.0
        }
    }

    pub fn value_at(&self, percent: f64) -> f64 {
        self.min + percent * self.range()
    }

    pub fn midpoint(&self) -> f64 {
        self.min + self.range() / 2.0
    }

    /// Clamps into `[min, max]`. NaN reads as `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Rounds onto the `min + k·step` grid, then clamps.
    pub fn snap_to_step(&self, value: f64) -> f64 {
        if !(self.step > 0.0) || !self.step.is_finite() {
            return self.clamp(value);
        }
        let steps = ((value - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Maps a widget's top-left corner to the reference point the pointer
    /// mapper measures against: the leading edge of a linear track, or the
    /// center of a circular one.
    pub fn track_origin(&self, bounds_origin: Point) -> Point {
        match self.kind {
            TrackKind::Linear(_) => bounds_origin,
            TrackKind::Angular(track) => bounds_origin.offset(track.center(), track.center()),
        }
    }
}

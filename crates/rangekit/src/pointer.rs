use crate::geometry::{AngularTrack, LinearTrack, Point, TrackGeometry, pointer_angle};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Client coordinates carried by a mouse or touch event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    #[serde(default)]
    pub touches: Option<Vec<Point>>,
    #[serde(default)]
    pub client: Option<Point>,
}

impl PointerInput {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            touches: None,
            client: Some(Point::new(x, y)),
        }
    }

    pub fn touch(x: f64, y: f64) -> Self {
        Self {
            touches: Some(vec![Point::new(x, y)]),
            client: None,
        }
    }

    /// The first touch point when present, else the event's own client
    /// coordinates. Missing coordinates read as 0.
    pub fn client_point(&self) -> Point {
        self.touches
            .as_ref()
            .and_then(|touches| touches.first().copied())
            .or(self.client)
            .unwrap_or_default()
    }
}

/// Share of the track addressed by a pointer, in `[0, 1]`. The pointer is
/// taken to hold the knob by its center, so the knob's leading edge lands
/// where [`crate::position`] would put it.
pub fn linear_percent(track: &LinearTrack, point: Point, origin: Point) -> f64 {
    let travel = track.travel_px();
    if travel <= 0.0 {
        return 0.0;
    }
    let along = point.x - origin.x - track.knob_size_px / 2.0;
    (along / travel).clamp(0.0, 1.0)
}

/// Share of the arc addressed by a pointer around `center`. Full circles wrap
/// into `[0, 1)`; on a bounded arc a pointer in the gap snaps to whichever end
/// is angularly closer, so the knob never jumps across the gap.
pub fn angular_percent(track: &AngularTrack, point: Point, center: Point) -> f64 {
    let offset = track.offset_from_zero(pointer_angle(point, center));

    if track.is_full_circle() {
        return (offset / TAU).rem_euclid(1.0);
    }

    let span = track.span_radians;
    let offset = if offset <= span {
        offset
    } else if TAU - offset < offset - span {
        0.0
    } else {
        span
    };
    offset / span
}

/// Dampens the flip a knob would make when the pointer crosses the seam of
/// the angle calculation: a move of half the range or more is refused and the
/// current value kept (held inside the track bounds).
pub fn guard_large_jump(geometry: &TrackGeometry, value: f64, current: Option<f64>) -> f64 {
    let Some(current) = current.filter(|c| !c.is_nan()) else {
        return value;
    };
    let half = geometry.range() / 2.0;
    if !(half > 0.0) {
        return value;
    }

    if current - value >= half {
        current.min(geometry.max)
    } else if value - current >= half {
        current.max(geometry.min)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn full_circle(zero_radians: f64, counter_clockwise: bool) -> AngularTrack {
        AngularTrack {
            zero_radians,
            span_radians: TAU,
            counter_clockwise,
            radius: 50.0,
            margin: 0.0,
        }
    }

    fn geometry(min: f64, max: f64, track: AngularTrack) -> TrackGeometry {
        TrackGeometry {
            min,
            max,
            step: 1.0,
            kind: crate::geometry::TrackKind::Angular(track),
        }
    }

    const CENTER: Point = Point { x: 0.0, y: 0.0 };

    #[test]
    fn test_touch_wins_over_client() {
        let input = PointerInput {
            touches: Some(vec![Point::new(3.0, 4.0), Point::new(9.0, 9.0)]),
            client: Some(Point::new(1.0, 1.0)),
        };
        assert_eq!(input.client_point(), Point::new(3.0, 4.0));
        assert_eq!(PointerInput::mouse(5.0, 6.0).client_point(), Point::new(5.0, 6.0));
        assert_eq!(PointerInput::default().client_point(), Point::default());
    }

    #[test]
    fn test_empty_touch_list_uses_client() {
        let input = PointerInput {
            touches: Some(Vec::new()),
            client: Some(Point::new(7.0, 8.0)),
        };
        assert_eq!(input.client_point(), Point::new(7.0, 8.0));
    }

    #[test]
    fn test_linear_percent_clamps() {
        let track = LinearTrack {
            length_px: 200.0,
            knob_size_px: 0.0,
        };
        let origin = Point::new(10.0, 0.0);
        assert_eq!(linear_percent(&track, Point::new(110.0, 0.0), origin), 0.5);
        assert_eq!(linear_percent(&track, Point::new(-50.0, 0.0), origin), 0.0);
        assert_eq!(linear_percent(&track, Point::new(500.0, 0.0), origin), 1.0);
    }

    #[test]
    fn test_linear_percent_measures_knob_center() {
        let track = LinearTrack {
            length_px: 116.0,
            knob_size_px: 16.0,
        };
        let origin = Point::default();
        assert_eq!(linear_percent(&track, Point::new(8.0, 0.0), origin), 0.0);
        assert_eq!(linear_percent(&track, Point::new(58.0, 0.0), origin), 0.5);
        assert_eq!(linear_percent(&track, Point::new(108.0, 0.0), origin), 1.0);
    }

    #[test]
    fn test_angular_percent_clockwise_from_three_o_clock() {
        let track = full_circle(0.0, false);
        assert_relative_eq!(angular_percent(&track, Point::new(10.0, 0.0), CENTER), 0.0);
        assert_relative_eq!(angular_percent(&track, Point::new(0.0, 10.0), CENTER), 0.25);
        assert_relative_eq!(angular_percent(&track, Point::new(-10.0, 0.0), CENTER), 0.5);
        assert_relative_eq!(angular_percent(&track, Point::new(0.0, -10.0), CENTER), 0.75);
    }

    #[test]
    fn test_angular_percent_counter_clockwise() {
        // zero at 12 o'clock, growing to the left
        let track = full_circle(3.0 * PI / 2.0, true);
        assert_relative_eq!(angular_percent(&track, Point::new(0.0, -10.0), CENTER), 0.0);
        assert_relative_eq!(angular_percent(&track, Point::new(-10.0, 0.0), CENTER), 0.25);
        assert_relative_eq!(angular_percent(&track, Point::new(10.0, 0.0), CENTER), 0.75);
    }

    #[test]
    fn test_bounded_arc_snaps_to_closer_end() {
        // clockwise half circle from 3 o'clock to 9 o'clock through 6 o'clock
        let track = AngularTrack {
            span_radians: PI,
            ..full_circle(0.0, false)
        };
        assert_relative_eq!(angular_percent(&track, Point::new(0.0, 10.0), CENTER), 0.5);
        // just above 3 o'clock: in the gap, nearest the start
        assert_eq!(angular_percent(&track, Point::new(10.0, -1.0), CENTER), 0.0);
        // just above 9 o'clock: in the gap, nearest the end
        assert_eq!(angular_percent(&track, Point::new(-10.0, -1.0), CENTER), 1.0);
    }

    #[test]
    fn test_guard_refuses_large_decrease() {
        let geometry = geometry(0.0, 100.0, full_circle(0.0, false));
        assert_eq!(guard_large_jump(&geometry, 5.0, Some(90.0)), 90.0);
    }

    #[test]
    fn test_guard_refuses_large_increase() {
        let geometry = geometry(0.0, 100.0, full_circle(0.0, false));
        assert_eq!(guard_large_jump(&geometry, 97.0, Some(3.0)), 3.0);
    }

    #[test]
    fn test_guard_allows_small_moves_and_missing_current() {
        let geometry = geometry(0.0, 100.0, full_circle(0.0, false));
        assert_eq!(guard_large_jump(&geometry, 60.0, Some(20.0)), 60.0);
        assert_eq!(guard_large_jump(&geometry, 5.0, None), 5.0);
        assert_eq!(guard_large_jump(&geometry, 5.0, Some(f64::NAN)), 5.0);
    }

    #[test]
    fn test_guard_scales_with_range() {
        let geometry = geometry(-1.0, 1.0, full_circle(0.0, false));
        assert_eq!(guard_large_jump(&geometry, -0.9, Some(0.9)), 0.9);
        assert_eq!(guard_large_jump(&geometry, 0.5, Some(0.9)), 0.5);
    }
}

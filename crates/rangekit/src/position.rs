use crate::geometry::{AngularTrack, LinearTrack, Point, TrackGeometry};
use crate::knobs::Knobs;
use serde::{Serialize, Serializer};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearKnob {
    pub percent: f64,
    pub offset_px: f64,
}

/// Highlighted stretch of a linear track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    pub start_px: f64,
    pub end_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearRender {
    pub knobs: Knobs<LinearKnob>,
    pub fill: Fill,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngularKnob {
    pub percent: f64,
    pub radians: f64,
    pub point: Point,
    pub transform: KnobTransform,
}

/// CSS transform placing a knob on the track, rotated to face outwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobTransform {
    pub translate: Point,
    pub rotate_radians: f64,
}

impl fmt::Display for KnobTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) rotate({}rad)",
            self.translate.x, self.translate.y, self.rotate_radians
        )
    }
}

impl Serialize for KnobTransform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Elliptical arc between two points on the track, drawn as SVG path data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPath {
    pub start: Point,
    pub end: Point,
    pub radius: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} A {r} {r} 0 {} {} {} {}",
            self.start.x,
            self.start.y,
            u8::from(self.large_arc),
            u8::from(self.sweep),
            self.end.x,
            self.end.y,
            r = self.radius,
        )
    }
}

impl Serialize for ArcPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngularRender {
    pub knobs: Knobs<AngularKnob>,
    pub arc: ArcPath,
    pub complete: bool,
}

/// Everything a renderer needs to place knobs and progress for one set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderDescriptor {
    Linear(LinearRender),
    Angular(AngularRender),
}

impl RenderDescriptor {
    /// The (last) knob sits at the end of the track.
    pub fn complete(&self) -> bool {
        match self {
            RenderDescriptor::Linear(render) => render.complete,
            RenderDescriptor::Angular(render) => render.complete,
        }
    }
}

fn last_percent(percents: Knobs<f64>) -> f64 {
    match percents {
        Knobs::One(p) | Knobs::Two(_, p) => p,
    }
}

pub fn linear_render(geometry: &TrackGeometry, track: &LinearTrack, values: Knobs<f64>) -> LinearRender {
    let travel = track.travel_px();
    let percents = values.map(|v| geometry.percent_for(v));
    let knobs = percents.map(|percent| LinearKnob {
        percent,
        offset_px: percent * travel,
    });

    let fill = match knobs {
        Knobs::One(knob) => Fill {
            start_px: 0.0,
            end_px: knob.offset_px,
        },
        Knobs::Two(a, b) => Fill {
            start_px: a.offset_px,
            end_px: b.offset_px,
        },
    };

    LinearRender {
        knobs,
        fill,
        complete: last_percent(percents) >= 1.0,
    }
}

fn angular_knob(track: &AngularTrack, percent: f64) -> AngularKnob {
    let radians = track.radians_at_percent(percent);
    let point = track.point_at(radians);
    AngularKnob {
        percent,
        radians,
        point,
        transform: KnobTransform {
            translate: point,
            rotate_radians: radians + FRAC_PI_2,
        },
    }
}

pub fn angular_render(
    geometry: &TrackGeometry,
    track: &AngularTrack,
    values: Knobs<f64>,
) -> AngularRender {
    let percents = values.map(|v| geometry.percent_for(v));
    let knobs = percents.map(|percent| angular_knob(track, percent));

    // Both arcs run in the direction of travel; the swept angle alone decides
    // which of the two candidate arcs is drawn.
    let (start, end, swept) = match knobs {
        Knobs::One(knob) => (
            track.point_at(track.zero_radians),
            knob.point,
            knob.percent * track.span_radians,
        ),
        Knobs::Two(a, b) => (a.point, b.point, (b.percent - a.percent) * track.span_radians),
    };

    AngularRender {
        knobs,
        arc: ArcPath {
            start,
            end,
            radius: track.radius,
            large_arc: swept > PI,
            sweep: !track.counter_clockwise,
        },
        complete: last_percent(percents) >= 1.0,
    }
}

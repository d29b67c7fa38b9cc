//! Stateless entry points for a rendering layer.
//!
//! The renderer owns all mutable state and measurement; it calls these per
//! frame or event with a geometry snapshot and gets plain values back.

use crate::config::{RawConfig, normalize_track};
use crate::geometry::{Point, TrackGeometry, TrackKind};
use crate::knobs::Knobs;
use crate::pointer::{PointerInput, angular_percent, guard_large_jump, linear_percent};
use crate::position::{RenderDescriptor, angular_render, linear_render};

pub use crate::knobs::apply_knob_move;

pub fn resolve_config(raw: &RawConfig) -> TrackGeometry {
    normalize_track(raw)
}

/// Domain value under the pointer. `origin` is the track's leading edge for a
/// linear track and its center for a circular one. `current` arms the
/// large-jump guard on circular tracks.
pub fn value_from_pointer(
    geometry: &TrackGeometry,
    input: &PointerInput,
    origin: Point,
    current: Option<f64>,
) -> f64 {
    let point = input.client_point();
    match geometry.kind {
        TrackKind::Linear(track) => geometry.value_at(linear_percent(&track, point, origin)),
        TrackKind::Angular(track) => {
            let value = geometry.value_at(angular_percent(&track, point, origin));
            guard_large_jump(geometry, value, current)
        }
    }
}

pub fn position_from_value(geometry: &TrackGeometry, values: Knobs<f64>) -> RenderDescriptor {
    match geometry.kind {
        TrackKind::Linear(track) => RenderDescriptor::Linear(linear_render(geometry, &track, values)),
        TrackKind::Angular(track) => {
            RenderDescriptor::Angular(angular_render(geometry, &track, values))
        }
    }
}

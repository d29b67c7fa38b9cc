use crate::geometry::{Point, TrackGeometry, TrackKind, angle_difference, pointer_angle};
use crate::pointer::angular_percent;
use serde::{Serialize, Serializer};
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, StrumDisplay)]
pub enum KnobId {
    #[default]
    First,
    Second,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("knob index {0} is out of range (expected 0 or 1)")]
pub struct KnobIdError(pub usize);

impl KnobId {
    pub fn as_index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Result<Self, KnobIdError> {
        Self::iter().nth(idx).ok_or(KnobIdError(idx))
    }

    pub fn other(&self) -> Self {
        match self {
            KnobId::First => KnobId::Second,
            KnobId::Second => KnobId::First,
        }
    }
}

impl TryFrom<usize> for KnobId {
    type Error = KnobIdError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        Self::from_index(idx)
    }
}

// Change notifications identify knobs by position.
impl Serialize for KnobId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_index() as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KnobState {
    pub id: KnobId,
    pub value: f64,
    pub focused: bool,
}

impl KnobState {
    pub fn new(id: KnobId, value: f64, focused: bool) -> Self {
        Self { id, value, focused }
    }
}

/// One value per knob: a single slider carries one, a range slider two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Knobs<T> {
    One(T),
    Two(T, T),
}

impl<T: Clone> Knobs<T> {
    pub fn first(&self) -> T {
        match self {
            Knobs::One(a) | Knobs::Two(a, _) => a.clone(),
        }
    }

    pub fn get(&self, id: KnobId) -> Option<T> {
        match (self, id) {
            (Knobs::One(a), KnobId::First) | (Knobs::Two(a, _), KnobId::First) => Some(a.clone()),
            (Knobs::Two(_, b), KnobId::Second) => Some(b.clone()),
            (Knobs::One(_), KnobId::Second) => None,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Knobs::Two(..))
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Knobs<U> {
        match self {
            Knobs::One(a) => Knobs::One(f(a)),
            Knobs::Two(a, b) => Knobs::Two(f(a), f(b)),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Knobs::One(a) => vec![a.clone()],
            Knobs::Two(a, b) => vec![a.clone(), b.clone()],
        }
    }
}

/// Moves the focused knob to `new_value` and drags the other one along when
/// they would cross. The returned pair is always sorted ascending; equal
/// values are allowed.
pub fn apply_knob_move(
    knobs: [KnobState; 2],
    focused: KnobId,
    new_value: f64,
) -> [KnobState; 2] {
    let [mut first, mut second] = knobs;

    match focused {
        KnobId::First => {
            first.value = new_value;
            second.value = second.value.max(new_value);
        }
        KnobId::Second => {
            second.value = new_value;
            first.value = first.value.min(new_value);
        }
    }

    first.focused = focused == KnobId::First;
    second.focused = focused == KnobId::Second;
    [first, second]
}

pub fn focused_knob(knobs: &[KnobState; 2]) -> KnobId {
    if knobs[1].focused && !knobs[0].focused {
        KnobId::Second
    } else {
        KnobId::First
    }
}

pub fn switch_focus(knobs: [KnobState; 2]) -> [KnobState; 2] {
    let next = focused_knob(&knobs).other();
    let [mut first, mut second] = knobs;
    first.focused = next == KnobId::First;
    second.focused = next == KnobId::Second;
    [first, second]
}

/// Orders an incoming pair the way the focused knob would have pushed it:
/// the unfocused knob gives way.
pub fn order_by_focus(first: f64, second: f64, focused: KnobId) -> (f64, f64) {
    match focused {
        KnobId::First => (first, first.max(second)),
        KnobId::Second => (first.min(second), second),
    }
}

/// Picks the knob closest to where the pointer went down. `origin` is the
/// mapper origin (see [`TrackGeometry::track_origin`]). Ties go to the first
/// knob.
pub fn nearest_knob(
    geometry: &TrackGeometry,
    values: [f64; 2],
    pointer: Point,
    origin: Point,
) -> KnobId {
    let distances = match geometry.kind {
        TrackKind::Linear(track) => {
            let at = pointer.x - origin.x - track.knob_size_px / 2.0;
            values.map(|v| (at - geometry.percent_for(v) * track.travel_px()).abs())
        }
        TrackKind::Angular(track) if track.is_full_circle() => {
            let angle = pointer_angle(pointer, origin);
            values.map(|v| angle_difference(angle, track.radians_at_percent(geometry.percent_for(v))))
        }
        // a bounded arc cannot be crossed through its gap; measure along the
        // arc from where the pointer snaps to
        TrackKind::Angular(track) => {
            let at = angular_percent(&track, pointer, origin);
            values.map(|v| (at - geometry.percent_for(v)).abs())
        }
    };

    if distances[1] < distances[0] {
        KnobId::Second
    } else {
        KnobId::First
    }
}

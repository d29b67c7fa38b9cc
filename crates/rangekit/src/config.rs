//! Normalization of raw widget configuration.
//!
//! Every field is optional and every invalid input silently falls back to its
//! default: a widget must always render, whatever its owner hands it.

use crate::geometry::{
    AngularTrack, LinearTrack, TrackGeometry, TrackKind, normalize_degrees, normalize_radians,
};
use crate::knobs::{KnobId, Knobs, order_by_focus};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DefaultOnError, DeserializeFromStr, serde_as};
use std::f64::consts::TAU;
use strum::{Display as StrumDisplay, EnumString};

pub const DEFAULT_MIN: f64 = 0.0;
pub const DEFAULT_MAX: f64 = 100.0;
pub const DEFAULT_STEP: f64 = 1.0;
pub const DEFAULT_TRACK_LENGTH: f64 = 200.0;
pub const DEFAULT_KNOB_SIZE: f64 = 16.0;
pub const DEFAULT_TRACK_RADIUS: f64 = 54.0;
pub const DEFAULT_TRACK_MARGIN: f64 = 10.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    #[strum(serialize = "horizontal", serialize = "linear")]
    Horizontal,
    #[strum(serialize = "circular", serialize = "angular")]
    Circular,
}

/// Form field name carried by a knob's hidden input.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct InputName(String);

crate::impl_string_newtype!(InputName);

/// Widget configuration as received from the owner. Fields that fail to
/// deserialize are read as absent.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    #[serde_as(as = "DefaultOnError")]
    pub shape: Shape,
    #[serde_as(as = "DefaultOnError")]
    pub min: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub max: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub step: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub multiple: Option<bool>,
    #[serde(deserialize_with = "lenient_values")]
    pub value: Option<Vec<Option<f64>>>,
    #[serde(deserialize_with = "lenient_values")]
    pub default_value: Option<Vec<Option<f64>>>,
    #[serde_as(as = "DefaultOnError")]
    pub zero_at_degrees: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub min_degrees: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub max_degrees: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub counter_clockwise: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    pub name: Option<InputName>,
    #[serde_as(as = "DefaultOnError")]
    pub name2: Option<InputName>,
    #[serde_as(as = "DefaultOnError")]
    pub track_length: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub knob_size: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub track_radius: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    pub track_margin: Option<f64>,
}

impl RawConfig {
    pub fn is_multiple(&self) -> bool {
        self.multiple.unwrap_or(false)
    }

    /// An owner that supplies `value` drives the widget.
    pub fn is_controlled(&self) -> bool {
        self.value.is_some()
    }
}

/// Accepts a number or an array of numbers. Entries that are not numbers are
/// kept as `None` so their position still counts.
fn lenient_values<'de, D>(deserializer: D) -> Result<Option<Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Number(f64),
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Entry>),
        One(Entry),
    }

    let number = |entry: Entry| match entry {
        Entry::Number(n) => Some(n),
        Entry::Other(_) => None,
    };

    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|values| match values {
        OneOrMany::Many(entries) => entries.into_iter().map(number).collect(),
        OneOrMany::One(entry) => vec![number(entry)],
    }))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn number(value: Option<f64>, fallback: f64) -> f64 {
    finite(value).unwrap_or(fallback)
}

fn resolve_bounds(min: Option<f64>, max: Option<f64>) -> (f64, f64) {
    let min = number(min, DEFAULT_MIN);
    let max = number(max, DEFAULT_MAX);
    if min > max {
        log::warn!("range min {min} exceeds max {max}; collapsing to a zero-width range at {max}");
        return (max, max);
    }
    (min, max)
}

fn resolve_angular(raw: &RawConfig) -> AngularTrack {
    let counter_clockwise = raw.counter_clockwise.unwrap_or(false);
    let radius = number(raw.track_radius, DEFAULT_TRACK_RADIUS).max(0.0);
    let margin = number(raw.track_margin, DEFAULT_TRACK_MARGIN).max(0.0);

    let mut track = AngularTrack {
        zero_radians: normalize_degrees(number(raw.zero_at_degrees, 0.0)).radians,
        span_radians: TAU,
        counter_clockwise,
        radius,
        margin,
    };

    let (lo, hi) = (finite(raw.min_degrees), finite(raw.max_degrees));
    if lo.is_some() || hi.is_some() {
        let lo = normalize_degrees(lo.unwrap_or(0.0));
        let hi = normalize_degrees(hi.unwrap_or(360.0));
        // the arc always runs clockwise from min to max; counter-clockwise
        // knobs start at max and travel back towards min
        let span = normalize_radians(hi.radians - lo.radians);
        track.zero_radians = if counter_clockwise { hi.radians } else { lo.radians };
        // coinciding bounds describe the whole circle
        track.span_radians = if span > 0.0 { span } else { TAU };
    }

    track
}

/// Resolves raw configuration into track geometry.
pub fn normalize_track(raw: &RawConfig) -> TrackGeometry {
    let (min, max) = resolve_bounds(raw.min, raw.max);
    let step = number(raw.step, DEFAULT_STEP);

    let kind = match raw.shape {
        Shape::Horizontal => TrackKind::Linear(LinearTrack {
            length_px: number(raw.track_length, DEFAULT_TRACK_LENGTH).max(0.0),
            knob_size_px: number(raw.knob_size, DEFAULT_KNOB_SIZE).max(0.0),
        }),
        Shape::Circular => TrackKind::Angular(resolve_angular(raw)),
    };

    TrackGeometry {
        min,
        max,
        step,
        kind,
    }
}

/// Initial knob values. `value` wins over `default_value`; missing or invalid
/// entries start halfway between min and max. A pair is ordered the way the
/// focused knob would push it.
pub fn resolve_values(raw: &RawConfig, geometry: &TrackGeometry, focused: KnobId) -> Knobs<f64> {
    let source = match (&raw.value, &raw.default_value) {
        (None, Some(defaults)) => Some(defaults),
        (value, _) => value.as_ref(),
    };
    let nth = |idx: usize| {
        let value = source.and_then(|values| values.get(idx).copied().flatten());
        geometry.clamp(number(value, geometry.midpoint()))
    };

    if raw.is_multiple() {
        let (first, second) = order_by_focus(nth(0), nth(1), focused);
        Knobs::Two(first, second)
    } else {
        Knobs::One(nth(0))
    }
}

/// Hidden-input names; the second is only present in multiple mode.
pub fn resolve_names(raw: &RawConfig) -> Knobs<InputName> {
    let first = raw.name.clone().unwrap_or_default();
    if raw.is_multiple() {
        Knobs::Two(first, raw.name2.clone().unwrap_or_default())
    } else {
        Knobs::One(first)
    }
}

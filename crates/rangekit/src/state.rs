use crate::config::{DEFAULT_STEP, RawConfig, resolve_values};
use crate::engine::{position_from_value, resolve_config, value_from_pointer};
use crate::geometry::{Point, TrackGeometry};
use crate::knobs::{
    KnobId, KnobState, Knobs, apply_knob_move, focused_knob, nearest_knob, order_by_focus,
    switch_focus,
};
use crate::pointer::PointerInput;
use crate::position::RenderDescriptor;
use serde::Serialize;
use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum StepDirection {
    #[strum(serialize = "decrease", serialize = "left")]
    Decrease,
    #[strum(serialize = "increase", serialize = "right")]
    Increase,
}

/// What the owner is told after an input. In multiple mode it names the
/// knob that moved and carries the resulting pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangeEvent {
    Single { value: f64 },
    Multiple { knob: KnobId, value: [f64; 2] },
}

/// Per-widget state. When controlled, inputs only report candidates and the
/// owner feeds the accepted value back through [`RangeState::set_external`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeState {
    geometry: TrackGeometry,
    knobs: Knobs<KnobState>,
    controlled: bool,
}

fn knob_states(values: Knobs<f64>, focused: KnobId) -> Knobs<KnobState> {
    match values {
        Knobs::One(v) => Knobs::One(KnobState::new(KnobId::First, v, true)),
        Knobs::Two(a, b) => Knobs::Two(
            KnobState::new(KnobId::First, a, focused == KnobId::First),
            KnobState::new(KnobId::Second, b, focused == KnobId::Second),
        ),
    }
}

impl RangeState {
    pub fn new(raw: &RawConfig) -> Self {
        let geometry = resolve_config(raw);
        let focused = KnobId::First;
        Self {
            knobs: knob_states(resolve_values(raw, &geometry, focused), focused),
            geometry,
            controlled: raw.is_controlled(),
        }
    }

    /// Applies changed configuration. Uncontrolled widgets keep their values
    /// (re-clamped) unless the knob count changed.
    pub fn reconfigure(&mut self, raw: &RawConfig) {
        let focused = self.focused();
        self.geometry = resolve_config(raw);
        self.controlled = raw.is_controlled();

        let values = if self.controlled || raw.is_multiple() != self.is_multiple() {
            resolve_values(raw, &self.geometry, focused)
        } else {
            self.ordered(self.values(), focused)
        };
        self.knobs = knob_states(values, focused);
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    pub fn knobs(&self) -> Knobs<KnobState> {
        self.knobs
    }

    pub fn values(&self) -> Knobs<f64> {
        self.knobs.map(|knob| knob.value)
    }

    pub fn is_controlled(&self) -> bool {
        self.controlled
    }

    pub fn is_multiple(&self) -> bool {
        self.knobs.is_pair()
    }

    pub fn focused(&self) -> KnobId {
        match self.knobs {
            Knobs::One(_) => KnobId::First,
            Knobs::Two(a, b) => focused_knob(&[a, b]),
        }
    }

    fn focused_value(&self) -> f64 {
        self.knobs.get(self.focused()).map_or(self.geometry.min, |knob| knob.value)
    }

    fn ordered(&self, values: Knobs<f64>, focused: KnobId) -> Knobs<f64> {
        match values.map(|v| self.geometry.clamp(v)) {
            Knobs::One(v) => Knobs::One(v),
            Knobs::Two(a, b) => {
                let (a, b) = order_by_focus(a, b, focused);
                Knobs::Two(a, b)
            }
        }
    }

    /// Starts a gesture. In multiple mode the knob nearest the pointer takes
    /// focus first; no jump guard applies since there is no drag yet.
    pub fn pointer_down(&mut self, input: &PointerInput, origin: Point) -> ChangeEvent {
        if let Knobs::Two(a, b) = self.knobs {
            let nearest = nearest_knob(&self.geometry, [a.value, b.value], input.client_point(), origin);
            self.focus(nearest);
        }
        let candidate = value_from_pointer(&self.geometry, input, origin, None);
        self.propose(candidate)
    }

    pub fn pointer_move(&mut self, input: &PointerInput, origin: Point) -> ChangeEvent {
        let current = self.focused_value();
        let candidate = value_from_pointer(&self.geometry, input, origin, Some(current));
        self.propose(candidate)
    }

    /// Keyboard step of the focused knob, snapped onto the step grid.
    pub fn step(&mut self, direction: StepDirection) -> ChangeEvent {
        let step = if self.geometry.step > 0.0 {
            self.geometry.step
        } else {
            DEFAULT_STEP
        };
        let delta = match direction {
            StepDirection::Decrease => -step,
            StepDirection::Increase => step,
        };
        let candidate = self.geometry.snap_to_step(self.focused_value() + delta);
        self.propose(candidate)
    }

    /// Hands input focus to the other knob. Single knobs ignore this.
    pub fn switch_focus(&mut self) -> KnobId {
        if let Knobs::Two(a, b) = self.knobs {
            let [a, b] = switch_focus([a, b]);
            self.knobs = Knobs::Two(a, b);
        }
        self.focused()
    }

    pub fn focus(&mut self, id: KnobId) {
        if self.focused() != id {
            self.switch_focus();
        }
    }

    /// Takes values supplied by the owner. A single value for a pair moves
    /// the focused knob.
    pub fn set_external(&mut self, values: Knobs<f64>) {
        let focused = self.focused();
        let next = match (self.knobs, values) {
            (Knobs::One(_), values) => Knobs::One(self.geometry.clamp(values.first())),
            (Knobs::Two(_, _), Knobs::Two(a, b)) => self.ordered(Knobs::Two(a, b), focused),
            (Knobs::Two(a, b), Knobs::One(v)) => {
                let [a, b] = apply_knob_move([a, b], focused, self.geometry.clamp(v));
                Knobs::Two(a.value, b.value)
            }
        };
        self.knobs = knob_states(next, focused);
    }

    fn propose(&mut self, candidate: f64) -> ChangeEvent {
        let candidate = self.geometry.clamp(candidate);

        match self.knobs {
            Knobs::One(knob) => {
                if !self.controlled {
                    self.knobs = Knobs::One(KnobState { value: candidate, ..knob });
                }
                ChangeEvent::Single { value: candidate }
            }
            Knobs::Two(a, b) => {
                let focused = self.focused();
                let [a, b] = apply_knob_move([a, b], focused, candidate);
                if !self.controlled {
                    self.knobs = Knobs::Two(a, b);
                }
                ChangeEvent::Multiple {
                    knob: focused,
                    value: [a.value, b.value],
                }
            }
        }
    }

    pub fn render(&self) -> RenderDescriptor {
        position_from_value(&self.geometry, self.values())
    }
}

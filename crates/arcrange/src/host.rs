//! Headless widget host.
//!
//! Owns one [`RangeState`] per configured widget and plays the part of the
//! rendering layer: it turns pointer, key and value events into engine calls
//! and reports the outcome as [`Notification`]s.

use crate::config::{self, Config, WidgetConfig, WidgetId};
use crate::events::{HostEvent, KeyCommand};
use parking_lot::Mutex;
use rangekit::config::resolve_names;
use rangekit::{
    ChangeEvent, DragSession, GestureListeners, InputName, Knobs, PointerInput, Point,
    RangeState, RenderDescriptor, StepDirection,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Widgets currently listening for pointer moves.
#[derive(Debug, Default)]
pub struct MoveListeners {
    live: Mutex<BTreeSet<WidgetId>>,
}

impl MoveListeners {
    pub fn is_subscribed(&self, id: &WidgetId) -> bool {
        self.live.lock().contains(id)
    }

    pub fn subscribed(&self) -> Vec<WidgetId> {
        self.live.lock().iter().cloned().collect()
    }
}

impl GestureListeners for MoveListeners {
    type Key = WidgetId;

    fn subscribe(&self, key: &WidgetId) {
        self.live.lock().insert(key.clone());
    }

    fn unsubscribe(&self, key: &WidgetId) {
        self.live.lock().remove(key);
    }
}

/// A named value as a form would submit it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: InputName,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub widget: WidgetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeEvent>,
    pub render: RenderDescriptor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,
}

#[derive(Debug)]
struct Widget {
    bounds: Point,
    names: Knobs<InputName>,
    state: RangeState,
}

impl Widget {
    fn new(config: &WidgetConfig) -> Self {
        Self {
            bounds: config.bounds(),
            names: resolve_names(&config.range),
            state: RangeState::new(&config.range),
        }
    }

    fn reconfigure(&mut self, config: &WidgetConfig) {
        self.bounds = config.bounds();
        self.names = resolve_names(&config.range);
        self.state.reconfigure(&config.range);
    }

    fn origin(&self) -> Point {
        self.state.geometry().track_origin(self.bounds)
    }

    fn fields(&self) -> Vec<FormField> {
        self.names
            .to_vec()
            .into_iter()
            .zip(self.state.values().to_vec())
            .filter(|(name, _)| !name.is_unset())
            .map(|(name, value)| FormField { name, value })
            .collect()
    }

    fn notify(&self, id: WidgetId, change: Option<ChangeEvent>) -> Notification {
        Notification {
            widget: id,
            change,
            render: self.state.render(),
            fields: self.fields(),
        }
    }
}

pub struct Host {
    widgets: BTreeMap<WidgetId, Widget>,
    listeners: Arc<MoveListeners>,
    sessions: BTreeMap<WidgetId, DragSession<MoveListeners>>,
}

impl Host {
    pub fn new(config: &Config) -> Self {
        let mut host = Self {
            widgets: BTreeMap::new(),
            listeners: Arc::new(MoveListeners::default()),
            sessions: BTreeMap::new(),
        };
        host.apply_config(config);
        host
    }

    pub fn state(&self, id: &WidgetId) -> Option<&RangeState> {
        self.widgets.get(id).map(|w| &w.state)
    }

    pub fn listeners(&self) -> &Arc<MoveListeners> {
        &self.listeners
    }

    pub fn is_dragging(&self, id: &WidgetId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Brings the widget set in line with `config`. Surviving widgets keep
    /// their values; any drag in progress is abandoned.
    pub fn apply_config(&mut self, config: &Config) -> Vec<Notification> {
        self.end_sessions();

        let mut next = BTreeMap::new();
        for widget_config in &config.widgets {
            if widget_config.id.is_unset() {
                log::warn!("Skipping widget without an id");
                continue;
            }
            let widget = match self.widgets.remove(&widget_config.id) {
                Some(mut widget) => {
                    widget.reconfigure(widget_config);
                    widget
                }
                None => Widget::new(widget_config),
            };
            if next.insert(widget_config.id.clone(), widget).is_some() {
                log::warn!("Widget '{}' is defined more than once; using the last", widget_config.id);
            }
        }

        for id in self.widgets.keys() {
            log::info!("Widget '{}' removed by config", id);
        }
        self.widgets = next;
        self.snapshot()
    }

    /// Current render of every widget.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.widgets
            .iter()
            .map(|(id, widget)| widget.notify(id.clone(), None))
            .collect()
    }

    pub fn handle(&mut self, event: HostEvent) -> Vec<Notification> {
        match event {
            HostEvent::PointerDown { widget, input } => self.pointer_down(widget, &input),
            HostEvent::PointerMove(input) => self.pointer_move(&input),
            HostEvent::PointerUp | HostEvent::PointerCancel => {
                self.end_sessions();
                Vec::new()
            }
            HostEvent::Key { widget, key } => self.key(widget, key),
            HostEvent::SetValue { widget, values } => {
                self.update(widget, |state| {
                    state.set_external(values);
                    None
                })
            }
            HostEvent::Teardown(widget) => {
                if let Some(session) = self.sessions.remove(&widget) {
                    session.end();
                }
                if self.widgets.remove(&widget).is_none() {
                    log::warn!("Teardown of unknown widget '{}'", widget);
                }
                Vec::new()
            }
            HostEvent::ConfigReload => match config::load_config() {
                Ok(config) => {
                    log::info!("Config reloaded");
                    self.apply_config(&config)
                }
                Err(e) => {
                    log::error!("Failed to reload config: {}", e);
                    Vec::new()
                }
            },
        }
    }

    fn end_sessions(&mut self) {
        for (_, session) in std::mem::take(&mut self.sessions) {
            session.end();
        }
    }

    fn pointer_down(&mut self, id: WidgetId, input: &PointerInput) -> Vec<Notification> {
        // a new press means any earlier gesture lost its release
        self.end_sessions();

        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Pointer down on unknown widget '{}'", id);
            return Vec::new();
        };
        let origin = widget.origin();
        let change = widget.state.pointer_down(input, origin);
        let session = DragSession::start(self.listeners.clone(), id.clone(), widget.state.focused());
        self.sessions.insert(id.clone(), session);

        vec![widget.notify(id, Some(change))]
    }

    fn pointer_move(&mut self, input: &PointerInput) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for id in self.listeners.subscribed() {
            let Some(widget) = self.widgets.get_mut(&id) else {
                continue;
            };
            // the drag stays on the knob it grabbed, whatever the keyboard did since
            if let Some(session) = self.sessions.get(&id) {
                widget.state.focus(session.knob());
            }
            let origin = widget.origin();
            let change = widget.state.pointer_move(input, origin);
            notifications.push(widget.notify(id, Some(change)));
        }
        notifications
    }

    fn key(&mut self, id: WidgetId, key: KeyCommand) -> Vec<Notification> {
        self.update(id, |state| match key {
            KeyCommand::Left => Some(state.step(StepDirection::Decrease)),
            KeyCommand::Right => Some(state.step(StepDirection::Increase)),
            KeyCommand::Up | KeyCommand::Down => {
                state.switch_focus();
                None
            }
        })
    }

    fn update(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut RangeState) -> Option<ChangeEvent>,
    ) -> Vec<Notification> {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::warn!("Event for unknown widget '{}'", id);
            return Vec::new();
        };
        let change = f(&mut widget.state);
        vec![widget.notify(id, change)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use rangekit::{KnobId, Knobs};

    const WIDGETS: &str = r#"
        [[widgets]]
        id = "volume"
        x = 10
        y = 20
        track_length = 100
        knob_size = 0
        default_value = 50

        [[widgets]]
        id = "price"
        x = 10
        y = 60
        track_length = 100
        knob_size = 0
        multiple = true
        default_value = [20, 40]
        name = "from"
        name2 = "to"

        [[widgets]]
        id = "locked"
        track_length = 100
        knob_size = 0
        value = 10
    "#;

    fn host() -> Host {
        Host::new(&parse_config(WIDGETS).unwrap())
    }

    fn id(s: &str) -> WidgetId {
        WidgetId::new(s)
    }

    fn down(widget: &str, x: f64, y: f64) -> HostEvent {
        HostEvent::PointerDown {
            widget: id(widget),
            input: PointerInput::mouse(x, y),
        }
    }

    fn values(host: &Host, widget: &str) -> Knobs<f64> {
        host.state(&id(widget)).unwrap().values()
    }

    #[test]
    fn test_drag_routes_moves_until_release() {
        let mut host = host();

        let out = host.handle(down("volume", 40.0, 25.0));
        assert_eq!(out[0].change, Some(ChangeEvent::Single { value: 30.0 }));
        assert!(host.listeners().is_subscribed(&id("volume")));

        let out = host.handle(HostEvent::PointerMove(PointerInput::mouse(70.0, 500.0)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].change, Some(ChangeEvent::Single { value: 60.0 }));

        assert!(host.handle(HostEvent::PointerUp).is_empty());
        assert!(!host.listeners().is_subscribed(&id("volume")));
        assert!(host.handle(HostEvent::PointerMove(PointerInput::mouse(90.0, 0.0))).is_empty());
        assert_eq!(values(&host, "volume"), Knobs::One(60.0));
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut host = host();
        assert!(host.handle(HostEvent::PointerMove(PointerInput::mouse(40.0, 25.0))).is_empty());
        assert_eq!(values(&host, "volume"), Knobs::One(50.0));
    }

    #[test]
    fn test_cancel_and_teardown_release_listeners() {
        let mut host = host();
        host.handle(down("volume", 40.0, 25.0));
        host.handle(HostEvent::PointerCancel);
        assert!(host.listeners().subscribed().is_empty());

        host.handle(down("volume", 40.0, 25.0));
        assert!(host.is_dragging(&id("volume")));
        host.handle(HostEvent::Teardown(id("volume")));
        assert!(host.listeners().subscribed().is_empty());
        assert!(host.state(&id("volume")).is_none());
    }

    #[test]
    fn test_second_press_replaces_drag() {
        let mut host = host();
        host.handle(down("volume", 40.0, 25.0));
        host.handle(down("price", 45.0, 60.0));
        assert_eq!(host.listeners().subscribed(), vec![id("price")]);
    }

    #[test]
    fn test_dual_drag_pushes_other_knob() {
        let mut host = host();
        // nearer the second knob at 40
        let out = host.handle(down("price", 45.0, 60.0));
        assert_eq!(
            out[0].change,
            Some(ChangeEvent::Multiple {
                knob: KnobId::Second,
                value: [20.0, 35.0],
            })
        );

        host.handle(HostEvent::PointerMove(PointerInput::mouse(15.0, 60.0)));
        assert_eq!(values(&host, "price"), Knobs::Two(5.0, 5.0));
    }

    #[test]
    fn test_drag_keeps_grabbed_knob_after_focus_switch() {
        let mut host = host();
        host.handle(down("price", 45.0, 60.0));
        host.handle(HostEvent::Key {
            widget: id("price"),
            key: KeyCommand::Up,
        });
        assert_eq!(host.state(&id("price")).unwrap().focused(), KnobId::First);

        let out = host.handle(HostEvent::PointerMove(PointerInput::mouse(60.0, 60.0)));
        assert_eq!(
            out[0].change,
            Some(ChangeEvent::Multiple {
                knob: KnobId::Second,
                value: [20.0, 50.0],
            })
        );
    }

    #[test]
    fn test_controlled_widget_waits_for_owner() {
        let mut host = host();
        let out = host.handle(down("locked", 70.0, 0.0));
        assert_eq!(out[0].change, Some(ChangeEvent::Single { value: 70.0 }));
        assert_eq!(values(&host, "locked"), Knobs::One(10.0));

        host.handle(HostEvent::SetValue {
            widget: id("locked"),
            values: Knobs::One(70.0),
        });
        assert_eq!(values(&host, "locked"), Knobs::One(70.0));
    }

    #[test]
    fn test_keys_step_and_switch_focus() {
        let mut host = host();
        let out = host.handle(HostEvent::Key {
            widget: id("volume"),
            key: KeyCommand::Right,
        });
        assert_eq!(out[0].change, Some(ChangeEvent::Single { value: 51.0 }));

        let out = host.handle(HostEvent::Key {
            widget: id("price"),
            key: KeyCommand::Down,
        });
        assert_eq!(out[0].change, None);
        assert_eq!(host.state(&id("price")).unwrap().focused(), KnobId::Second);

        host.handle(HostEvent::Key {
            widget: id("price"),
            key: KeyCommand::Left,
        });
        assert_eq!(values(&host, "price"), Knobs::Two(20.0, 39.0));
    }

    #[test]
    fn test_unknown_widget_yields_nothing() {
        let mut host = host();
        assert!(host.handle(down("nope", 0.0, 0.0)).is_empty());
        assert!(host.listeners().subscribed().is_empty());
        assert!(host
            .handle(HostEvent::Key {
                widget: id("nope"),
                key: KeyCommand::Left,
            })
            .is_empty());
    }

    #[test]
    fn test_apply_config_keeps_surviving_values() {
        let mut host = host();
        host.handle(down("volume", 40.0, 25.0));

        let next = parse_config(
            r#"
            [[widgets]]
            id = "volume"
            track_length = 100
            knob_size = 0
            max = 20

            [[widgets]]
            id = "fresh"
            "#,
        )
        .unwrap();
        let out = host.apply_config(&next);

        assert_eq!(out.iter().map(|n| n.widget.to_string()).collect::<Vec<_>>(), ["fresh", "volume"]);
        assert_eq!(values(&host, "volume"), Knobs::One(20.0));
        assert!(host.state(&id("price")).is_none());
        assert!(!host.is_dragging(&id("volume")));
        assert!(host.listeners().subscribed().is_empty());
    }

    #[test]
    fn test_notification_json() {
        let mut host = host();
        let out = host.handle(down("volume", 40.0, 25.0));
        let json = serde_json::to_value(&out[0]).unwrap();

        assert_eq!(json["widget"], "volume");
        assert_eq!(json["change"]["value"], 30.0);
        assert_eq!(json["render"]["kind"], "linear");
        assert_eq!(json["render"]["fill"]["end_px"], 30.0);

        assert!(json.get("fields").is_none());

        let json = serde_json::to_value(&host.snapshot()[0]).unwrap();
        assert!(json.get("change").is_none());
    }

    #[test]
    fn test_fields_follow_committed_values() {
        let mut host = host();
        let out = host.handle(HostEvent::SetValue {
            widget: id("price"),
            values: Knobs::Two(30.0, 70.0),
        });
        assert_eq!(
            out[0].fields,
            vec![
                FormField {
                    name: InputName::new("from"),
                    value: 30.0,
                },
                FormField {
                    name: InputName::new("to"),
                    value: 70.0,
                },
            ]
        );
    }
}

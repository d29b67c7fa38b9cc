use crate::config::WidgetId;
use rangekit::{Knobs, PointerInput};
use strum::{Display as StrumDisplay, EnumString};

/// Arrow keys understood by a focused widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum KeyCommand {
    #[strum(serialize = "left", serialize = "arrowleft")]
    Left,
    #[strum(serialize = "right", serialize = "arrowright")]
    Right,
    #[strum(serialize = "up", serialize = "arrowup")]
    Up,
    #[strum(serialize = "down", serialize = "arrowdown")]
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PointerDown { widget: WidgetId, input: PointerInput },
    /// Moves carry no target; they go to whichever widgets hold a drag.
    PointerMove(PointerInput),
    PointerUp,
    PointerCancel,
    Key { widget: WidgetId, key: KeyCommand },
    SetValue { widget: WidgetId, values: Knobs<f64> },
    Teardown(WidgetId),
    ConfigReload,
}

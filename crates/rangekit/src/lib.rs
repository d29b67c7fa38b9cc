//! Value and geometry engine for linear and circular range sliders with one
//! or two knobs.

pub mod config;
pub mod drag;
pub mod engine;
pub mod geometry;
pub mod knobs;
mod macros;
pub mod pointer;
pub mod position;
pub mod state;

pub use config::{InputName, RawConfig, Shape};
pub use drag::{DragSession, GestureListeners};
pub use engine::{apply_knob_move, position_from_value, resolve_config, value_from_pointer};
pub use geometry::{Point, TrackGeometry, TrackKind};
pub use knobs::{KnobId, KnobState, Knobs};
pub use pointer::PointerInput;
pub use position::RenderDescriptor;
pub use state::{ChangeEvent, RangeState, StepDirection};

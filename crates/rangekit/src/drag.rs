//! Listener bookkeeping for a drag gesture.
//!
//! Pointer-move tracking lives for exactly one gesture: it is registered on
//! pointer-down and must go away on pointer-up, pointer-cancel or teardown,
//! however the gesture ends. [`DragSession`] ties the registration to a value
//! so that every exit path, unwinding included, unregisters.

use crate::knobs::KnobId;
use std::fmt;
use std::sync::Arc;

/// Registry of move listeners owned by the host (the equivalent of
/// window-level listeners in a browser).
pub trait GestureListeners {
    type Key: Clone + fmt::Debug;

    fn subscribe(&self, key: &Self::Key);
    fn unsubscribe(&self, key: &Self::Key);
}

pub struct DragSession<L: GestureListeners> {
    listeners: Arc<L>,
    key: L::Key,
    knob: KnobId,
    active: bool,
}

impl<L: GestureListeners> DragSession<L> {
    pub fn start(listeners: Arc<L>, key: L::Key, knob: KnobId) -> Self {
        listeners.subscribe(&key);
        log::debug!("drag started for {:?} (knob {})", key, knob);
        Self {
            listeners,
            key,
            knob,
            active: true,
        }
    }

    /// Knob that had focus when the gesture began.
    pub fn knob(&self) -> KnobId {
        self.knob
    }

    pub fn end(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if std::mem::take(&mut self.active) {
            self.listeners.unsubscribe(&self.key);
            log::debug!("drag ended for {:?}", self.key);
        }
    }
}

impl<L: GestureListeners> Drop for DragSession<L> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<L: GestureListeners> fmt::Debug for DragSession<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSession")
            .field("key", &self.key)
            .field("knob", &self.knob)
            .field("active", &self.active)
            .finish()
    }
}

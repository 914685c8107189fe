//! Typed events emitted by the renderer to outside subscribers.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use serde::{Deserialize, Serialize};

use crate::coords::Coords;
use crate::scene::NodeId;

/// Something observable changed in the rendered scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneEvent {
    /// The logical zoom level changed.
    ZoomChanged { level: f64 },
    /// The pointer moved onto a different tile.
    TileHovered { tile: Coords },
    /// A node received focus.
    NodeSelected { id: NodeId },
    /// Focus was removed from every node.
    SelectionCleared,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&SceneEvent)>;

/// Fan-out of scene events to a set of subscribers, in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&SceneEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &SceneEvent) {
        tracing::trace!(?event, subscribers = self.handlers.len(), "scene event");
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    pub fn emit_all(&mut self, events: impl IntoIterator<Item = SceneEvent>) {
        for event in events {
            self.emit(&event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

use std::collections::VecDeque;

use crate::controller::ControllerIndex;

/// A notification from the session, device or display layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    SessionStarted,
    SessionEnded,
    ControllerConnected(ControllerIndex),
    ControllerDisconnected(ControllerIndex),
    SelectStart(ControllerIndex),
    DisplayResized { width: u32, height: u32 },
}

/// FIFO of pending scene events, drained once per frame.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: VecDeque<SceneEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: SceneEvent) {
        self.events.push_back(event);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and yields every queued event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = SceneEvent> + '_ {
        self.events.drain(..)
    }
}

impl Extend<SceneEvent> for EventQueue {
    fn extend<T: IntoIterator<Item = SceneEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let mut q = EventQueue::new();
        q.push(SceneEvent::SessionStarted);
        q.push(SceneEvent::SelectStart(ControllerIndex::Primary));
        q.extend([SceneEvent::SessionEnded]);
        assert_eq!(q.len(), 3);

        let drained: Vec<_> = q.drain().collect();
        assert_eq!(
            drained,
            vec![
                SceneEvent::SessionStarted,
                SceneEvent::SelectStart(ControllerIndex::Primary),
                SceneEvent::SessionEnded,
            ]
        );
        assert!(q.is_empty());
    }
}

//! Episode event channel
//!
//! Targets and the exit door never call into the orchestrator. They emit
//! events through the `EpisodeObserver` interface; the orchestrator owns an
//! `EventQueue` created at construction and drains it after each dispatch
//! phase, in emission order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::models::{AgentId, TargetId};

/// Notifications emitted by targets and the door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEvent {
    /// A target's lives reached zero
    TargetDefeated { target: TargetId, by: AgentId },
    /// A living target reached its lair
    TargetEscaped { target: TargetId },
    /// The door was unlocked by an agent holding the key
    DoorUnlocked { by: AgentId },
    /// An agent passed through the unlocked door
    AgentEscaped { agent: AgentId },
}

/// Fire-and-forget requests for an external renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualCue {
    /// Brief flash on a target that took a hit
    HitFlash { target: TargetId },
    /// Arena lights signal a win
    Success,
    /// Arena lights signal a failure
    Failure,
}

/// Observer interface for entity notifications
pub trait EpisodeObserver {
    fn notify(&mut self, event: EpisodeEvent);

    fn request_visual(&mut self, _cue: VisualCue) {}
}

/// FIFO buffer implementing `EpisodeObserver`
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<EpisodeEvent>,
    visuals: Vec<VisualCue>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&mut self) -> Option<EpisodeEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drops pending entity events; visual requests are kept for the renderer
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn drain_visuals(&mut self) -> Vec<VisualCue> {
        std::mem::take(&mut self.visuals)
    }
}

impl EpisodeObserver for EventQueue {
    fn notify(&mut self, event: EpisodeEvent) {
        self.events.push_back(event);
    }

    fn request_visual(&mut self, cue: VisualCue) {
        self.visuals.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q = EventQueue::new();
        q.notify(EpisodeEvent::TargetDefeated { target: 0, by: 1 });
        q.notify(EpisodeEvent::TargetEscaped { target: 1 });

        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(EpisodeEvent::TargetDefeated { target: 0, by: 1 }));
        assert_eq!(q.pop(), Some(EpisodeEvent::TargetEscaped { target: 1 }));
        assert!(q.pop().is_none());
    }

    #[test]
    fn test_visuals_survive_event_clear() {
        let mut q = EventQueue::new();
        q.notify(EpisodeEvent::AgentEscaped { agent: 0 });
        q.request_visual(VisualCue::Success);
        q.clear_events();

        assert!(q.is_empty());
        assert_eq!(q.drain_visuals(), vec![VisualCue::Success]);
        assert!(q.drain_visuals().is_empty());
    }
}

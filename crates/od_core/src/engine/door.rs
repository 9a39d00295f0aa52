//! Exit Door
//!
//! Locked at every reset. The first touch by a key carrier unlocks it and
//! each key-carrier touch lets that agent out. Both are reported through
//! `EpisodeObserver`, the same channel targets use.

use tracing::trace;

use super::events::{EpisodeEvent, EpisodeObserver};
use super::spawn::DoorLayout;
use crate::models::{AgentId, Vec3};

#[derive(Debug, Clone)]
pub struct Door {
    layout: DoorLayout,
    unlocked: bool,
}

impl Door {
    pub fn new(layout: DoorLayout) -> Self {
        Self { layout, unlocked: false }
    }

    pub fn layout(&self) -> &DoorLayout {
        &self.layout
    }

    pub fn position(&self) -> Vec3 {
        self.layout.position
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Moves to a new placement and locks again
    pub fn relock(&mut self, layout: DoorLayout) {
        self.layout = layout;
        self.unlocked = false;
    }

    /// Handles a touch by `agent`
    ///
    /// Without the key the door stays shut and this returns false, so the
    /// caller treats the contact as a wall.
    pub fn touch(&mut self, agent: AgentId, carrying_key: bool, observer: &mut dyn EpisodeObserver) -> bool {
        if !carrying_key {
            return false;
        }
        if !self.unlocked {
            self.unlocked = true;
            trace!(agent, "door unlocked");
            observer.notify(EpisodeEvent::DoorUnlocked { by: agent });
        }
        observer.notify(EpisodeEvent::AgentEscaped { agent });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::EventQueue;
    use crate::models::ArenaSide;

    fn door() -> Door {
        Door::new(DoorLayout { side: ArenaSide::Top, position: Vec3::new(0.0, 0.9, 9.0), yaw: 180.0 })
    }

    #[test]
    fn test_locked_without_key() {
        let mut q = EventQueue::new();
        let mut d = door();
        assert!(!d.touch(0, false, &mut q));
        assert!(!d.is_unlocked());
        assert!(q.is_empty());
    }

    #[test]
    fn test_unlock_then_escape() {
        let mut q = EventQueue::new();
        let mut d = door();
        assert!(d.touch(2, true, &mut q));
        assert!(d.is_unlocked());
        assert_eq!(q.pop(), Some(EpisodeEvent::DoorUnlocked { by: 2 }));
        assert_eq!(q.pop(), Some(EpisodeEvent::AgentEscaped { agent: 2 }));

        // Already open: only the escape is reported
        assert!(d.touch(1, true, &mut q));
        assert_eq!(q.pop(), Some(EpisodeEvent::AgentEscaped { agent: 1 }));
        assert!(q.is_empty());
    }

    #[test]
    fn test_relock() {
        let mut q = EventQueue::new();
        let mut d = door();
        d.touch(0, true, &mut q);

        let moved = DoorLayout { side: ArenaSide::Right, position: Vec3::new(9.0, 0.9, 0.0), yaw: 270.0 };
        d.relock(moved);
        assert!(!d.is_unlocked());
        assert_eq!(d.layout(), &moved);
        assert_eq!(d.position(), Vec3::new(9.0, 0.9, 0.0));
    }
}

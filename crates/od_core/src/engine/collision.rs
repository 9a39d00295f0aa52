//! Collision categories
//!
//! Contacts reported by the movement collaborator carry a tagged category.
//! The orchestrator dispatches them through a table indexed by
//! `CollisionKind`, one handler per category.

use serde::{Deserialize, Serialize};

use crate::models::{AgentId, TargetId};

/// A contact between an agent and something in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collision {
    Wall,
    Obstacle,
    Door,
    Key,
    Target(TargetId),
    Peer(AgentId),
}

/// Payload-free category, used as the dispatch table index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    Wall = 0,
    Obstacle = 1,
    Door = 2,
    Key = 3,
    Target = 4,
    Peer = 5,
}

impl CollisionKind {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Collision {
    pub fn kind(&self) -> CollisionKind {
        match self {
            Collision::Wall => CollisionKind::Wall,
            Collision::Obstacle => CollisionKind::Obstacle,
            Collision::Door => CollisionKind::Door,
            Collision::Key => CollisionKind::Key,
            Collision::Target(_) => CollisionKind::Target,
            Collision::Peer(_) => CollisionKind::Peer,
        }
    }
}

/// One contact reported for one agent during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentContact {
    pub agent: AgentId,
    pub collision: Collision,
}

impl AgentContact {
    pub fn new(agent: AgentId, collision: Collision) -> Self {
        Self { agent, collision }
    }
}

//! Movement and navigation collaborators
//!
//! `Movement` turns per-tick actions into new agent poses and reports the
//! contacts that started this tick. `Navigator` walks targets toward their
//! lair. The kinematic and straight-line versions here are enough for
//! headless runs; a physics engine can be slotted in behind the same traits.

use std::collections::BTreeSet;

use crate::config::{ArenaConfig, EpisodeConfig, Obstacle};
use crate::models::geometry::{heading_vector, normalize_angle};
use crate::models::{planar_distance, AgentAction, AgentState, Rect, Vec3};

use super::collision::{AgentContact, Collision};
use super::target::Target;

/// Solid and pickup geometry the movement collaborator tests against
#[derive(Debug, Clone, Copy)]
pub struct Colliders<'a> {
    pub floor: Rect,
    pub obstacles: &'a [Obstacle],
    pub targets: &'a [Target],
    pub key: Option<Vec3>,
    pub door: Vec3,
}

pub trait Movement {
    /// Applies one tick of actions; `actions[i]` drives `agents[i]`
    fn advance(
        &mut self,
        agents: &mut [AgentState],
        actions: &[AgentAction],
        world: &Colliders<'_>,
        dt: f32,
    ) -> Vec<AgentContact>;

    /// Forgets contact history at episode reset
    fn reset(&mut self) {}
}

pub trait Navigator {
    /// Moves `position` toward `destination`; true once arrived
    fn advance(&mut self, position: &mut Vec3, destination: &Vec3, dt: f32) -> bool;
}

// ============================================================================
// KinematicMovement
// ============================================================================

/// Integrates heading and forward speed, blocking on contact
///
/// A blocked step leaves the agent where it was. A contact is reported on
/// the first tick it appears and again only after it has been released.
/// Started contacts come back sorted by agent id, then by collision kind
/// (`Wall`, `Obstacle`, `Door`, `Key`, `Target`, `Peer`).
#[derive(Debug, Clone)]
pub struct KinematicMovement {
    pub speed: f32,
    /// Degrees per second at full rotation input
    pub rotation_speed: f32,
    pub agent_radius: f32,
    pub target_radius: f32,
    pub key_pickup_radius: f32,
    pub door_contact_radius: f32,
    touching: BTreeSet<AgentContact>,
}

impl KinematicMovement {
    pub fn from_config(episode: &EpisodeConfig, arena: &ArenaConfig) -> Self {
        Self {
            speed: episode.agent_speed,
            rotation_speed: episode.rotation_speed,
            agent_radius: arena.agent_radius,
            target_radius: arena.target_radius,
            key_pickup_radius: arena.key_pickup_radius,
            door_contact_radius: arena.door_contact_radius,
            touching: BTreeSet::new(),
        }
    }
}

impl Movement for KinematicMovement {
    fn advance(
        &mut self,
        agents: &mut [AgentState],
        actions: &[AgentAction],
        world: &Colliders<'_>,
        dt: f32,
    ) -> Vec<AgentContact> {
        let mut positions: Vec<Vec3> = agents.iter().map(|a| a.position).collect();
        let bounds = world.floor.inset(self.agent_radius);
        let mut now_touching = BTreeSet::new();

        for (i, agent) in agents.iter_mut().enumerate() {
            let action = actions.get(i).copied().unwrap_or_default().sanitized();
            agent.heading = normalize_angle(agent.heading + action.rotation * self.rotation_speed * dt);
            agent.forward_speed = action.forward;

            let step = heading_vector(agent.heading) * (action.forward * self.speed * dt);
            let mut candidate = agent.position + step;
            let mut blocked = false;
            let mut contacts = Vec::new();

            if !bounds.contains(candidate.x, candidate.z) {
                candidate.x = candidate.x.clamp(bounds.min_x, bounds.max_x);
                candidate.z = candidate.z.clamp(bounds.min_z, bounds.max_z);
                contacts.push(Collision::Wall);
            }

            let agent_point = |x: f32, z: f32| Vec3::new(x, candidate.y, z);
            if world
                .obstacles
                .iter()
                .any(|o| planar_distance(&candidate, &agent_point(o.x, o.z)) < o.radius + self.agent_radius)
            {
                blocked = true;
                contacts.push(Collision::Obstacle);
            }

            for target in world.targets.iter().filter(|t| t.is_alive()) {
                if planar_distance(&candidate, &target.position) < self.agent_radius + self.target_radius {
                    blocked = true;
                    contacts.push(Collision::Target(target.id));
                }
            }

            for (j, other) in positions.iter().enumerate() {
                if j != i && planar_distance(&candidate, other) < 2.0 * self.agent_radius {
                    blocked = true;
                    contacts.push(Collision::Peer(j));
                }
            }

            if planar_distance(&candidate, &world.door) < self.door_contact_radius {
                blocked = true;
                contacts.push(Collision::Door);
            }

            if !blocked {
                agent.position = candidate;
                positions[i] = candidate;
            }

            if let Some(key) = world.key {
                if planar_distance(&agent.position, &key) < self.key_pickup_radius {
                    contacts.push(Collision::Key);
                }
            }

            for collision in contacts {
                now_touching.insert(AgentContact::new(agent.id, collision));
            }
        }

        let started: Vec<AgentContact> = now_touching.difference(&self.touching).copied().collect();
        self.touching = now_touching;
        started
    }

    fn reset(&mut self) {
        self.touching.clear();
    }
}

// ============================================================================
// StraightLineNavigator
// ============================================================================

/// Constant-speed approach along the straight line to the destination
#[derive(Debug, Clone)]
pub struct StraightLineNavigator {
    pub speed: f32,
    pub arrival_radius: f32,
}

impl StraightLineNavigator {
    pub fn new(speed: f32, arrival_radius: f32) -> Self {
        Self { speed, arrival_radius }
    }
}

impl Navigator for StraightLineNavigator {
    fn advance(&mut self, position: &mut Vec3, destination: &Vec3, dt: f32) -> bool {
        let remaining = planar_distance(position, destination);
        if remaining <= self.arrival_radius {
            return true;
        }

        let step = (self.speed * dt).min(remaining);
        let dir_x = (destination.x - position.x) / remaining;
        let dir_z = (destination.z - position.z) / remaining;
        position.x += dir_x * step;
        position.z += dir_z * step;

        planar_distance(position, destination) <= self.arrival_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Personality;
    use std::sync::Arc;

    fn movement() -> KinematicMovement {
        KinematicMovement::from_config(&EpisodeConfig::default(), &ArenaConfig::default())
    }

    fn agent(id: usize, x: f32, z: f32, heading: f32) -> AgentState {
        let mut a = AgentState::new(id, Arc::new(Personality::neutral("n")), "N");
        a.position = Vec3::new(x, 0.3, z);
        a.heading = heading;
        a
    }

    fn open_world<'a>() -> Colliders<'a> {
        Colliders {
            floor: Rect::new(-10.0, 10.0, -10.0, 10.0),
            obstacles: &[],
            targets: &[],
            key: None,
            door: Vec3::new(0.0, 0.9, 9.0),
        }
    }

    #[test]
    fn test_forward_integration() {
        let mut m = movement();
        let mut agents = vec![agent(0, 0.0, 0.0, 90.0)];
        let contacts = m.advance(&mut agents, &[AgentAction::new(0.0, 1.0)], &open_world(), 0.5);

        assert!(contacts.is_empty());
        assert!((agents[0].position.x - 1.0).abs() < 1e-5);
        assert!(agents[0].position.z.abs() < 1e-5);
        assert_eq!(agents[0].forward_speed, 1.0);
    }

    #[test]
    fn test_rotation() {
        let mut m = movement();
        let mut agents = vec![agent(0, 0.0, 0.0, 0.0)];
        m.advance(&mut agents, &[AgentAction::new(1.0, 0.0)], &open_world(), 0.5);
        assert!((agents[0].heading - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_wall_contact_reported_once() {
        let mut m = movement();
        let mut agents = vec![agent(0, 9.5, 0.0, 90.0)];
        let push = [AgentAction::new(0.0, 1.0)];

        let first = m.advance(&mut agents, &push, &open_world(), 0.1);
        assert_eq!(first, vec![AgentContact::new(0, Collision::Wall)]);
        assert!(agents[0].position.x <= 9.6 + 1e-5);

        let second = m.advance(&mut agents, &push, &open_world(), 0.1);
        assert!(second.is_empty());

        // Releasing and pushing again reports a fresh contact
        m.advance(&mut agents, &[AgentAction::idle()], &open_world(), 0.1);
        let third = m.advance(&mut agents, &push, &open_world(), 0.1);
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn test_peer_blocks() {
        let mut m = movement();
        let mut agents = vec![agent(0, 0.0, 0.0, 0.0), agent(1, 0.0, 0.85, 180.0)];
        let contacts = m.advance(
            &mut agents,
            &[AgentAction::new(0.0, 1.0), AgentAction::idle()],
            &open_world(),
            0.1,
        );
        assert_eq!(contacts, vec![AgentContact::new(0, Collision::Peer(1))]);
        assert_eq!(agents[0].position, Vec3::new(0.0, 0.3, 0.0));
    }

    #[test]
    fn test_target_and_key_contacts() {
        let mut m = movement();
        let mut t = Target::new(4, 2);
        t.resurrect(Vec3::new(0.0, 0.3, 1.1));
        let targets = [t];
        let world = Colliders { targets: &targets, key: Some(Vec3::new(0.3, 0.3, 0.0)), ..open_world() };

        let mut agents = vec![agent(0, 0.0, 0.0, 0.0)];
        let contacts = m.advance(&mut agents, &[AgentAction::new(0.0, 1.0)], &world, 0.1);
        assert_eq!(
            contacts,
            vec![AgentContact::new(0, Collision::Key), AgentContact::new(0, Collision::Target(4))]
        );
    }

    #[test]
    fn test_contacts_sorted_by_agent_then_kind() {
        let mut m = movement();
        let mut t = Target::new(4, 2);
        t.resurrect(Vec3::new(0.0, 0.3, 1.1));
        let targets = [t];
        let world = Colliders { targets: &targets, key: Some(Vec3::new(0.3, 0.3, 0.0)), ..open_world() };

        // Agent 1 hits the wall; agent 0 touches the target and the key
        let mut agents = vec![agent(1, 9.5, 0.0, 90.0), agent(0, 0.0, 0.0, 0.0)];
        let push = [AgentAction::new(0.0, 1.0), AgentAction::new(0.0, 1.0)];
        let contacts = m.advance(&mut agents, &push, &world, 0.1);
        assert_eq!(
            contacts,
            vec![
                AgentContact::new(0, Collision::Key),
                AgentContact::new(0, Collision::Target(4)),
                AgentContact::new(1, Collision::Wall),
            ]
        );
    }

    #[test]
    fn test_reset_forgets_contacts() {
        let mut m = movement();
        let mut agents = vec![agent(0, 9.5, 0.0, 90.0)];
        let push = [AgentAction::new(0.0, 1.0)];
        m.advance(&mut agents, &push, &open_world(), 0.1);
        m.reset();
        assert_eq!(m.advance(&mut agents, &push, &open_world(), 0.1).len(), 1);
    }

    #[test]
    fn test_navigator_arrives() {
        let mut nav = StraightLineNavigator::new(1.0, 0.5);
        let mut pos = Vec3::new(0.0, 0.3, 0.0);
        let dest = Vec3::new(3.0, 0.5, 0.0);

        let mut arrived = false;
        for _ in 0..10 {
            arrived = nav.advance(&mut pos, &dest, 0.5);
            if arrived {
                break;
            }
        }
        assert!(arrived);
        assert!((pos.x - 2.5).abs() < 1e-5);
        assert_eq!(pos.y, 0.3);
    }
}

//! Target State Machine
//!
//! A guarded target walks toward its lair while agents hit it.
//!
//! ## States
//! - `Alive { lives }` with lives > 0
//! - `Dead`
//!
//! `take_hit` decrements lives and records the attacker; the hit that
//! reaches zero emits `TargetDefeated`. Reaching the lair while alive emits
//! `TargetEscaped` once. `resurrect` restores full lives and clears the
//! attacker set.

use std::collections::BTreeSet;

use tracing::trace;

use super::events::{EpisodeEvent, EpisodeObserver, VisualCue};
use crate::models::{planar_distance, AgentId, TargetId, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Alive { lives: u32 },
    Dead,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub position: Vec3,
    max_lives: u32,
    lives: u32,
    attackers: BTreeSet<AgentId>,
    lair: Vec3,
    /// Distance to the lair at resurrection, for lair progress
    start_distance: f32,
    escaped: bool,
}

impl Target {
    /// New targets start dead until the first resurrection places them
    pub fn new(id: TargetId, max_lives: u32) -> Self {
        Self {
            id,
            position: Vec3::zeros(),
            max_lives: max_lives.max(1),
            lives: 0,
            attackers: BTreeSet::new(),
            lair: Vec3::zeros(),
            start_distance: 0.0,
            escaped: false,
        }
    }

    pub fn state(&self) -> TargetState {
        if self.lives > 0 {
            TargetState::Alive { lives: self.lives }
        } else {
            TargetState::Dead
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn attackers(&self) -> &BTreeSet<AgentId> {
        &self.attackers
    }

    /// Whether anyone other than `agent` has damaged this target
    pub fn hit_by_other_than(&self, agent: AgentId) -> bool {
        self.attackers.iter().any(|&id| id != agent)
    }

    pub fn lair(&self) -> Vec3 {
        self.lair
    }

    pub fn has_escaped(&self) -> bool {
        self.escaped
    }

    /// Fraction of the way from the resurrection point to the lair, in [0, 1]
    pub fn lair_progress(&self) -> f32 {
        if !self.is_alive() || self.start_distance <= f32::EPSILON {
            return 0.0;
        }
        let remaining = planar_distance(&self.position, &self.lair);
        (1.0 - remaining / self.start_distance).clamp(0.0, 1.0)
    }

    /// Applies one hit and returns the remaining lives
    ///
    /// Hits on a dead target are ignored and report 0 without emitting.
    pub fn take_hit(&mut self, attacker: AgentId, observer: &mut dyn EpisodeObserver) -> u32 {
        if !self.is_alive() {
            return 0;
        }

        self.lives -= 1;
        self.attackers.insert(attacker);
        observer.request_visual(VisualCue::HitFlash { target: self.id });
        trace!(target_id = self.id, attacker, lives = self.lives, "target hit");

        if self.lives == 0 {
            observer.notify(EpisodeEvent::TargetDefeated { target: self.id, by: attacker });
        }
        self.lives
    }

    /// Marks arrival at the lair; emits at most once per life
    pub fn reach_lair(&mut self, observer: &mut dyn EpisodeObserver) {
        if self.is_alive() && !self.escaped {
            self.escaped = true;
            observer.notify(EpisodeEvent::TargetEscaped { target: self.id });
        }
    }

    pub fn set_lair(&mut self, lair: Vec3) {
        self.lair = lair;
        self.start_distance = planar_distance(&self.position, &self.lair);
    }

    /// Teleports to `position` with full lives and an empty attacker set
    pub fn resurrect(&mut self, position: Vec3) {
        self.position = position;
        self.lives = self.max_lives;
        self.attackers.clear();
        self.escaped = false;
        self.start_distance = planar_distance(&self.position, &self.lair);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::EventQueue;
    use proptest::prelude::*;

    #[test]
    fn test_hits_until_dead() {
        let mut q = EventQueue::new();
        let mut t = Target::new(0, 3);
        t.resurrect(Vec3::new(1.0, 0.3, 1.0));

        assert_eq!(t.take_hit(7, &mut q), 2);
        assert_eq!(t.take_hit(7, &mut q), 1);
        assert!(q.is_empty());
        assert_eq!(t.take_hit(7, &mut q), 0);

        assert_eq!(t.state(), TargetState::Dead);
        assert_eq!(t.attackers().len(), 1);
        assert!(t.attackers().contains(&7));
        assert_eq!(q.pop(), Some(EpisodeEvent::TargetDefeated { target: 0, by: 7 }));
        assert_eq!(q.drain_visuals(), vec![VisualCue::HitFlash { target: 0 }; 3]);
    }

    #[test]
    fn test_hit_on_dead_target_is_ignored() {
        let mut q = EventQueue::new();
        let mut t = Target::new(0, 1);
        t.resurrect(Vec3::zeros());
        t.take_hit(0, &mut q);
        q.pop();

        assert_eq!(t.take_hit(1, &mut q), 0);
        assert!(q.is_empty());
        assert!(!t.attackers().contains(&1));
    }

    #[test]
    fn test_resurrect_clears_attackers() {
        let mut q = EventQueue::new();
        let mut t = Target::new(0, 5);
        t.resurrect(Vec3::zeros());
        t.take_hit(1, &mut q);
        t.take_hit(2, &mut q);
        assert!(t.hit_by_other_than(1));

        t.resurrect(Vec3::new(2.0, 0.3, 2.0));
        assert!(t.attackers().is_empty());
        assert_eq!(t.state(), TargetState::Alive { lives: 5 });
        assert_eq!(t.position, Vec3::new(2.0, 0.3, 2.0));
    }

    #[test]
    fn test_hit_by_other_than() {
        let mut q = EventQueue::new();
        let mut t = Target::new(0, 5);
        t.resurrect(Vec3::zeros());
        t.take_hit(3, &mut q);

        assert!(!t.hit_by_other_than(3));
        assert!(t.hit_by_other_than(4));
    }

    #[test]
    fn test_reach_lair_emits_once() {
        let mut q = EventQueue::new();
        let mut t = Target::new(1, 2);
        t.resurrect(Vec3::zeros());

        t.reach_lair(&mut q);
        t.reach_lair(&mut q);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(EpisodeEvent::TargetEscaped { target: 1 }));
    }

    #[test]
    fn test_lair_progress() {
        let mut t = Target::new(0, 2);
        t.resurrect(Vec3::new(0.0, 0.3, 0.0));
        t.set_lair(Vec3::new(10.0, 0.5, 0.0));
        assert!(t.lair_progress().abs() < 1e-6);

        t.position = Vec3::new(5.0, 0.3, 0.0);
        assert!((t.lair_progress() - 0.5).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_attacker_set_laws(
            id in 0usize..4,
            max_lives in 1u32..6,
            hitters in proptest::collection::vec(0usize..5, 0..16),
        ) {
            let mut q = EventQueue::new();
            let mut t = Target::new(id, max_lives);
            t.resurrect(Vec3::zeros());

            let landed = hitters.len().min(max_lives as usize);
            let mut defeated = Vec::new();
            for (n, &hitter) in hitters.iter().enumerate() {
                let left = t.take_hit(hitter, &mut q);
                prop_assert_eq!(left, max_lives.saturating_sub(n as u32 + 1));
                prop_assert_eq!(left, t.lives());
                while let Some(event) = q.pop() {
                    defeated.push(event);
                }
            }

            // Only hits on a living target count toward the attacker set
            let expected: BTreeSet<AgentId> = hitters[..landed].iter().copied().collect();
            prop_assert_eq!(t.attackers(), &expected);

            if hitters.len() >= max_lives as usize {
                let by = hitters[landed - 1];
                prop_assert_eq!(defeated, vec![EpisodeEvent::TargetDefeated { target: id, by }]);
                prop_assert_eq!(t.state(), TargetState::Dead);
            } else {
                prop_assert!(defeated.is_empty());
                prop_assert!(t.is_alive());
            }

            let visuals = q.drain_visuals();
            prop_assert_eq!(visuals.len(), landed);
            let hit_flash = VisualCue::HitFlash { target: id };
            prop_assert!(visuals.iter().all(|v| *v == hit_flash));

            t.resurrect(Vec3::new(1.0, 0.3, 1.0));
            prop_assert!(t.attackers().is_empty());
            prop_assert_eq!(t.state(), TargetState::Alive { lives: max_lives });
        }
    }
}

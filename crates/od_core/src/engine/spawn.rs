//! Spawn Placement Solver
//!
//! Rejection sampling of non-overlapping floor positions.
//!
//! ## Placement rules
//! - Samples are uniform over a region (the arena minus a wall margin, or a
//!   sub-rectangle of it) at a fixed height.
//! - A sample is accepted when no blocking volume lies within the safety
//!   radius and it keeps the same clearance from positions accepted earlier
//!   in the same call.
//! - Each position gets `max_attempts` samples. `place` reports
//!   `SpawnExhaustion`; `place_relaxed` shrinks the radius and retries, and
//!   as a last resort accepts unconstrained samples with a warning.
//!
//! The lair is placed in a random corner; its companion targets spawn in
//! the quadrant diagonally opposite. The door sits at the midpoint of a
//! random side, facing the centroid.

use rand::Rng;
use tracing::warn;

use crate::config::{ArenaConfig, Obstacle, SpawnConfig};
use crate::error::{DungeonError, Result};
use crate::models::geometry::yaw_towards;
use crate::models::{planar_distance, ArenaSide, Corner, Rect, Vec3};

// ============================================================================
// Blocking volumes
// ============================================================================

/// Answers "is anything solid within `radius` of this point"
pub trait BlockerQuery {
    fn is_blocked(&self, position: &Vec3, radius: f32) -> bool;
}

/// Set of vertical cylinders (center, radius) on the floor plane
#[derive(Debug, Clone, Default)]
pub struct SphereBlockers {
    spheres: Vec<(Vec3, f32)>,
}

impl SphereBlockers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_obstacles(obstacles: &[Obstacle], y: f32) -> Self {
        let mut blockers = Self::new();
        for o in obstacles {
            blockers.push(Vec3::new(o.x, y, o.z), o.radius);
        }
        blockers
    }

    pub fn push(&mut self, center: Vec3, radius: f32) {
        self.spheres.push((center, radius.max(0.0)));
    }

    pub fn extend_points(&mut self, points: &[Vec3], radius: f32) {
        for p in points {
            self.push(*p, radius);
        }
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Vec3, f32)> {
        self.spheres.iter()
    }
}

impl BlockerQuery for SphereBlockers {
    fn is_blocked(&self, position: &Vec3, radius: f32) -> bool {
        self.spheres
            .iter()
            .any(|(center, r)| planar_distance(position, center) < radius + r)
    }
}

// ============================================================================
// SpawnSolver
// ============================================================================

#[derive(Debug, Clone)]
pub struct SpawnSolver {
    safety_radius: f32,
    max_attempts: u32,
    relaxation_factor: f32,
    max_relaxations: u32,
}

impl SpawnSolver {
    pub fn new(config: &SpawnConfig, safety_radius: f32) -> Self {
        Self {
            safety_radius: safety_radius.max(0.0),
            max_attempts: config.max_attempts.max(1),
            relaxation_factor: config.relaxation_factor,
            max_relaxations: config.max_relaxations,
        }
    }

    pub fn safety_radius(&self) -> f32 {
        self.safety_radius
    }

    /// Places `count` positions with the configured clearance
    pub fn place<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        region: &Rect,
        y: f32,
        count: usize,
        blockers: &dyn BlockerQuery,
        entity: &str,
    ) -> Result<Vec<Vec3>> {
        self.place_with_radius(rng, region, y, count, blockers, entity, self.safety_radius)
    }

    /// Like `place`, relaxing clearance instead of failing
    pub fn place_relaxed<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        region: &Rect,
        y: f32,
        count: usize,
        blockers: &dyn BlockerQuery,
        entity: &str,
    ) -> Vec<Vec3> {
        let mut radius = self.safety_radius;
        for round in 0..=self.max_relaxations {
            match self.place_with_radius(rng, region, y, count, blockers, entity, radius) {
                Ok(positions) => return positions,
                Err(err) => {
                    warn!(%err, round, radius, "spawn exhausted, relaxing clearance");
                    radius *= self.relaxation_factor;
                }
            }
        }

        warn!(entity, count, "spawn clearance abandoned, using unconstrained positions");
        (0..count).map(|_| region.sample(rng, y)).collect()
    }

    fn place_with_radius<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        region: &Rect,
        y: f32,
        count: usize,
        blockers: &dyn BlockerQuery,
        entity: &str,
        radius: f32,
    ) -> Result<Vec<Vec3>> {
        let mut accepted: Vec<Vec3> = Vec::with_capacity(count);

        while accepted.len() < count {
            let mut placed = false;
            for _ in 0..self.max_attempts {
                let candidate = region.sample(rng, y);
                let clear = !blockers.is_blocked(&candidate, radius)
                    && accepted.iter().all(|p| planar_distance(p, &candidate) >= radius);
                if clear {
                    accepted.push(candidate);
                    placed = true;
                    break;
                }
            }
            if !placed {
                return Err(DungeonError::SpawnExhaustion {
                    entity: format!("{} #{}", entity, accepted.len()),
                    attempts: self.max_attempts,
                });
            }
        }

        Ok(accepted)
    }
}

// ============================================================================
// Landmarks
// ============================================================================

/// Lair corner and the region its companion targets spawn in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LairLayout {
    pub corner: Corner,
    pub position: Vec3,
    /// Yaw facing the arena centroid
    pub yaw: f32,
    pub companion_region: Rect,
}

pub fn solve_lair<R: Rng + ?Sized>(rng: &mut R, arena: &ArenaConfig) -> LairLayout {
    let corner = Corner::random(rng);
    let y = arena.floor_y + arena.lair_height_offset;
    let position = corner.position(&arena.floor, arena.lair_margin, y);
    let yaw = yaw_towards(&position, &arena.floor.center(y));
    let companion_region = corner.opposite_quadrant(&arena.floor, arena.lair_margin);
    LairLayout { corner, position, yaw, companion_region }
}

/// Exit door placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorLayout {
    pub side: ArenaSide,
    pub position: Vec3,
    /// Yaw facing the arena centroid
    pub yaw: f32,
}

pub fn solve_door<R: Rng + ?Sized>(rng: &mut R, arena: &ArenaConfig) -> DoorLayout {
    let side = ArenaSide::random(rng);
    let y = arena.floor_y + arena.door_height_offset;
    let position = side.midpoint(&arena.floor, arena.wall_margin, y);
    let yaw = yaw_towards(&position, &arena.floor.center(y));
    DoorLayout { side, position, yaw }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn solver() -> SpawnSolver {
        SpawnSolver::new(&SpawnConfig::default(), 0.8)
    }

    fn region() -> Rect {
        Rect::new(-9.0, 9.0, -9.0, 9.0)
    }

    #[test]
    fn test_place_respects_blockers_and_each_other() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut blockers = SphereBlockers::new();
        blockers.push(Vec3::zeros(), 3.0);

        let positions = solver().place(&mut rng, &region(), 0.3, 10, &blockers, "agent").unwrap();
        assert_eq!(positions.len(), 10);
        for (i, p) in positions.iter().enumerate() {
            assert!(planar_distance(p, &Vec3::zeros()) >= 3.8);
            assert!(region().contains(p.x, p.z));
            assert!((p.y - 0.3).abs() < 1e-6);
            for q in &positions[i + 1..] {
                assert!(planar_distance(p, q) >= 0.8);
            }
        }
    }

    #[test]
    fn test_saturated_region_reports_exhaustion() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut blockers = SphereBlockers::new();
        blockers.push(Vec3::zeros(), 100.0);

        let cfg = SpawnConfig { max_attempts: 50, ..SpawnConfig::default() };
        let err = SpawnSolver::new(&cfg, 0.8)
            .place(&mut rng, &region(), 0.3, 1, &blockers, "key")
            .unwrap_err();
        assert!(matches!(err, DungeonError::SpawnExhaustion { attempts: 50, .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_relaxed_never_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut blockers = SphereBlockers::new();
        blockers.push(Vec3::zeros(), 100.0);

        let cfg = SpawnConfig { max_attempts: 20, relaxation_factor: 0.5, max_relaxations: 2 };
        let positions =
            SpawnSolver::new(&cfg, 0.8).place_relaxed(&mut rng, &region(), 0.3, 3, &blockers, "target");
        assert_eq!(positions.len(), 3);
    }

    #[test]
    fn test_relaxation_succeeds_with_smaller_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        // A 1x1 region fits two points 0.9 apart only once the radius shrinks
        let tiny = Rect::new(0.0, 1.0, 0.0, 1.0);
        let cfg = SpawnConfig { max_attempts: 200, relaxation_factor: 0.5, max_relaxations: 3 };
        let solver = SpawnSolver::new(&cfg, 2.0);
        let positions = solver.place_relaxed(&mut rng, &tiny, 0.0, 2, &SphereBlockers::new(), "a");
        assert_eq!(positions.len(), 2);
        assert!(planar_distance(&positions[0], &positions[1]) >= 0.25);
    }

    #[test]
    fn test_lair_companions_opposite() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let lair = solve_lair(&mut rng, &arena);
            let q = lair.companion_region;
            // Lair and region sit on opposite sides of both centroid axes
            assert!((lair.position.x < arena.floor.center_x()) == (q.min_x >= arena.floor.center_x()));
            assert!((lair.position.z < arena.floor.center_z()) == (q.min_z >= arena.floor.center_z()));
        }
    }

    #[test]
    fn test_door_on_side_midpoint_facing_center() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let door = solve_door(&mut rng, &arena);
            seen.insert(door.side);
            let on_axis = door.position.x.abs() < 1e-5 || door.position.z.abs() < 1e-5;
            assert!(on_axis);
            let center = arena.floor.center(door.position.y);
            let angle = crate::models::geometry::signed_angle_to(&door.position, door.yaw, &center);
            assert!(angle.abs() < 1e-3);
        }
        assert_eq!(seen.len(), 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        /// No returned position lies within the safety radius of a blocker
        #[test]
        fn prop_positions_clear_of_blockers(
            seed in any::<u64>(),
            specs in prop::collection::vec((-9.0f32..9.0, -9.0f32..9.0, 0.1f32..1.0), 0..8),
            count in 1usize..5,
        ) {
            // At most 8 blockers of radius <= 1.0 with 0.8 clearance keep
            // occupancy well under half of the 18x18 region
            let mut blockers = SphereBlockers::new();
            for (x, z, r) in &specs {
                blockers.push(Vec3::new(*x, 0.3, *z), *r);
            }
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let positions = solver().place(&mut rng, &region(), 0.3, count, &blockers, "p").unwrap();

            prop_assert_eq!(positions.len(), count);
            for p in &positions {
                for (center, r) in blockers.iter() {
                    prop_assert!(planar_distance(p, center) >= 0.8 + r);
                }
            }
        }
    }
}

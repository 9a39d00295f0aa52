//! Arena geometry
//!
//! Positions are `nalgebra::Vector3<f32>` with Y up; all planar math works
//! on the (x, z) floor plane. Headings are yaw angles in degrees where 0
//! faces +z and positive yaw turns toward +x.

use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f32>;

/// Distance on the floor plane, ignoring height
pub fn planar_distance(a: &Vec3, b: &Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit forward vector for a yaw angle
pub fn heading_vector(yaw_deg: f32) -> Vec3 {
    let rad = yaw_deg.to_radians();
    Vec3::new(rad.sin(), 0.0, rad.cos())
}

/// Yaw that faces from `from` toward `to`
pub fn yaw_towards(from: &Vec3, to: &Vec3) -> f32 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    normalize_angle(dx.atan2(dz).to_degrees())
}

/// Signed angle in degrees, (-180, 180], from a heading to a point
pub fn signed_angle_to(from: &Vec3, yaw_deg: f32, to: &Vec3) -> f32 {
    normalize_angle(yaw_towards(from, to) - yaw_deg)
}

/// Wraps an angle into (-180, 180]
pub fn normalize_angle(deg: f32) -> f32 {
    let mut a = deg % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

// ============================================================================
// Rect
// ============================================================================

/// Axis-aligned rectangle on the floor plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Rect {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self { min_x, max_x, min_z, max_z }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) * 0.5
    }

    pub fn center_z(&self) -> f32 {
        (self.min_z + self.max_z) * 0.5
    }

    pub fn center(&self, y: f32) -> Vec3 {
        Vec3::new(self.center_x(), y, self.center_z())
    }

    pub fn diagonal(&self) -> f32 {
        (self.width() * self.width() + self.depth() * self.depth()).sqrt()
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.depth().max(0.0)
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Shrinks every side by `margin`
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(self.min_x + margin, self.max_x - margin, self.min_z + margin, self.max_z - margin)
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_z < self.min_z
    }

    /// Uniform sample at height `y`; a degenerate axis collapses to its minimum
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, y: f32) -> Vec3 {
        let x = if self.max_x > self.min_x { rng.gen_range(self.min_x..self.max_x) } else { self.min_x };
        let z = if self.max_z > self.min_z { rng.gen_range(self.min_z..self.max_z) } else { self.min_z };
        Vec3::new(x, y, z)
    }
}

// ============================================================================
// Corner / Side
// ============================================================================

/// Arena corner, used for the lair landmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    MinXMinZ,
    MinXMaxZ,
    MaxXMinZ,
    MaxXMaxZ,
}

impl Corner {
    pub const ALL: [Corner; 4] =
        [Corner::MinXMinZ, Corner::MinXMaxZ, Corner::MaxXMinZ, Corner::MaxXMaxZ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    fn on_min_x(self) -> bool {
        matches!(self, Corner::MinXMinZ | Corner::MinXMaxZ)
    }

    fn on_min_z(self) -> bool {
        matches!(self, Corner::MinXMinZ | Corner::MaxXMinZ)
    }

    /// Corner position pulled `margin` inside the arena
    pub fn position(self, arena: &Rect, margin: f32, y: f32) -> Vec3 {
        let x = if self.on_min_x() { arena.min_x + margin } else { arena.max_x - margin };
        let z = if self.on_min_z() { arena.min_z + margin } else { arena.max_z - margin };
        Vec3::new(x, y, z)
    }

    /// Quadrant diagonally opposite this corner
    ///
    /// The arena is split by the two axes crossing its centroid; the outer
    /// sides keep `margin` from the walls, the inner sides sit on the axes.
    pub fn opposite_quadrant(self, arena: &Rect, margin: f32) -> Rect {
        let (min_x, max_x) = if self.on_min_x() {
            (arena.center_x(), arena.max_x - margin)
        } else {
            (arena.min_x + margin, arena.center_x())
        };
        let (min_z, max_z) = if self.on_min_z() {
            (arena.center_z(), arena.max_z - margin)
        } else {
            (arena.min_z + margin, arena.center_z())
        };
        Rect::new(min_x, max_x, min_z, max_z)
    }
}

/// Arena side, used for the exit door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArenaSide {
    Left,
    Right,
    Bottom,
    Top,
}

impl ArenaSide {
    pub const ALL: [ArenaSide; 4] =
        [ArenaSide::Left, ArenaSide::Right, ArenaSide::Bottom, ArenaSide::Top];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Midpoint of this side, pulled `margin` inside the arena
    pub fn midpoint(self, arena: &Rect, margin: f32, y: f32) -> Vec3 {
        match self {
            ArenaSide::Left => Vec3::new(arena.min_x + margin, y, arena.center_z()),
            ArenaSide::Right => Vec3::new(arena.max_x - margin, y, arena.center_z()),
            ArenaSide::Bottom => Vec3::new(arena.center_x(), y, arena.min_z + margin),
            ArenaSide::Top => Vec3::new(arena.center_x(), y, arena.max_z - margin),
        }
    }
}

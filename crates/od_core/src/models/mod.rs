//! Domain models: personalities, agents, arena geometry

pub mod agent;
pub mod geometry;
pub mod personality;

pub use agent::{AgentAction, AgentId, AgentState, TargetId};
pub use geometry::{planar_distance, ArenaSide, Corner, Rect, Vec3};
pub use personality::{preferred_radius, trait_factor, OceanTrait, Personality};

//! Per-tick movement terms
//!
//! Visibility-gated terms take an `Option<Contact>`: `None` contributes 0
//! and there is no distance or angle to read.

use crate::engine::perception::Contact;

/// Conscientious diligence: progress toward the exit, in normalized distance
pub fn diligence(trait_value: f32, previous_distance: f32, distance: f32, scale: f32) -> f32 {
    trait_value * (previous_distance - distance) * scale
}

/// Procrastination for non-conscientious agents
///
/// `gain` is how far the agent pushed past its furthest distance from the
/// key grab point; only new ground pays.
pub fn procrastination(trait_value: f32, gain: f32, scale: f32) -> f32 {
    if gain > 0.0 {
        -trait_value * gain * scale
    } else {
        0.0
    }
}

/// Openness exploration while no threat is in view
///
/// Only positive openness and forward motion count.
pub fn exploration(openness: f32, forward: f32, threat_visible: bool, threats_alive: bool, scale: f32) -> f32 {
    if threat_visible || !threats_alive || forward <= 0.0 {
        return 0.0;
    }
    openness.max(0.0) * forward * scale
}

/// Impatience: charging straight at a visible threat
pub fn impatience(scale: f32, trait_value: f32, forward: f32, threat: Option<Contact>) -> f32 {
    match threat {
        Some(c) => scale * trait_value * forward * c.angle.to_radians().cos(),
        None => 0.0,
    }
}

/// Anxiety: keeping distance from a visible threat
pub fn anxiety(scale: f32, trait_value: f32, threat: Option<Contact>, max_distance: f32) -> f32 {
    match threat {
        Some(c) if max_distance > f32::EPSILON => {
            let normalized = c.distance / max_distance;
            scale * trait_value * (normalized - 0.5)
        }
        _ => 0.0,
    }
}

/// Neurotic hesitance and recklessness
///
/// Speed is punished while urgency sits below the pivot and rewarded above
/// it. Only positive neuroticism contributes.
pub fn recklessness(trait_value: f32, forward: f32, urgency: f32, pivot: f32, scale: f32) -> f32 {
    if trait_value <= 0.0 {
        return 0.0;
    }
    trait_value * forward * scale * (urgency.clamp(0.0, 1.0) - pivot)
}

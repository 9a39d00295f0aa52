//! Combat terms, evaluated when an agent lands a hit on a target

use crate::config::ShapingConfig;

/// Neuroticism bravery/panic
///
/// Below the threshold the agent hit again too soon:
/// `-trait * (exp(k * dt) - floor) * scale`. At or above it the agent waited:
/// `trait * ln(dt - threshold + 1) * log_scale`.
pub fn bravery(trait_value: f32, since_last_hit: f32, cfg: &ShapingConfig) -> f32 {
    let dt = since_last_hit.max(0.0);
    if dt < cfg.bravery_threshold {
        -trait_value * ((cfg.bravery_time_scale * dt).exp() - cfg.bravery_panic_floor) * cfg.bravery_scale
    } else {
        trait_value * (dt - cfg.bravery_threshold + 1.0).ln() * cfg.bravery_log_scale
    }
}

/// Agreeableness cooperation
///
/// A non-agreeable agent striking an untouched target is paid
/// `base * (1 - trait)`; every other case pays `base * trait * coop_scale`.
pub fn cooperation(base: f32, trait_value: f32, hit_by_others: bool, coop_scale: f32) -> f32 {
    if !hit_by_others && trait_value < 0.0 {
        base * (1.0 - trait_value)
    } else {
        base * trait_value * coop_scale
    }
}

/// Conscientiousness commitment: `±base_factor * trait`, + when sticking with the same target
pub fn commitment(base_factor: f32, trait_value: f32, same_target: bool) -> f32 {
    let switch = if same_target { 1.0 } else { -1.0 };
    base_factor * trait_value * switch
}

/// Agreeableness heroism for the finishing blow: `urgency^2 * trait * base`
pub fn heroism(urgency: f32, trait_value: f32, base: f32) -> f32 {
    let u = urgency.clamp(0.0, 1.0);
    u * u * trait_value * base
}

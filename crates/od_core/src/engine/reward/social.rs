//! Extraversion terms
//!
//! Both use a preferred interaction radius interpolated from the trait:
//! introverts (-1) want the wide radius, extroverts (+1) the narrow one.

/// Density-coupled social reward
///
/// `base * trait * (2 * density - 1)`: zero at density 0.5 and odd in the
/// trait. Used for initiative (hitting a target) and embarrassment
/// (grabbing the key).
pub fn density_coupled(base: f32, trait_value: f32, density: f32) -> f32 {
    base * trait_value * (2.0 * density - 1.0)
}

/// Socialization: reward for closing the gap to the preferred team radius
pub fn socialization(trait_value: f32, previous_error: f32, error: f32) -> f32 {
    trait_value * (previous_error - error)
}

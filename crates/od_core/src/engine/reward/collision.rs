//! Collision terms

/// Conscientious self control, constant per contact
pub fn self_control(scale: f32, conscientiousness: f32) -> f32 {
    scale * conscientiousness
}

/// Agreeable politeness, constant per peer contact
pub fn politeness(scale: f32, agreeableness: f32) -> f32 {
    scale * agreeableness
}

/// Neurotic panic, grows with urgency; only positive neuroticism contributes
pub fn panic(scale: f32, neuroticism: f32, urgency: f32) -> f32 {
    if neuroticism <= 0.0 {
        return 0.0;
    }
    urgency.clamp(0.0, 1.0) * neuroticism * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_terms() {
        assert!((self_control(-0.1, 1.0) + 0.1).abs() < 1e-6);
        assert!((politeness(-0.1, -1.0) - 0.1).abs() < 1e-6);
        assert_eq!(panic(0.1, -0.5, 1.0), 0.0);
        assert_eq!(panic(0.1, 1.0, 0.0), 0.0);
        assert!((panic(0.1, 1.0, 0.5) - 0.05).abs() < 1e-6);
    }
}

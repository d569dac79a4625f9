//! Expected damage.

use crate::rolls::success_probability;
use serde::{Deserialize, Serialize};

/// Averaged inputs to the damage estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageInput {
    /// Average number of attacks.
    pub attacks: f64,
    pub hit_probability: f64,
    pub wound_probability: f64,
    pub failed_save_probability: f64,
    /// Average damage per unsaved wound.
    pub damage: f64,
    /// Feel No Pain target, if the defender has one.
    pub feel_no_pain: Option<i32>,
}

/// Expected values at each stage of the attack sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEstimate {
    pub hits: f64,
    pub wounds: f64,
    pub unsaved_wounds: f64,
    /// Fraction of damage that gets through Feel No Pain.
    pub feel_no_pain_factor: f64,
    pub expected_damage: f64,
}

/// Fraction of damage not stopped by a Feel No Pain roll.
///
/// `1.0` without Feel No Pain.
pub fn feel_no_pain_factor(feel_no_pain: Option<i32>) -> f64 {
    match feel_no_pain {
        Some(target) => 1.0 - success_probability(target),
        None => 1.0,
    }
}

/// Walk the attack sequence with expected values.
///
/// # Examples
///
/// ```rust
/// use hitroll::damage::{estimate, DamageInput};
///
/// let estimate = estimate(&DamageInput {
///     attacks: 12.0,
///     hit_probability: 0.5,
///     wound_probability: 0.5,
///     failed_save_probability: 0.5,
///     damage: 2.0,
///     feel_no_pain: None,
/// });
///
/// assert_eq!(estimate.hits, 6.0);
/// assert_eq!(estimate.expected_damage, 3.0);
/// ```
pub fn estimate(input: &DamageInput) -> DamageEstimate {
    let hits = input.attacks * input.hit_probability;
    let wounds = hits * input.wound_probability;
    let unsaved_wounds = wounds * input.failed_save_probability;
    let factor = feel_no_pain_factor(input.feel_no_pain);
    DamageEstimate {
        hits,
        wounds,
        unsaved_wounds,
        feel_no_pain_factor: factor,
        expected_damage: unsaved_wounds * input.damage * factor,
    }
}

/// Expected damage of one attack profile.
pub fn expected_damage(input: &DamageInput) -> f64 {
    estimate(input).expected_damage
}

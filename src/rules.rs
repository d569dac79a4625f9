//! Game-table constants.
//!
//! [`RollRules`] holds the numbers the roll calculators clamp and cap
//! against, plus the weapon characteristics assumed when the attacker
//! has no weapon selected. The defaults are the standard table; a JSON
//! document can override any subset of them.

use crate::dice::Dice;
use crate::error::RulesError;
use serde::{Deserialize, Serialize};

/// Caps, clamps and fallback characteristics used by the calculators.
///
/// # Examples
///
/// ```rust
/// use hitroll::RollRules;
///
/// let rules = RollRules::from_json(r#"{ "modifierCap": 2 }"#).unwrap();
/// assert_eq!(rules.modifier_cap, 2);
/// assert_eq!(rules.max_target, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RollRules {
    /// Largest net hit or wound modifier, in either direction.
    pub modifier_cap: i32,
    /// Best hit/wound/save target a roll can need.
    pub min_target: i32,
    /// Worst hit/wound target a roll can need.
    pub max_target: i32,
    /// Save target meaning no save is possible.
    pub no_save: i32,
    /// Cover only improves saves of this target or worse.
    pub cover_threshold: i32,
    pub default_bs_ws: i32,
    pub default_strength: i32,
    pub default_ap: i32,
    pub default_attacks: Dice,
    pub default_damage: Dice,
}

impl Default for RollRules {
    fn default() -> Self {
        Self {
            modifier_cap: 1,
            min_target: 2,
            max_target: 6,
            no_save: 7,
            cover_threshold: 4,
            default_bs_ws: 4,
            default_strength: 4,
            default_ap: 0,
            default_attacks: Dice::fixed(1),
            default_damage: Dice::fixed(1),
        }
    }
}

impl RollRules {
    /// Parse an override document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self =
            serde_json::from_str(json).map_err(|e| RulesError::malformed("roll rules", e))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check the table is internally consistent.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.modifier_cap < 0 {
            return Err(RulesError::InvalidRules(
                "modifierCap",
                format!("must not be negative, got {}", self.modifier_cap),
            ));
        }
        if self.min_target < 1 || self.min_target > self.max_target {
            return Err(RulesError::InvalidRules(
                "minTarget",
                format!(
                    "must be between 1 and maxTarget ({}), got {}",
                    self.max_target, self.min_target
                ),
            ));
        }
        if self.max_target > 6 {
            return Err(RulesError::InvalidRules(
                "maxTarget",
                format!("a D6 cannot roll above 6, got {}", self.max_target),
            ));
        }
        if self.no_save <= self.max_target {
            return Err(RulesError::InvalidRules(
                "noSave",
                format!(
                    "must be above maxTarget ({}), got {}",
                    self.max_target, self.no_save
                ),
            ));
        }
        if self.default_strength < 1 {
            return Err(RulesError::InvalidRules(
                "defaultStrength",
                format!("must be at least 1, got {}", self.default_strength),
            ));
        }
        Ok(())
    }

    /// Clamp a hit or wound target.
    pub fn clamp_target(&self, target: i32) -> i32 {
        target.clamp(self.min_target, self.max_target)
    }

    /// Clamp a save target; [`no_save`](Self::no_save) is the worst.
    pub fn clamp_save(&self, target: i32) -> i32 {
        target.clamp(self.min_target, self.no_save)
    }

    /// Clip a net hit or wound modifier to `±modifier_cap`.
    pub fn cap_modifier(&self, net: i32) -> i32 {
        net.clamp(-self.modifier_cap, self.modifier_cap)
    }
}

//! Hit, Wound and Save target calculators.
//!
//! Each calculator is a pure function from characteristics and modifier
//! lists to a clamped D6 target, returning the breakdown of how the
//! target was reached. A target of `0` means the roll succeeds
//! automatically; a save target of [`RollRules::no_save`] means no save
//! is possible.

use crate::fields::RollKind;
use crate::rules::RollRules;
use crate::stats::{net_modifier, RollModifier};
use serde::{Deserialize, Serialize};

/// Target sentinel for a roll that needs no dice.
pub const AUTOMATIC: i32 = 0;

/// Hit or wound target with its breakdown.
///
/// `steps` lists each adjustment as `(description, target after it)`,
/// in the order applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollTarget {
    pub roll: RollKind,
    /// Target before modifiers (BS/WS, or the Strength vs Toughness table).
    pub base: i32,
    pub target: i32,
    pub automatic: bool,
    pub modifiers: Vec<RollModifier>,
    /// Uncapped sum of `modifiers`.
    pub net_modifier: i32,
    /// Modifier actually applied after capping.
    pub applied_modifier: i32,
    pub steps: Vec<(String, i32)>,
}

impl RollTarget {
    fn new(roll: RollKind, base: i32, modifiers: &[RollModifier]) -> Self {
        Self {
            roll,
            base,
            target: base,
            automatic: false,
            modifiers: modifiers.to_vec(),
            net_modifier: net_modifier(modifiers),
            applied_modifier: 0,
            steps: Vec::new(),
        }
    }

    fn step(&mut self, description: impl Into<String>, target: i32) {
        self.target = target;
        self.steps.push((description.into(), target));
    }

    /// Chance a single D6 meets this target.
    pub fn probability(&self) -> f64 {
        success_probability(self.target)
    }

    fn modified(
        roll: RollKind,
        base: i32,
        modifiers: &[RollModifier],
        automatic: bool,
        rules: &RollRules,
    ) -> Self {
        let mut result = Self::new(roll, base, modifiers);
        if automatic {
            result.automatic = true;
            result.step("automatic success", AUTOMATIC);
            return result;
        }

        result.applied_modifier = rules.cap_modifier(result.net_modifier);
        if result.applied_modifier != result.net_modifier {
            result.steps.push((
                format!(
                    "modifier {:+} capped to {:+}",
                    result.net_modifier, result.applied_modifier
                ),
                base,
            ));
        }
        if result.applied_modifier != 0 {
            result.step(
                format!("modifier {:+}", result.applied_modifier),
                base.saturating_sub(result.applied_modifier),
            );
        }
        let clamped = rules.clamp_target(result.target);
        if clamped != result.target {
            result.step("clamped", clamped);
        }
        result
    }
}

/// Hit target: BS/WS minus the capped net modifier, clamped.
///
/// # Examples
///
/// ```rust
/// use hitroll::rolls::calculate_hit_target;
/// use hitroll::stats::RollModifier;
/// use hitroll::RollRules;
///
/// let rules = RollRules::default();
/// let modifiers = vec![
///     RollModifier::new(1, "Heavy"),
///     RollModifier::new(1, "Oath of Moment"),
/// ];
///
/// let hit = calculate_hit_target(4, &modifiers, false, &rules);
/// assert_eq!(hit.net_modifier, 2);
/// assert_eq!(hit.applied_modifier, 1);
/// assert_eq!(hit.target, 3);
/// ```
pub fn calculate_hit_target(
    bs_ws: i32,
    modifiers: &[RollModifier],
    auto_hit: bool,
    rules: &RollRules,
) -> RollTarget {
    RollTarget::modified(RollKind::Hit, bs_ws, modifiers, auto_hit, rules)
}

/// Unmodified wound target from the Strength vs Toughness table.
///
/// | Strength vs Toughness | Target |
/// |---|---|
/// | S ≥ 2T | 2+ |
/// | S > T | 3+ |
/// | S = T | 4+ |
/// | S ≤ T/2 | 6+ |
/// | otherwise | 5+ |
pub fn calculate_base_wound_target(strength: i32, toughness: i32) -> i32 {
    if strength >= toughness.saturating_mul(2) {
        2
    } else if strength > toughness {
        3
    } else if strength == toughness {
        4
    } else if strength.saturating_mul(2) <= toughness {
        6
    } else {
        5
    }
}

/// Wound target: the table value minus the capped net modifier, clamped.
pub fn calculate_wound_target(
    strength: i32,
    toughness: i32,
    modifiers: &[RollModifier],
    auto_wound: bool,
    rules: &RollRules,
) -> RollTarget {
    let base = calculate_base_wound_target(strength, toughness);
    RollTarget::modified(RollKind::Wound, base, modifiers, auto_wound, rules)
}

/// Everything the save calculator looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveInput<'a> {
    /// Armour save; [`RollRules::no_save`] if the model has none.
    pub sv: i32,
    pub inv_sv: Option<i32>,
    /// Only the magnitude matters.
    pub ap: i32,
    pub in_cover: bool,
    pub ignores_cover: bool,
    pub modifiers: &'a [RollModifier],
}

/// Save target with its breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTarget {
    /// Final target, after choosing between armour and invulnerable.
    pub target: i32,
    /// Armour save after AP, cover and modifiers, clamped.
    pub armour_target: i32,
    pub invuln_target: Option<i32>,
    pub invuln_used: bool,
    pub cover_applied: bool,
    pub modifiers: Vec<RollModifier>,
    /// Sum of `modifiers`; save modifiers are never capped.
    pub net_modifier: i32,
    pub steps: Vec<(String, i32)>,
}

impl SaveTarget {
    /// Chance a single D6 makes the save.
    pub fn probability(&self) -> f64 {
        success_probability(self.target)
    }

    /// Chance the save is failed.
    pub fn failed_probability(&self) -> f64 {
        failed_save_probability(self.target)
    }
}

/// Save target.
///
/// The armour save is worsened by `|AP|`, improved by 1 for cover when
/// the AP-adjusted save is [`RollRules::cover_threshold`] or worse and
/// the weapon does not ignore cover, then improved by the full net save
/// modifier. A strictly better invulnerable save replaces it; the
/// invulnerable value is taken raw and cover no longer counts.
///
/// # Examples
///
/// ```rust
/// use hitroll::rolls::{calculate_save_target, SaveInput};
/// use hitroll::RollRules;
///
/// let rules = RollRules::default();
/// let save = calculate_save_target(
///     &SaveInput {
///         sv: 3,
///         inv_sv: Some(4),
///         ap: -2,
///         in_cover: false,
///         ignores_cover: false,
///         modifiers: &[],
///     },
///     &rules,
/// );
///
/// assert_eq!(save.armour_target, 5);
/// assert_eq!(save.target, 4);
/// assert!(save.invuln_used);
/// ```
pub fn calculate_save_target(input: &SaveInput<'_>, rules: &RollRules) -> SaveTarget {
    let mut steps = vec![("armour save".to_string(), input.sv)];
    let mut armour = input.sv;

    let ap = input.ap.saturating_abs();
    if ap != 0 {
        armour = armour.saturating_add(ap);
        steps.push((format!("AP -{}", ap), armour));
    }

    let mut cover_applied = false;
    if input.in_cover && !input.ignores_cover && armour >= rules.cover_threshold {
        armour = armour.saturating_sub(1);
        cover_applied = true;
        steps.push(("cover".to_string(), armour));
    }

    let net = net_modifier(input.modifiers);
    if net != 0 {
        armour = armour.saturating_sub(net);
        steps.push((format!("modifier {:+}", net), armour));
    }

    let armour_target = rules.clamp_save(armour);
    if armour_target != armour {
        steps.push(("clamped".to_string(), armour_target));
    }

    let mut target = armour_target;
    let mut invuln_used = false;
    if let Some(invuln) = input.inv_sv {
        if invuln < armour_target {
            target = rules.clamp_save(invuln);
            invuln_used = true;
            cover_applied = false;
            steps.push(("invulnerable save".to_string(), target));
        }
    }

    SaveTarget {
        target,
        armour_target,
        invuln_target: input.inv_sv,
        invuln_used,
        cover_applied,
        modifiers: input.modifiers.to_vec(),
        net_modifier: net,
        steps,
    }
}

/// Chance a single D6 rolls `target` or more.
///
/// Targets of 1 or less (including [`AUTOMATIC`]) always succeed; 7 or
/// more never do.
pub fn success_probability(target: i32) -> f64 {
    if target <= 1 {
        1.0
    } else if target >= 7 {
        0.0
    } else {
        f64::from(7 - target) / 6.0
    }
}

/// Chance a save at `target` is failed.
pub fn failed_save_probability(target: i32) -> f64 {
    1.0 - success_probability(target)
}

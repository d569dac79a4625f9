//! Combat orchestration.
//!
//! [`CombatResolver`] runs one attacker/defender pairing end to end:
//! collect each side's mechanics, apply them, compute the three roll
//! targets and the expected damage, and explain which mechanics took
//! effect.
//!
//! Hit and wound rolls belong to the attacker and the save roll to the
//! defender, but either side's rules may modify any of them (a defender's
//! "-1 to be hit", an attacker's "-1 to saves"). Each roll therefore uses
//! the modifiers of both sides, the rolling side's first.

use crate::applicator::{apply_effects_with_details, ApplicationDetails, MechanicOutcome};
use crate::collector::MechanicCollector;
use crate::context::GameContext;
use crate::core_abilities::CoreAbilityRegistry;
use crate::damage::{estimate, DamageEstimate, DamageInput};
use crate::dice::Dice;
use crate::entity::Perspective;
use crate::fields::RollKind;
use crate::mechanic::Mechanic;
use crate::rolls::{
    calculate_hit_target, calculate_save_target, calculate_wound_target, RollTarget, SaveInput,
    SaveTarget,
};
use crate::rules::RollRules;
use crate::stats::{ModifiedStats, RerollGrades, RollModifier};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Added keyword or weapon attribute that denies the defender cover.
pub const IGNORES_COVER: &str = "IGNORES COVER";
/// Added ability that puts the defender in cover.
pub const BENEFIT_OF_COVER: &str = "BENEFIT OF COVER";

/// One mechanic considered during a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMechanic {
    /// Side the mechanic was collected for.
    pub perspective: Perspective,
    /// Position within that side's collected list.
    pub index: usize,
    pub mechanic: Mechanic,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AppliedMechanic {
    fn from_outcome(perspective: Perspective, outcome: MechanicOutcome) -> Self {
        Self {
            perspective,
            index: outcome.index,
            mechanic: outcome.mechanic,
            applied: outcome.applied,
            reason: outcome.reason,
        }
    }
}

/// Per-roll success chances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollProbabilities {
    pub hit: f64,
    pub wound: f64,
    pub save: f64,
    pub failed_save: f64,
}

/// Outcome of one attacker/defender pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatResult {
    /// Hit target; `0` when hits are automatic.
    pub to_hit: i32,
    /// Wound target; `0` when wounds are automatic.
    pub to_wound: i32,
    /// Save target; `7` when no save is possible.
    pub to_save: i32,
    pub auto_hit: bool,
    pub auto_wound: bool,
    pub invuln_save_used: bool,
    pub cover_applied: bool,
    pub feel_no_pain: Option<i32>,
    pub hit_modifiers: Vec<RollModifier>,
    pub wound_modifiers: Vec<RollModifier>,
    pub save_modifiers: Vec<RollModifier>,
    /// Hit and wound grades are the attacker's, the save grade the defender's.
    pub rerolls: RerollGrades,
    pub probabilities: RollProbabilities,
    /// Average attacks of the selected weapon.
    pub attacks: f64,
    /// Average damage per unsaved wound.
    pub damage: f64,
    pub expected_damage: f64,
    pub hit: RollTarget,
    pub wound: RollTarget,
    pub save: SaveTarget,
    pub estimate: DamageEstimate,
    /// Every collected mechanic, attacker's first, in collection order.
    pub applied_mechanics: Vec<AppliedMechanic>,
}

impl CombatResult {
    /// Mechanics that took effect.
    pub fn applied(&self) -> impl Iterator<Item = &AppliedMechanic> {
        self.applied_mechanics.iter().filter(|m| m.applied)
    }

    /// Mechanics whose conditions failed.
    pub fn not_applied(&self) -> impl Iterator<Item = &AppliedMechanic> {
        self.applied_mechanics.iter().filter(|m| !m.applied)
    }
}

/// Resolves attacker/defender pairings against one registry and rule table.
///
/// # Examples
///
/// ```rust
/// use hitroll::datasheet::{Datasheet, ModelProfile, WeaponProfile};
/// use hitroll::{CombatResolver, Dice, GameContext, UnitContext};
///
/// let intercessor = ModelProfile {
///     name: "Intercessor".into(), m: Some(6), t: 4, sv: Some(3), inv_sv: None,
///     w: 2, ld: Some(6), oc: Some(2),
/// };
/// let bolt_rifle = WeaponProfile {
///     name: "Bolt rifle".into(), range: Some(24), a: Dice::fixed(2), bs_ws: 3,
///     s: 4, ap: Some(-1), d: Dice::fixed(1), attributes: vec![],
/// };
/// let attacker = UnitContext::new(Datasheet::default(), intercessor.clone()).with_weapon(bolt_rifle);
/// let defender = UnitContext::new(Datasheet::default(), intercessor);
///
/// let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));
/// assert_eq!((result.to_hit, result.to_wound, result.to_save), (3, 4, 4));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CombatResolver {
    registry: CoreAbilityRegistry,
    rules: RollRules,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(CoreAbilityRegistry::standard(), RollRules::default())
    }
}

impl CombatResolver {
    pub fn new(registry: CoreAbilityRegistry, rules: RollRules) -> Self {
        Self { registry, rules }
    }

    pub fn registry(&self) -> &CoreAbilityRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &RollRules {
        &self.rules
    }

    /// Resolve one pairing.
    pub fn resolve(&self, ctx: &GameContext) -> CombatResult {
        let collected = MechanicCollector::new(&self.registry).collect_all(ctx);
        let attacker =
            apply_effects_with_details(&collected.attacker_mechanics, ctx, Perspective::Attacker);
        let defender =
            apply_effects_with_details(&collected.defender_mechanics, ctx, Perspective::Defender);

        let mut result = self.resolve_stats(
            &attacker.stats,
            &defender.stats,
            ctx.defender.combat_status.in_cover,
        );
        result.applied_mechanics = explain(Perspective::Attacker, attacker)
            .chain(explain(Perspective::Defender, defender))
            .collect();

        debug!(
            attacker = %ctx.attacker.datasheet.name,
            defender = %ctx.defender.datasheet.name,
            to_hit = result.to_hit,
            to_wound = result.to_wound,
            to_save = result.to_save,
            expected_damage = result.expected_damage,
            "resolved combat"
        );
        result
    }

    /// Compute targets and damage from already modified stats.
    ///
    /// The returned result has an empty `applied_mechanics` list.
    pub fn resolve_stats(
        &self,
        attacker: &ModifiedStats,
        defender: &ModifiedStats,
        defender_in_cover: bool,
    ) -> CombatResult {
        let rules = &self.rules;
        let weapon = attacker.weapon.as_ref();
        let bs_ws = weapon.map_or(rules.default_bs_ws, |w| w.bs_ws);
        let strength = weapon.map_or(rules.default_strength, |w| w.s);
        let ap = weapon.map_or(rules.default_ap, |w| w.ap);
        let attacks = weapon.map_or(rules.default_attacks, |w| w.a);
        let damage: Dice = weapon.map_or(rules.default_damage, |w| w.d);

        let ignores_cover = attacker.has_keyword(IGNORES_COVER)
            || weapon.is_some_and(|w| w.has_attribute(IGNORES_COVER));
        let in_cover = defender_in_cover || defender.has_ability(BENEFIT_OF_COVER);

        let hit_modifiers = merged(attacker, defender, RollKind::Hit);
        let wound_modifiers = merged(attacker, defender, RollKind::Wound);
        let save_modifiers = merged(defender, attacker, RollKind::Save);

        let hit = calculate_hit_target(bs_ws, &hit_modifiers, attacker.auto_hit, rules);
        let wound = calculate_wound_target(
            strength,
            defender.model.t,
            &wound_modifiers,
            attacker.auto_wound,
            rules,
        );
        let save = calculate_save_target(
            &SaveInput {
                sv: defender.model.sv,
                inv_sv: defender.model.inv_sv,
                ap,
                in_cover,
                ignores_cover,
                modifiers: &save_modifiers,
            },
            rules,
        );

        let probabilities = RollProbabilities {
            hit: hit.probability(),
            wound: wound.probability(),
            save: save.probability(),
            failed_save: save.failed_probability(),
        };
        let estimate = estimate(&DamageInput {
            attacks: attacks.average(),
            hit_probability: probabilities.hit,
            wound_probability: probabilities.wound,
            failed_save_probability: probabilities.failed_save,
            damage: damage.average(),
            feel_no_pain: defender.feel_no_pain,
        });

        CombatResult {
            to_hit: hit.target,
            to_wound: wound.target,
            to_save: save.target,
            auto_hit: hit.automatic,
            auto_wound: wound.automatic,
            invuln_save_used: save.invuln_used,
            cover_applied: save.cover_applied,
            feel_no_pain: defender.feel_no_pain,
            hit_modifiers,
            wound_modifiers,
            save_modifiers,
            rerolls: RerollGrades {
                hit: attacker.rerolls.hit,
                wound: attacker.rerolls.wound,
                save: defender.rerolls.save,
            },
            probabilities,
            attacks: attacks.average(),
            damage: damage.average(),
            expected_damage: estimate.expected_damage,
            hit,
            wound,
            save,
            estimate,
            applied_mechanics: Vec::new(),
        }
    }
}

/// The rolling side's own modifiers followed by those its opponent imposes.
fn merged(roller: &ModifiedStats, opponent: &ModifiedStats, roll: RollKind) -> Vec<RollModifier> {
    roller
        .modifiers(roll)
        .iter()
        .chain(opponent.imposed(roll))
        .cloned()
        .collect()
}

fn explain(
    perspective: Perspective,
    details: ApplicationDetails,
) -> impl Iterator<Item = AppliedMechanic> {
    let mut outcomes = details.applied;
    outcomes.extend(details.not_applied);
    outcomes.sort_by_key(|outcome| outcome.index);
    outcomes
        .into_iter()
        .map(move |outcome| AppliedMechanic::from_outcome(perspective, outcome))
}

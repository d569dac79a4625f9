//! Effect application.
//!
//! Folds a side's applicable mechanics into a fresh [`ModifiedStats`].
//! Mechanics are filtered through the condition evaluator, then applied
//! in effect-priority order (see [`Effect::priority`]); within one
//! priority, collection order is kept.

use crate::condition::{evaluate_with_reason, filter_applicable};
use crate::context::GameContext;
use crate::entity::Perspective;
use crate::fields::{Attribute, RollKind};
use crate::mechanic::{Effect, Mechanic};
use crate::stats::{ModifiedStats, RerollGrade, RollModifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{trace, warn};

/// Whether one collected mechanic took effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicOutcome {
    /// Position of the mechanic in the list passed to the applicator.
    pub index: usize,
    pub mechanic: Mechanic,
    pub applied: bool,
    /// First failing condition, for mechanics that did not apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Stats plus the applied / not-applied partition of the input mechanics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    pub stats: ModifiedStats,
    pub applied: Vec<MechanicOutcome>,
    pub not_applied: Vec<MechanicOutcome>,
}

/// Apply `mechanics` to the `perspective` side's selected profiles.
///
/// # Examples
///
/// ```rust
/// use hitroll::applicator::apply_effects;
/// use hitroll::datasheet::{Datasheet, ModelProfile};
/// use hitroll::fields::{ModelField, RollKind};
/// use hitroll::mechanic::Mechanic;
/// use hitroll::{GameContext, Perspective, UnitContext};
///
/// let model = ModelProfile {
///     name: "Brute".into(), m: Some(6), t: 5, sv: Some(4), inv_sv: None,
///     w: 3, ld: Some(7), oc: Some(1),
/// };
/// let unit = UnitContext::new(Datasheet::default(), model);
/// let ctx = GameContext::new(unit.clone(), unit);
///
/// let mechanics = vec![
///     Mechanic::roll_penalty(RollKind::Save, -1),
///     Mechanic::static_number(ModelField::T, 6),
/// ];
/// let stats = apply_effects(&mechanics, &ctx, Perspective::Defender);
///
/// assert_eq!(stats.model.t, 6);
/// assert_eq!(stats.save_modifiers[0].value, -1);
/// ```
pub fn apply_effects(
    mechanics: &[Mechanic],
    ctx: &GameContext,
    perspective: Perspective,
) -> ModifiedStats {
    let applicable = ordered_applicable(mechanics, ctx, perspective);
    fold(&applicable, ctx, perspective)
}

/// Like [`apply_effects`], also reporting which mechanics applied and why
/// the others did not. The returned stats are identical.
pub fn apply_effects_with_details(
    mechanics: &[Mechanic],
    ctx: &GameContext,
    perspective: Perspective,
) -> ApplicationDetails {
    let applicable = ordered_applicable(mechanics, ctx, perspective);
    let stats = fold(&applicable, ctx, perspective);
    let applied_ids: BTreeSet<usize> = applicable.iter().map(|(index, _)| *index).collect();

    let mut applied = Vec::new();
    let mut not_applied = Vec::new();
    for (index, mechanic) in mechanics.iter().enumerate() {
        if applied_ids.contains(&index) {
            applied.push(MechanicOutcome {
                index,
                mechanic: mechanic.clone(),
                applied: true,
                reason: None,
            });
        } else {
            let evaluation = evaluate_with_reason(mechanic, ctx, perspective);
            trace!(
                side = %perspective,
                mechanic = %mechanic,
                reason = evaluation.reason.as_deref().unwrap_or(""),
                "mechanic skipped"
            );
            not_applied.push(MechanicOutcome {
                index,
                mechanic: mechanic.clone(),
                applied: false,
                reason: evaluation.reason,
            });
        }
    }

    ApplicationDetails {
        stats,
        applied,
        not_applied,
    }
}

fn ordered_applicable<'m>(
    mechanics: &'m [Mechanic],
    ctx: &GameContext,
    perspective: Perspective,
) -> Vec<(usize, &'m Mechanic)> {
    let mut applicable = filter_applicable(mechanics, ctx, perspective);
    // stable: equal priorities keep collection order
    applicable.sort_by_key(|(_, mechanic)| mechanic.effect.priority());
    applicable
}

fn fold(
    applicable: &[(usize, &Mechanic)],
    ctx: &GameContext,
    perspective: Perspective,
) -> ModifiedStats {
    let mut stats = ModifiedStats::from_unit(ctx.unit(perspective));
    for (_, mechanic) in applicable {
        trace!(side = %perspective, mechanic = %mechanic, "applying mechanic");
        apply_mechanic(&mut stats, mechanic);
    }
    stats
}

/// Apply a single mechanic to `stats`, ignoring its conditions.
///
/// Malformed mechanics (no roll selected, non-numeric values) leave the
/// stats untouched.
pub fn apply_mechanic(stats: &mut ModifiedStats, mechanic: &Mechanic) {
    match mechanic.effect {
        Effect::AddsKeyword => stats.add_keywords(&mechanic.keywords),
        Effect::AddsAbility => {
            stats.add_abilities(&mechanic.abilities);
            let grants_fnp = mechanic
                .abilities
                .iter()
                .any(|name| name.to_uppercase().contains("FEEL NO PAIN"));
            if grants_fnp {
                if let Some(value) = mechanic.value.as_ref().and_then(|v| v.as_int()) {
                    stats.offer_feel_no_pain(value);
                }
            }
        }
        Effect::StaticNumber => {
            let Some(value) = mechanic.value.as_ref().and_then(|v| v.as_int()) else {
                warn!(mechanic = %mechanic, "staticNumber without a numeric value ignored");
                return;
            };
            match &mechanic.attribute {
                Some(Attribute::Model(field)) => stats.model.set(*field, value),
                Some(Attribute::Weapon(field)) => {
                    if let Some(weapon) = stats.weapon.as_mut() {
                        weapon.set(*field, value);
                    }
                }
                _ => warn!(mechanic = %mechanic, "staticNumber on an unmodifiable attribute ignored"),
            }
        }
        Effect::RollBonus | Effect::RollPenalty => {
            let (Some(roll), Some(value)) = (
                mechanic.roll(),
                mechanic.value.as_ref().and_then(|v| v.as_int()),
            ) else {
                warn!(mechanic = %mechanic, "roll modifier without roll or value ignored");
                return;
            };
            let value = if mechanic.effect == Effect::RollPenalty {
                value.saturating_abs().saturating_neg()
            } else {
                value
            };
            let modifier = RollModifier::new(value, mechanic.source_label());
            if mechanic.entity.targets_opponent() {
                stats.impose_modifier(roll, modifier);
            } else {
                stats.push_modifier(roll, modifier);
            }
        }
        Effect::AutoSuccess => match mechanic.roll() {
            Some(RollKind::Hit) => stats.auto_hit = true,
            Some(RollKind::Wound) => stats.auto_wound = true,
            Some(RollKind::Save) | None => {}
        },
        Effect::Reroll => {
            if let Some(roll) = mechanic.roll() {
                stats
                    .rerolls
                    .upgrade(roll, RerollGrade::from_value(mechanic.value.as_ref()));
            }
        }
        // resolved with damage, not as a stat change
        Effect::MortalWounds => {}
        Effect::Unknown => {}
    }
}

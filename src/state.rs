//! Entity state resolution.
//!
//! Resolves an [`Entity`] reference against a [`GameContext`] from one
//! side's perspective and exposes the derived facts conditions test:
//! keyword and ability sets, characteristic values and battlefield flags.

use crate::context::{CombatStatus, GameContext};
use crate::datasheet::{ModelProfile, WeaponProfile};
use crate::dice::Dice;
use crate::entity::{Entity, Perspective};
use crate::fields::{Attribute, ModelField, WeaponField};
use crate::value::Value;

/// Facts about one resolved entity.
///
/// Keywords and abilities are upper-cased and deduplicated, and include
/// those of every attached leader. Army-level entities resolve to an
/// empty state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState<'a> {
    pub model: Option<&'a ModelProfile>,
    pub weapon: Option<&'a WeaponProfile>,
    pub combat_status: Option<&'a CombatStatus>,
    pub keywords: Vec<String>,
    pub abilities: Vec<String>,
    leader_count: usize,
}

/// Resolve `entity` as seen from `perspective`.
///
/// # Examples
///
/// ```rust
/// use hitroll::datasheet::{Datasheet, ModelProfile};
/// use hitroll::{Entity, GameContext, Perspective, UnitContext};
///
/// let model = ModelProfile {
///     name: "Trooper".into(), m: Some(6), t: 3, sv: Some(5), inv_sv: None,
///     w: 1, ld: Some(7), oc: Some(2),
/// };
/// let sheet = Datasheet {
///     name: "Troopers".into(),
///     keywords: vec!["Infantry".into()],
///     ..Datasheet::default()
/// };
/// let unit = UnitContext::new(sheet, model);
/// let ctx = GameContext::new(unit.clone(), unit);
///
/// let target = hitroll::state::resolve(Entity::TargetUnit, &ctx, Perspective::Attacker);
/// assert_eq!(target.keywords, vec!["INFANTRY".to_string()]);
/// ```
pub fn resolve<'a>(
    entity: Entity,
    ctx: &'a GameContext,
    perspective: Perspective,
) -> EntityState<'a> {
    let Some(side) = entity.side(perspective) else {
        return EntityState::default();
    };
    let unit = ctx.unit(side);

    let keywords = normalize_names(
        unit.datasheet
            .keywords
            .iter()
            .chain(unit.attached_leaders.iter().flat_map(|l| l.keywords.iter())),
    );
    let abilities = normalize_names(
        unit.datasheet
            .abilities
            .iter()
            .chain(unit.attached_leaders.iter().flat_map(|l| l.abilities.iter()))
            .map(|ability| &ability.name),
    );

    EntityState {
        model: Some(&unit.model),
        weapon: unit.weapon.as_ref(),
        combat_status: Some(&unit.combat_status),
        keywords,
        abilities,
        leader_count: unit.attached_leaders.len(),
    }
}

impl EntityState<'_> {
    /// Read a characteristic from the model or weapon facet.
    ///
    /// Returns `None` if the entity lacks that facet or the attribute is
    /// not one of the readable model/weapon fields.
    pub fn attribute_value(&self, attribute: &Attribute) -> Option<Value> {
        match attribute {
            Attribute::Model(field) => {
                let model = self.model?;
                let value = match field {
                    ModelField::M => model.m?,
                    ModelField::T => model.t,
                    ModelField::Sv => model.sv?,
                    ModelField::InvSv => model.inv_sv?,
                    ModelField::W => model.w,
                    ModelField::Ld => model.ld?,
                    ModelField::Oc => model.oc?,
                };
                Some(Value::from(value))
            }
            Attribute::Weapon(field) => {
                let weapon = self.weapon?;
                match field {
                    WeaponField::Range => weapon.range.map(Value::from),
                    WeaponField::A => Some(dice_value(weapon.a)),
                    WeaponField::BsWs => Some(Value::from(weapon.bs_ws)),
                    WeaponField::S => Some(Value::from(weapon.s)),
                    WeaponField::Ap => Some(Value::from(weapon.ap.unwrap_or(0))),
                    WeaponField::D => Some(dice_value(weapon.d)),
                }
            }
            Attribute::Roll(_) | Attribute::Other(_) => None,
        }
    }

    /// Check a named battlefield flag. Unknown names are false.
    pub fn check_state(&self, name: &str) -> bool {
        if is_leader_state(name) {
            return self.leader_count > 0;
        }
        let Some(status) = self.combat_status else {
            return false;
        };
        match state_key(name).as_str() {
            "incover" => status.in_cover,
            "inengagementrange" => status.in_engagement_range,
            "inobjectiverange" | "withinobjectiverange" => status.in_objective_range,
            "remainedstationary" | "isstationary" | "stationary" => status.remained_stationary,
            "battleshocked" | "isbattleshocked" => status.battle_shocked,
            "hasfiredthisphase" | "hasfired" => status.has_fired_this_phase,
            "haschargedthisphase" | "hascharged" | "charged" => status.has_charged_this_phase,
            "belowhalfstrength" => status.below_half_strength,
            "belowstartingstrength" => status.below_starting_strength,
            "isdamaged" | "damaged" => status.is_damaged,
            _ => false,
        }
    }

    /// True if any of `keywords` is present (case-insensitive).
    pub fn has_any_keyword(&self, keywords: &[String]) -> bool {
        contains_any(&self.keywords, keywords)
    }

    /// True if any of `abilities` is present (case-insensitive).
    pub fn has_any_ability(&self, abilities: &[String]) -> bool {
        contains_any(&self.abilities, abilities)
    }
}

/// True for the flags that mean "a leader is attached".
pub fn is_leader_state(name: &str) -> bool {
    matches!(
        state_key(name).as_str(),
        "hasleader" | "isleadingunit" | "leading" | "isattached"
    )
}

/// Upper-case, trim and deduplicate names, keeping first-seen order.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = normalize_name(name.as_ref());
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn contains_any(have: &[String], wanted: &[String]) -> bool {
    wanted
        .iter()
        .map(|w| normalize_name(w))
        .any(|w| have.contains(&w))
}

fn state_key(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn dice_value(dice: Dice) -> Value {
    if dice.is_fixed() {
        Value::from(dice.modifier)
    } else {
        Value::from(dice.to_string())
    }
}

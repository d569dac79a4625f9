//! Modified stats snapshot.
//!
//! A [`ModifiedStats`] is built fresh for each side of each resolution by
//! the [`applicator`](crate::applicator). It starts as a copy of the
//! selected model and weapon profiles and accumulates what applicable
//! mechanics change.

use crate::context::UnitContext;
use crate::datasheet::{ModelProfile, WeaponProfile};
use crate::dice::Dice;
use crate::fields::{ModelField, RollKind, WeaponField};
use crate::state::normalize_name;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Armour save value meaning "no save possible".
pub const NO_SAVE: i32 = 7;

/// Model characteristics after static overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub m: i32,
    pub t: i32,
    pub sv: i32,
    pub inv_sv: Option<i32>,
    pub w: i32,
    pub ld: i32,
    pub oc: i32,
}

impl ModelStats {
    /// Copy a profile; a missing armour save becomes [`NO_SAVE`].
    pub fn from_profile(profile: &ModelProfile) -> Self {
        Self {
            m: profile.m.unwrap_or(0),
            t: profile.t,
            sv: profile.sv.unwrap_or(NO_SAVE),
            inv_sv: profile.inv_sv,
            w: profile.w,
            ld: profile.ld.unwrap_or(0),
            oc: profile.oc.unwrap_or(0),
        }
    }

    /// Overwrite one characteristic.
    pub fn set(&mut self, field: ModelField, value: i32) {
        match field {
            ModelField::M => self.m = value,
            ModelField::T => self.t = value,
            ModelField::Sv => self.sv = value,
            ModelField::InvSv => self.inv_sv = Some(value),
            ModelField::W => self.w = value,
            ModelField::Ld => self.ld = value,
            ModelField::Oc => self.oc = value,
        }
    }
}

/// Weapon characteristics after static overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponStats {
    pub name: String,
    /// `None` for melee weapons.
    pub range: Option<i32>,
    pub a: Dice,
    pub bs_ws: i32,
    pub s: i32,
    pub ap: i32,
    pub d: Dice,
    /// Upper-cased attribute names.
    pub attributes: Vec<String>,
}

impl WeaponStats {
    pub fn from_profile(profile: &WeaponProfile) -> Self {
        Self {
            name: profile.name.clone(),
            range: profile.range,
            a: profile.a,
            bs_ws: profile.bs_ws,
            s: profile.s,
            ap: profile.ap.unwrap_or(0),
            d: profile.d,
            attributes: profile
                .attributes
                .iter()
                .map(|attr| normalize_name(&attr.name))
                .collect(),
        }
    }

    /// Overwrite one characteristic.
    pub fn set(&mut self, field: WeaponField, value: i32) {
        match field {
            WeaponField::Range => self.range = Some(value),
            WeaponField::A => self.a = Dice::fixed(value),
            WeaponField::BsWs => self.bs_ws = value,
            WeaponField::S => self.s = value,
            WeaponField::Ap => self.ap = value,
            WeaponField::D => self.d = Dice::fixed(value),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.attributes.iter().any(|attr| *attr == name)
    }
}

/// One signed roll modifier and the rule it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollModifier {
    pub value: i32,
    pub source: String,
}

impl RollModifier {
    pub fn new(value: i32, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
        }
    }
}

/// Sum of a modifier list, uncapped. Saturates instead of overflowing.
pub fn net_modifier(modifiers: &[RollModifier]) -> i32 {
    modifiers
        .iter()
        .fold(0i32, |net, m| net.saturating_add(m.value))
}

/// How generous a re-roll is. Grades only ever upgrade.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum RerollGrade {
    #[default]
    None,
    Ones,
    Failed,
    All,
}

impl RerollGrade {
    /// Read a reroll mechanic's value.
    ///
    /// `"ones"` and `"failed"` are recognised; anything else, including a
    /// bare `true` or no value, grants a full re-roll.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_text).map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("ones") => RerollGrade::Ones,
            Some(s) if s.eq_ignore_ascii_case("failed") => RerollGrade::Failed,
            _ => RerollGrade::All,
        }
    }
}

/// Re-roll grade per roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerollGrades {
    pub hit: RerollGrade,
    pub wound: RerollGrade,
    pub save: RerollGrade,
}

impl RerollGrades {
    pub fn get(&self, roll: RollKind) -> RerollGrade {
        match roll {
            RollKind::Hit => self.hit,
            RollKind::Wound => self.wound,
            RollKind::Save => self.save,
        }
    }

    /// Raise the grade for `roll` if `grade` is strictly better.
    ///
    /// Returns true if the stored grade changed.
    pub fn upgrade(&mut self, roll: RollKind, grade: RerollGrade) -> bool {
        let slot = match roll {
            RollKind::Hit => &mut self.hit,
            RollKind::Wound => &mut self.wound,
            RollKind::Save => &mut self.save,
        };
        if grade > *slot {
            *slot = grade;
            true
        } else {
            false
        }
    }
}

/// Working snapshot of one side after applying its mechanics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedStats {
    pub model: ModelStats,
    pub weapon: Option<WeaponStats>,
    /// Upper-cased, deduplicated.
    pub added_abilities: Vec<String>,
    /// Upper-cased, deduplicated.
    pub added_keywords: Vec<String>,
    pub hit_modifiers: Vec<RollModifier>,
    pub wound_modifiers: Vec<RollModifier>,
    pub save_modifiers: Vec<RollModifier>,
    /// Modifiers this side imposes on the opponent's rolls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imposed_modifiers: Vec<(RollKind, RollModifier)>,
    pub auto_hit: bool,
    pub auto_wound: bool,
    pub rerolls: RerollGrades,
    /// Best (lowest) Feel No Pain value granted, if any.
    pub feel_no_pain: Option<i32>,
}

impl ModifiedStats {
    /// Initial snapshot: a copy of the unit's selected profiles.
    pub fn from_unit(unit: &UnitContext) -> Self {
        Self {
            model: ModelStats::from_profile(&unit.model),
            weapon: unit.weapon.as_ref().map(WeaponStats::from_profile),
            added_abilities: Vec::new(),
            added_keywords: Vec::new(),
            hit_modifiers: Vec::new(),
            wound_modifiers: Vec::new(),
            save_modifiers: Vec::new(),
            imposed_modifiers: Vec::new(),
            auto_hit: false,
            auto_wound: false,
            rerolls: RerollGrades::default(),
            feel_no_pain: None,
        }
    }

    pub fn modifiers(&self, roll: RollKind) -> &[RollModifier] {
        match roll {
            RollKind::Hit => &self.hit_modifiers,
            RollKind::Wound => &self.wound_modifiers,
            RollKind::Save => &self.save_modifiers,
        }
    }

    pub fn push_modifier(&mut self, roll: RollKind, modifier: RollModifier) {
        match roll {
            RollKind::Hit => self.hit_modifiers.push(modifier),
            RollKind::Wound => self.wound_modifiers.push(modifier),
            RollKind::Save => self.save_modifiers.push(modifier),
        }
    }

    pub fn impose_modifier(&mut self, roll: RollKind, modifier: RollModifier) {
        self.imposed_modifiers.push((roll, modifier));
    }

    /// Modifiers this side imposes on the opponent's `roll`, in order.
    pub fn imposed(&self, roll: RollKind) -> impl Iterator<Item = &RollModifier> + '_ {
        self.imposed_modifiers
            .iter()
            .filter(move |(kind, _)| *kind == roll)
            .map(|(_, modifier)| modifier)
    }

    /// Append keywords, upper-cased and deduplicated.
    pub fn add_keywords<S: AsRef<str>>(&mut self, keywords: &[S]) {
        push_unique(&mut self.added_keywords, keywords);
    }

    /// Append abilities, upper-cased and deduplicated.
    pub fn add_abilities<S: AsRef<str>>(&mut self, abilities: &[S]) {
        push_unique(&mut self.added_abilities, abilities);
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.added_keywords.contains(&normalize_name(keyword))
    }

    pub fn has_ability(&self, ability: &str) -> bool {
        self.added_abilities.contains(&normalize_name(ability))
    }

    /// Keep the better (lower) Feel No Pain value.
    pub fn offer_feel_no_pain(&mut self, value: i32) {
        self.feel_no_pain = Some(match self.feel_no_pain {
            Some(current) => current.min(value),
            None => value,
        });
    }
}

fn push_unique<S: AsRef<str>>(target: &mut Vec<String>, names: &[S]) {
    for name in names {
        let name = normalize_name(name.as_ref());
        if !name.is_empty() && !target.contains(&name) {
            target.push(name);
        }
    }
}

//! Mechanics and conditions.
//!
//! A [`Mechanic`] is one atomic rule instruction: an effect, the stat it
//! touches, a value, the conditions gating it and where it came from.
//! Mechanics are plain values; every transformation produces a new one.
//!
//! Mechanics deserialize from the flat JSON shape used by rule data and
//! can also be built in code:
//!
//! ```rust
//! use hitroll::mechanic::{Condition, Mechanic};
//! use hitroll::fields::RollKind;
//! use hitroll::Entity;
//!
//! // +1 to hit while this unit remained stationary
//! let heavy = Mechanic::roll_bonus(RollKind::Hit, 1)
//!     .when(Condition::state(Entity::ThisUnit, "remainedStationary"));
//!
//! assert_eq!(heavy.conditions.len(), 1);
//! ```

use crate::entity::Entity;
use crate::fields::{Attribute, RollKind};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a mechanic does.
///
/// Effects are applied in priority order (see [`Effect::priority`]).
/// Unknown effect names load as `Unknown` and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    RollBonus,
    RollPenalty,
    StaticNumber,
    AddsAbility,
    AddsKeyword,
    AutoSuccess,
    Reroll,
    MortalWounds,
    #[serde(other)]
    Unknown,
}

impl Effect {
    /// Application priority. Lower values are applied first.
    ///
    /// Order: AddsKeyword (1) → AddsAbility (2) → StaticNumber (3) →
    /// RollBonus/RollPenalty (4) → AutoSuccess/Reroll (5) → MortalWounds (6) → Unknown (99)
    pub fn priority(self) -> u8 {
        match self {
            Effect::AddsKeyword => 1,
            Effect::AddsAbility => 2,
            Effect::StaticNumber => 3,
            Effect::RollBonus | Effect::RollPenalty => 4,
            Effect::AutoSuccess | Effect::Reroll => 5,
            Effect::MortalWounds => 6,
            Effect::Unknown => 99,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::RollBonus => "rollBonus",
            Effect::RollPenalty => "rollPenalty",
            Effect::StaticNumber => "staticNumber",
            Effect::AddsAbility => "addsAbility",
            Effect::AddsKeyword => "addsKeyword",
            Effect::AutoSuccess => "autoSuccess",
            Effect::Reroll => "reroll",
            Effect::MortalWounds => "mortalWounds",
            Effect::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of rule a mechanic was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Ability,
    Weapon,
    Enhancement,
    Faction,
    Detachment,
    Stratagem,
    DamagedProfile,
}

/// Provenance of a mechanic, used for explanations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MechanicSource {
    pub kind: SourceKind,
    pub name: String,
    /// Name of the unit that owns the rule, where relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MechanicSource {
    pub fn new(kind: SourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl fmt::Display for MechanicSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} ({})", self.name, unit),
            None => f.write_str(&self.name),
        }
    }
}

/// One rule instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mechanic {
    /// Who the mechanic targets; implicitly the side it was collected for.
    #[serde(default)]
    pub entity: Entity,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// All conditions must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<MechanicSource>,
}

impl Mechanic {
    /// A bare mechanic with no attribute, value or conditions.
    pub fn new(effect: Effect) -> Self {
        Self {
            entity: Entity::ThisUnit,
            effect,
            attribute: None,
            value: None,
            abilities: Vec::new(),
            keywords: Vec::new(),
            conditions: Vec::new(),
            source: None,
        }
    }

    /// `+value` to the selected roll.
    pub fn roll_bonus(roll: RollKind, value: i32) -> Self {
        Self::new(Effect::RollBonus).on(roll).with_value(value)
    }

    /// `-value` to the selected roll.
    pub fn roll_penalty(roll: RollKind, value: i32) -> Self {
        Self::new(Effect::RollPenalty).on(roll).with_value(value)
    }

    /// Overwrite a model or weapon characteristic.
    pub fn static_number(attribute: impl Into<Attribute>, value: i32) -> Self {
        Self::new(Effect::StaticNumber)
            .on(attribute)
            .with_value(value)
    }

    /// Grant abilities by name.
    pub fn adds_ability<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mechanic = Self::new(Effect::AddsAbility);
        mechanic.abilities = names.into_iter().map(Into::into).collect();
        mechanic
    }

    /// Grant keywords by name.
    pub fn adds_keyword<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mechanic = Self::new(Effect::AddsKeyword);
        mechanic.keywords = names.into_iter().map(Into::into).collect();
        mechanic
    }

    /// The selected roll succeeds without rolling.
    pub fn auto_success(roll: RollKind) -> Self {
        Self::new(Effect::AutoSuccess).on(roll)
    }

    /// Re-roll the selected roll. `grade` is `"ones"`, `"failed"` or `"all"`.
    pub fn reroll(roll: RollKind, grade: impl Into<Value>) -> Self {
        Self::new(Effect::Reroll).on(roll).with_value(grade)
    }

    pub fn mortal_wounds(amount: impl Into<Value>) -> Self {
        Self::new(Effect::MortalWounds).with_value(amount)
    }

    pub fn on(mut self, attribute: impl Into<Attribute>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn targeting(mut self, entity: Entity) -> Self {
        self.entity = entity;
        self
    }

    /// Add a gating condition.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_source(mut self, source: MechanicSource) -> Self {
        self.source = Some(source);
        self
    }

    /// The roll selected by `attribute`, if it names one.
    pub fn roll(&self) -> Option<RollKind> {
        self.attribute.as_ref().and_then(Attribute::roll)
    }

    /// Provenance label for explanations.
    pub fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

impl fmt::Display for Mechanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.effect)?;
        if let Some(attribute) = &self.attribute {
            write!(f, " {}", attribute)?;
        }
        if let Some(value) = &self.value {
            write!(f, " {}", value)?;
        }
        if let Some(source) = &self.source {
            write!(f, " from {}", source)?;
        }
        Ok(())
    }
}

/// Comparison applied by a condition. Missing operators mean `Equals`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Includes,
    NotIncludes,
    /// Any operator the engine does not know; always evaluates false.
    #[serde(other)]
    Unknown,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::LessThan => "lessThan",
            Operator::LessThanOrEqual => "lessThanOrEqual",
            Operator::Includes => "includes",
            Operator::NotIncludes => "notIncludes",
            Operator::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fact a condition tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A named boolean battlefield flag.
    State(String),
    /// The entity has any of these keywords.
    Keywords(Vec<String>),
    /// The entity has any of these abilities.
    Abilities(Vec<String>),
    /// A model or weapon characteristic.
    Attribute(Attribute),
    /// No discriminant was given; the condition trivially holds.
    Always,
}

/// A single predicate gating a mechanic.
///
/// # Examples
///
/// ```rust
/// use hitroll::mechanic::{Condition, Operator, Predicate};
///
/// let json = r#"{ "entity": "targetUnit", "keywords": ["VEHICLE"], "operator": "notIncludes" }"#;
/// let condition: Condition = serde_json::from_str(json).unwrap();
///
/// assert_eq!(condition.operator, Operator::NotIncludes);
/// assert_eq!(condition.predicate, Predicate::Keywords(vec!["VEHICLE".into()]));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    pub entity: Entity,
    pub predicate: Predicate,
    pub operator: Operator,
    pub value: Option<Value>,
}

impl Condition {
    fn with_predicate(entity: Entity, predicate: Predicate) -> Self {
        Self {
            entity,
            predicate,
            operator: Operator::Equals,
            value: None,
        }
    }

    /// A boolean flag check. Without an explicit value, the flag must be set.
    pub fn state(entity: Entity, name: impl Into<String>) -> Self {
        Self::with_predicate(entity, Predicate::State(name.into()))
    }

    pub fn keywords<I, S>(entity: Entity, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_predicate(
            entity,
            Predicate::Keywords(keywords.into_iter().map(Into::into).collect()),
        )
    }

    pub fn abilities<I, S>(entity: Entity, abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_predicate(
            entity,
            Predicate::Abilities(abilities.into_iter().map(Into::into).collect()),
        )
    }

    pub fn attribute(entity: Entity, attribute: impl Into<Attribute>) -> Self {
        Self::with_predicate(entity, Predicate::Attribute(attribute.into()))
    }

    /// Set the operator and expected value.
    pub fn compare(mut self, operator: Operator, value: impl Into<Value>) -> Self {
        self.operator = operator;
        self.value = Some(value.into());
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// True if this condition is satisfied only while a leader is attached.
    pub fn requires_leader(&self) -> bool {
        match &self.predicate {
            Predicate::State(name) => {
                let negated = matches!(self.value, Some(Value::Bool(false)))
                    || self.operator == Operator::NotEquals;
                crate::state::is_leader_state(name) && !negated
            }
            _ => false,
        }
    }
}

/// Flat wire shape of a condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    #[serde(default)]
    entity: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    abilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<Attribute>,
    #[serde(default)]
    operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl From<RawCondition> for Condition {
    fn from(raw: RawCondition) -> Self {
        let predicate = if let Some(state) = raw.state {
            Predicate::State(state)
        } else if let Some(keywords) = raw.keywords {
            Predicate::Keywords(keywords)
        } else if let Some(abilities) = raw.abilities {
            Predicate::Abilities(abilities)
        } else if let Some(attribute) = raw.attribute {
            Predicate::Attribute(attribute)
        } else {
            Predicate::Always
        };

        Self {
            entity: raw.entity,
            predicate,
            operator: raw.operator.unwrap_or_default(),
            value: raw.value,
        }
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        let mut raw = RawCondition {
            entity: condition.entity,
            operator: Some(condition.operator),
            value: condition.value,
            ..RawCondition::default()
        };
        match condition.predicate {
            Predicate::State(state) => raw.state = Some(state),
            Predicate::Keywords(keywords) => raw.keywords = Some(keywords),
            Predicate::Abilities(abilities) => raw.abilities = Some(abilities),
            Predicate::Attribute(attribute) => raw.attribute = Some(attribute),
            Predicate::Always => {}
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ModelField;

    #[test]
    fn test_effect_priority_order() {
        let ordered = [
            Effect::AddsKeyword,
            Effect::AddsAbility,
            Effect::StaticNumber,
            Effect::RollBonus,
            Effect::AutoSuccess,
            Effect::MortalWounds,
            Effect::Unknown,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].priority() < pair[1].priority());
        }
        assert_eq!(Effect::RollBonus.priority(), Effect::RollPenalty.priority());
        assert_eq!(Effect::AutoSuccess.priority(), Effect::Reroll.priority());
    }

    #[test]
    fn test_unknown_effect_and_operator_load() {
        let json = r#"{
            "effect": "summonDaemon",
            "conditions": [{ "attribute": "t", "operator": "roughlyEquals", "value": 4 }]
        }"#;
        let mechanic: Mechanic = serde_json::from_str(json).unwrap();
        assert_eq!(mechanic.effect, Effect::Unknown);
        assert_eq!(mechanic.conditions[0].operator, Operator::Unknown);
    }

    #[test]
    fn test_condition_dispatch_order() {
        let json = r#"{ "state": "inCover", "keywords": ["INFANTRY"], "attribute": "t" }"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.predicate, Predicate::State("inCover".into()));
        assert_eq!(condition.operator, Operator::Equals);

        let json = r#"{ "keywords": ["INFANTRY"], "attribute": "t" }"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert!(matches!(condition.predicate, Predicate::Keywords(_)));

        let condition: Condition = serde_json::from_str("{}").unwrap();
        assert_eq!(condition.predicate, Predicate::Always);
        assert_eq!(condition.entity, Entity::ThisUnit);
    }

    #[test]
    fn test_mechanic_from_json() {
        let json = r#"{
            "effect": "staticNumber",
            "attribute": "t",
            "value": 6,
            "conditions": [{ "entity": "thisUnit", "state": "isDamaged", "value": false }]
        }"#;
        let mechanic: Mechanic = serde_json::from_str(json).unwrap();
        assert_eq!(mechanic.attribute, Some(Attribute::Model(ModelField::T)));
        assert_eq!(mechanic.value, Some(Value::Number(6.0)));
        assert_eq!(mechanic.conditions[0].value, Some(Value::Bool(false)));
    }

    #[test]
    fn test_leader_gate_detection() {
        assert!(Condition::state(Entity::ThisUnit, "isLeadingUnit").requires_leader());
        assert!(Condition::state(Entity::ThisUnit, "leading")
            .compare(Operator::Equals, true)
            .requires_leader());
        assert!(!Condition::state(Entity::ThisUnit, "hasLeader")
            .compare(Operator::Equals, false)
            .requires_leader());
        assert!(!Condition::state(Entity::ThisUnit, "inCover").requires_leader());
    }

    #[test]
    fn test_display() {
        let mechanic = Mechanic::roll_penalty(RollKind::Hit, 1)
            .with_source(MechanicSource::new(SourceKind::Ability, "Stealth").with_unit("Scouts"));
        assert_eq!(mechanic.to_string(), "rollPenalty hit 1 from Stealth (Scouts)");
    }
}

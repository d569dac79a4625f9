//! Condition evaluation.
//!
//! Conditions are tested against the facts the [`state`](crate::state)
//! resolver exposes. A mechanic applies only if every one of its
//! conditions holds; there is no OR grouping. Anything the evaluator
//! cannot make sense of (unknown operator, missing attribute) evaluates
//! false rather than failing.

use crate::context::GameContext;
use crate::entity::Perspective;
use crate::mechanic::{Condition, Mechanic, Operator, Predicate};
use crate::state::{self, EntityState};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating a mechanic's conditions, with the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub applies: bool,
    /// Description of the first failing condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Evaluation {
    fn pass() -> Self {
        Self {
            applies: true,
            reason: None,
        }
    }

    fn fail(reason: String) -> Self {
        Self {
            applies: false,
            reason: Some(reason),
        }
    }
}

/// Evaluate one condition from `perspective`.
///
/// # Examples
///
/// ```rust
/// use hitroll::condition::evaluate;
/// use hitroll::datasheet::{Datasheet, ModelProfile};
/// use hitroll::mechanic::{Condition, Operator};
/// use hitroll::fields::ModelField;
/// use hitroll::{Entity, GameContext, Perspective, UnitContext};
///
/// let model = ModelProfile {
///     name: "Tank".into(), m: Some(10), t: 10, sv: Some(3), inv_sv: None,
///     w: 13, ld: Some(7), oc: Some(3),
/// };
/// let unit = UnitContext::new(Datasheet::default(), model);
/// let ctx = GameContext::new(unit.clone(), unit);
///
/// let tough_target = Condition::attribute(Entity::TargetModel, ModelField::T)
///     .compare(Operator::GreaterThanOrEqual, 8);
/// assert!(evaluate(&tough_target, &ctx, Perspective::Attacker));
/// ```
pub fn evaluate(condition: &Condition, ctx: &GameContext, perspective: Perspective) -> bool {
    let entity = state::resolve(condition.entity, ctx, perspective);
    evaluate_against(condition, &entity)
}

fn evaluate_against(condition: &Condition, entity: &EntityState<'_>) -> bool {
    match &condition.predicate {
        Predicate::State(name) => {
            let actual = Value::Bool(entity.check_state(name));
            let expected = condition.value.clone().unwrap_or(Value::Bool(true));
            compare(Some(&actual), condition.operator, Some(&expected))
        }
        Predicate::Keywords(keywords) => {
            presence(entity.has_any_keyword(keywords), condition.operator)
        }
        Predicate::Abilities(abilities) => {
            presence(entity.has_any_ability(abilities), condition.operator)
        }
        Predicate::Attribute(attribute) => {
            let actual = entity.attribute_value(attribute);
            compare(actual.as_ref(), condition.operator, condition.value.as_ref())
        }
        Predicate::Always => true,
    }
}

fn presence(has_any: bool, operator: Operator) -> bool {
    match operator {
        Operator::Equals | Operator::Includes => has_any,
        Operator::NotEquals | Operator::NotIncludes => !has_any,
        _ => false,
    }
}

/// Apply `operator` to an actual and expected value.
///
/// Ordering operators need two numbers. `includes` accepts list
/// membership or substring containment. A missing actual value only
/// satisfies `equals` against a missing expected value, or `notEquals`
/// against a present one.
pub fn compare(actual: Option<&Value>, operator: Operator, expected: Option<&Value>) -> bool {
    let Some(actual) = actual else {
        return match operator {
            Operator::Equals => expected.is_none(),
            Operator::NotEquals => expected.is_some(),
            _ => false,
        };
    };

    match operator {
        Operator::Equals => expected.is_some_and(|e| actual.loosely_equals(e)),
        Operator::NotEquals => !expected.is_some_and(|e| actual.loosely_equals(e)),
        Operator::GreaterThan => numeric(actual, expected, |a, b| a > b),
        Operator::GreaterThanOrEqual => numeric(actual, expected, |a, b| a >= b),
        Operator::LessThan => numeric(actual, expected, |a, b| a < b),
        Operator::LessThanOrEqual => numeric(actual, expected, |a, b| a <= b),
        Operator::Includes => expected.is_some_and(|e| actual.contains(e)),
        Operator::NotIncludes => expected.is_some_and(|e| !actual.contains(e)),
        Operator::Unknown => false,
    }
}

fn numeric(actual: &Value, expected: Option<&Value>, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual, expected) {
        (Value::Number(a), Some(Value::Number(b))) => cmp(*a, *b),
        _ => false,
    }
}

/// True if every condition of `mechanic` holds.
pub fn evaluate_mechanic(mechanic: &Mechanic, ctx: &GameContext, perspective: Perspective) -> bool {
    mechanic
        .conditions
        .iter()
        .all(|condition| evaluate(condition, ctx, perspective))
}

/// Like [`evaluate_mechanic`], also describing the first failing condition.
pub fn evaluate_with_reason(
    mechanic: &Mechanic,
    ctx: &GameContext,
    perspective: Perspective,
) -> Evaluation {
    match mechanic
        .conditions
        .iter()
        .find(|condition| !evaluate(condition, ctx, perspective))
    {
        Some(failed) => Evaluation::fail(describe(failed)),
        None => Evaluation::pass(),
    }
}

/// Keep the mechanics whose conditions hold, paired with their index in `mechanics`.
pub fn filter_applicable<'m>(
    mechanics: &'m [Mechanic],
    ctx: &GameContext,
    perspective: Perspective,
) -> Vec<(usize, &'m Mechanic)> {
    mechanics
        .iter()
        .enumerate()
        .filter(|(_, mechanic)| evaluate_mechanic(mechanic, ctx, perspective))
        .collect()
}

/// Deterministic one-line description of a condition.
///
/// Format: `<entity>.<field> <operator>[ <expected>]`, e.g.
/// `this-unit.inCover equals true` or `target-unit.keywords[VEHICLE] notIncludes`.
pub fn describe(condition: &Condition) -> String {
    let field = match &condition.predicate {
        Predicate::State(name) => name.clone(),
        Predicate::Keywords(keywords) => format!("keywords[{}]", keywords.join(", ")),
        Predicate::Abilities(abilities) => format!("abilities[{}]", abilities.join(", ")),
        Predicate::Attribute(attribute) => attribute.name().to_string(),
        Predicate::Always => "always".to_string(),
    };

    let expected = match (&condition.predicate, &condition.value) {
        (_, Some(value)) => Some(value.to_string()),
        (Predicate::State(_), None) => Some("true".to_string()),
        (Predicate::Attribute(_), None) => Some("null".to_string()),
        _ => None,
    };

    match expected {
        Some(expected) => format!(
            "{}.{} {} {}",
            condition.entity, field, condition.operator, expected
        ),
        None => format!("{}.{} {}", condition.entity, field, condition.operator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UnitContext;
    use crate::datasheet::{Datasheet, ModelProfile};
    use crate::entity::Entity;
    use crate::fields::{ModelField, RollKind, WeaponField};

    fn context() -> GameContext {
        let model = ModelProfile {
            name: "Warrior".into(),
            m: Some(6),
            t: 4,
            sv: Some(3),
            inv_sv: None,
            w: 2,
            ld: Some(6),
            oc: Some(2),
        };
        let attacker = UnitContext::new(
            Datasheet {
                name: "Warriors".into(),
                keywords: vec!["INFANTRY".into()],
                ..Datasheet::default()
            },
            model.clone(),
        );
        let mut defender = UnitContext::new(
            Datasheet {
                name: "Walker".into(),
                keywords: vec!["VEHICLE".into(), "WALKER".into()],
                ..Datasheet::default()
            },
            ModelProfile { t: 9, ..model },
        );
        defender.combat_status.in_cover = true;
        GameContext::new(attacker, defender)
    }

    #[test]
    fn test_state_defaults_to_true() {
        let ctx = context();
        let cover = Condition::state(Entity::ThisUnit, "inCover");
        assert!(evaluate(&cover, &ctx, Perspective::Defender));
        assert!(!evaluate(&cover, &ctx, Perspective::Attacker));

        let not_in_cover = cover.compare(Operator::Equals, false);
        assert!(evaluate(&not_in_cover, &ctx, Perspective::Attacker));
    }

    #[test]
    fn test_keyword_presence_operators() {
        let ctx = context();
        let vehicle = Condition::keywords(Entity::TargetUnit, ["vehicle", "monster"]);
        assert!(evaluate(&vehicle, &ctx, Perspective::Attacker));

        let not_vehicle = vehicle.clone().with_operator(Operator::NotIncludes);
        assert!(!evaluate(&not_vehicle, &ctx, Perspective::Attacker));

        let nonsense = vehicle.with_operator(Operator::GreaterThan);
        assert!(!evaluate(&nonsense, &ctx, Perspective::Attacker));
    }

    #[test]
    fn test_attribute_comparisons() {
        let ctx = context();
        let t = |op, v: i32| {
            Condition::attribute(Entity::TargetModel, ModelField::T).compare(op, v)
        };
        assert!(evaluate(&t(Operator::GreaterThan, 8), &ctx, Perspective::Attacker));
        assert!(evaluate(&t(Operator::LessThanOrEqual, 9), &ctx, Perspective::Attacker));
        assert!(!evaluate(&t(Operator::LessThan, 9), &ctx, Perspective::Attacker));
        assert!(evaluate(&t(Operator::NotEquals, 4), &ctx, Perspective::Attacker));
        assert!(!evaluate(&t(Operator::Unknown, 9), &ctx, Perspective::Attacker));
    }

    #[test]
    fn test_missing_attribute_is_null() {
        let ctx = context();
        let strength = Condition::attribute(Entity::ThisUnit, WeaponField::S);
        // no weapon selected: actual is null
        assert!(evaluate(&strength, &ctx, Perspective::Attacker));
        let strong = strength.compare(Operator::GreaterThanOrEqual, 5);
        assert!(!evaluate(&strong, &ctx, Perspective::Attacker));
    }

    #[test]
    fn test_compare_null_rules() {
        let four = Value::from(4);
        assert!(compare(None, Operator::Equals, None));
        assert!(!compare(None, Operator::Equals, Some(&four)));
        assert!(compare(None, Operator::NotEquals, Some(&four)));
        assert!(!compare(None, Operator::Includes, Some(&four)));
        assert!(!compare(Some(&Value::from("4")), Operator::GreaterThan, Some(&Value::from(3))));
    }

    #[test]
    fn test_all_conditions_must_hold() {
        let ctx = context();
        let mechanic = Mechanic::roll_bonus(RollKind::Wound, 1)
            .when(Condition::keywords(Entity::TargetUnit, ["VEHICLE"]))
            .when(Condition::state(Entity::ThisUnit, "remainedStationary"));

        let evaluation = evaluate_with_reason(&mechanic, &ctx, Perspective::Attacker);
        assert!(!evaluation.applies);
        assert_eq!(
            evaluation.reason.as_deref(),
            Some("this-unit.remainedStationary equals true")
        );
        assert!(!evaluate_mechanic(&mechanic, &ctx, Perspective::Attacker));
    }

    #[test]
    fn test_filter_keeps_indices() {
        let ctx = context();
        let mechanics = vec![
            Mechanic::roll_bonus(RollKind::Hit, 1)
                .when(Condition::state(Entity::ThisUnit, "inCover")),
            Mechanic::roll_bonus(RollKind::Wound, 1),
        ];
        let applicable = filter_applicable(&mechanics, &ctx, Perspective::Attacker);
        assert_eq!(applicable.len(), 1);
        assert_eq!(applicable[0].0, 1);
    }

    #[test]
    fn test_describe_is_deterministic() {
        let condition = Condition::keywords(Entity::TargetUnit, ["VEHICLE", "MONSTER"])
            .with_operator(Operator::NotIncludes);
        assert_eq!(
            describe(&condition),
            "target-unit.keywords[VEHICLE, MONSTER] notIncludes"
        );
        let attribute = Condition::attribute(Entity::ThisModel, ModelField::W)
            .compare(Operator::LessThan, 3);
        assert_eq!(describe(&attribute), "this-model.w lessThan 3");
    }
}

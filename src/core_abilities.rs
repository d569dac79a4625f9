//! Core ability templates.
//!
//! Many datasheets share the same named abilities ("Lethal Hits",
//! "Feel No Pain 5+"). The registry maps an upper-case ability name to a
//! template; the collector instantiates the template instead of using any
//! mechanics embedded on the ability. Parameterised templates carry
//! [`PARAMETER_TOKEN`] in a value, replaced by the ability's parameter.

use crate::entity::Entity;
use crate::error::RulesError;
use crate::fields::{ModelField, RollKind, WeaponField};
use crate::mechanic::{Condition, Mechanic, Operator};
use crate::state::normalize_name;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder substituted with an ability's instance parameter.
pub const PARAMETER_TOKEN: &str = "{X}";

/// Whether a template takes a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKind {
    Static,
    Parameterized,
}

/// Mechanics shared by every instance of a core ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreAbilityTemplate {
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
}

impl CoreAbilityTemplate {
    pub fn fixed(mechanics: Vec<Mechanic>) -> Self {
        Self {
            kind: TemplateKind::Static,
            mechanics,
        }
    }

    pub fn parameterized(mechanics: Vec<Mechanic>) -> Self {
        Self {
            kind: TemplateKind::Parameterized,
            mechanics,
        }
    }
}

/// Build fresh mechanics from a template.
///
/// Static templates are copied as-is. Parameterised templates need a
/// parameter: every value equal to [`PARAMETER_TOKEN`] (in a mechanic or
/// one of its conditions) becomes the parameter, and without one the
/// template yields no mechanics at all. The template is never modified.
///
/// # Examples
///
/// ```rust
/// use hitroll::core_abilities::{instantiate, CoreAbilityRegistry};
/// use hitroll::Value;
///
/// let registry = CoreAbilityRegistry::standard();
/// let fnp = registry.get("feel no pain").unwrap();
///
/// let mechanics = instantiate(fnp, Some(&Value::from("5+")));
/// assert_eq!(mechanics[0].value, Some(Value::Number(5.0)));
///
/// assert!(instantiate(fnp, None).is_empty());
/// ```
pub fn instantiate(template: &CoreAbilityTemplate, parameter: Option<&Value>) -> Vec<Mechanic> {
    match template.kind {
        TemplateKind::Static => template.mechanics.clone(),
        TemplateKind::Parameterized => {
            let Some(parameter) = parameter else {
                return Vec::new();
            };
            let parameter = normalize_parameter(parameter);
            template
                .mechanics
                .iter()
                .map(|mechanic| substitute(mechanic, &parameter))
                .collect()
        }
    }
}

fn substitute(mechanic: &Mechanic, parameter: &Value) -> Mechanic {
    let mut instance = mechanic.clone();
    if is_token(instance.value.as_ref()) {
        instance.value = Some(parameter.clone());
    }
    for condition in &mut instance.conditions {
        if is_token(condition.value.as_ref()) {
            condition.value = Some(parameter.clone());
        }
    }
    instance
}

fn is_token(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Text(s)) if s.trim() == PARAMETER_TOKEN)
}

/// `"5+"` and `"2"` become numbers; dice and other text stay as given.
fn normalize_parameter(parameter: &Value) -> Value {
    match parameter {
        Value::Text(_) => parameter
            .as_number()
            .map(Value::Number)
            .unwrap_or_else(|| parameter.clone()),
        _ => parameter.clone(),
    }
}

/// Lookup table of core abilities keyed by upper-case name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreAbilityRegistry {
    templates: BTreeMap<String, CoreAbilityTemplate>,
}

impl CoreAbilityRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry document.
    ///
    /// The document maps ability names to `{ "type": "static" | "parameterized", "mechanics": [...] }`.
    /// Keys are normalised, so `"Lethal Hits"` and `"LETHAL HITS"` are the same entry.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let raw: BTreeMap<String, CoreAbilityTemplate> =
            serde_json::from_str(json).map_err(|e| RulesError::malformed("core ability", e))?;
        let mut registry = Self::new();
        for (name, template) in raw {
            registry.insert(&name, template);
        }
        Ok(registry)
    }

    /// Register or replace a template.
    pub fn insert(&mut self, name: &str, template: CoreAbilityTemplate) {
        self.templates.insert(normalize_name(name), template);
    }

    /// Find a template by name (trimmed, case-insensitive).
    pub fn get(&self, name: &str) -> Option<&CoreAbilityTemplate> {
        self.templates.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// The common core abilities.
    pub fn standard() -> Self {
        let token = || Value::from(PARAMETER_TOKEN);
        let ranged_attack = || {
            Condition::attribute(Entity::OpposingUnit, WeaponField::Range)
                .compare(Operator::GreaterThan, 0)
        };

        let mut registry = Self::new();
        registry.insert(
            "Lethal Hits",
            CoreAbilityTemplate::fixed(vec![Mechanic::adds_ability(["LETHAL HITS"])]),
        );
        registry.insert(
            "Devastating Wounds",
            CoreAbilityTemplate::fixed(vec![Mechanic::adds_ability(["DEVASTATING WOUNDS"])]),
        );
        registry.insert(
            "Sustained Hits",
            CoreAbilityTemplate::parameterized(vec![
                Mechanic::adds_ability(["SUSTAINED HITS"]).with_value(token())
            ]),
        );
        registry.insert(
            "Feel No Pain",
            CoreAbilityTemplate::parameterized(vec![
                Mechanic::adds_ability(["FEEL NO PAIN"]).with_value(token())
            ]),
        );
        registry.insert(
            "Invulnerable Save",
            CoreAbilityTemplate::parameterized(vec![Mechanic::static_number(
                ModelField::InvSv,
                0,
            )
            .with_value(token())]),
        );
        registry.insert(
            "Stealth",
            CoreAbilityTemplate::fixed(vec![Mechanic::roll_penalty(RollKind::Hit, 1)
                .targeting(Entity::OpposingUnit)
                .when(ranged_attack())]),
        );
        registry.insert(
            "Torrent",
            CoreAbilityTemplate::fixed(vec![Mechanic::auto_success(RollKind::Hit)]),
        );
        registry.insert(
            "Heavy",
            CoreAbilityTemplate::fixed(vec![Mechanic::roll_bonus(RollKind::Hit, 1)
                .when(Condition::state(Entity::ThisUnit, "remainedStationary"))]),
        );
        registry.insert(
            "Lance",
            CoreAbilityTemplate::fixed(vec![Mechanic::roll_bonus(RollKind::Wound, 1)
                .when(Condition::state(Entity::ThisUnit, "hasChargedThisPhase"))]),
        );
        registry.insert(
            "Twin-linked",
            CoreAbilityTemplate::fixed(vec![Mechanic::reroll(RollKind::Wound, "failed")]),
        );
        registry.insert(
            "Ignores Cover",
            CoreAbilityTemplate::fixed(vec![Mechanic::adds_keyword(["IGNORES COVER"])]),
        );
        registry.insert(
            "Benefit of Cover",
            CoreAbilityTemplate::fixed(vec![Mechanic::adds_ability(["BENEFIT OF COVER"])]),
        );
        registry
    }
}

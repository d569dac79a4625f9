//! Rule data supplied by external loaders.
//!
//! Datasheets, weapon profiles, abilities and army-level rules are read
//! only. Characteristics accept either numbers or the printed form
//! (`"3+"`, `"6\""`, `"-1"`).

use crate::dice::Dice;
use crate::mechanic::Mechanic;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// One model profile of a datasheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    pub name: String,
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub m: Option<i32>,
    #[serde(deserialize_with = "de::stat")]
    pub t: i32,
    /// Armour save; missing means no save.
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub sv: Option<i32>,
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub inv_sv: Option<i32>,
    #[serde(deserialize_with = "de::stat")]
    pub w: i32,
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub ld: Option<i32>,
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub oc: Option<i32>,
}

/// One weapon profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponProfile {
    pub name: String,
    /// Range in inches; missing or `"Melee"` means melee.
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub range: Option<i32>,
    #[serde(default)]
    pub a: Dice,
    #[serde(deserialize_with = "de::stat")]
    pub bs_ws: i32,
    #[serde(deserialize_with = "de::stat")]
    pub s: i32,
    #[serde(default, deserialize_with = "de::optional_stat")]
    pub ap: Option<i32>,
    #[serde(default)]
    pub d: Dice,
    /// Weapon abilities such as `"Lethal Hits"` or `"Sustained Hits 1"`.
    #[serde(default)]
    pub attributes: Vec<Ability>,
}

impl WeaponProfile {
    /// True if any weapon attribute carries `name` (case-insensitive).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|attr| attr.name.trim().eq_ignore_ascii_case(name.trim()))
    }
}

/// A named ability, optionally parameterised (`Feel No Pain 5+`).
///
/// Abilities deserialize from either an object or a printed label:
///
/// ```rust
/// use hitroll::datasheet::Ability;
/// use hitroll::Value;
///
/// let ability: Ability = serde_json::from_str("\"Sustained Hits 2\"").unwrap();
/// assert_eq!(ability.name, "Sustained Hits");
/// assert_eq!(ability.parameter(), Some(&Value::Number(2.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AbilityRepr")]
pub struct Ability {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Value>,
    /// Mechanics embedded on the ability, used when it is not a core ability.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mechanics: Vec<Mechanic>,
}

impl Ability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: None,
            mechanics: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<Value>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn with_mechanics(mut self, mechanics: Vec<Mechanic>) -> Self {
        self.mechanics = mechanics;
        self
    }

    /// Split a printed label into name and trailing parameter.
    ///
    /// `"Anti-Infantry 4+"` becomes `Anti-Infantry` with parameter `"4+"`;
    /// `"Deadly Demise D3"` keeps `"D3"`; `"Lethal Hits"` has no parameter.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if let Some((name, last)) = label.rsplit_once(char::is_whitespace) {
            if let Ok(n) = last.parse::<f64>() {
                return Ability::new(name.trim_end()).with_parameter(n);
            }
            let is_target = Value::from(last).as_number().is_some();
            let is_dice = last
                .parse::<Dice>()
                .map(|dice| !dice.is_fixed())
                .unwrap_or(false);
            if is_target || is_dice {
                return Ability::new(name.trim_end()).with_parameter(last);
            }
        }
        Ability::new(label)
    }

    /// The instance parameter, ignoring empty and `"none"` placeholders.
    pub fn parameter(&self) -> Option<&Value> {
        self.parameter.as_ref().filter(|value| match value {
            Value::Text(s) => {
                let s = s.trim();
                !s.is_empty() && !s.eq_ignore_ascii_case("none")
            }
            _ => true,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AbilityRepr {
    Label(String),
    #[serde(rename_all = "camelCase")]
    Full {
        name: String,
        #[serde(default)]
        parameter: Option<Value>,
        #[serde(default)]
        mechanics: Vec<Mechanic>,
    },
}

impl From<AbilityRepr> for Ability {
    fn from(repr: AbilityRepr) -> Self {
        match repr {
            AbilityRepr::Label(label) => Ability::from_label(&label),
            AbilityRepr::Full {
                name,
                parameter,
                mechanics,
            } => Ability {
                name,
                parameter,
                mechanics,
            },
        }
    }
}

/// A unit's datasheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datasheet {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub models: Vec<ModelProfile>,
    #[serde(default)]
    pub weapons: Vec<WeaponProfile>,
    /// Mechanics that apply once the unit is damaged.
    #[serde(default)]
    pub damaged_mechanics: Vec<Mechanic>,
}

/// An enhancement carried by a unit (usually by a character).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    pub name: String,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
}

/// An army rule granted by the faction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionAbility {
    pub name: String,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
}

/// An army rule granted by the chosen detachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachmentAbility {
    pub name: String,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
}

/// A stratagem; it contributes only while toggled on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stratagem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mechanics: Vec<Mechanic>,
}

/// Lenient characteristic deserializers.
mod de {
    use crate::value::Value;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn stat<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        value
            .as_int()
            .ok_or_else(|| D::Error::custom(format!("expected a characteristic, got {}", value)))
    }

    pub fn optional_stat<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(Value::as_int))
    }
}

//! Entity references and evaluation perspective.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the exchange a computation is carried out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Perspective {
    Attacker,
    Defender,
}

impl Perspective {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Perspective::Attacker => Perspective::Defender,
            Perspective::Defender => Perspective::Attacker,
        }
    }
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perspective::Attacker => f.write_str("attacker"),
            Perspective::Defender => f.write_str("defender"),
        }
    }
}

/// An abstract reference resolved against a perspective.
///
/// `This*` refers to the side being evaluated, `Target*` and `Opposing*`
/// to the other side. Army references carry no unit data.
///
/// # Examples
///
/// ```rust
/// use hitroll::{Entity, Perspective};
///
/// assert_eq!(Entity::ThisUnit.side(Perspective::Defender), Some(Perspective::Defender));
/// assert_eq!(Entity::TargetModel.side(Perspective::Attacker), Some(Perspective::Defender));
/// assert_eq!(Entity::ThisArmy.side(Perspective::Attacker), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Entity {
    #[default]
    #[serde(alias = "this-unit")]
    ThisUnit,
    #[serde(alias = "this-model")]
    ThisModel,
    #[serde(alias = "target-unit")]
    TargetUnit,
    #[serde(alias = "target-model")]
    TargetModel,
    #[serde(alias = "opposing-unit")]
    OpposingUnit,
    #[serde(alias = "opposing-model")]
    OpposingModel,
    #[serde(alias = "this-army")]
    ThisArmy,
    #[serde(alias = "opponent-army", alias = "opposingArmy")]
    OpponentArmy,
}

impl Entity {
    /// The unit side this entity points at, or `None` for army-level references.
    pub fn side(self, perspective: Perspective) -> Option<Perspective> {
        match self {
            Entity::ThisUnit | Entity::ThisModel => Some(perspective),
            Entity::TargetUnit
            | Entity::TargetModel
            | Entity::OpposingUnit
            | Entity::OpposingModel => Some(perspective.opponent()),
            Entity::ThisArmy | Entity::OpponentArmy => None,
        }
    }

    /// True for references to the other side of the exchange.
    pub fn targets_opponent(self) -> bool {
        matches!(
            self,
            Entity::TargetUnit
                | Entity::TargetModel
                | Entity::OpposingUnit
                | Entity::OpposingModel
                | Entity::OpponentArmy
        )
    }

    pub fn is_army(self) -> bool {
        matches!(self, Entity::ThisArmy | Entity::OpponentArmy)
    }

    /// Kebab-case name used in explanations.
    pub fn name(self) -> &'static str {
        match self {
            Entity::ThisUnit => "this-unit",
            Entity::ThisModel => "this-model",
            Entity::TargetUnit => "target-unit",
            Entity::TargetModel => "target-model",
            Entity::OpposingUnit => "opposing-unit",
            Entity::OpposingModel => "opposing-model",
            Entity::ThisArmy => "this-army",
            Entity::OpponentArmy => "opponent-army",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

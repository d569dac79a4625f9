//! Closed sets of modifiable fields.
//!
//! Rule data names the stat it touches with a short string (`"t"`,
//! `"bsWs"`, `"hit"`). Those names are parsed once into the enums below
//! so that only the listed fields can ever be read or overwritten.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelField {
    /// Move.
    M,
    /// Toughness.
    T,
    /// Armour save.
    Sv,
    /// Invulnerable save.
    InvSv,
    /// Wounds.
    W,
    /// Leadership.
    Ld,
    /// Objective control.
    Oc,
}

/// Weapon characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeaponField {
    Range,
    /// Attacks.
    A,
    /// Ballistic or weapon skill.
    BsWs,
    /// Strength.
    S,
    /// Armour penetration.
    Ap,
    /// Damage.
    D,
}

/// The three rolls of an attack sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollKind {
    Hit,
    Wound,
    Save,
}

/// What a mechanic or condition refers to.
///
/// Unrecognised names are kept as `Other` so that condition checks on
/// them degrade to "absent" instead of failing to load.
///
/// # Examples
///
/// ```rust
/// use hitroll::fields::{Attribute, ModelField, RollKind};
///
/// assert_eq!(Attribute::parse("T"), Attribute::Model(ModelField::T));
/// assert_eq!(Attribute::parse("hit"), Attribute::Roll(RollKind::Hit));
/// assert_eq!(Attribute::parse("charisma"), Attribute::Other("charisma".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Attribute {
    Roll(RollKind),
    Model(ModelField),
    Weapon(WeaponField),
    Other(String),
}

impl Attribute {
    /// Parse an attribute name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        let key = name.trim().to_ascii_lowercase();
        match key.as_str() {
            "hit" => Attribute::Roll(RollKind::Hit),
            "wound" => Attribute::Roll(RollKind::Wound),
            "save" => Attribute::Roll(RollKind::Save),
            "m" => Attribute::Model(ModelField::M),
            "t" => Attribute::Model(ModelField::T),
            "sv" => Attribute::Model(ModelField::Sv),
            "invsv" => Attribute::Model(ModelField::InvSv),
            "w" => Attribute::Model(ModelField::W),
            "ld" => Attribute::Model(ModelField::Ld),
            "oc" => Attribute::Model(ModelField::Oc),
            "range" => Attribute::Weapon(WeaponField::Range),
            "a" => Attribute::Weapon(WeaponField::A),
            "bsws" | "bs" | "ws" => Attribute::Weapon(WeaponField::BsWs),
            "s" => Attribute::Weapon(WeaponField::S),
            "ap" => Attribute::Weapon(WeaponField::Ap),
            "d" => Attribute::Weapon(WeaponField::D),
            _ => Attribute::Other(name.trim().to_string()),
        }
    }

    /// The canonical name used in rule data.
    pub fn name(&self) -> &str {
        match self {
            Attribute::Roll(RollKind::Hit) => "hit",
            Attribute::Roll(RollKind::Wound) => "wound",
            Attribute::Roll(RollKind::Save) => "save",
            Attribute::Model(ModelField::M) => "m",
            Attribute::Model(ModelField::T) => "t",
            Attribute::Model(ModelField::Sv) => "sv",
            Attribute::Model(ModelField::InvSv) => "invSv",
            Attribute::Model(ModelField::W) => "w",
            Attribute::Model(ModelField::Ld) => "ld",
            Attribute::Model(ModelField::Oc) => "oc",
            Attribute::Weapon(WeaponField::Range) => "range",
            Attribute::Weapon(WeaponField::A) => "a",
            Attribute::Weapon(WeaponField::BsWs) => "bsWs",
            Attribute::Weapon(WeaponField::S) => "s",
            Attribute::Weapon(WeaponField::Ap) => "ap",
            Attribute::Weapon(WeaponField::D) => "d",
            Attribute::Other(name) => name,
        }
    }

    /// The roll this attribute selects, if any.
    pub fn roll(&self) -> Option<RollKind> {
        match self {
            Attribute::Roll(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<String> for Attribute {
    fn from(s: String) -> Self {
        Attribute::parse(&s)
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Attribute::parse(s)
    }
}

impl From<Attribute> for String {
    fn from(attribute: Attribute) -> Self {
        attribute.name().to_string()
    }
}

impl From<RollKind> for Attribute {
    fn from(kind: RollKind) -> Self {
        Attribute::Roll(kind)
    }
}

impl From<ModelField> for Attribute {
    fn from(field: ModelField) -> Self {
        Attribute::Model(field)
    }
}

impl From<WeaponField> for Attribute {
    fn from(field: WeaponField) -> Self {
        Attribute::Weapon(field)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

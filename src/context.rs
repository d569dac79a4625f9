//! Game state for one attacker/defender pairing.
//!
//! The `GameContext` carries everything a resolution reads: both units
//! with their selected profiles and battlefield flags, both armies'
//! rules and which stratagems each side has toggled on. The core does
//! not interpret this data beyond the lookups in [`crate::state`].

use crate::datasheet::{
    Datasheet, DetachmentAbility, Enhancement, FactionAbility, ModelProfile, Stratagem,
    WeaponProfile,
};
use crate::entity::Perspective;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Battlefield flags for a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatStatus {
    pub in_cover: bool,
    pub in_engagement_range: bool,
    pub in_objective_range: bool,
    pub remained_stationary: bool,
    pub battle_shocked: bool,
    pub has_fired_this_phase: bool,
    pub has_charged_this_phase: bool,
    pub below_half_strength: bool,
    pub below_starting_strength: bool,
    pub is_damaged: bool,
}

/// A unit as it stands in the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitContext {
    pub datasheet: Datasheet,
    /// The currently selected model profile.
    pub model: ModelProfile,
    /// The currently selected weapon profile, if any.
    #[serde(default)]
    pub weapon: Option<WeaponProfile>,
    #[serde(default)]
    pub attached_leaders: Vec<Datasheet>,
    #[serde(default)]
    pub combat_status: CombatStatus,
    /// Enhancements carried by the unit or its attached leaders.
    #[serde(default)]
    pub enhancements: Vec<Enhancement>,
}

impl UnitContext {
    /// A unit with the given model selected and nothing else.
    pub fn new(datasheet: Datasheet, model: ModelProfile) -> Self {
        Self {
            datasheet,
            model,
            weapon: None,
            attached_leaders: Vec::new(),
            combat_status: CombatStatus::default(),
            enhancements: Vec::new(),
        }
    }

    /// Select the first model profile of a datasheet.
    ///
    /// Returns `None` if the datasheet has no models.
    pub fn from_datasheet(datasheet: Datasheet) -> Option<Self> {
        let model = datasheet.models.first()?.clone();
        Some(Self::new(datasheet, model))
    }

    pub fn with_weapon(mut self, weapon: WeaponProfile) -> Self {
        self.weapon = Some(weapon);
        self
    }

    /// Select a weapon from the datasheet by name (case-insensitive).
    ///
    /// The selection is left unchanged if no weapon matches.
    pub fn with_weapon_named(mut self, name: &str) -> Self {
        if let Some(weapon) = self
            .datasheet
            .weapons
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name))
        {
            self.weapon = Some(weapon.clone());
        }
        self
    }

    pub fn with_leader(mut self, leader: Datasheet) -> Self {
        self.attached_leaders.push(leader);
        self
    }

    pub fn with_status(mut self, status: CombatStatus) -> Self {
        self.combat_status = status;
        self
    }

    pub fn with_enhancement(mut self, enhancement: Enhancement) -> Self {
        self.enhancements.push(enhancement);
        self
    }

    pub fn has_leader(&self) -> bool {
        !self.attached_leaders.is_empty()
    }
}

/// Army-scoped rules for one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArmyContext {
    pub faction_abilities: Vec<FactionAbility>,
    pub detachment_abilities: Vec<DetachmentAbility>,
    /// Stratagems available to the army.
    pub stratagems: Vec<Stratagem>,
}

/// Everything one resolution reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameContext {
    pub attacker: UnitContext,
    pub defender: UnitContext,
    #[serde(default)]
    pub attacker_army: ArmyContext,
    #[serde(default)]
    pub defender_army: ArmyContext,
    /// Stratagem ids currently toggled on by the attacker.
    #[serde(default)]
    pub attacker_stratagems: BTreeSet<String>,
    /// Stratagem ids currently toggled on by the defender.
    #[serde(default)]
    pub defender_stratagems: BTreeSet<String>,
}

impl GameContext {
    /// A pairing with no army rules and no active stratagems.
    pub fn new(attacker: UnitContext, defender: UnitContext) -> Self {
        Self {
            attacker,
            defender,
            attacker_army: ArmyContext::default(),
            defender_army: ArmyContext::default(),
            attacker_stratagems: BTreeSet::new(),
            defender_stratagems: BTreeSet::new(),
        }
    }

    pub fn with_armies(mut self, attacker_army: ArmyContext, defender_army: ArmyContext) -> Self {
        self.attacker_army = attacker_army;
        self.defender_army = defender_army;
        self
    }

    /// Toggle a stratagem on for one side.
    pub fn activate_stratagem(&mut self, perspective: Perspective, id: impl Into<String>) {
        match perspective {
            Perspective::Attacker => self.attacker_stratagems.insert(id.into()),
            Perspective::Defender => self.defender_stratagems.insert(id.into()),
        };
    }

    pub fn unit(&self, perspective: Perspective) -> &UnitContext {
        match perspective {
            Perspective::Attacker => &self.attacker,
            Perspective::Defender => &self.defender,
        }
    }

    pub fn army(&self, perspective: Perspective) -> &ArmyContext {
        match perspective {
            Perspective::Attacker => &self.attacker_army,
            Perspective::Defender => &self.defender_army,
        }
    }

    pub fn active_stratagems(&self, perspective: Perspective) -> &BTreeSet<String> {
        match perspective {
            Perspective::Attacker => &self.attacker_stratagems,
            Perspective::Defender => &self.defender_stratagems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str) -> Datasheet {
        Datasheet {
            name: name.to_string(),
            models: vec![ModelProfile {
                name: name.to_string(),
                m: Some(6),
                t: 4,
                sv: Some(3),
                inv_sv: None,
                w: 2,
                ld: Some(6),
                oc: Some(2),
            }],
            ..Datasheet::default()
        }
    }

    #[test]
    fn test_from_datasheet_selects_first_model() {
        let unit = UnitContext::from_datasheet(sheet("Intercessors")).unwrap();
        assert_eq!(unit.model.name, "Intercessors");
        assert!(!unit.has_leader());
        assert!(UnitContext::from_datasheet(Datasheet::default()).is_none());
    }

    #[test]
    fn test_activate_stratagem_per_side() {
        let attacker = UnitContext::from_datasheet(sheet("A")).unwrap();
        let defender = UnitContext::from_datasheet(sheet("B")).unwrap();
        let mut ctx = GameContext::new(attacker, defender);

        ctx.activate_stratagem(Perspective::Defender, "armour-of-contempt");
        assert!(ctx.active_stratagems(Perspective::Attacker).is_empty());
        assert!(ctx
            .active_stratagems(Perspective::Defender)
            .contains("armour-of-contempt"));
    }

    #[test]
    fn test_combat_status_defaults() {
        let status: CombatStatus = serde_json::from_str(r#"{ "inCover": true }"#).unwrap();
        assert!(status.in_cover);
        assert!(!status.is_damaged);
    }
}

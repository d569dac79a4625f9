//! Mechanic collection.
//!
//! Gathers every mechanic relevant to one side from its rule sources, in
//! a fixed order:
//!
//! 1. unit abilities, then each attached leader's abilities
//! 2. weapon attributes of the selected weapon (attacker only)
//! 3. enhancements
//! 4. faction abilities
//! 5. detachment abilities
//! 6. active stratagems
//! 7. the damaged profile, when the unit is damaged
//!
//! Collection order is provenance only; application order is decided by
//! the [`applicator`](crate::applicator).

use crate::context::{GameContext, UnitContext};
use crate::core_abilities::{instantiate, CoreAbilityRegistry};
use crate::datasheet::Ability;
use crate::entity::Perspective;
use crate::mechanic::{Mechanic, MechanicSource, SourceKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Synthetic source name for damaged-profile mechanics.
pub const DAMAGED_PROFILE: &str = "Damaged Profile";

/// Mechanics collected for both sides of an exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedMechanics {
    pub attacker_mechanics: Vec<Mechanic>,
    pub defender_mechanics: Vec<Mechanic>,
}

impl CollectedMechanics {
    pub fn side(&self, perspective: Perspective) -> &[Mechanic] {
        match perspective {
            Perspective::Attacker => &self.attacker_mechanics,
            Perspective::Defender => &self.defender_mechanics,
        }
    }
}

/// Collects mechanics, resolving core abilities through a registry.
///
/// # Examples
///
/// ```rust
/// use hitroll::collector::MechanicCollector;
/// use hitroll::core_abilities::CoreAbilityRegistry;
/// use hitroll::datasheet::{Ability, Datasheet, ModelProfile};
/// use hitroll::{GameContext, UnitContext};
///
/// let model = ModelProfile {
///     name: "Scout".into(), m: Some(6), t: 4, sv: Some(4), inv_sv: None,
///     w: 2, ld: Some(6), oc: Some(1),
/// };
/// let scouts = Datasheet {
///     name: "Scouts".into(),
///     abilities: vec![Ability::new("Stealth")],
///     ..Datasheet::default()
/// };
/// let defender = UnitContext::new(scouts, model.clone());
/// let attacker = UnitContext::new(Datasheet::default(), model);
///
/// let registry = CoreAbilityRegistry::standard();
/// let collected = MechanicCollector::new(&registry)
///     .collect_all(&GameContext::new(attacker, defender));
///
/// assert!(collected.attacker_mechanics.is_empty());
/// assert_eq!(collected.defender_mechanics.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MechanicCollector<'r> {
    registry: &'r CoreAbilityRegistry,
}

impl<'r> MechanicCollector<'r> {
    pub fn new(registry: &'r CoreAbilityRegistry) -> Self {
        Self { registry }
    }

    /// Collect mechanics for both sides.
    pub fn collect_all(&self, ctx: &GameContext) -> CollectedMechanics {
        CollectedMechanics {
            attacker_mechanics: self.collect_side(ctx, Perspective::Attacker),
            defender_mechanics: self.collect_side(ctx, Perspective::Defender),
        }
    }

    /// Collect mechanics for one side, in source order.
    pub fn collect_side(&self, ctx: &GameContext, perspective: Perspective) -> Vec<Mechanic> {
        let unit = ctx.unit(perspective);
        let army = ctx.army(perspective);
        let unit_name = unit.datasheet.name.as_str();
        let mut out = Vec::new();

        // 1. unit abilities, then attached leaders
        for ability in &unit.datasheet.abilities {
            let source = MechanicSource::new(SourceKind::Ability, &ability.name).with_unit(unit_name);
            out.extend(
                self.ability_mechanics(ability, source)
                    .into_iter()
                    .filter(|mechanic| unit.has_leader() || !is_leader_gated(mechanic)),
            );
        }
        for leader in &unit.attached_leaders {
            for ability in &leader.abilities {
                let source =
                    MechanicSource::new(SourceKind::Ability, &ability.name).with_unit(&leader.name);
                out.extend(self.ability_mechanics(ability, source));
            }
        }

        // 2. weapon attributes
        if perspective == Perspective::Attacker {
            out.extend(self.weapon_mechanics(unit));
        }

        // 3. enhancements
        for enhancement in &unit.enhancements {
            let source =
                MechanicSource::new(SourceKind::Enhancement, &enhancement.name).with_unit(unit_name);
            out.extend(tagged(&enhancement.mechanics, &source));
        }

        // 4. faction abilities
        for ability in &army.faction_abilities {
            let source = MechanicSource::new(SourceKind::Faction, &ability.name);
            out.extend(tagged(&ability.mechanics, &source));
        }

        // 5. detachment abilities
        for ability in &army.detachment_abilities {
            let source = MechanicSource::new(SourceKind::Detachment, &ability.name);
            out.extend(tagged(&ability.mechanics, &source));
        }

        // 6. active stratagems
        let active = ctx.active_stratagems(perspective);
        for stratagem in army.stratagems.iter().filter(|s| active.contains(&s.id)) {
            let source = MechanicSource::new(SourceKind::Stratagem, &stratagem.name);
            out.extend(tagged(&stratagem.mechanics, &source));
        }

        // 7. damaged profile
        if unit.combat_status.is_damaged {
            let source =
                MechanicSource::new(SourceKind::DamagedProfile, DAMAGED_PROFILE).with_unit(unit_name);
            out.extend(tagged(&unit.datasheet.damaged_mechanics, &source));
        }

        debug!(
            side = %perspective,
            unit = unit_name,
            count = out.len(),
            "collected mechanics"
        );
        out
    }

    /// Mechanics for one ability: the core template if registered, else
    /// the mechanics embedded on the ability.
    pub fn ability_mechanics(&self, ability: &Ability, source: MechanicSource) -> Vec<Mechanic> {
        match self.registry.get(&ability.name) {
            Some(template) => {
                let mechanics = instantiate(template, ability.parameter());
                if mechanics.is_empty() {
                    trace!(ability = %ability.name, "core ability without parameter contributes nothing");
                }
                tagged(&mechanics, &source)
            }
            None => tagged(&ability.mechanics, &source),
        }
    }

    fn weapon_mechanics(&self, unit: &UnitContext) -> Vec<Mechanic> {
        let Some(weapon) = &unit.weapon else {
            return Vec::new();
        };
        weapon
            .attributes
            .iter()
            .flat_map(|attribute| {
                let source = MechanicSource::new(SourceKind::Weapon, &attribute.name)
                    .with_unit(&unit.datasheet.name);
                self.ability_mechanics(attribute, source)
            })
            .collect()
    }
}

/// True if a mechanic only makes sense while a leader is attached.
pub fn is_leader_gated(mechanic: &Mechanic) -> bool {
    mechanic.conditions.iter().any(|c| c.requires_leader())
}

fn tagged(mechanics: &[Mechanic], source: &MechanicSource) -> Vec<Mechanic> {
    mechanics
        .iter()
        .map(|mechanic| mechanic.clone().with_source(source.clone()))
        .collect()
}

use hitroll::datasheet::{Ability, Datasheet, Enhancement, ModelProfile, Stratagem, WeaponProfile};
use hitroll::fields::{ModelField, RollKind};
use hitroll::mechanic::SourceKind;
use hitroll::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn model(name: &str, t: i32, sv: i32, inv_sv: Option<i32>) -> ModelProfile {
    ModelProfile {
        name: name.into(),
        m: Some(6),
        t,
        sv: Some(sv),
        inv_sv,
        w: 2,
        ld: Some(6),
        oc: Some(2),
    }
}

fn weapon(bs_ws: i32, s: i32, ap: i32) -> WeaponProfile {
    WeaponProfile {
        name: "Test weapon".into(),
        range: Some(24),
        a: Dice::fixed(2),
        bs_ws,
        s,
        ap: Some(ap),
        d: Dice::fixed(1),
        attributes: Vec::new(),
    }
}

fn sheet(name: &str) -> Datasheet {
    Datasheet {
        name: name.into(),
        ..Datasheet::default()
    }
}

/// Test the plain attack sequence with no rules in play.
#[test]
fn test_unmodified_exchange() {
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None))
        .with_weapon(weapon(3, 5, -1));
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 3, Some(5)));

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert_eq!(result.to_hit, 3);
    assert_eq!(result.to_wound, 3);
    // 3+ armour, AP -1; the 5+ invulnerable is worse
    assert_eq!(result.to_save, 4);
    assert!(!result.invuln_save_used);
    assert!(!result.auto_hit);
    assert!(result.hit_modifiers.is_empty());

    let expected = 2.0 * (4.0 / 6.0) * (4.0 / 6.0) * 0.5;
    assert!(approx(result.expected_damage, expected));
}

/// Test that stacked hit bonuses from several sources are capped at +1.
#[test]
fn test_hit_bonus_cap_across_sources() {
    let bonus = || Mechanic::roll_bonus(RollKind::Hit, 1);
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None))
        .with_weapon(weapon(4, 4, 0))
        .with_enhancement(Enhancement {
            name: "Auspex".into(),
            mechanics: vec![bonus()],
        });
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 3, None));
    let army = ArmyContext {
        faction_abilities: vec![hitroll::datasheet::FactionAbility {
            name: "Oath".into(),
            mechanics: vec![bonus()],
        }],
        detachment_abilities: vec![hitroll::datasheet::DetachmentAbility {
            name: "Doctrine".into(),
            mechanics: vec![bonus()],
        }],
        stratagems: Vec::new(),
    };
    let ctx = GameContext::new(attacker, defender).with_armies(army, ArmyContext::default());

    let result = CombatResolver::default().resolve(&ctx);

    assert_eq!(result.hit_modifiers.len(), 3);
    assert_eq!(result.hit.net_modifier, 3);
    assert_eq!(result.hit.applied_modifier, 1);
    assert_eq!(result.to_hit, 3);
}

/// Test that save bonuses are not capped and stratagems only count while active.
#[test]
fn test_save_bonuses_and_stratagem_toggle() {
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None))
        .with_weapon(weapon(3, 4, 0));
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 6, None));
    let save_bonus = |id: &str| Stratagem {
        id: id.into(),
        name: id.to_uppercase(),
        mechanics: vec![Mechanic::roll_bonus(RollKind::Save, 1)],
    };
    let defender_army = ArmyContext {
        stratagems: vec![save_bonus("a"), save_bonus("b"), save_bonus("c")],
        ..ArmyContext::default()
    };
    let mut ctx =
        GameContext::new(attacker, defender).with_armies(ArmyContext::default(), defender_army);

    let resolver = CombatResolver::default();
    assert_eq!(resolver.resolve(&ctx).to_save, 6);

    ctx.activate_stratagem(Perspective::Defender, "a");
    ctx.activate_stratagem(Perspective::Defender, "b");
    ctx.activate_stratagem(Perspective::Defender, "c");
    let result = resolver.resolve(&ctx);
    assert_eq!(result.save.net_modifier, 3);
    assert_eq!(result.to_save, 3);

    // the attacker toggling the same ids changes nothing
    ctx.activate_stratagem(Perspective::Attacker, "a");
    assert_eq!(resolver.resolve(&ctx), result);
}

/// Test that auto-hit wins over any hit modifier.
#[test]
fn test_torrent_auto_hits() {
    let mut flamer = weapon(4, 5, 0);
    flamer.attributes = vec![Ability::new("Torrent")];
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None)).with_weapon(flamer);
    let defender = UnitContext::new(
        Datasheet {
            name: "Scouts".into(),
            abilities: vec![Ability::new("Stealth")],
            ..Datasheet::default()
        },
        model("D", 4, 4, None),
    );

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert!(result.auto_hit);
    assert_eq!(result.to_hit, 0);
    assert_eq!(result.probabilities.hit, 1.0);
    assert_eq!(result.hit_modifiers.len(), 1);
}

/// Test a leader's ability that only works while leading.
#[test]
fn test_attached_leader_bonus() {
    let captain = Datasheet {
        name: "Captain".into(),
        keywords: vec!["Character".into()],
        abilities: vec![Ability::new("Rites of Battle").with_mechanics(vec![
            Mechanic::roll_bonus(RollKind::Wound, 1)
                .when(Condition::state(Entity::ThisUnit, "isLeadingUnit")),
        ])],
        ..Datasheet::default()
    };
    let attacker = UnitContext::new(sheet("Intercessors"), model("A", 4, 3, None))
        .with_weapon(weapon(3, 4, 0))
        .with_leader(captain);
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 3, None));

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert_eq!(result.to_wound, 3);
    assert_eq!(result.wound_modifiers[0].source, "Rites of Battle (Captain)");
}

/// Test the damaged profile penalty and its explanation entry.
#[test]
fn test_damaged_profile() {
    let mut dreadnought = UnitContext::new(
        Datasheet {
            name: "Dreadnought".into(),
            damaged_mechanics: vec![Mechanic::roll_penalty(RollKind::Hit, 1)],
            ..Datasheet::default()
        },
        model("Dreadnought", 9, 2, None),
    )
    .with_weapon(weapon(3, 6, -1));
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 3, None));
    let resolver = CombatResolver::default();

    let healthy = resolver.resolve(&GameContext::new(dreadnought.clone(), defender.clone()));
    assert_eq!(healthy.to_hit, 3);

    dreadnought.combat_status.is_damaged = true;
    let damaged = resolver.resolve(&GameContext::new(dreadnought, defender));
    assert_eq!(damaged.to_hit, 4);
    let entry = &damaged.applied_mechanics[0];
    assert!(entry.applied);
    assert_eq!(
        entry.mechanic.source.as_ref().map(|s| s.kind),
        Some(SourceKind::DamagedProfile)
    );
}

/// Test the explanation list reports why a rule did not apply.
#[test]
fn test_explanations() {
    let mut gun = weapon(3, 4, 0);
    gun.attributes = vec![Ability::new("Heavy"), Ability::new("Lance")];
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None)).with_weapon(gun);
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 3, None));

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert_eq!(result.applied().count(), 0);
    let reasons: Vec<&str> = result
        .not_applied()
        .filter_map(|m| m.reason.as_deref())
        .collect();
    assert_eq!(
        reasons,
        vec![
            "this-unit.remainedStationary equals true",
            "this-unit.hasChargedThisPhase equals true",
        ]
    );
    let indices: Vec<usize> = result.applied_mechanics.iter().map(|m| m.index).collect();
    assert_eq!(indices, vec![0, 1]);
}

/// Test a whole exchange described in JSON, as a loader would supply it.
#[test]
fn test_json_context() {
    let json = r#"{
        "attacker": {
            "datasheet": { "name": "Hellblasters", "keywords": ["Infantry"] },
            "model": { "name": "Hellblaster", "m": "6\"", "t": 4, "sv": "3+", "w": 2, "ld": "6+", "oc": 1 },
            "weapon": {
                "name": "Plasma incinerator", "range": "24\"", "a": 2, "bsWs": "3+",
                "s": 8, "ap": -3, "d": 2, "attributes": ["Heavy", "Hazardous"]
            },
            "combatStatus": { "remainedStationary": true }
        },
        "defender": {
            "datasheet": {
                "name": "Terminators",
                "abilities": [{ "name": "Feel No Pain", "parameter": "6+" }]
            },
            "model": { "name": "Terminator", "t": 5, "sv": "2+", "invSv": "4+", "w": 3 }
        },
        "attackerArmy": {
            "factionAbilities": [{
                "name": "Oath of Moment",
                "mechanics": [{ "effect": "reroll", "attribute": "hit", "value": "all" }]
            }]
        },
        "defenderArmy": {
            "stratagems": [{
                "id": "aoc",
                "name": "Armour of Contempt",
                "mechanics": [{ "effect": "rollBonus", "attribute": "save", "value": 1 }]
            }]
        }
    }"#;
    let mut ctx: GameContext = serde_json::from_str(json).unwrap();
    let resolver = CombatResolver::default();

    let result = resolver.resolve(&ctx);
    assert_eq!(result.to_hit, 2);
    assert_eq!(result.to_wound, 3);
    assert_eq!(result.to_save, 4);
    assert!(result.invuln_save_used);
    assert_eq!(result.feel_no_pain, Some(6));
    assert_eq!(result.rerolls.hit, RerollGrade::All);
    let expected = 2.0 * (5.0 / 6.0) * (4.0 / 6.0) * 0.5 * 2.0 * (5.0 / 6.0);
    assert!(approx(result.expected_damage, expected));

    // armour 5+ improved to 4+ ties the invulnerable save, so armour is kept
    ctx.activate_stratagem(Perspective::Defender, "aoc");
    let result = resolver.resolve(&ctx);
    assert_eq!(result.to_save, 4);
    assert!(!result.invuln_save_used);
    assert_eq!(result.save_modifiers[0].source, "Armour of Contempt");
}

/// Test static overrides feed the calculators.
#[test]
fn test_static_number_overrides() {
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None))
        .with_weapon(weapon(3, 4, 0));
    let defender = UnitContext::new(
        Datasheet {
            name: "Defenders".into(),
            abilities: vec![Ability::new("Iron Hide").with_mechanics(vec![
                Mechanic::static_number(ModelField::T, 8),
            ])],
            ..Datasheet::default()
        },
        model("D", 4, 3, None),
    );

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));
    assert_eq!(result.to_wound, 6);
}

/// Test repeated resolution gives identical results.
#[test]
fn test_resolution_is_idempotent() {
    let mut gun = weapon(3, 4, -1);
    gun.attributes = vec![Ability::from_label("Sustained Hits 1"), Ability::new("Lethal Hits")];
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None)).with_weapon(gun);
    let defender = UnitContext::new(sheet("Defenders"), model("D", 4, 3, None));
    let ctx = GameContext::new(attacker, defender);
    let resolver = CombatResolver::default();

    let first = resolver.resolve(&ctx);
    let second = resolver.resolve(&ctx);
    assert_eq!(first, second);
    assert_eq!(first.applied().count(), 2);
}

/// Test a side's buffs to its own rolls never reach the opponent's rolls.
#[test]
fn test_own_roll_buffs_stay_on_their_side() {
    let attacker = UnitContext::new(
        Datasheet {
            name: "Armoured Attackers".into(),
            abilities: vec![Ability::new("Iron Halo")
                .with_mechanics(vec![Mechanic::roll_bonus(RollKind::Save, 1)])],
            ..Datasheet::default()
        },
        model("A", 4, 3, None),
    )
    .with_weapon(weapon(3, 4, 0));
    let defender = UnitContext::new(
        Datasheet {
            name: "Marksmen".into(),
            abilities: vec![Ability::new("Targeting Array")
                .with_mechanics(vec![Mechanic::roll_bonus(RollKind::Hit, 1)])],
            ..Datasheet::default()
        },
        model("D", 4, 4, None),
    );

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert_eq!(result.to_hit, 3);
    assert_eq!(result.to_save, 4);
    assert!(result.hit_modifiers.is_empty());
    assert!(result.save_modifiers.is_empty());
    // both mechanics still applied to their own side
    assert_eq!(result.applied().count(), 2);
}

/// Test mechanics aimed at the opposing unit modify the opponent's rolls.
#[test]
fn test_opposing_modifiers_cross_sides() {
    let attacker = UnitContext::new(
        Datasheet {
            name: "Shredders".into(),
            abilities: vec![Ability::new("Rending Volley").with_mechanics(vec![
                Mechanic::roll_penalty(RollKind::Save, 1).targeting(Entity::TargetUnit),
            ])],
            ..Datasheet::default()
        },
        model("A", 4, 3, None),
    )
    .with_weapon(weapon(3, 4, 0));
    let defender: Datasheet = serde_json::from_str(
        r#"{
            "name": "Wardens",
            "abilities": [{
                "name": "Unyielding",
                "mechanics": [{
                    "entity": "opposingUnit",
                    "effect": "rollPenalty",
                    "attribute": "wound",
                    "value": 1
                }]
            }]
        }"#,
    )
    .unwrap();
    let defender = UnitContext::new(defender, model("D", 4, 4, None));

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert_eq!(result.to_wound, 5);
    assert_eq!(result.wound_modifiers[0].source, "Unyielding (Wardens)");
    assert_eq!(result.to_save, 5);
    assert_eq!(result.save_modifiers[0].source, "Rending Volley (Shredders)");
}

/// Test Benefit of Cover granted as an ability counts as being in cover.
#[test]
fn test_benefit_of_cover_ability() {
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None))
        .with_weapon(weapon(3, 4, 0));
    let defender = UnitContext::new(
        Datasheet {
            name: "Skulkers".into(),
            abilities: vec![Ability::new("Benefit of Cover")],
            ..Datasheet::default()
        },
        model("D", 4, 4, None),
    );
    assert!(!defender.combat_status.in_cover);

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert!(result.cover_applied);
    assert_eq!(result.to_save, 3);
}

/// Test out-of-range loader values degrade instead of overflowing.
#[test]
fn test_extreme_values_degrade() {
    let attacker = UnitContext::new(sheet("Attackers"), model("A", 4, 3, None))
        .with_weapon(weapon(3, 4, 0));
    let defender: Datasheet = serde_json::from_str(
        r#"{
            "name": "Bastion",
            "abilities": [{
                "name": "Impossible Armour",
                "mechanics": [
                    { "effect": "rollBonus", "attribute": "save", "value": 3e9 },
                    { "effect": "rollBonus", "attribute": "save", "value": 3e9 }
                ]
            }]
        }"#,
    )
    .unwrap();
    let defender = UnitContext::new(defender, model("D", 4, 4, None));

    let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));

    assert_eq!(result.save.net_modifier, i32::MAX);
    assert_eq!(result.to_save, 2);
}

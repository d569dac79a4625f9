//! Skirmish Example
//!
//! Resolves one shooting exchange loaded from JSON and prints the
//! target numbers, the modifier breakdowns and which rules applied:
//! - Weapon traits given as printed labels ("Sustained Hits 1", "Heavy")
//! - A defender with Stealth, a 4+ invulnerable save and Feel No Pain
//! - An army rule and a stratagem toggled on mid-example
//!
//! Run with `RUST_LOG=hitroll=trace cargo run --example skirmish` to see
//! every mechanic as it is collected and applied.

use hitroll::*;

const EXCHANGE: &str = r#"{
    "attacker": {
        "datasheet": { "name": "Hellblaster Squad", "keywords": ["Infantry", "Imperium"] },
        "model": { "name": "Hellblaster", "m": "6\"", "t": 4, "sv": "3+", "w": 2, "ld": "6+", "oc": 1 },
        "weapon": {
            "name": "Plasma incinerator", "range": "24\"", "a": 2, "bsWs": "3+",
            "s": 8, "ap": -3, "d": 2, "attributes": ["Heavy", "Sustained Hits 1"]
        },
        "combatStatus": { "remainedStationary": true }
    },
    "defender": {
        "datasheet": {
            "name": "Ghost Squad",
            "keywords": ["Infantry"],
            "abilities": ["Stealth", { "name": "Feel No Pain", "parameter": "5+" }]
        },
        "model": { "name": "Ghost", "m": "7\"", "t": 4, "sv": "4+", "invSv": "4+", "w": 2 },
        "combatStatus": { "inCover": true }
    },
    "attackerArmy": {
        "factionAbilities": [{
            "name": "Oath of Moment",
            "mechanics": [{ "effect": "reroll", "attribute": "hit", "value": "all" }]
        }],
        "stratagems": [{
            "id": "fire-discipline",
            "name": "Fire Discipline",
            "mechanics": [{ "effect": "rollBonus", "attribute": "wound", "value": 1 }]
        }]
    }
}"#;

fn print_modifiers(label: &str, modifiers: &[RollModifier]) {
    if modifiers.is_empty() {
        return;
    }
    println!("  {} modifiers:", label);
    for modifier in modifiers {
        println!("    {:+} from {}", modifier.value, modifier.source);
    }
}

fn report(title: &str, result: &CombatResult) {
    println!("== {} ==", title);
    println!(
        "  to hit {}+  to wound {}+  to save {}+{}",
        result.to_hit,
        result.to_wound,
        result.to_save,
        if result.invuln_save_used { " (invulnerable)" } else { "" }
    );
    print_modifiers("hit", &result.hit_modifiers);
    print_modifiers("wound", &result.wound_modifiers);
    print_modifiers("save", &result.save_modifiers);
    if let Some(fnp) = result.feel_no_pain {
        println!("  feel no pain {}+", fnp);
    }
    println!(
        "  rerolls: hit {:?}, wound {:?}",
        result.rerolls.hit, result.rerolls.wound
    );
    println!("  expected damage {:.3}", result.expected_damage);

    for entry in &result.applied_mechanics {
        match &entry.reason {
            None => println!("    [x] {} {}", entry.perspective, entry.mechanic),
            Some(reason) => println!(
                "    [ ] {} {} (needs {})",
                entry.perspective, entry.mechanic, reason
            ),
        }
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut ctx: GameContext = serde_json::from_str(EXCHANGE)?;
    let resolver = CombatResolver::new(CoreAbilityRegistry::standard(), RollRules::default());

    report("Opening volley", &resolver.resolve(&ctx));

    ctx.activate_stratagem(Perspective::Attacker, "fire-discipline");
    report("With Fire Discipline", &resolver.resolve(&ctx));

    ctx.attacker.combat_status.remained_stationary = false;
    report("After moving", &resolver.resolve(&ctx));

    Ok(())
}

use hitroll::datasheet::{Datasheet, ModelProfile, WeaponProfile};
use hitroll::fields::{ModelField, RollKind};
use hitroll::rolls::{
    calculate_base_wound_target, calculate_hit_target, calculate_save_target,
    calculate_wound_target, success_probability, SaveInput,
};
use hitroll::stats::RerollGrades;
use hitroll::*;
use proptest::prelude::*;

fn modifiers(values: &[i32]) -> Vec<RollModifier> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| RollModifier::new(*v, format!("Rule {}", i)))
        .collect()
}

fn grade() -> impl Strategy<Value = RerollGrade> {
    prop_oneof![
        Just(RerollGrade::None),
        Just(RerollGrade::Ones),
        Just(RerollGrade::Failed),
        Just(RerollGrade::All),
    ]
}

fn context(t: i32, sv: i32) -> GameContext {
    let model = ModelProfile {
        name: "Model".into(),
        m: Some(6),
        t,
        sv: Some(sv),
        inv_sv: None,
        w: 2,
        ld: Some(6),
        oc: Some(1),
    };
    let weapon = WeaponProfile {
        name: "Gun".into(),
        range: Some(24),
        a: Dice::fixed(2),
        bs_ws: 3,
        s: 4,
        ap: Some(-1),
        d: Dice::fixed(1),
        attributes: Vec::new(),
    };
    let attacker = UnitContext::new(Datasheet::default(), model.clone()).with_weapon(weapon);
    GameContext::new(attacker, UnitContext::new(Datasheet::default(), model))
}

proptest! {
    #[test]
    fn hit_and_wound_targets_stay_in_range(
        bs in 1i32..8,
        s in 1i32..20,
        t in 1i32..20,
        mods in prop::collection::vec(-3i32..4, 0..6),
    ) {
        let rules = RollRules::default();
        let mods = modifiers(&mods);

        let hit = calculate_hit_target(bs, &mods, false, &rules);
        prop_assert!((2..=6).contains(&hit.target));
        prop_assert!(hit.applied_modifier.abs() <= 1);

        let wound = calculate_wound_target(s, t, &mods, false, &rules);
        prop_assert!((2..=6).contains(&wound.target));
    }

    #[test]
    fn save_target_stays_in_range(
        sv in 2i32..8,
        inv in prop::option::of(2i32..7),
        ap in -6i32..1,
        in_cover in any::<bool>(),
        mods in prop::collection::vec(-3i32..4, 0..6),
    ) {
        let mods = modifiers(&mods);
        let save = calculate_save_target(
            &SaveInput { sv, inv_sv: inv, ap, in_cover, ignores_cover: false, modifiers: &mods },
            &RollRules::default(),
        );
        prop_assert!((2..=7).contains(&save.target));
        prop_assert!(save.target <= save.armour_target);
        if save.invuln_used {
            prop_assert!(!save.cover_applied);
            prop_assert_eq!(Some(save.target), inv);
        }
    }

    #[test]
    fn wound_table_is_monotonic(s in 1i32..20, t in 1i32..20) {
        let target = calculate_base_wound_target(s, t);
        prop_assert!((2..=6).contains(&target));
        prop_assert!(calculate_base_wound_target(s + 1, t) <= target);
        prop_assert!(calculate_base_wound_target(s, t + 1) >= target);
    }

    #[test]
    fn automatic_rolls_ignore_modifiers(
        bs in 2i32..7,
        mods in prop::collection::vec(-3i32..4, 0..6),
    ) {
        let rules = RollRules::default();
        let hit = calculate_hit_target(bs, &modifiers(&mods), true, &rules);
        prop_assert_eq!(hit.target, 0);
        prop_assert_eq!(success_probability(hit.target), 1.0);
    }

    #[test]
    fn reroll_grades_never_downgrade(grades in prop::collection::vec(grade(), 0..8)) {
        let mut rerolls = RerollGrades::default();
        let mut best = RerollGrade::None;
        for g in grades {
            let before = rerolls.hit;
            rerolls.upgrade(RollKind::Hit, g);
            prop_assert!(rerolls.hit >= before);
            best = best.max(g);
        }
        prop_assert_eq!(rerolls.hit, best);
    }

    #[test]
    fn apply_effects_is_idempotent(
        t in 1i32..12,
        sv in 2i32..7,
        bonus in -2i32..3,
        toughness_override in prop::option::of(1i32..12),
    ) {
        let ctx = context(t, sv);
        let mut mechanics = vec![
            Mechanic::roll_bonus(RollKind::Save, bonus),
            Mechanic::reroll(RollKind::Hit, "ones"),
            Mechanic::adds_keyword(["Fly"]),
        ];
        if let Some(value) = toughness_override {
            mechanics.push(Mechanic::static_number(ModelField::T, value));
        }

        let first = apply_effects(&mechanics, &ctx, Perspective::Defender);
        let second = apply_effects(&mechanics, &ctx, Perspective::Defender);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.model.t, toughness_override.unwrap_or(t));
    }

    #[test]
    fn probabilities_are_bounded(target in -2i32..10) {
        let p = success_probability(target);
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert!(success_probability(target + 1) <= p);
    }
}

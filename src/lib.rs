//! # hitroll - Deterministic Tabletop Combat Rules Engine
//!
//! Computes the dice targets and expected damage of one attack exchange
//! between two units:
//! - **Data-driven** rules (abilities, stratagems and weapon traits are
//!   plain `Mechanic` records, not code)
//! - **Deterministic** resolution (same context → same result, no RNG)
//! - **Explainable** output (every considered mechanic with why it did
//!   or did not apply)
//!
//! ## Core Concepts
//!
//! ### Resolution Pipeline
//!
//! ```text
//! [GameContext] → collect → evaluate → apply → [ModifiedStats] → calculate → [CombatResult]
//! ```
//!
//! 1. The **collector** gathers each side's mechanics from unit, leader,
//!    weapon, enhancement, army and stratagem sources
//! 2. The **condition evaluator** keeps those whose conditions hold
//! 3. The **applicator** folds them, by effect priority, into a
//!    `ModifiedStats` snapshot per side
//! 4. The **roll calculators** turn both snapshots into clamped Hit,
//!    Wound and Save targets, and the damage estimator into an expected
//!    damage figure
//!
//! ## Example
//!
//! ```rust
//! use hitroll::*;
//! use hitroll::datasheet::{Ability, Datasheet, ModelProfile, WeaponProfile};
//!
//! let marine = ModelProfile {
//!     name: "Intercessor".into(), m: Some(6), t: 4, sv: Some(3), inv_sv: None,
//!     w: 2, ld: Some(6), oc: Some(2),
//! };
//! let bolt_rifle = WeaponProfile {
//!     name: "Bolt rifle".into(), range: Some(24), a: Dice::fixed(2), bs_ws: 3,
//!     s: 4, ap: Some(-1), d: Dice::fixed(1),
//!     attributes: vec![Ability::new("Heavy")],
//! };
//!
//! let mut attacker = UnitContext::new(Datasheet::default(), marine.clone()).with_weapon(bolt_rifle);
//! attacker.combat_status.remained_stationary = true;
//! let defender = UnitContext::new(Datasheet::default(), marine);
//!
//! let result = CombatResolver::default().resolve(&GameContext::new(attacker, defender));
//! assert_eq!(result.to_hit, 2); // BS 3+, Heavy +1
//! assert_eq!(result.to_wound, 4);
//! assert_eq!(result.to_save, 4);
//! ```
//!
//! ## Modules
//!
//! - [`value`] - Loosely typed rule values
//! - [`dice`] - Dice expressions for attacks and damage
//! - [`fields`] - Model and weapon characteristics, roll kinds
//! - [`entity`] - Entity references and perspective
//! - [`mechanic`] - Mechanics and conditions
//! - [`datasheet`] - Unit and army data as supplied by loaders
//! - [`context`] - Game state for one pairing
//! - [`state`] - Entity resolution
//! - [`condition`] - Condition evaluation
//! - [`core_abilities`] - Core ability templates
//! - [`collector`] - Mechanic collection
//! - [`stats`] - Modified stats snapshot
//! - [`applicator`] - Effect application
//! - [`rules`] - Game-table constants
//! - [`rolls`] - Hit, Wound and Save calculators
//! - [`damage`] - Expected damage
//! - [`combat`] - End-to-end resolution
//! - [`error`] - Error types

pub mod applicator;
pub mod collector;
pub mod combat;
pub mod condition;
pub mod context;
pub mod core_abilities;
pub mod damage;
pub mod datasheet;
pub mod dice;
pub mod entity;
pub mod error;
pub mod fields;
pub mod mechanic;
pub mod rolls;
pub mod rules;
pub mod state;
pub mod stats;
pub mod value;

// Re-export main types for convenience
pub use combat::{AppliedMechanic, CombatResolver, CombatResult};
pub use context::{ArmyContext, CombatStatus, GameContext, UnitContext};
pub use dice::Dice;
pub use entity::{Entity, Perspective};
pub use error::RulesError;
pub use rules::RollRules;
pub use value::Value;

// Re-export the rule model
pub use core_abilities::{CoreAbilityRegistry, CoreAbilityTemplate};
pub use mechanic::{Condition, Effect, Mechanic, MechanicSource, Operator, SourceKind};
pub use stats::{ModifiedStats, RerollGrade, RollModifier};

// Re-export pipeline stages
pub use applicator::{apply_effects, apply_effects_with_details};
pub use collector::MechanicCollector;
pub use condition::{evaluate, evaluate_mechanic, evaluate_with_reason};

//! Ironclaw 2E dice pool engine.
//!
//! This crate provides:
//! - Dice notation parsing and formatting for the five Ironclaw die types
//! - Pool aggregation from named stats, with the burdened limit
//! - Target-number and highest-die evaluation, including ties and botches
//! - A pluggable dice source so rolls can be scripted in tests
//!
//! # Quick Start
//!
//! ```ignore
//! use ironclaw_core::{CharacterStats, DiceRoller, DieType, EvaluationMode, RollPolicy, Stat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let character = CharacterStats::new()
//!         .with(Stat::trait_die("Speed", DieType::D10))
//!         .with(Stat::skill("Dodge", "1d8")?);
//!
//!     let roller = DiceRoller::new(RollPolicy::from_env()?);
//!     let roll = roller
//!         .roll_stats(&character, &["Speed", "Dodge"], "", EvaluationMode::TargetNumber(3))
//!         .await?;
//!
//!     if let Some(roll) = roll {
//!         println!("{}: {}", roll.label, roll.result);
//!     }
//!     Ok(())
//! }
//! ```

pub mod dice;
pub mod policy;
pub mod pool;
pub mod roll;
pub mod roller;
pub mod source;
pub mod stats;
pub mod testing;

// Primary public API
pub use dice::{
    parse_term, DiceError, DicePool, DieType, ParseWarning, ParsedNotation, MAX_POOL_DICE,
};
pub use policy::{PolicyError, RollPolicy};
pub use pool::{
    add_pools, apply_ceiling, combine_pools, upgrade_dice, CombinedPool, NamedContribution,
    PoolBuilder,
};
pub use roll::{
    evaluate_highest, evaluate_target_number, Classification, EvaluationMode, Outcome,
    PreparedRoll, RollResult,
};
pub use roller::{DiceRoller, LabeledRoll};
pub use source::{DiceSource, RngDiceSource};
pub use stats::{CharacterStats, Stat, StatKind, StatSource};

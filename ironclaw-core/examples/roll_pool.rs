//! Roll a few Ironclaw pools with the real RNG.
//!
//! Run with: `RUST_LOG=debug cargo run -p ironclaw-core --example roll_pool`

use ironclaw_core::{
    CharacterStats, DicePool, DiceRoller, DieType, EvaluationMode, RollPolicy, Stat,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let roller = DiceRoller::new(RollPolicy::from_env()?);
    println!("=== Policy: {:?} ===\n", roller.policy());

    test_roll(&roller, "2d12, 1d8", EvaluationMode::TargetNumber(3)).await?;
    test_roll(&roller, "d10, d6, d4", EvaluationMode::Highest).await?;
    test_roll(&roller, "3d4", EvaluationMode::TargetNumber(5)).await?;
    test_roll(&roller, "1d20, d0", EvaluationMode::Highest).await?;

    let character = CharacterStats::new()
        .with(Stat::trait_die("Speed", DieType::D12))
        .with(Stat::trait_die("Mind", DieType::D8))
        .with(Stat::skill("Dodge", "1d10")?)
        .with(Stat::gift("Fast", DicePool::single(DieType::D6)));

    println!("\n=== Dodging while burdened ===");
    match roller
        .roll_stats(
            &character,
            &["Speed", "Dodge", "Fast"],
            "1d4",
            EvaluationMode::TargetNumber(6),
        )
        .await?
    {
        Some(roll) => println!("{}: {}", roll.label, roll.result),
        None => println!("Nothing to roll"),
    }

    Ok(())
}

async fn test_roll(
    roller: &DiceRoller,
    notation: &str,
    mode: EvaluationMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = roller.parse_notation(notation);
    for warning in &parsed.warnings {
        println!("  dropped {warning}");
    }
    print!("Rolling {notation} ({mode:?})... ");
    match roller.evaluate(parsed.pool, mode).await? {
        Some(result) => println!("{result}"),
        None => println!("nothing to roll"),
    }
    Ok(())
}

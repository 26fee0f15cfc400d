//! End-to-end roll flows through the public API.
//!
//! Dice come from `FixedDiceSource`, so every outcome here is exact.
//! Run with: `cargo test -p ironclaw-core --test roll_flow`

use ironclaw_core::testing::{pool_of, FixedDiceSource};
use ironclaw_core::{
    apply_ceiling, combine_pools, evaluate_highest, evaluate_target_number, CharacterStats,
    Classification, DiceError, DicePool, DiceRoller, DieType, EvaluationMode, NamedContribution,
    Outcome, RngDiceSource, RollPolicy, Stat, MAX_POOL_DICE,
};

// =============================================================================
// Notation
// =============================================================================

#[test]
fn test_parse_and_format_scenario() {
    let parsed = DicePool::parse_notation("2d12, 1d8");
    assert_eq!(parsed.pool.counts(), [2, 0, 1, 0, 0]);
    assert_eq!(parsed.pool.format(true), "2d12, 1d8");
}

#[test]
fn test_notation_round_trip_is_canonical() {
    for (input, canonical) in [
        ("d8", "1d8"),
        ("1d4,1d12", "1d12, 1d4"),
        ("2D6, d6, 1d10", "1d10, 3d6"),
        ("3d12,2d10,1d8,1d6,4d4", "3d12, 2d10, 1d8, 1d6, 4d4"),
    ] {
        let pool = DicePool::parse_notation(input).pool;
        assert_eq!(pool.format(true), canonical, "input {input:?}");
        assert_eq!(DicePool::parse_notation(canonical).pool, pool);
    }
}

#[test]
fn test_lenient_parse_reports_dropped_terms() {
    let parsed = DicePool::parse_notation("1d12, 2d20, d0, banana");
    assert_eq!(parsed.pool, pool_of("d12"));
    let dropped: Vec<_> = parsed.warnings.iter().map(|w| w.term.as_str()).collect();
    assert_eq!(dropped, vec!["2d20", "banana"]);
}

// =============================================================================
// Aggregation
// =============================================================================

#[test]
fn test_combine_scenario() {
    let combined = combine_pools(
        &[
            NamedContribution::new("Speed", DicePool::new([1, 0, 0, 0, 0])),
            NamedContribution::new("Dodge", DicePool::new([0, 1, 0, 0, 0])),
        ],
        None,
    );
    assert_eq!(combined.pool.counts(), [1, 1, 0, 0, 0]);
    assert_eq!(combined.label, "Speed + Dodge");
}

#[test]
fn test_ceiling_scenario() {
    assert_eq!(
        apply_ceiling(DicePool::new([2, 0, 0, 0, 0]), DieType::D8).counts(),
        [0, 0, 2, 0, 0]
    );
}

#[test]
fn test_combine_is_associative() {
    let a = NamedContribution::limited("Speed", pool_of("d12"));
    let b = NamedContribution::new("Dodge", pool_of("d10, d6"));
    let c = NamedContribution::new("Fast", pool_of("2d4"));

    let all = combine_pools(&[a.clone(), b.clone(), c.clone()], Some(DieType::D8));
    let ab = combine_pools(&[a, b], Some(DieType::D8));
    let then_c = combine_pools(
        &[NamedContribution::new("ab", ab.pool), c],
        Some(DieType::D8),
    );
    assert_eq!(all.pool, then_c.pool);
}

// =============================================================================
// Evaluation
// =============================================================================

#[tokio::test]
async fn test_target_number_scenario() {
    let source = FixedDiceSource::new([12, 3, 1]);
    let result = evaluate_target_number(3, pool_of("d12, d8, d4"), &source)
        .await
        .unwrap()
        .unwrap();

    let Outcome::TargetNumber(outcome) = result.outcome else {
        panic!("expected a target-number outcome");
    };
    assert_eq!(outcome.successes, 2);
    assert_eq!(outcome.highest, 12);
    assert!(!outcome.botch);
    assert_eq!(result.classification(), Classification::Success(2));
}

#[tokio::test]
async fn test_botch_scenario() {
    let source = FixedDiceSource::new([1, 1, 1]);
    let result = evaluate_target_number(5, pool_of("3d4"), &source)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.highest(), 1);
    assert!(result.is_botch());
    assert_eq!(result.classification(), Classification::Botch);
}

#[tokio::test]
async fn test_highest_scenario() {
    let source = FixedDiceSource::new([4, 10, 2]);
    let result = evaluate_highest(pool_of("2d12, d4"), &source)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.highest(), 10);
    assert_eq!(result.classification(), Classification::Normal(10));
}

#[tokio::test]
async fn test_empty_pool_is_not_an_error() {
    let roller = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::default());
    assert_eq!(roller.evaluate_highest(DicePool::empty()).await, Ok(None));
    assert_eq!(
        roller.evaluate_target_number(3, DicePool::empty()).await,
        Ok(None)
    );
}

#[tokio::test]
async fn test_botch_iff_all_ones() {
    let source = RngDiceSource::seeded(2024);
    let roller = DiceRoller::with_source(RollPolicy::default(), source);
    for _ in 0..200 {
        let result = roller
            .evaluate_target_number(4, pool_of("d6, 2d4"))
            .await
            .unwrap()
            .unwrap();
        let all_ones = result.faces().iter().all(|&face| face == 1);
        assert_eq!(result.is_botch(), all_ones, "faces {:?}", result.faces());
    }
}

#[tokio::test]
async fn test_botch_iff_all_ones_at_tn_one() {
    let roller = DiceRoller::with_source(RollPolicy::default(), RngDiceSource::seeded(7));
    for _ in 0..200 {
        let result = roller
            .evaluate_target_number(1, pool_of("2d4"))
            .await
            .unwrap()
            .unwrap();
        let all_ones = result.faces().iter().all(|&face| face == 1);
        assert_eq!(result.is_botch(), all_ones, "faces {:?}", result.faces());
        assert_eq!(result.classification(), Classification::Success(2));
    }

    let scripted = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::new([1, 1]));
    let result = scripted
        .evaluate_target_number(1, pool_of("2d4"))
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_botch());
    assert_eq!(result.classification(), Classification::Success(2));
}

#[tokio::test]
async fn test_rng_faces_stay_on_the_dice() {
    let roller = DiceRoller::with_source(RollPolicy::default(), RngDiceSource::seeded(99));
    for _ in 0..100 {
        let result = roller
            .evaluate_highest(pool_of("d12, d10, d8, d6, d4"))
            .await
            .unwrap()
            .unwrap();
        for roll in &result.dice {
            assert!(roll.face >= 1 && roll.face <= roll.die.sides());
        }
    }
}

#[tokio::test]
async fn test_invalid_target_number_is_rejected() {
    let roller = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::default());
    assert_eq!(
        roller.evaluate_target_number(0, pool_of("d6")).await,
        Err(DiceError::InvalidTargetNumber(0))
    );
}

// =============================================================================
// Character rolls
// =============================================================================

#[tokio::test]
async fn test_burdened_character_roll() {
    let character = CharacterStats::new()
        .with(Stat::trait_die("Speed", DieType::D12))
        .with(Stat::trait_die("Body", DieType::D10))
        .with(Stat::skill("Dodge", "1d10").unwrap());

    let roller = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::new([2, 2, 6]));
    let roll = roller
        .roll_stats(
            &character,
            &["Speed", "Dodge"],
            "1d6, 1d3",
            EvaluationMode::TargetNumber(7),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(roll.label, "Speed + Dodge + extra");
    assert_eq!(roll.result.pool, pool_of("2d8, 1d6"));
    assert_eq!(roll.warnings.len(), 1);
    assert_eq!(roll.result.classification(), Classification::Tie(1));
}

#[tokio::test]
async fn test_luck_reroll_turns_botch_around() {
    let luck = FixedDiceSource::new([9]);
    let roller = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::new([1, 1]));
    let result = roller
        .evaluate_target_number(3, pool_of("d12, d4"))
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_botch());

    let rerolled = result.reroll_die(0, &luck).await.unwrap();
    assert_eq!(rerolled.faces(), vec![9, 1]);
    assert_eq!(rerolled.classification(), Classification::Success(1));
}

#[tokio::test]
async fn test_huge_extra_dice_are_refused() {
    let character = CharacterStats::new().with(Stat::trait_die("Body", DieType::D10));
    let source = FixedDiceSource::default();
    let roller = DiceRoller::with_source(RollPolicy::default(), source);

    let err = roller
        .roll_stats(&character, &["Body"], "4294967295d12, 5d12", EvaluationMode::Highest)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DiceError::PoolTooLarge {
            dice: u32::MAX,
            max: MAX_POOL_DICE,
        }
    );
}

//! DiceRoller - the primary public API for Ironclaw rolls.
//!
//! This module bundles a [`RollPolicy`] and a [`DiceSource`] behind the
//! small call surface the chat and sheet layers use: parse and format pools,
//! combine named stats, and evaluate a pool in either mode.

use crate::dice::{DiceError, DicePool, ParseWarning, ParsedNotation};
use crate::policy::RollPolicy;
use crate::pool::{combine_pools, CombinedPool, NamedContribution, PoolBuilder};
use crate::roll::{self, EvaluationMode, RollResult};
use crate::source::{DiceSource, RngDiceSource};
use crate::stats::CharacterStats;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A roll of named stats, with the label shown to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRoll {
    /// Composition label, e.g. `Speed + Dodge + extra`.
    pub label: String,
    /// Extra-dice terms that were dropped.
    pub warnings: Vec<ParseWarning>,
    pub result: RollResult,
}

/// Rolls pools under one policy with one dice source.
///
/// Every call is independent; a roller can serve concurrent requests.
#[derive(Clone)]
pub struct DiceRoller {
    policy: RollPolicy,
    source: Arc<dyn DiceSource>,
}

impl DiceRoller {
    /// A roller backed by an entropy-seeded RNG.
    pub fn new(policy: RollPolicy) -> Self {
        Self::with_source(policy, RngDiceSource::new())
    }

    /// A roller that draws faces from `source`.
    pub fn with_source(policy: RollPolicy, source: impl DiceSource + 'static) -> Self {
        Self {
            policy,
            source: Arc::new(source),
        }
    }

    /// A roller sharing a source with other rollers.
    pub fn with_shared_source(policy: RollPolicy, source: Arc<dyn DiceSource>) -> Self {
        Self { policy, source }
    }

    /// Current roll policy.
    pub fn policy(&self) -> &RollPolicy {
        &self.policy
    }

    /// Replace the policy, e.g. when a character becomes burdened.
    pub fn set_policy(&mut self, policy: RollPolicy) {
        self.policy = policy;
    }

    /// Lenient notation parse; see [`DicePool::parse_notation`].
    pub fn parse_notation(&self, text: &str) -> ParsedNotation {
        DicePool::parse_notation(text)
    }

    /// Render a pool as notation.
    pub fn format_pool(&self, pool: &DicePool, human_readable: bool) -> String {
        pool.format(human_readable)
    }

    /// Sum named sources, capping burden-limited ones when the policy says so.
    pub fn combine_pools(&self, sources: &[NamedContribution]) -> CombinedPool {
        combine_pools(sources, self.policy.ceiling())
    }

    /// Roll a pool in the given mode. `Ok(None)` for an empty pool.
    pub async fn evaluate(
        &self,
        pool: DicePool,
        mode: EvaluationMode,
    ) -> Result<Option<RollResult>, DiceError> {
        roll::evaluate(pool, mode, self.source.as_ref()).await
    }

    /// Count successes against `tn`.
    pub async fn evaluate_target_number(
        &self,
        tn: u32,
        pool: DicePool,
    ) -> Result<Option<RollResult>, DiceError> {
        self.evaluate(pool, EvaluationMode::TargetNumber(tn)).await
    }

    /// Read the single highest face.
    pub async fn evaluate_highest(&self, pool: DicePool) -> Result<Option<RollResult>, DiceError> {
        self.evaluate(pool, EvaluationMode::Highest).await
    }

    /// Roll with the policy's default mode.
    pub async fn roll_default(&self, pool: DicePool) -> Result<Option<RollResult>, DiceError> {
        self.evaluate(pool, self.policy.default_mode()).await
    }

    /// Roll a character's named stats plus free-text extra dice.
    ///
    /// Stats are added in the order given and the label follows that order.
    /// Returns `Ok(None)` when the combined pool is empty.
    pub async fn roll_stats(
        &self,
        character: &CharacterStats,
        names: &[&str],
        extra: &str,
        mode: EvaluationMode,
    ) -> Result<Option<LabeledRoll>, DiceError> {
        let builder = character
            .contributions(names)?
            .into_iter()
            .fold(PoolBuilder::new(), PoolBuilder::add)
            .extra(extra);
        let combined = builder.build(&self.policy);
        debug!("Rolling {} as {}", combined.label, combined.pool);

        let result = self.evaluate(combined.pool, mode).await?;
        Ok(result.map(|result| LabeledRoll {
            label: combined.label,
            warnings: builder.warnings().to_vec(),
            result,
        }))
    }

    /// Roll independent requests concurrently, results in request order.
    pub async fn roll_all(
        &self,
        requests: &[(DicePool, EvaluationMode)],
    ) -> Vec<Result<Option<RollResult>, DiceError>> {
        join_all(
            requests
                .iter()
                .map(|&(pool, mode)| self.evaluate(pool, mode)),
        )
        .await
    }
}

/// An RNG-backed roller with the default policy, burdened cap included.
impl Default for DiceRoller {
    fn default() -> Self {
        Self::new(RollPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DieType;
    use crate::roll::Classification;
    use crate::stats::Stat;
    use crate::testing::{pool_of, FixedDiceSource};

    fn runner() -> CharacterStats {
        CharacterStats::new()
            .with(Stat::trait_die("Speed", DieType::D12))
            .with(Stat::trait_die("Mind", DieType::D6))
            .with(Stat::skill("Dodge", "1d10").unwrap())
    }

    #[tokio::test]
    async fn test_roll_stats_applies_burdened_limit() {
        let roller =
            DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::new([8, 2, 4]));
        let roll = roller
            .roll_stats(&runner(), &["Speed", "Dodge"], "1d4", EvaluationMode::TargetNumber(4))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(roll.label, "Speed + Dodge + extra");
        assert_eq!(roll.result.pool, pool_of("2d8, 1d4"));
        assert_eq!(roll.result.classification(), Classification::Success(2));
        assert!(roll.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_roll_stats_without_limit() {
        let policy = RollPolicy::default().with_burdened_limit(false);
        let roller = DiceRoller::with_source(policy, FixedDiceSource::new([5, 9]));
        let roll = roller
            .roll_stats(&runner(), &["Dodge", "Speed"], "", EvaluationMode::Highest)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(roll.label, "Dodge + Speed");
        assert_eq!(roll.result.pool, pool_of("1d12, 1d10"));
        assert_eq!(roll.result.classification(), Classification::Normal(9));
    }

    #[tokio::test]
    async fn test_roll_stats_unknown_name() {
        let roller = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::default());
        let err = roller
            .roll_stats(&runner(), &["Speed", "Flying"], "", EvaluationMode::Highest)
            .await
            .unwrap_err();
        assert_eq!(err, DiceError::UnknownStat("Flying".to_string()));
    }

    #[tokio::test]
    async fn test_roll_default_uses_policy_mode() {
        let policy = RollPolicy::default().with_default_target_number(6);
        let roller = DiceRoller::with_source(policy, FixedDiceSource::new([6, 2]));
        let result = roller.roll_default(pool_of("2d6")).await.unwrap().unwrap();
        assert_eq!(result.mode, EvaluationMode::TargetNumber(6));
        assert_eq!(result.successes(), Some(1));
    }

    #[tokio::test]
    async fn test_roll_all_keeps_request_order() {
        let roller = DiceRoller::with_source(RollPolicy::default(), FixedDiceSource::new([1, 4]));
        let results = roller
            .roll_all(&[
                (pool_of("d4"), EvaluationMode::Highest),
                (DicePool::empty(), EvaluationMode::Highest),
                (pool_of("d6"), EvaluationMode::TargetNumber(0)),
            ])
            .await;

        assert_eq!(results.len(), 3);
        let first = results[0].as_ref().unwrap().as_ref().unwrap();
        assert_eq!(first.pool, pool_of("d4"));
        assert!(results[1].as_ref().unwrap().is_none());
        assert_eq!(results[2], Err(DiceError::InvalidTargetNumber(0)));
    }

    #[test]
    fn test_parse_and_format() {
        let roller = DiceRoller::default();
        let parsed = roller.parse_notation("2d12, 1d8");
        assert_eq!(roller.format_pool(&parsed.pool, true), "2d12, 1d8");
        assert_eq!(roller.format_pool(&parsed.pool, false), "2d12,1d8");
    }

    #[test]
    fn test_combine_pools_uses_policy_ceiling() {
        let sources = [
            NamedContribution::limited("Speed", pool_of("d12")),
            NamedContribution::new("Fast", pool_of("d12")),
        ];
        let limited = DiceRoller::default().combine_pools(&sources);
        assert_eq!(limited.pool, pool_of("d12, d8"));

        let free = DiceRoller::new(RollPolicy::default().with_burdened_limit(false))
            .combine_pools(&sources);
        assert_eq!(free.pool, pool_of("2d12"));
    }
}

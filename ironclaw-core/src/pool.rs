//! Combining dice from several named sources into one pool.
//!
//! Rolls in Ironclaw add up a trait, a skill or two, gift bonuses and any
//! extra dice the player typed in. Some stats are capped while the
//! character is burdened; the cap only touches those stats, never the
//! whole pool.

use crate::dice::{DiceError, DicePool, DieType, ParseWarning, POOL_SLOTS};
use crate::policy::RollPolicy;
use crate::stats::StatSource;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Label used for free-text extra dice.
pub const EXTRA_LABEL: &str = "extra";

/// Sum two pools, treating a missing pool as empty.
pub fn add_pools(a: Option<&DicePool>, b: Option<&DicePool>) -> DicePool {
    a.copied().unwrap_or_default() + b.copied().unwrap_or_default()
}

/// Fold every die at or above `ceiling` into the `ceiling` slot.
///
/// `[2, 0, 0, 0, 0]` capped at d8 becomes `[0, 0, 2, 0, 0]`. Applying the
/// same ceiling twice changes nothing.
pub fn apply_ceiling(pool: DicePool, ceiling: DieType) -> DicePool {
    let mut counts = pool.counts();
    let limit = ceiling.index();
    let folded = counts[..=limit]
        .iter()
        .fold(0u32, |total, &count| total.saturating_add(count));
    counts[..limit].iter_mut().for_each(|count| *count = 0);
    counts[limit] = folded;
    DicePool::new(counts)
}

/// Turn a numeric slot index into a ceiling die.
///
/// Fractions are rounded and out-of-range values clamped to d12..d4.
pub fn ceiling_from_index(index: f64) -> Result<DieType, DiceError> {
    if !index.is_finite() {
        return Err(DiceError::InvalidCeiling(index.to_string()));
    }
    let clamped = index.round().clamp(0.0, (POOL_SLOTS - 1) as f64) as usize;
    DieType::from_index(clamped).ok_or_else(|| DiceError::InvalidCeiling(index.to_string()))
}

/// Move every die `steps` sizes up, stopping at d12.
pub fn upgrade_dice(pool: DicePool, steps: usize) -> DicePool {
    shift_dice(pool, |index| index.saturating_sub(steps))
}

/// Move every die `steps` sizes down, stopping at d4.
pub fn downgrade_dice(pool: DicePool, steps: usize) -> DicePool {
    shift_dice(pool, |index| index.saturating_add(steps).min(POOL_SLOTS - 1))
}

fn shift_dice(pool: DicePool, target: impl Fn(usize) -> usize) -> DicePool {
    let mut shifted = DicePool::empty();
    for (die, count) in pool.iter() {
        if let Some(moved) = DieType::from_index(target(die.index())) {
            shifted.add_dice(moved, count);
        }
    }
    shifted
}

/// One labeled source of dice feeding a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedContribution {
    pub label: String,
    pub pool: DicePool,
    /// Whether the burdened ceiling applies to this source.
    pub burden_limited: bool,
}

impl NamedContribution {
    /// A source the burdened ceiling leaves alone.
    pub fn new(label: impl Into<String>, pool: DicePool) -> Self {
        Self {
            label: label.into(),
            pool,
            burden_limited: false,
        }
    }

    /// A source that the burdened ceiling caps.
    pub fn limited(label: impl Into<String>, pool: DicePool) -> Self {
        Self {
            burden_limited: true,
            ..Self::new(label, pool)
        }
    }
}

/// A finished pool together with its composition label, e.g. `Speed + Dodge`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombinedPool {
    pub pool: DicePool,
    pub label: String,
}

/// Sum contributions in the order given, capping burden-limited ones.
///
/// The label lists every source in caller order; the pool itself does not
/// depend on the order.
pub fn combine_pools(sources: &[NamedContribution], ceiling: Option<DieType>) -> CombinedPool {
    let mut pool = DicePool::empty();
    let mut labels = Vec::with_capacity(sources.len());

    for source in sources {
        let dice = match ceiling {
            Some(die) if source.burden_limited => apply_ceiling(source.pool, die),
            _ => source.pool,
        };
        trace!("Adding {} ({}) to pool", source.label, dice);
        pool += dice;
        labels.push(source.label.as_str());
    }

    CombinedPool {
        pool,
        label: labels.join(" + "),
    }
}

/// Collects contributions for one roll, in order.
#[derive(Debug, Clone, Default)]
pub struct PoolBuilder {
    contributions: Vec<NamedContribution>,
    warnings: Vec<ParseWarning>,
}

impl PoolBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contribution after the ones already added.
    pub fn add(mut self, contribution: NamedContribution) -> Self {
        self.contributions.push(contribution);
        self
    }

    /// Append a stat, keeping its burden flag.
    pub fn add_source(self, source: &impl StatSource) -> Self {
        self.add(source.contribution())
    }

    /// Add free-text extra dice under the `extra` label.
    ///
    /// Bad terms are dropped and kept as warnings; nothing is added when the
    /// notation yields no dice.
    pub fn extra(mut self, notation: &str) -> Self {
        let parsed = DicePool::parse_notation(notation);
        self.warnings.extend(parsed.warnings);
        if !parsed.pool.is_empty() {
            self.contributions
                .push(NamedContribution::new(EXTRA_LABEL, parsed.pool));
        }
        self
    }

    /// Contributions in the order they were added.
    pub fn contributions(&self) -> &[NamedContribution] {
        &self.contributions
    }

    /// Terms dropped from extra dice.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Combine everything, capping burden-limited sources if the policy says so.
    pub fn build(&self, policy: &RollPolicy) -> CombinedPool {
        combine_pools(&self.contributions, policy.ceiling())
    }
}

//! Roll policy: the table settings that change how pools are built and read.
//!
//! Hosts either build a [`RollPolicy`] directly, hand over their settings as
//! JSON, or configure it through environment variables:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `IRONCLAW_BURDENED_LIMIT` | cap burden-limited stats | `true` |
//! | `IRONCLAW_BURDENED_CEILING` | die the cap folds into (`d8`, `10`, ...) | `d8` |
//! | `IRONCLAW_TARGET_NUMBER_MODE` | default rolls count successes | `true` |
//! | `IRONCLAW_DEFAULT_TN` | target number for default rolls | `3` |

use crate::dice::DieType;
use crate::roll::EvaluationMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_BURDENED_LIMIT: &str = "IRONCLAW_BURDENED_LIMIT";
pub const ENV_BURDENED_CEILING: &str = "IRONCLAW_BURDENED_CEILING";
pub const ENV_TARGET_NUMBER_MODE: &str = "IRONCLAW_TARGET_NUMBER_MODE";
pub const ENV_DEFAULT_TN: &str = "IRONCLAW_DEFAULT_TN";

/// Errors from loading a policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid policy JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for building and reading pools.
///
/// The default assumes a burdened character: burden-limited stats (Speed,
/// Dodge, Stealth and the rest) are capped at d8. Hosts rolling for an
/// unburdened character should pass `with_burdened_limit(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollPolicy {
    /// Cap burden-limited stats at `burdened_ceiling`.
    pub apply_burdened_limit: bool,
    /// Die that capped stats fold into.
    pub burdened_ceiling: DieType,
    /// Default rolls count successes against `default_target_number`
    /// instead of reading the highest die.
    pub prefer_target_number: bool,
    /// Target number for default rolls, at least 1.
    pub default_target_number: u32,
}

impl Default for RollPolicy {
    fn default() -> Self {
        Self {
            apply_burdened_limit: true,
            burdened_ceiling: DieType::D8,
            prefer_target_number: true,
            default_target_number: 3,
        }
    }
}

impl RollPolicy {
    /// Same as [`RollPolicy::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the burdened cap on or off.
    pub fn with_burdened_limit(mut self, enabled: bool) -> Self {
        self.apply_burdened_limit = enabled;
        self
    }

    /// Die the burdened cap folds into.
    pub fn with_burdened_ceiling(mut self, ceiling: DieType) -> Self {
        self.burdened_ceiling = ceiling;
        self
    }

    /// Whether default rolls count successes or read the highest die.
    pub fn with_target_number_mode(mut self, enabled: bool) -> Self {
        self.prefer_target_number = enabled;
        self
    }

    /// Target number used by default rolls.
    pub fn with_default_target_number(mut self, tn: u32) -> Self {
        self.default_target_number = tn;
        self
    }

    /// The ceiling to apply to burden-limited stats, if the limit is on.
    pub fn ceiling(&self) -> Option<DieType> {
        self.apply_burdened_limit.then_some(self.burdened_ceiling)
    }

    /// Evaluation mode for rolls that don't ask for one.
    pub fn default_mode(&self) -> EvaluationMode {
        if self.prefer_target_number {
            EvaluationMode::TargetNumber(self.default_target_number)
        } else {
            EvaluationMode::Highest
        }
    }

    /// Load from `IRONCLAW_*` environment variables, defaulting anything unset.
    pub fn from_env() -> Result<Self, PolicyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PolicyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::default();

        if let Some(value) = lookup(ENV_BURDENED_LIMIT) {
            policy.apply_burdened_limit = parse_flag(ENV_BURDENED_LIMIT, &value)?;
        }
        if let Some(value) = lookup(ENV_BURDENED_CEILING) {
            policy.burdened_ceiling = value.parse().map_err(|_| PolicyError::InvalidValue {
                key: ENV_BURDENED_CEILING,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_TARGET_NUMBER_MODE) {
            policy.prefer_target_number = parse_flag(ENV_TARGET_NUMBER_MODE, &value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_TN) {
            policy.default_target_number = value
                .trim()
                .parse()
                .ok()
                .filter(|&tn: &u32| tn >= 1)
                .ok_or_else(|| PolicyError::InvalidValue {
                    key: ENV_DEFAULT_TN,
                    value: value.clone(),
                })?;
        }

        Ok(policy)
    }

    /// Load from a JSON settings object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, PolicyError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PolicyError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

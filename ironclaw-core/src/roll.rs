//! Rolling a pool and reading the result.
//!
//! An evaluation goes through three steps:
//! 1. [`PreparedRoll::new`] checks the request and lays the pool out as
//!    individual dice. An empty pool stops here with nothing to roll.
//! 2. [`PreparedRoll::roll`] asks a [`DiceSource`] for one face per die.
//! 3. The faces are classified under the requested [`EvaluationMode`].
//!
//! Target-number rolls count every die at or above the TN. When nothing
//! succeeds, the dice showing the highest face are counted as ties; this is
//! what initiative uses to separate "close" from "nothing at all". A highest
//! face of 1 means every die came up 1, which is a botch.

use crate::dice::{DiceError, DicePool, DieType, MAX_POOL_DICE};
use crate::source::DiceSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// How a rolled pool is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// Count dice meeting or beating the target number.
    TargetNumber(u32),
    /// Only the single highest face matters.
    Highest,
}

/// One physical die and the face it landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieRoll {
    pub die: DieType,
    pub face: u32,
}

/// Outcome of a target-number roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetNumberOutcome {
    pub successes: u32,
    /// Dice showing the highest face; only counted when there are no successes.
    pub ties: u32,
    pub highest: u32,
    pub botch: bool,
}

impl TargetNumberOutcome {
    /// Count successes and ties for faces rolled against `tn`.
    pub fn from_faces(tn: u32, faces: &[u32]) -> Self {
        let successes = count_u32(faces.iter().filter(|&&face| face >= tn));
        let highest = faces.iter().copied().max().unwrap_or(0);
        let ties = if successes == 0 {
            count_u32(faces.iter().filter(|&&face| face == highest))
        } else {
            0
        };

        Self {
            successes,
            ties,
            highest,
            botch: highest == 1,
        }
    }

    /// Successes beat a botch, a botch beats ties, ties beat plain failure.
    pub fn classification(&self) -> Classification {
        if self.successes > 0 {
            Classification::Success(self.successes)
        } else if self.botch {
            Classification::Botch
        } else if self.ties > 0 {
            Classification::Tie(self.ties)
        } else {
            Classification::Failure
        }
    }
}

/// Outcome of a highest-die roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighestOutcome {
    pub highest: u32,
}

impl HighestOutcome {
    /// Highest face, 0 when there are none.
    pub fn from_faces(faces: &[u32]) -> Self {
        Self {
            highest: faces.iter().copied().max().unwrap_or(0),
        }
    }

    pub fn classification(&self) -> Classification {
        if self.highest == 1 {
            Classification::Botch
        } else {
            Classification::Normal(self.highest)
        }
    }
}

/// Raw numbers behind a classification, per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    TargetNumber(TargetNumberOutcome),
    Highest(HighestOutcome),
}

impl Outcome {
    /// Read `faces` under `mode`.
    pub fn evaluate(mode: EvaluationMode, faces: &[u32]) -> Self {
        match mode {
            EvaluationMode::TargetNumber(tn) => {
                Outcome::TargetNumber(TargetNumberOutcome::from_faces(tn, faces))
            }
            EvaluationMode::Highest => Outcome::Highest(HighestOutcome::from_faces(faces)),
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            Outcome::TargetNumber(outcome) => outcome.classification(),
            Outcome::Highest(outcome) => outcome.classification(),
        }
    }

    pub fn highest(&self) -> u32 {
        match self {
            Outcome::TargetNumber(outcome) => outcome.highest,
            Outcome::Highest(outcome) => outcome.highest,
        }
    }

    /// Every die showed 1, whatever the classification says.
    pub fn is_botch(&self) -> bool {
        match self {
            Outcome::TargetNumber(outcome) => outcome.botch,
            Outcome::Highest(outcome) => outcome.highest == 1,
        }
    }
}

/// Locale-neutral verdict for the chat layer to dress up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Success(u32),
    Tie(u32),
    Failure,
    Botch,
    Normal(u32),
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Success(n) => write!(f, "Success({n})"),
            Classification::Tie(n) => write!(f, "Tie({n})"),
            Classification::Failure => write!(f, "Failure"),
            Classification::Botch => write!(f, "Botch"),
            Classification::Normal(face) => write!(f, "Normal({face})"),
        }
    }
}

/// A validated, non-empty pool ready to be rolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRoll {
    pool: DicePool,
    mode: EvaluationMode,
    dice: Vec<DieType>,
}

impl PreparedRoll {
    /// `Ok(None)` when the pool has no dice: there is nothing to roll.
    ///
    /// Pools above [`MAX_POOL_DICE`] are rejected before any dice are laid out.
    pub fn new(pool: DicePool, mode: EvaluationMode) -> Result<Option<Self>, DiceError> {
        if let EvaluationMode::TargetNumber(0) = mode {
            return Err(DiceError::InvalidTargetNumber(0));
        }
        if pool.is_empty() {
            debug!("Nothing to roll for {:?}", mode);
            return Ok(None);
        }
        let total = pool.total_dice();
        if total > MAX_POOL_DICE {
            return Err(DiceError::PoolTooLarge {
                dice: total,
                max: MAX_POOL_DICE,
            });
        }

        let prepared = Self {
            pool,
            mode,
            dice: pool.dice().collect(),
        };
        debug!("Prepared {} for {:?}", prepared.notation(), mode);
        Ok(Some(prepared))
    }

    /// The pool being rolled.
    pub fn pool(&self) -> DicePool {
        self.pool
    }

    /// How the faces will be read.
    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// One entry per physical die, biggest first.
    pub fn dice(&self) -> &[DieType] {
        &self.dice
    }

    /// Side count of each die, the request sent to a [`DiceSource`].
    pub fn sides(&self) -> Vec<u32> {
        self.dice.iter().map(|die| die.sides()).collect()
    }

    /// One term per die, e.g. `1d12,1d12,1d8`.
    pub fn notation(&self) -> String {
        self.dice
            .iter()
            .map(|die| format!("1{die}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Roll every die through `source` and classify the faces.
    pub async fn roll<S>(self, source: &S) -> Result<RollResult, DiceError>
    where
        S: DiceSource + ?Sized,
    {
        let faces = source.roll_faces(&self.sides()).await;
        self.with_faces(&faces)
    }

    /// Classify faces rolled elsewhere, e.g. physical dice typed in by a player.
    pub fn with_faces(self, faces: &[u32]) -> Result<RollResult, DiceError> {
        if faces.len() != self.dice.len() {
            return Err(DiceError::FaceCountMismatch {
                dice: self.dice.len(),
                faces: faces.len(),
            });
        }

        let dice = self
            .dice
            .iter()
            .zip(faces)
            .map(|(&die, &face)| check_face(die, face))
            .collect::<Result<Vec<_>, _>>()?;

        let result = RollResult {
            pool: self.pool,
            mode: self.mode,
            outcome: Outcome::evaluate(self.mode, faces),
            dice,
        };
        debug!("Rolled {}", result);
        Ok(result)
    }
}

fn check_face(die: DieType, face: u32) -> Result<DieRoll, DiceError> {
    if face == 0 || face > die.sides() {
        return Err(DiceError::FaceOutOfRange {
            face,
            sides: die.sides(),
        });
    }
    Ok(DieRoll { die, face })
}

fn count_u32<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}

/// A rolled and classified pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub pool: DicePool,
    pub mode: EvaluationMode,
    /// One entry per physical die, biggest die first.
    pub dice: Vec<DieRoll>,
    pub outcome: Outcome,
}

impl RollResult {
    /// Rolled faces in die order.
    pub fn faces(&self) -> Vec<u32> {
        self.dice.iter().map(|roll| roll.face).collect()
    }

    pub fn classification(&self) -> Classification {
        self.outcome.classification()
    }

    pub fn highest(&self) -> u32 {
        self.outcome.highest()
    }

    /// True iff every die came up 1, even when a TN of 1 still counts successes.
    pub fn is_botch(&self) -> bool {
        self.outcome.is_botch()
    }

    /// Success count for target-number rolls.
    pub fn successes(&self) -> Option<u32> {
        match self.outcome {
            Outcome::TargetNumber(outcome) => Some(outcome.successes),
            Outcome::Highest(_) => None,
        }
    }

    /// Reroll the die at `index` and classify again under the same mode.
    pub async fn reroll_die<S>(&self, index: usize, source: &S) -> Result<RollResult, DiceError>
    where
        S: DiceSource + ?Sized,
    {
        let target = self.dice.get(index).ok_or(DiceError::DieIndexOutOfRange {
            index,
            len: self.dice.len(),
        })?;

        let rolled = source.roll_faces(&[target.die.sides()]).await;
        let face = match rolled.as_slice() {
            [face] => *face,
            _ => {
                return Err(DiceError::FaceCountMismatch {
                    dice: 1,
                    faces: rolled.len(),
                })
            }
        };

        let mut dice = self.dice.clone();
        dice[index] = check_face(target.die, face)?;
        let faces: Vec<u32> = dice.iter().map(|roll| roll.face).collect();

        let result = RollResult {
            pool: self.pool,
            mode: self.mode,
            outcome: Outcome::evaluate(self.mode, &faces),
            dice,
        };
        debug!("Rerolled die {} of {}: {}", index, self.pool, result);
        Ok(result)
    }

    /// Faces with their dice, e.g. `[d12: 12, d8: 3, d4: 1]`.
    pub fn dice_display(&self) -> String {
        let parts: Vec<String> = self
            .dice
            .iter()
            .map(|roll| format!("{}: {}", roll.die, roll.face))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            EvaluationMode::TargetNumber(tn) => write!(
                f,
                "{} vs TN {}: {} = {}",
                self.pool,
                tn,
                self.dice_display(),
                self.classification()
            ),
            EvaluationMode::Highest => write!(
                f,
                "{}: {} = {}",
                self.pool,
                self.dice_display(),
                self.classification()
            ),
        }
    }
}

/// Roll `pool` against target number `tn`. `Ok(None)` for an empty pool.
pub async fn evaluate_target_number<S>(
    tn: u32,
    pool: DicePool,
    source: &S,
) -> Result<Option<RollResult>, DiceError>
where
    S: DiceSource + ?Sized,
{
    evaluate(pool, EvaluationMode::TargetNumber(tn), source).await
}

/// Roll `pool` and keep the highest face. `Ok(None)` for an empty pool.
pub async fn evaluate_highest<S>(
    pool: DicePool,
    source: &S,
) -> Result<Option<RollResult>, DiceError>
where
    S: DiceSource + ?Sized,
{
    evaluate(pool, EvaluationMode::Highest, source).await
}

pub async fn evaluate<S>(
    pool: DicePool,
    mode: EvaluationMode,
    source: &S,
) -> Result<Option<RollResult>, DiceError>
where
    S: DiceSource + ?Sized,
{
    match PreparedRoll::new(pool, mode)? {
        Some(prepared) => prepared.roll(source).await.map(Some),
        None => Ok(None),
    }
}

//! Ironclaw dice notation and the five-slot dice pool.
//!
//! A pool counts how many of each die type a roll uses, ordered from the
//! biggest die to the smallest: d12, d10, d8, d6, d4. Notation is a comma
//! separated list of `XdY` terms, e.g. `2d12, 1d8`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Number of die types a pool tracks.
pub const POOL_SLOTS: usize = 5;

/// Largest number of physical dice a single roll may contain.
pub const MAX_POOL_DICE: u32 = 100;

/// Error type for dice parsing, pool construction and rolling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("Dice pool needs exactly {POOL_SLOTS} slots, got {0}")]
    WrongLength(usize),
    #[error("Negative die count {count} in slot {slot}")]
    NegativeCount { slot: usize, count: i64 },
    #[error("Invalid ceiling index: {0}")]
    InvalidCeiling(String),
    #[error("Target number must be at least 1, got {0}")]
    InvalidTargetNumber(u32),
    #[error("Dice source returned {faces} faces for {dice} dice")]
    FaceCountMismatch { dice: usize, faces: usize },
    #[error("Face {face} is not possible on a d{sides}")]
    FaceOutOfRange { face: u32, sides: u32 },
    #[error("No die at index {index} (roll has {len} dice)")]
    DieIndexOutOfRange { index: usize, len: usize },
    #[error("Unknown stat: {0}")]
    UnknownStat(String),
    #[error("Pool of {dice} dice exceeds the limit of {max}")]
    PoolTooLarge { dice: u32, max: u32 },
}

/// The die types used by Ironclaw, biggest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D12,
    D10,
    D8,
    D6,
    D4,
}

impl DieType {
    /// All die types in slot order.
    pub const ALL: [DieType; POOL_SLOTS] = [
        DieType::D12,
        DieType::D10,
        DieType::D8,
        DieType::D6,
        DieType::D4,
    ];

    /// Number of faces on this die.
    pub fn sides(self) -> u32 {
        match self {
            DieType::D12 => 12,
            DieType::D10 => 10,
            DieType::D8 => 8,
            DieType::D6 => 6,
            DieType::D4 => 4,
        }
    }

    /// Slot of this die type inside a [`DicePool`].
    pub fn index(self) -> usize {
        match self {
            DieType::D12 => 0,
            DieType::D10 => 1,
            DieType::D8 => 2,
            DieType::D6 => 3,
            DieType::D4 => 4,
        }
    }

    /// Die type for a pool slot, `None` past the d4 slot.
    pub fn from_index(index: usize) -> Option<DieType> {
        Self::ALL.get(index).copied()
    }

    /// Die type with the given number of faces, if Ironclaw uses one.
    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            12 => Some(DieType::D12),
            10 => Some(DieType::D10),
            8 => Some(DieType::D8),
            6 => Some(DieType::D6),
            4 => Some(DieType::D4),
            _ => None,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl FromStr for DieType {
    type Err = DiceError;

    /// Accepts `d8`, `D8` or a bare `8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix(|c: char| c.eq_ignore_ascii_case(&'d'))
            .unwrap_or(trimmed);
        let sides: u32 = digits
            .parse()
            .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
        DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))
    }
}

/// One successfully parsed notation term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTerm {
    Dice { count: u32, die: DieType },
    /// A side count of zero: the stat has no die at all.
    Absent,
}

/// Why a notation term was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Count or sides did not parse as a non-negative integer.
    Malformed,
    /// Parsed fine, but Ironclaw has no die with this many sides.
    UnsupportedSize(u32),
}

/// A dropped term from a notation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub term: String,
    pub kind: WarningKind,
}

impl ParseWarning {
    fn new(term: &str, kind: WarningKind) -> Self {
        Self {
            term: term.to_string(),
            kind,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::Malformed => write!(f, "malformed dice term '{}'", self.term),
            WarningKind::UnsupportedSize(sides) => {
                write!(f, "unsupported die size d{} in '{}'", sides, self.term)
            }
        }
    }
}

/// Parse a single `XdY` term.
///
/// The count defaults to 1 when the term starts with `d`. The split happens on
/// the first `d` or `D`; both halves must be non-negative integers.
pub fn parse_term(term: &str) -> Result<ParsedTerm, ParseWarning> {
    let trimmed = term.trim();
    let malformed = || ParseWarning::new(trimmed, WarningKind::Malformed);

    let d_pos = trimmed
        .find(|c: char| c.eq_ignore_ascii_case(&'d'))
        .ok_or_else(malformed)?;

    let count_str = trimmed[..d_pos].trim();
    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str.parse().map_err(|_| malformed())?
    };

    let sides: u32 = trimmed[d_pos + 1..]
        .trim()
        .parse()
        .map_err(|_| malformed())?;

    if sides == 0 {
        return Ok(ParsedTerm::Absent);
    }

    DieType::from_sides(sides)
        .map(|die| ParsedTerm::Dice { count, die })
        .ok_or_else(|| ParseWarning::new(trimmed, WarningKind::UnsupportedSize(sides)))
}

/// Result of lenient notation parsing: the pool plus every term that was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedNotation {
    pub pool: DicePool,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedNotation {
    /// True when no term had to be dropped.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Counts of d12, d10, d8, d6 and d4, in that order.
///
/// Ordering compares from the d12 slot downward: the first slot that differs
/// decides, more dice of the bigger type winning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct DicePool([u32; POOL_SLOTS]);

impl DicePool {
    /// Create a pool from counts in slot order.
    pub const fn new(counts: [u32; POOL_SLOTS]) -> Self {
        Self(counts)
    }

    /// A pool with no dice.
    pub const fn empty() -> Self {
        Self([0; POOL_SLOTS])
    }

    /// A pool holding one die of the given type.
    pub fn single(die: DieType) -> Self {
        Self::empty().with(die, 1)
    }

    /// Build a pool from an untrusted count array.
    pub fn from_counts(counts: &[i64]) -> Result<Self, DiceError> {
        if counts.len() != POOL_SLOTS {
            return Err(DiceError::WrongLength(counts.len()));
        }
        let mut pool = [0u32; POOL_SLOTS];
        for (slot, (&count, target)) in counts.iter().zip(pool.iter_mut()).enumerate() {
            *target = u32::try_from(count).map_err(|_| DiceError::NegativeCount { slot, count })?;
        }
        Ok(Self(pool))
    }

    /// Raw counts in slot order.
    pub fn counts(&self) -> [u32; POOL_SLOTS] {
        self.0
    }

    /// Number of dice of one type.
    pub fn count(&self, die: DieType) -> u32 {
        self.0[die.index()]
    }

    /// Copy of this pool with the count for `die` replaced.
    pub fn with(mut self, die: DieType, count: u32) -> Self {
        self.0[die.index()] = count;
        self
    }

    /// Add dice of one type, saturating at `u32::MAX`.
    pub fn add_dice(&mut self, die: DieType, count: u32) {
        let slot = &mut self.0[die.index()];
        *slot = slot.saturating_add(count);
    }

    /// True when every slot is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Number of physical dice, saturating at `u32::MAX`.
    pub fn total_dice(&self) -> u32 {
        self.0.iter().fold(0u32, |total, &count| total.saturating_add(count))
    }

    /// Occupied slots as `(die, count)`, biggest die first.
    pub fn iter(&self) -> impl Iterator<Item = (DieType, u32)> + '_ {
        DieType::ALL
            .iter()
            .zip(self.0.iter())
            .filter(|(_, &count)| count > 0)
            .map(|(&die, &count)| (die, count))
    }

    /// Every physical die in the pool, biggest first.
    pub fn dice(&self) -> impl Iterator<Item = DieType> + '_ {
        self.iter()
            .flat_map(|(die, count)| std::iter::repeat(die).take(count as usize))
    }

    /// Side count of every physical die, biggest first.
    pub fn sides_list(&self) -> Vec<u32> {
        self.dice().map(DieType::sides).collect()
    }

    /// Largest die present, as a side count. Zero for an empty pool.
    pub fn max_die_face(&self) -> u32 {
        self.iter().next().map(|(die, _)| die.sides()).unwrap_or(0)
    }

    /// Compare two pools by their biggest dice.
    pub fn compare(&self, other: &DicePool) -> Ordering {
        self.cmp(other)
    }

    /// Render as notation, e.g. `2d12,1d8` or `2d12, 1d8` when human readable.
    pub fn format(&self, human_readable: bool) -> String {
        let separator = if human_readable { ", " } else { "," };
        self.iter()
            .map(|(die, count)| format!("{count}{die}"))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Parse a comma separated notation list, dropping bad terms.
    ///
    /// Dropped terms are logged and returned as warnings. Blank terms
    /// (e.g. a trailing comma) are ignored without a warning.
    pub fn parse_notation(text: &str) -> ParsedNotation {
        let mut pool = DicePool::empty();
        let mut warnings = Vec::new();

        for term in text.split(',') {
            if term.trim().is_empty() {
                continue;
            }
            match parse_term(term) {
                Ok(ParsedTerm::Dice { count, die }) => pool.add_dice(die, count),
                Ok(ParsedTerm::Absent) => {}
                Err(warning) => {
                    warn!("Skipping dice term in '{}': {}", text, warning);
                    warnings.push(warning);
                }
            }
        }

        ParsedNotation { pool, warnings }
    }
}

impl FromStr for DicePool {
    type Err = DiceError;

    /// Strict parse: any dropped term is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DicePool::parse_notation(s);
        match parsed.warnings.first() {
            Some(warning) => Err(DiceError::InvalidNotation(warning.to_string())),
            None => Ok(parsed.pool),
        }
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(true))
    }
}

impl From<DieType> for DicePool {
    fn from(die: DieType) -> Self {
        DicePool::single(die)
    }
}

impl Add for DicePool {
    type Output = DicePool;

    fn add(mut self, rhs: DicePool) -> DicePool {
        self += rhs;
        self
    }
}

impl AddAssign for DicePool {
    fn add_assign(&mut self, rhs: DicePool) {
        for (slot, extra) in self.0.iter_mut().zip(rhs.0) {
            *slot = slot.saturating_add(extra);
        }
    }
}

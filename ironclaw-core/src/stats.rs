//! Typed stat sources: traits, skills, gifts and extra careers.
//!
//! The host hands over resolved stats by name; this module turns them into
//! [`NamedContribution`]s in the order the caller asks for.

use crate::dice::{DiceError, DicePool, DieType};
use crate::pool::NamedContribution;
use serde::{Deserialize, Serialize};

/// Stats capped by the burdened limit, in normalized form.
pub const BURDEN_LIMITED_STATS: [&str; 6] = [
    "speed",
    "climbing",
    "dodge",
    "endurance",
    "stealth",
    "swimming",
];

/// Lowercase a stat name and drop everything but letters and digits.
///
/// `"Dodge"`, `" dodge "` and `"DODGE!"` all become `"dodge"`.
pub fn normalize_stat_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether the burdened limit caps a stat with this name.
pub fn is_burden_limited(name: &str) -> bool {
    let normalized = normalize_stat_name(name);
    BURDEN_LIMITED_STATS.contains(&normalized.as_str())
}

/// Anything that can feed dice into a roll.
pub trait StatSource {
    fn name(&self) -> &str;

    fn dice(&self) -> DicePool;

    fn burden_limited(&self) -> bool {
        is_burden_limited(self.name())
    }

    fn contribution(&self) -> NamedContribution {
        NamedContribution {
            label: self.name().to_string(),
            pool: self.dice(),
            burden_limited: self.burden_limited(),
        }
    }
}

impl StatSource for NamedContribution {
    fn name(&self) -> &str {
        &self.label
    }

    fn dice(&self) -> DicePool {
        self.pool
    }

    fn burden_limited(&self) -> bool {
        self.burden_limited
    }
}

/// Where a stat comes from on the character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Trait,
    Skill,
    Gift,
    ExtraCareer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub kind: StatKind,
    pub name: String,
    pub dice: DicePool,
}

impl Stat {
    pub fn new(kind: StatKind, name: impl Into<String>, dice: DicePool) -> Self {
        Self {
            kind,
            name: name.into(),
            dice,
        }
    }

    /// A trait, which is always a single die.
    pub fn trait_die(name: impl Into<String>, die: DieType) -> Self {
        Self::new(StatKind::Trait, name, die.into())
    }

    /// A skill from its notation, e.g. `"1d8, 1d4"`. A `d0` skill has no dice.
    pub fn skill(name: impl Into<String>, notation: &str) -> Result<Self, DiceError> {
        Ok(Self::new(StatKind::Skill, name, notation.parse()?))
    }

    /// Bonus dice from a gift.
    pub fn gift(name: impl Into<String>, bonus: DicePool) -> Self {
        Self::new(StatKind::Gift, name, bonus)
    }

    /// The die from an extra career.
    pub fn extra_career(name: impl Into<String>, die: DieType) -> Self {
        Self::new(StatKind::ExtraCareer, name, die.into())
    }
}

impl StatSource for Stat {
    fn name(&self) -> &str {
        &self.name
    }

    fn dice(&self) -> DicePool {
        self.dice
    }

    /// Only traits and skills are capped; gifts and careers never are.
    fn burden_limited(&self) -> bool {
        matches!(self.kind, StatKind::Trait | StatKind::Skill) && is_burden_limited(&self.name)
    }
}

/// A character's stats in sheet declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    stats: Vec<Stat>,
}

impl CharacterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CharacterStats::push`].
    pub fn with(mut self, stat: Stat) -> Self {
        self.push(stat);
        self
    }

    pub fn push(&mut self, stat: Stat) {
        self.stats.push(stat);
    }

    /// Look a stat up by name, ignoring case, spaces and punctuation.
    pub fn get(&self, name: &str) -> Option<&Stat> {
        let wanted = normalize_stat_name(name);
        self.stats
            .iter()
            .find(|stat| normalize_stat_name(&stat.name) == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stat> {
        self.stats.iter()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Contributions for the named stats, in the order the names are given.
    pub fn contributions(&self, names: &[&str]) -> Result<Vec<NamedContribution>, DiceError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .map(|stat| stat.contribution())
                    .ok_or_else(|| DiceError::UnknownStat((*name).to_string()))
            })
            .collect()
    }
}

impl FromIterator<Stat> for CharacterStats {
    fn from_iter<I: IntoIterator<Item = Stat>>(iter: I) -> Self {
        Self {
            stats: iter.into_iter().collect(),
        }
    }
}

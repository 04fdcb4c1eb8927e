//! Range and role scoring: weighted formulas, classification, head-to-head.
//!
//! Every label owns an immutable weight table. A stat whose raw value is
//! exactly zero is treated as "not reported by this game" and dropped from
//! the sum (calibration never moves a stat in or out of that set);
//! the remaining weights are rescaled so the label's total weight is kept.
//! That makes a missing stat neutral instead of a penalty, at the price of
//! a genuine zero being neutral too.

use crate::config::RECOMMEND_THRESHOLD;
use crate::model::{BaseWeaponStats, FinalWeaponStats, ParseEnumError, StatKind, WeaponClass};
use crate::util::{normalize_key, round_to};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub type WeightTable = &'static [(StatKind, f64)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CombatRange {
    Close,
    Mid,
    Long,
}

impl CombatRange {
    pub const ALL: [CombatRange; 3] = [CombatRange::Close, CombatRange::Mid, CombatRange::Long];

    pub fn label(self) -> &'static str {
        match self {
            CombatRange::Close => "Close Range",
            CombatRange::Mid => "Mid Range",
            CombatRange::Long => "Long Range",
        }
    }

    /// Engagement distance band.
    pub fn distance(self) -> &'static str {
        match self {
            CombatRange::Close => "0-20m",
            CombatRange::Mid => "21-50m",
            CombatRange::Long => "51m+",
        }
    }
}

impl fmt::Display for CombatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CombatRange {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "close" | "close-range" | "short" | "short-range" => Ok(CombatRange::Close),
            "mid" | "mid-range" | "medium" => Ok(CombatRange::Mid),
            "long" | "long-range" => Ok(CombatRange::Long),
            _ => Err(ParseEnumError {
                kind: "combat range",
                value: s.to_string(),
            }),
        }
    }
}

/// Which family of labels a record is classified against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringContext {
    #[default]
    CombatRange,
    WeaponRole,
}

impl ScoringContext {
    pub fn labels(self) -> Vec<ScoreLabel> {
        match self {
            ScoringContext::CombatRange => RANGE_WEIGHTS.iter().map(|(r, _)| ScoreLabel::Range(*r)).collect(),
            ScoringContext::WeaponRole => ROLE_WEIGHTS.iter().map(|(c, _)| ScoreLabel::Role(*c)).collect(),
        }
    }
}

impl FromStr for ScoringContext {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "range" | "combat-range" => Ok(ScoringContext::CombatRange),
            "role" | "weapon-role" | "class" => Ok(ScoringContext::WeaponRole),
            _ => Err(ParseEnumError {
                kind: "scoring context",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreLabel {
    Range(CombatRange),
    Role(WeaponClass),
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreLabel::Range(r) => f.write_str(r.label()),
            ScoreLabel::Role(c) => f.write_str(c.label()),
        }
    }
}

impl Serialize for ScoreLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const RANGE_WEIGHTS: [(CombatRange, WeightTable); 3] = [
    (
        CombatRange::Close,
        &[
            (StatKind::Damage, 0.20),
            (StatKind::FireRate, 0.20),
            (StatKind::Handling, 0.25),
            (StatKind::Control, 0.15),
            (StatKind::Stability, 0.10),
            (StatKind::Accuracy, 0.05),
            (StatKind::Range, 0.03),
            (StatKind::MuzzleVelocity, 0.02),
        ],
    ),
    (
        CombatRange::Mid,
        &[
            (StatKind::Accuracy, 0.20),
            (StatKind::Damage, 0.18),
            (StatKind::Control, 0.15),
            (StatKind::Stability, 0.15),
            (StatKind::Handling, 0.13),
            (StatKind::Range, 0.12),
            (StatKind::FireRate, 0.05),
            (StatKind::MuzzleVelocity, 0.02),
        ],
    ),
    (
        CombatRange::Long,
        &[
            (StatKind::Accuracy, 0.25),
            (StatKind::Stability, 0.20),
            (StatKind::Control, 0.15),
            (StatKind::Damage, 0.15),
            (StatKind::Range, 0.10),
            (StatKind::MuzzleVelocity, 0.08),
            (StatKind::Handling, 0.05),
        ],
    ),
];

/// How closely a record plays like each archetype.
pub const ROLE_WEIGHTS: [(WeaponClass, WeightTable); 7] = [
    (
        WeaponClass::AssaultRifle,
        &[
            (StatKind::Damage, 0.20),
            (StatKind::FireRate, 0.15),
            (StatKind::Accuracy, 0.15),
            (StatKind::Control, 0.15),
            (StatKind::Stability, 0.10),
            (StatKind::Range, 0.10),
            (StatKind::Handling, 0.10),
            (StatKind::MuzzleVelocity, 0.05),
        ],
    ),
    (
        WeaponClass::Smg,
        &[
            (StatKind::FireRate, 0.25),
            (StatKind::Handling, 0.25),
            (StatKind::Damage, 0.15),
            (StatKind::Control, 0.10),
            (StatKind::Accuracy, 0.10),
            (StatKind::Stability, 0.05),
            (StatKind::Range, 0.05),
            (StatKind::MuzzleVelocity, 0.05),
        ],
    ),
    (
        WeaponClass::Shotgun,
        &[
            (StatKind::Damage, 0.40),
            (StatKind::Handling, 0.20),
            (StatKind::FireRate, 0.10),
            (StatKind::Accuracy, 0.10),
            (StatKind::Control, 0.10),
            (StatKind::Stability, 0.05),
            (StatKind::Range, 0.05),
        ],
    ),
    (
        WeaponClass::Sniper,
        &[
            (StatKind::Damage, 0.30),
            (StatKind::Accuracy, 0.20),
            (StatKind::Range, 0.15),
            (StatKind::MuzzleVelocity, 0.15),
            (StatKind::Stability, 0.15),
            (StatKind::Handling, 0.05),
        ],
    ),
    (
        WeaponClass::MarksmanRifle,
        &[
            (StatKind::Damage, 0.25),
            (StatKind::Accuracy, 0.20),
            (StatKind::Range, 0.15),
            (StatKind::Stability, 0.15),
            (StatKind::Control, 0.10),
            (StatKind::MuzzleVelocity, 0.10),
            (StatKind::FireRate, 0.05),
        ],
    ),
    (
        WeaponClass::Pistol,
        &[
            (StatKind::Handling, 0.35),
            (StatKind::Accuracy, 0.15),
            (StatKind::Damage, 0.15),
            (StatKind::FireRate, 0.15),
            (StatKind::Control, 0.10),
            (StatKind::Stability, 0.05),
            (StatKind::Range, 0.05),
        ],
    ),
    (
        WeaponClass::Lmg,
        &[
            (StatKind::FireRate, 0.20),
            (StatKind::Control, 0.20),
            (StatKind::Stability, 0.20),
            (StatKind::Damage, 0.15),
            (StatKind::Range, 0.10),
            (StatKind::Accuracy, 0.10),
            (StatKind::MuzzleVelocity, 0.05),
        ],
    ),
];

pub fn weights(label: ScoreLabel) -> WeightTable {
    match label {
        ScoreLabel::Range(range) => RANGE_WEIGHTS
            .iter()
            .find(|(r, _)| *r == range)
            .map(|(_, t)| *t)
            .unwrap_or(&[]),
        ScoreLabel::Role(class) => ROLE_WEIGHTS
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, t)| *t)
            .unwrap_or(&[]),
    }
}

/// Weights after dropping undetected stats, plus the dropped stats.
/// Included weights still sum to the table total unless nothing is included.
pub fn rescale_weights(
    table: WeightTable,
    undetected: &[StatKind],
) -> (Vec<(StatKind, f64)>, Vec<StatKind>) {
    let total: f64 = table.iter().map(|(_, w)| w).sum();
    let (included, excluded): (Vec<_>, Vec<_>) =
        table.iter().partition(|(kind, _)| !undetected.contains(kind));
    let included_sum: f64 = included.iter().map(|(_, w)| w).sum();
    let excluded: Vec<StatKind> = excluded.iter().map(|(k, _)| *k).collect();
    if included_sum <= 0.0 {
        return (Vec::new(), excluded);
    }
    let rescaled = included
        .iter()
        .map(|(kind, w)| (*kind, w / included_sum * total))
        .collect();
    (rescaled, excluded)
}

/// Per-stat contributions to one label's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub label: ScoreLabel,
    pub score: f64,
    pub contributions: BTreeMap<StatKind, f64>,
    /// Stats left out because they were zero (not detected).
    pub excluded: Vec<StatKind>,
}

/// Score a raw record, where a zero stat means not detected.
pub fn score_label(stats: &BaseWeaponStats, label: ScoreLabel) -> ScoreBreakdown {
    score_stats(stats, &stats.undetected_stats(), label)
}

/// Score calibrated stats. Exclusion follows the pre-calibration record.
pub fn score_final(stats: &FinalWeaponStats, label: ScoreLabel) -> ScoreBreakdown {
    score_stats(&stats.stats, &stats.undetected, label)
}

fn score_stats(stats: &BaseWeaponStats, undetected: &[StatKind], label: ScoreLabel) -> ScoreBreakdown {
    let (rescaled, excluded) = rescale_weights(weights(label), undetected);
    if !excluded.is_empty() {
        debug!("{} / {}: excluding undetected {:?}", stats.name, label, excluded);
    }
    let mut contributions = BTreeMap::new();
    let mut sum = 0.0;
    for (kind, weight) in rescaled {
        let part = stats.normalized_stat(kind) * weight;
        sum += part;
        contributions.insert(kind, round_to(part, 2));
    }
    ScoreBreakdown {
        label,
        score: round_to(sum, 2),
        contributions,
        excluded,
    }
}

/// Whether the recommendation cleared the threshold or is only the best of weak options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fit {
    Recommended,
    MostSuited,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub breakdowns: Vec<ScoreBreakdown>,
    pub recommended: Vec<ScoreLabel>,
    pub fit: Fit,
}

impl Classification {
    pub fn scores(&self) -> BTreeMap<ScoreLabel, f64> {
        self.breakdowns.iter().map(|b| (b.label, b.score)).collect()
    }

    pub fn score(&self, label: ScoreLabel) -> Option<f64> {
        self.breakdowns.iter().find(|b| b.label == label).map(|b| b.score)
    }

    /// "Recommended: Mid Range, Long Range" or "Most suited: Close Range".
    pub fn headline(&self) -> String {
        let labels = self
            .recommended
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match self.fit {
            Fit::Recommended => format!("Recommended: {}", labels),
            Fit::MostSuited => format!("Most suited: {}", labels),
        }
    }
}

/// Score every label of the context. Labels at or above the threshold are
/// recommended; if none qualifies, the single best label is returned as
/// "most suited" (first in table order on equal scores).
pub fn classify(stats: &FinalWeaponStats, context: ScoringContext) -> Classification {
    let breakdowns: Vec<ScoreBreakdown> = context
        .labels()
        .into_iter()
        .map(|label| score_final(stats, label))
        .collect();
    let recommended: Vec<ScoreLabel> = breakdowns
        .iter()
        .filter(|b| b.score >= RECOMMEND_THRESHOLD)
        .map(|b| b.label)
        .collect();
    if !recommended.is_empty() {
        return Classification {
            breakdowns,
            recommended,
            fit: Fit::Recommended,
        };
    }
    let mut best: Option<&ScoreBreakdown> = None;
    for b in &breakdowns {
        if best.map_or(true, |current| b.score > current.score) {
            best = Some(b);
        }
    }
    let recommended = best.map(|b| vec![b.label]).unwrap_or_default();
    Classification {
        breakdowns,
        recommended,
        fit: Fit::MostSuited,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub label: ScoreLabel,
    pub first: f64,
    pub second: f64,
    /// `None` on equal scores; a tie never picks a side.
    pub winner: Option<Side>,
}

pub fn head_to_head(a: &FinalWeaponStats, b: &FinalWeaponStats, label: ScoreLabel) -> HeadToHead {
    let first = score_final(a, label).score;
    let second = score_final(b, label).score;
    let winner = if first > second {
        Some(Side::First)
    } else if second > first {
        Some(Side::Second)
    } else {
        None
    };
    HeadToHead {
        label,
        first,
        second,
        winner,
    }
}

pub fn compare(a: &FinalWeaponStats, b: &FinalWeaponStats, context: ScoringContext) -> Vec<HeadToHead> {
    context
        .labels()
        .into_iter()
        .map(|label| head_to_head(a, b, label))
        .collect()
}

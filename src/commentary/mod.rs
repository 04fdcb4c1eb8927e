//! Text-generation collaborator boundary and the built-in rule-based summary.
//!
//! A commentator receives a read-only snapshot of the final stats and their
//! classification and returns opaque text. Nothing it returns is parsed back.

use crate::model::{FinalWeaponStats, StatKind};
use crate::scoring::Classification;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Points kept in a summary.
pub const MAX_SUMMARY_POINTS: usize = 7;

#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("commentary backend failed: {0}")]
    Backend(String),
}

/// Everything that crosses the boundary to a text generator.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub stats: FinalWeaponStats,
    pub classification: Classification,
}

#[async_trait]
pub trait Commentator: Send + Sync {
    async fn commentate(&self, snapshot: &AnalysisSnapshot) -> Result<String, CommentaryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointKind {
    Strength,
    SecondaryStrength,
    Weakness,
}

impl PointKind {
    fn bullet(self) -> char {
        match self {
            PointKind::Strength => '+',
            PointKind::SecondaryStrength => '~',
            PointKind::Weakness => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPoint {
    pub point: String,
    pub kind: PointKind,
}

fn describe(kind: StatKind) -> &'static str {
    match kind {
        StatKind::Damage => "damage per shot",
        StatKind::FireRate => "bullets fired per minute",
        StatKind::Range => "effective range",
        StatKind::Accuracy => "shot grouping precision",
        StatKind::Control => "recoil control",
        StatKind::Handling => "movement and aim speed while equipped",
        StatKind::Stability => "aim stability",
        StatKind::MuzzleVelocity => "bullet travel speed",
    }
}

/// One point per detected stat: >= 75 strength, >= 50 secondary, else
/// weakness, judged on the calibrated 0-100 scale. Stats that were zero
/// before calibration are skipped.
pub fn summary_points(fin: &FinalWeaponStats) -> Vec<SummaryPoint> {
    StatKind::ALL
        .iter()
        .filter(|k| !fin.undetected.contains(*k))
        .map(|k| {
            let value = fin.stats.normalized_stat(*k);
            let what = describe(*k);
            if value >= 75.0 {
                SummaryPoint {
                    point: format!("High {} - great for its class.", what),
                    kind: PointKind::Strength,
                }
            } else if value >= 50.0 {
                SummaryPoint {
                    point: format!("Moderate {} - usable in most scenarios.", what),
                    kind: PointKind::SecondaryStrength,
                }
            } else {
                SummaryPoint {
                    point: format!("Low {} - may struggle where this is critical.", what),
                    kind: PointKind::Weakness,
                }
            }
        })
        .take(MAX_SUMMARY_POINTS)
        .collect()
}

/// Offline commentator built from fixed thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedCommentator;

impl RuleBasedCommentator {
    pub fn render(&self, snapshot: &AnalysisSnapshot) -> String {
        let stats = &snapshot.stats.stats;
        let mut lines = vec![format!(
            "{}: {}.",
            stats.name,
            snapshot.classification.headline()
        )];
        let ttk = stats.derived();
        if ttk.shots_to_kill > 0 {
            lines.push(format!(
                "TTK {} ms ({} shots at {} rpm).",
                ttk.ttk, ttk.shots_to_kill, ttk.effective_rate_used
            ));
        }
        for p in summary_points(&snapshot.stats) {
            lines.push(format!("{} {}", p.kind.bullet(), p.point));
        }
        lines.join("\n")
    }
}

#[async_trait]
impl Commentator for RuleBasedCommentator {
    async fn commentate(&self, snapshot: &AnalysisSnapshot) -> Result<String, CommentaryError> {
        Ok(self.render(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{apply_calibration, BaseWeaponStats, CalibrationStats};
    use crate::scoring::{classify, ScoringContext};

    fn finalize(stats: BaseWeaponStats) -> FinalWeaponStats {
        apply_calibration(&stats, &CalibrationStats::default())
    }

    fn stats() -> BaseWeaponStats {
        BaseWeaponStats::default()
            .with_name("Kilo")
            .with_stat(StatKind::Damage, 80.0)
            .with_stat(StatKind::FireRate, 720.0)
            .with_stat(StatKind::Accuracy, 30.0)
            .with_stat(StatKind::Control, 55.0)
    }

    #[test]
    fn points_by_threshold_and_skip_zero() {
        let points = summary_points(&finalize(stats()));
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].kind, PointKind::Strength);
        // 720 rpm -> 60 on the 0-100 scale.
        assert_eq!(points[1].kind, PointKind::SecondaryStrength);
        assert!(points.iter().any(|p| p.kind == PointKind::Weakness && p.point.contains("grouping")));
        assert!(!points.iter().any(|p| p.point.contains("bullet travel")));
    }

    #[test]
    fn at_most_seven_points() {
        let mut s = BaseWeaponStats::default();
        for kind in StatKind::ALL {
            s.set_stat(kind, 60.0);
        }
        assert_eq!(summary_points(&finalize(s)).len(), MAX_SUMMARY_POINTS);
    }

    #[test]
    fn stat_calibrated_to_zero_is_a_weakness() {
        let cal = CalibrationStats {
            hip_fire_aim_speed: -100.0,
            ..Default::default()
        };
        let points = summary_points(&apply_calibration(&stats(), &cal));
        assert_eq!(points.len(), 4);
        assert!(points.iter().any(|p| p.kind == PointKind::Weakness && p.point.contains("grouping")));
    }

    #[tokio::test]
    async fn rule_based_commentary_mentions_headline_and_ttk() {
        let fin = finalize(stats());
        let classification = classify(&fin, ScoringContext::CombatRange);
        let snapshot = AnalysisSnapshot {
            stats: fin,
            classification,
        };
        let text = RuleBasedCommentator.commentate(&snapshot).await.unwrap();
        assert!(text.starts_with("Kilo: "));
        assert!(text.contains("TTK 83 ms (2 shots at 720 rpm)."));
        assert!(text.lines().any(|l| l.starts_with("+ High damage")));
    }
}

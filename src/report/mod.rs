//! Analysis and comparison reports: assembly, JSON output, text rendering.

use crate::anomaly::{self, Anomaly};
use crate::commentary::{summary_points, AnalysisSnapshot, SummaryPoint};
use crate::model::{apply_calibration, BaseWeaponStats, CalibrationStats, FinalWeaponStats, StatKind};
use crate::scoring::{classify, compare, Classification, HeadToHead, ScoringContext, Side};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Everything the presentation layer needs for one weapon.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub stats: FinalWeaponStats,
    pub calibration: CalibrationStats,
    pub classification: Classification,
    pub summary: Vec<SummaryPoint>,
    pub anomalies: Vec<Anomaly>,
}

impl AnalysisReport {
    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot {
            stats: self.stats.clone(),
            classification: self.classification.clone(),
        }
    }
}

pub fn build_analysis(
    base: &BaseWeaponStats,
    calibration: &CalibrationStats,
    context: ScoringContext,
) -> AnalysisReport {
    let stats = apply_calibration(base, calibration);
    let classification = classify(&stats, context);
    let summary = summary_points(&stats);
    let mut anomalies = anomaly::ttk_input_anomalies(&stats.stats);
    anomalies.extend(anomaly::calibration_anomalies(&stats));
    AnalysisReport {
        stats,
        calibration: *calibration,
        classification,
        summary,
        anomalies,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub first: FinalWeaponStats,
    pub second: FinalWeaponStats,
    pub results: Vec<HeadToHead>,
}

pub fn build_comparison(
    first: (&BaseWeaponStats, &CalibrationStats),
    second: (&BaseWeaponStats, &CalibrationStats),
    context: ScoringContext,
) -> ComparisonReport {
    let a = apply_calibration(first.0, first.1);
    let b = apply_calibration(second.0, second.1);
    let results = compare(&a, &b, context);
    ComparisonReport {
        first: a,
        second: b,
        results,
    }
}

pub fn write_json_report<T: Serialize>(value: &T, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn render_stats(stats: &BaseWeaponStats, undetected: &[StatKind]) -> String {
    let mut out = String::new();
    let class = stats
        .weapon_class()
        .map(|c| c.label())
        .unwrap_or("unknown class");
    let _ = writeln!(out, "Weapon: {} ({})", stats.name, class);
    for kind in StatKind::ALL {
        let value = stats.stat(kind);
        if undetected.contains(&kind) {
            let _ = writeln!(out, "  {:<16} —  (not detected)", kind.label());
        } else {
            let _ = writeln!(out, "  {:<16} {}", kind.label(), value);
        }
    }
    let ttk = stats.derived();
    let _ = writeln!(
        out,
        "TTK: {} ms  shots={}  between_shots={}s  rate_used={} ({})",
        ttk.ttk,
        ttk.shots_to_kill,
        ttk.time_between_shots,
        ttk.effective_rate_used,
        stats.fire_rate_input()
    );
    out
}

pub fn render_anomalies(anomalies: &[Anomaly]) -> String {
    let mut out = String::from("Anomalies:\n");
    if anomalies.is_empty() {
        out.push_str("  None\n");
    }
    for a in anomalies {
        let _ = writeln!(out, "  [{}] {} — {}", a.code, a.severity.tag(), a.summary);
    }
    out
}

pub fn render_analysis(report: &AnalysisReport) -> String {
    let mut out = render_stats(&report.stats.stats, &report.stats.undetected);
    let _ = writeln!(out, "Final score: {:.2}", report.stats.final_score);
    let _ = writeln!(out, "\nScores:");
    for b in &report.classification.breakdowns {
        let _ = write!(out, "  {:<16} {:>6.2}", b.label.to_string(), b.score);
        if !b.excluded.is_empty() {
            let names: Vec<_> = b.excluded.iter().map(|k| k.label()).collect();
            let _ = write!(out, "  (excluded: {})", names.join(", "));
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{}\n", report.classification.headline());
    out.push_str(&render_anomalies(&report.anomalies));
    out
}

pub fn render_comparison(report: &ComparisonReport) -> String {
    let (a, b) = (&report.first.stats.name, &report.second.stats.name);
    let mut out = format!("Compare: {} vs {}\n", a, b);
    for r in &report.results {
        let verdict = match r.winner {
            Some(Side::First) => a.as_str(),
            Some(Side::Second) => b.as_str(),
            None => "tie",
        };
        let _ = writeln!(
            out,
            "  {:<16} {:>6.2} vs {:>6.2}  -> {}",
            r.label.to_string(),
            r.first,
            r.second,
            verdict
        );
    }
    out
}

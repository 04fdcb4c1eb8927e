//! Diagnostics attached to records: severity, explanation, technical note.
//!
//! Anomalies never change a value; they tell the caller how far to trust it.
//! A zero stat is ambiguous between "not on this game's screen" and "really
//! zero", and an all-zero extraction looks like a valid record, so both are
//! flagged here rather than guessed at.

use crate::config::MAX_REAL_RATE;
use crate::model::{BaseWeaponStats, FinalWeaponStats, FireRateInput, HandlingSource, StatKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Info,
    Warn,
    Crit,
}

impl AnomalySeverity {
    pub fn tag(self) -> &'static str {
        match self {
            AnomalySeverity::Info => "INFO",
            AnomalySeverity::Warn => "WARN",
            AnomalySeverity::Crit => "CRIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub code: String,
    pub severity: AnomalySeverity,
    /// Short explanation for users.
    pub summary: String,
    /// Technical note for devs.
    pub technical: String,
    pub stat: Option<StatKind>,
    pub weapon: String,
}

impl Anomaly {
    pub fn undetected_stat(weapon: &str, stat: StatKind) -> Self {
        Self {
            code: "UNDETECTED_STAT".to_string(),
            severity: AnomalySeverity::Info,
            summary: format!(
                "{}: {} was not found in the recognized text; it is excluded from range scoring.",
                weapon, stat
            ),
            technical: format!("label {:?} had no integer after it; value defaulted to 0", stat.label()),
            stat: Some(stat),
            weapon: weapon.to_string(),
        }
    }

    pub fn no_stats_detected(weapon: &str) -> Self {
        Self {
            code: "NO_STATS_DETECTED".to_string(),
            severity: AnomalySeverity::Crit,
            summary: format!(
                "{}: no stats could be read from the image. Enter them manually.",
                weapon
            ),
            technical: "every stat label was missing; the record is all zero and not a verified weapon"
                .to_string(),
            stat: None,
            weapon: weapon.to_string(),
        }
    }

    pub fn handling_from_mobility(weapon: &str, mobility: f64) -> Self {
        Self {
            code: "HANDLING_FROM_MOBILITY".to_string(),
            severity: AnomalySeverity::Info,
            summary: format!("{}: handling taken from the mobility stat ({}).", weapon, mobility),
            technical: "no positive Handling value; Mobility copied into handling".to_string(),
            stat: Some(StatKind::Handling),
            weapon: weapon.to_string(),
        }
    }

    pub fn fire_rate_clamped(weapon: &str, rate: f64) -> Self {
        Self {
            code: "FIRE_RATE_CLAMPED".to_string(),
            severity: AnomalySeverity::Warn,
            summary: format!(
                "{}: fire rate {} rpm exceeds {} rpm and was capped for TTK.",
                weapon, rate, MAX_REAL_RATE
            ),
            technical: format!("real-rate input clamped to {}", MAX_REAL_RATE),
            stat: Some(StatKind::FireRate),
            weapon: weapon.to_string(),
        }
    }

    pub fn stat_bar_out_of_range(weapon: &str, value: f64) -> Self {
        Self {
            code: "STAT_BAR_OUT_OF_RANGE".to_string(),
            severity: AnomalySeverity::Warn,
            summary: format!(
                "{}: fire rate {} is above 100 but is read as a stat-bar value. Was it a real rpm?",
                weapon, value
            ),
            technical: "normalized fire-rate input above 100 scales past the class ceiling".to_string(),
            stat: Some(StatKind::FireRate),
            weapon: weapon.to_string(),
        }
    }

    pub fn negative_final_stat(weapon: &str, stat: StatKind, value: f64) -> Self {
        Self {
            code: "NEGATIVE_FINAL_STAT".to_string(),
            severity: AnomalySeverity::Warn,
            summary: format!("{}: calibration drives {} below zero ({:.1}).", weapon, stat, value),
            technical: format!("calibrated {} = {}; engine does not clamp", stat.label(), value),
            stat: Some(stat),
            weapon: weapon.to_string(),
        }
    }
}

/// Diagnostics for a freshly extracted record.
pub fn extraction_anomalies(
    stats: &BaseWeaponStats,
    undetected: &[StatKind],
    handling_source: HandlingSource,
    mobility: f64,
) -> Vec<Anomaly> {
    let mut out = Vec::new();
    if stats.is_blank() {
        out.push(Anomaly::no_stats_detected(&stats.name));
        return out;
    }
    for stat in undetected {
        out.push(Anomaly::undetected_stat(&stats.name, *stat));
    }
    if handling_source == HandlingSource::Mobility {
        out.push(Anomaly::handling_from_mobility(&stats.name, mobility));
    }
    out.extend(ttk_input_anomalies(stats));
    out
}

/// Inputs the TTK calculator had to clamp or that look mis-tagged.
pub fn ttk_input_anomalies(stats: &BaseWeaponStats) -> Vec<Anomaly> {
    let rate = stats.fire_rate();
    match stats.fire_rate_input() {
        FireRateInput::Rate if rate > MAX_REAL_RATE => {
            vec![Anomaly::fire_rate_clamped(&stats.name, rate)]
        }
        FireRateInput::Normalized if rate > 100.0 => {
            vec![Anomaly::stat_bar_out_of_range(&stats.name, rate)]
        }
        _ => Vec::new(),
    }
}

/// Calibrated stats that went negative.
pub fn calibration_anomalies(fin: &FinalWeaponStats) -> Vec<Anomaly> {
    [
        StatKind::Control,
        StatKind::Accuracy,
        StatKind::Handling,
        StatKind::Stability,
    ]
    .iter()
    .filter_map(|kind| {
        let value = fin.stats.stat(*kind);
        (value < 0.0).then(|| Anomaly::negative_final_stat(&fin.stats.name, *kind, value))
    })
    .collect()
}

//! Calibration: percentage modifiers applied to base stats, plus the final score.

use super::{BaseWeaponStats, CalibrationStats, FinalWeaponStats, StatKind};
use crate::util::round_to;

/// Weights of the final score. Fire rate and muzzle velocity enter normalized.
pub const FINAL_SCORE_WEIGHTS: [(StatKind, f64); 8] = [
    (StatKind::Damage, 0.25),
    (StatKind::Accuracy, 0.15),
    (StatKind::Control, 0.20),
    (StatKind::Handling, 0.10),
    (StatKind::Stability, 0.10),
    (StatKind::FireRate, 0.10),
    (StatKind::Range, 0.05),
    (StatKind::MuzzleVelocity, 0.05),
];

fn factor(percent: f64) -> f64 {
    1.0 + percent / 100.0
}

/// Apply calibration multiplicatively. Results are not clamped: a large
/// negative modifier can push a stat below zero.
pub fn apply_calibration(base: &BaseWeaponStats, cal: &CalibrationStats) -> FinalWeaponStats {
    let mut stats = base.clone();
    stats.control = base.control * factor(cal.firing_stability + cal.extra_control);
    stats.accuracy = base.accuracy * factor(cal.hip_fire_aim_speed);
    stats.handling = base.handling * factor(cal.ads + cal.ads_movement_speed);
    stats.stability = base.stability * factor(cal.stability_when_moving);
    let final_score = final_score(&stats);
    FinalWeaponStats {
        stats,
        final_score,
        undetected: base.undetected_stats(),
    }
}

/// Fixed weighted sum over the (calibrated) stats, rounded to 2 decimals.
pub fn final_score(stats: &BaseWeaponStats) -> f64 {
    let sum: f64 = FINAL_SCORE_WEIGHTS
        .iter()
        .map(|(kind, weight)| stats.normalized_stat(*kind) * weight)
        .sum();
    round_to(sum, 2)
}

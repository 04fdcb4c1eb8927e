//! Time-to-kill from damage and fire rate.

use super::{FireRateInput, TtkResult, WeaponClass};
use crate::config::{HEALTH_POOL, MAX_REAL_RATE, UNKNOWN_CLASS_CEILING};
use crate::util::round_to;

/// Default rounds-per-minute ceiling per class, used to turn a 0-100
/// stat-bar fire rate into a real rate.
pub const CLASS_RATE_CEILINGS: [(WeaponClass, f64); 7] = [
    (WeaponClass::AssaultRifle, 800.0),
    (WeaponClass::Smg, 1000.0),
    (WeaponClass::Shotgun, 120.0),
    (WeaponClass::Sniper, 60.0),
    (WeaponClass::MarksmanRifle, 250.0),
    (WeaponClass::Pistol, 600.0),
    (WeaponClass::Lmg, 700.0),
];

pub fn class_rate_ceiling(class: WeaponClass) -> f64 {
    CLASS_RATE_CEILINGS
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, ceiling)| *ceiling)
        .unwrap_or(UNKNOWN_CLASS_CEILING)
}

/// Override first, then the class default, then the unknown-class ceiling.
/// A non-positive override counts as absent.
pub fn resolve_ceiling(class: Option<WeaponClass>, max_rate_override: Option<f64>) -> f64 {
    max_rate_override
        .filter(|c| c.is_finite() && *c > 0.0)
        .unwrap_or_else(|| class.map(class_rate_ceiling).unwrap_or(UNKNOWN_CLASS_CEILING))
}

/// Real rounds per minute for a fire-rate value, floored at 1.
pub fn effective_rate(
    fire_rate: f64,
    input: FireRateInput,
    class: Option<WeaponClass>,
    max_rate_override: Option<f64>,
) -> f64 {
    let rate = match input {
        FireRateInput::Rate => fire_rate.min(MAX_REAL_RATE),
        FireRateInput::Normalized => {
            // Multiply first: stat-bar 80 at ceiling 800 must give exactly 640.
            fire_rate.max(0.0) * resolve_ceiling(class, max_rate_override) / 100.0
        }
    };
    rate.max(1.0)
}

/// Time to empty the health pool. Undefined (all zero) when damage or fire
/// rate is not positive; a one-shot kill has `ttk == 0` and one shot.
pub fn compute_ttk(
    damage: f64,
    fire_rate: f64,
    input: FireRateInput,
    class: Option<WeaponClass>,
    max_rate_override: Option<f64>,
) -> TtkResult {
    if !(damage > 0.0) || !(fire_rate > 0.0) {
        return TtkResult::default();
    }
    let rate = effective_rate(fire_rate, input, class, max_rate_override);
    let shots_to_kill = ((HEALTH_POOL / damage).ceil() as u32).max(1);
    let time_between_shots = 60.0 / rate;
    let ttk = if shots_to_kill <= 1 {
        0
    } else {
        ((shots_to_kill - 1) as f64 * time_between_shots * 1000.0).round() as u64
    };
    TtkResult {
        ttk,
        shots_to_kill,
        time_between_shots: round_to(time_between_shots, 3),
        effective_rate_used: round_to(rate, 2),
    }
}

//! Build a base stat record from recognized text.

use super::{BaseWeaponStats, FireRateInput, StatKind, WeaponClass, UNKNOWN_WEAPON_NAME};
use crate::anomaly::{self, Anomaly};
use crate::parser::parse_field;
use serde::Serialize;
use tracing::debug;

/// Caller-side facts the text cannot provide.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Name from a separate recognition region or typed by the user.
    pub name: Option<String>,
    pub weapon_class: Option<WeaponClass>,
    pub fire_rate_input: FireRateInput,
    pub max_rate_override: Option<f64>,
}

/// Where the handling value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlingSource {
    Handling,
    Mobility,
    Missing,
}

/// A built record plus what the builder could and could not see.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub stats: BaseWeaponStats,
    pub handling_source: HandlingSource,
    /// Stats that parsed to zero, i.e. were most likely not on screen.
    pub undetected: Vec<StatKind>,
    pub anomalies: Vec<Anomaly>,
}

/// Record with default options; see [`extract_stats`].
pub fn base_stats_from_text(text: &str) -> BaseWeaponStats {
    extract_stats(text, &ExtractOptions::default()).stats
}

/// Parse every known label once and assemble the record. A positive
/// Handling wins; otherwise Mobility is copied into handling (never summed).
pub fn extract_stats(text: &str, opts: &ExtractOptions) -> Extraction {
    let handling = parse_field(text, "Handling") as f64;
    let mobility = parse_field(text, "Mobility") as f64;
    let handling_source = if handling > 0.0 {
        HandlingSource::Handling
    } else if mobility > 0.0 {
        HandlingSource::Mobility
    } else {
        HandlingSource::Missing
    };

    let name = opts
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNKNOWN_WEAPON_NAME)
        .to_string();

    let mut stats = BaseWeaponStats::default().with_name(name);
    stats.weapon_class = opts.weapon_class;
    stats.fire_rate_input = opts.fire_rate_input;
    stats.max_rate_override = opts.max_rate_override;
    stats.damage = parse_field(text, "Damage") as f64;
    stats.stability = parse_field(text, "Stability") as f64;
    stats.range = parse_field(text, "Range") as f64;
    stats.accuracy = parse_field(text, "Accuracy") as f64;
    stats.control = parse_field(text, "Control") as f64;
    stats.handling = if handling > 0.0 { handling } else { mobility };
    stats.fire_rate = parse_field(text, "Fire Rate") as f64;
    stats.muzzle_velocity = parse_field(text, "Muzzle Velocity") as f64;
    stats.refresh_derived();

    let undetected = stats.undetected_stats();
    debug!(
        "extracted {}: {} of {} stats detected, handling from {:?}",
        stats.name,
        StatKind::ALL.len() - undetected.len(),
        StatKind::ALL.len(),
        handling_source
    );
    let anomalies = anomaly::extraction_anomalies(&stats, &undetected, handling_source, mobility);
    Extraction {
        stats,
        handling_source,
        undetected,
        anomalies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AR_SCREEN: &str = "\
        KILO 141\n\
        Damage 25\n\
        Fire Rate 800\n\
        Range 55\n\
        Accuracy 62\n\
        Control 58\n\
        Mobility 64\n\
        Stability 50\n\
        Muzzle Velocity 720\n";

    #[test]
    fn builds_full_record() {
        let opts = ExtractOptions {
            weapon_class: Some(WeaponClass::AssaultRifle),
            ..Default::default()
        };
        let ex = extract_stats(AR_SCREEN, &opts);
        let s = &ex.stats;
        assert_eq!(s.name, UNKNOWN_WEAPON_NAME);
        assert_eq!(s.damage(), 25.0);
        assert_eq!(s.fire_rate(), 800.0);
        assert_eq!(s.range, 55.0);
        assert_eq!(s.muzzle_velocity, 720.0);
        assert_eq!(s.derived().ttk, 225);
        assert_eq!(s.derived().shots_to_kill, 4);
        assert!(ex.undetected.is_empty());
    }

    #[test]
    fn mobility_copied_when_handling_missing() {
        let ex = extract_stats(AR_SCREEN, &ExtractOptions::default());
        assert_eq!(ex.stats.handling, 64.0);
        assert_eq!(ex.handling_source, HandlingSource::Mobility);
        assert!(ex.anomalies.iter().any(|a| a.code == "HANDLING_FROM_MOBILITY"));
    }

    #[test]
    fn handling_wins_over_mobility() {
        let text = "Handling 71\nMobility 40\nDamage 30";
        let ex = extract_stats(text, &ExtractOptions::default());
        assert_eq!(ex.stats.handling, 71.0);
        assert_eq!(ex.handling_source, HandlingSource::Handling);
    }

    #[test]
    fn missing_stats_are_zero_and_reported() {
        let ex = extract_stats("Damage 40\nRange 70", &ExtractOptions::default());
        assert_eq!(ex.stats.muzzle_velocity, 0.0);
        assert!(ex.undetected.contains(&StatKind::MuzzleVelocity));
        assert!(ex.undetected.contains(&StatKind::FireRate));
        assert_eq!(ex.handling_source, HandlingSource::Missing);
        // Without a fire rate TTK is undefined.
        assert_eq!(ex.stats.derived().ttk, 0);
    }

    #[test]
    fn garbage_text_is_flagged_not_trusted() {
        let ex = extract_stats("%%% ~~ lorem", &ExtractOptions::default());
        assert!(ex.stats.is_blank());
        assert_eq!(ex.anomalies.len(), 1);
        assert_eq!(ex.anomalies[0].code, "NO_STATS_DETECTED");
    }

    #[test]
    fn options_flow_into_record() {
        let opts = ExtractOptions {
            name: Some("  Kilo 141 ".to_string()),
            weapon_class: Some(WeaponClass::AssaultRifle),
            fire_rate_input: FireRateInput::Normalized,
            max_rate_override: None,
        };
        let ex = extract_stats("Damage 34\nFire Rate 85", &opts);
        assert_eq!(ex.stats.name, "Kilo 141");
        assert_eq!(ex.stats.derived().effective_rate_used, 680.0);
        assert_eq!(ex.stats.derived().ttk, 176);
    }

    #[test]
    fn blank_name_option_keeps_sentinel() {
        let opts = ExtractOptions {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_stats("Damage 1", &opts).stats.name, UNKNOWN_WEAPON_NAME);
    }

    #[test]
    fn base_stats_from_text_defaults() {
        let s = base_stats_from_text(AR_SCREEN);
        assert_eq!(s.fire_rate_input(), FireRateInput::Rate);
        assert!(s.weapon_class().is_none());
        assert_eq!(s.derived().ttk, 225);
    }
}

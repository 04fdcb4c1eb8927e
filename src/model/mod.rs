//! Weapon stat model: base record, calibration modifiers, final record.

mod calibration;
mod extract;
mod ttk;

pub use calibration::{apply_calibration, final_score, FINAL_SCORE_WEIGHTS};
pub use extract::{base_stats_from_text, extract_stats, ExtractOptions, Extraction, HandlingSource};
pub use ttk::{class_rate_ceiling, compute_ttk, effective_rate, resolve_ceiling, CLASS_RATE_CEILINGS};

use crate::config::NORMALIZATION_CEILING;
use crate::util::normalize_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name used when no weapon name was recognized or supplied.
pub const UNKNOWN_WEAPON_NAME: &str = "Unknown Weapon";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Weapon archetype. Selects the default fire-rate ceiling and a role weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponClass {
    AssaultRifle,
    Smg,
    Shotgun,
    Sniper,
    MarksmanRifle,
    Pistol,
    Lmg,
}

impl WeaponClass {
    pub const ALL: [WeaponClass; 7] = [
        WeaponClass::AssaultRifle,
        WeaponClass::Smg,
        WeaponClass::Shotgun,
        WeaponClass::Sniper,
        WeaponClass::MarksmanRifle,
        WeaponClass::Pistol,
        WeaponClass::Lmg,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WeaponClass::AssaultRifle => "Assault Rifle",
            WeaponClass::Smg => "SMG",
            WeaponClass::Shotgun => "Shotgun",
            WeaponClass::Sniper => "Sniper Rifle",
            WeaponClass::MarksmanRifle => "Marksman Rifle",
            WeaponClass::Pistol => "Pistol",
            WeaponClass::Lmg => "LMG",
        }
    }
}

impl fmt::Display for WeaponClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WeaponClass {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "assault-rifle" | "assault" | "ar" => Ok(WeaponClass::AssaultRifle),
            "smg" | "submachine-gun" => Ok(WeaponClass::Smg),
            "shotgun" | "sg" => Ok(WeaponClass::Shotgun),
            "sniper" | "sniper-rifle" | "sr" => Ok(WeaponClass::Sniper),
            "marksman-rifle" | "marksman" | "dmr" | "mr" => Ok(WeaponClass::MarksmanRifle),
            "pistol" | "handgun" => Ok(WeaponClass::Pistol),
            "lmg" | "light-machine-gun" => Ok(WeaponClass::Lmg),
            _ => Err(ParseEnumError {
                kind: "weapon class",
                value: s.to_string(),
            }),
        }
    }
}

/// How the `fire_rate` number of a record must be read. Always explicit;
/// never inferred from the magnitude of the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireRateInput {
    /// Real rounds per minute.
    #[default]
    Rate,
    /// 0-100 stat-bar value, scaled by the class ceiling.
    Normalized,
}

impl fmt::Display for FireRateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireRateInput::Rate => f.write_str("rate"),
            FireRateInput::Normalized => f.write_str("normalized"),
        }
    }
}

impl FromStr for FireRateInput {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "rate" | "rpm" => Ok(FireRateInput::Rate),
            "normalized" | "stat" | "stat-bar" => Ok(FireRateInput::Normalized),
            _ => Err(ParseEnumError {
                kind: "fire rate input",
                value: s.to_string(),
            }),
        }
    }
}

/// Numeric stats of a record, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Damage,
    FireRate,
    Range,
    Accuracy,
    Control,
    Handling,
    Stability,
    MuzzleVelocity,
}

impl StatKind {
    pub const ALL: [StatKind; 8] = [
        StatKind::Damage,
        StatKind::FireRate,
        StatKind::Range,
        StatKind::Accuracy,
        StatKind::Control,
        StatKind::Handling,
        StatKind::Stability,
        StatKind::MuzzleVelocity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Damage => "Damage",
            StatKind::FireRate => "Fire Rate",
            StatKind::Range => "Range",
            StatKind::Accuracy => "Accuracy",
            StatKind::Control => "Control",
            StatKind::Handling => "Handling",
            StatKind::Stability => "Stability",
            StatKind::MuzzleVelocity => "Muzzle Velocity",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values derived from damage and fire rate. Zero everywhere when TTK is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TtkResult {
    /// Milliseconds to empty the health pool.
    pub ttk: u64,
    pub shots_to_kill: u32,
    /// Seconds between consecutive shots.
    pub time_between_shots: f64,
    /// Rounds per minute actually used for the computation.
    pub effective_rate_used: f64,
}

/// Canonical per-weapon record.
///
/// TTK inputs (damage, fire rate, its input type, weapon class, max-rate
/// override) are only reachable through setters so the derived fields are
/// always recomputed together with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BaseWeaponStatsInput")]
pub struct BaseWeaponStats {
    pub name: String,
    weapon_class: Option<WeaponClass>,
    damage: f64,
    pub stability: f64,
    pub range: f64,
    pub accuracy: f64,
    pub control: f64,
    /// Mobility and handling are the same capability; only handling is kept.
    pub handling: f64,
    fire_rate: f64,
    pub muzzle_velocity: f64,
    fire_rate_input: FireRateInput,
    max_rate_override: Option<f64>,
    #[serde(flatten)]
    derived: TtkResult,
}

/// Deserialization shape: TTK inputs only. Derived fields present in the
/// input are ignored and recomputed.
#[derive(Debug, Deserialize)]
struct BaseWeaponStatsInput {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    weapon_class: Option<WeaponClass>,
    #[serde(default)]
    damage: f64,
    #[serde(default)]
    stability: f64,
    #[serde(default)]
    range: f64,
    #[serde(default)]
    accuracy: f64,
    #[serde(default)]
    control: f64,
    #[serde(default)]
    handling: f64,
    #[serde(default)]
    mobility: f64,
    #[serde(default)]
    fire_rate: f64,
    #[serde(default)]
    muzzle_velocity: f64,
    #[serde(default)]
    fire_rate_input: FireRateInput,
    #[serde(default)]
    max_rate_override: Option<f64>,
}

fn default_name() -> String {
    UNKNOWN_WEAPON_NAME.to_string()
}

impl From<BaseWeaponStatsInput> for BaseWeaponStats {
    fn from(raw: BaseWeaponStatsInput) -> Self {
        let handling = if raw.handling > 0.0 {
            raw.handling
        } else {
            raw.mobility
        };
        let mut stats = BaseWeaponStats {
            name: raw.name,
            weapon_class: raw.weapon_class,
            damage: raw.damage,
            stability: raw.stability,
            range: raw.range,
            accuracy: raw.accuracy,
            control: raw.control,
            handling,
            fire_rate: raw.fire_rate,
            muzzle_velocity: raw.muzzle_velocity,
            fire_rate_input: raw.fire_rate_input,
            max_rate_override: raw.max_rate_override,
            derived: TtkResult::default(),
        };
        stats.refresh_derived();
        stats
    }
}

impl Default for BaseWeaponStats {
    fn default() -> Self {
        Self {
            name: default_name(),
            weapon_class: None,
            damage: 0.0,
            stability: 0.0,
            range: 0.0,
            accuracy: 0.0,
            control: 0.0,
            handling: 0.0,
            fire_rate: 0.0,
            muzzle_velocity: 0.0,
            fire_rate_input: FireRateInput::Rate,
            max_rate_override: None,
            derived: TtkResult::default(),
        }
    }
}

impl BaseWeaponStats {
    pub fn weapon_class(&self) -> Option<WeaponClass> {
        self.weapon_class
    }

    pub fn damage(&self) -> f64 {
        self.damage
    }

    pub fn fire_rate(&self) -> f64 {
        self.fire_rate
    }

    pub fn fire_rate_input(&self) -> FireRateInput {
        self.fire_rate_input
    }

    pub fn max_rate_override(&self) -> Option<f64> {
        self.max_rate_override
    }

    pub fn derived(&self) -> &TtkResult {
        &self.derived
    }

    pub fn stat(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Damage => self.damage,
            StatKind::FireRate => self.fire_rate,
            StatKind::Range => self.range,
            StatKind::Accuracy => self.accuracy,
            StatKind::Control => self.control,
            StatKind::Handling => self.handling,
            StatKind::Stability => self.stability,
            StatKind::MuzzleVelocity => self.muzzle_velocity,
        }
    }

    /// Stat on a 0-100 scale. Fire rate is only rescaled when it is a real
    /// rate; muzzle velocity is always in real units.
    pub fn normalized_stat(&self, kind: StatKind) -> f64 {
        let value = self.stat(kind);
        match kind {
            StatKind::FireRate if self.fire_rate_input == FireRateInput::Rate => {
                value / NORMALIZATION_CEILING * 100.0
            }
            StatKind::MuzzleVelocity => value / NORMALIZATION_CEILING * 100.0,
            _ => value,
        }
    }

    /// Manual edit of one stat. Editing damage or fire rate refreshes TTK.
    pub fn set_stat(&mut self, kind: StatKind, value: f64) {
        match kind {
            StatKind::Damage => self.damage = value,
            StatKind::FireRate => self.fire_rate = value,
            StatKind::Range => self.range = value,
            StatKind::Accuracy => self.accuracy = value,
            StatKind::Control => self.control = value,
            StatKind::Handling => self.handling = value,
            StatKind::Stability => self.stability = value,
            StatKind::MuzzleVelocity => self.muzzle_velocity = value,
        }
        if matches!(kind, StatKind::Damage | StatKind::FireRate) {
            self.refresh_derived();
        }
    }

    pub fn set_weapon_class(&mut self, class: Option<WeaponClass>) {
        self.weapon_class = class;
        self.refresh_derived();
    }

    pub fn set_fire_rate_input(&mut self, input: FireRateInput) {
        self.fire_rate_input = input;
        self.refresh_derived();
    }

    pub fn set_max_rate_override(&mut self, ceiling: Option<f64>) {
        self.max_rate_override = ceiling;
        self.refresh_derived();
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stat(mut self, kind: StatKind, value: f64) -> Self {
        self.set_stat(kind, value);
        self
    }

    pub fn with_weapon_class(mut self, class: WeaponClass) -> Self {
        self.set_weapon_class(Some(class));
        self
    }

    pub fn with_fire_rate_input(mut self, input: FireRateInput) -> Self {
        self.set_fire_rate_input(input);
        self
    }

    pub fn with_max_rate_override(mut self, ceiling: f64) -> Self {
        self.set_max_rate_override(Some(ceiling));
        self
    }

    /// True when every numeric stat is zero, i.e. nothing was detected.
    pub fn is_blank(&self) -> bool {
        StatKind::ALL.iter().all(|k| self.stat(*k) == 0.0)
    }

    /// Stats at zero, in display order. On a raw record zero means the
    /// stat was not on screen.
    pub fn undetected_stats(&self) -> Vec<StatKind> {
        StatKind::ALL
            .iter()
            .copied()
            .filter(|k| self.stat(*k) == 0.0)
            .collect()
    }

    fn refresh_derived(&mut self) {
        self.derived = compute_ttk(
            self.damage,
            self.fire_rate,
            self.fire_rate_input,
            self.weapon_class,
            self.max_rate_override,
        );
    }
}

/// Percentage modifiers from attachments and perks. All zero is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationStats {
    pub firing_stability: f64,
    pub extra_control: f64,
    pub stability_when_moving: f64,
    pub ads_movement_speed: f64,
    pub ads: f64,
    pub hip_fire_aim_speed: f64,
}

impl CalibrationStats {
    pub fn is_identity(&self) -> bool {
        [
            self.firing_stability,
            self.extra_control,
            self.stability_when_moving,
            self.ads_movement_speed,
            self.ads,
            self.hip_fire_aim_speed,
        ]
        .iter()
        .all(|v| *v == 0.0)
    }
}

/// Base record with control, accuracy, handling and stability replaced by
/// calibrated values. Always a pure function of base + calibration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalWeaponStats {
    #[serde(flatten)]
    pub stats: BaseWeaponStats,
    pub final_score: f64,
    /// Stats that were zero before calibration. Scoring excludes these and
    /// only these; a stat calibrated down to zero is still scored.
    pub undetected: Vec<StatKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_class_from_str_aliases() {
        assert_eq!("Assault Rifle".parse::<WeaponClass>(), Ok(WeaponClass::AssaultRifle));
        assert_eq!("SMG".parse::<WeaponClass>(), Ok(WeaponClass::Smg));
        assert_eq!("marksman_rifle".parse::<WeaponClass>(), Ok(WeaponClass::MarksmanRifle));
        assert_eq!("dmr".parse::<WeaponClass>(), Ok(WeaponClass::MarksmanRifle));
        assert!("railgun".parse::<WeaponClass>().is_err());
    }

    #[test]
    fn weapon_class_label_round_trips_through_from_str() {
        for class in WeaponClass::ALL {
            assert_eq!(class.label().parse::<WeaponClass>(), Ok(class));
        }
    }

    #[test]
    fn fire_rate_input_from_str() {
        assert_eq!("RPM".parse::<FireRateInput>(), Ok(FireRateInput::Rate));
        assert_eq!("stat bar".parse::<FireRateInput>(), Ok(FireRateInput::Normalized));
        assert!("fast".parse::<FireRateInput>().is_err());
    }

    #[test]
    fn default_record_uses_sentinel_name() {
        let s = BaseWeaponStats::default();
        assert_eq!(s.name, UNKNOWN_WEAPON_NAME);
        assert!(s.is_blank());
        assert_eq!(*s.derived(), TtkResult::default());
    }

    #[test]
    fn setters_refresh_ttk() {
        let mut s = BaseWeaponStats::default()
            .with_weapon_class(WeaponClass::AssaultRifle)
            .with_stat(StatKind::Damage, 25.0)
            .with_stat(StatKind::FireRate, 800.0);
        assert_eq!(s.derived().ttk, 225);
        s.set_stat(StatKind::Damage, 50.0);
        assert_eq!(s.derived().shots_to_kill, 2);
        assert_eq!(s.derived().ttk, 75);
        s.set_fire_rate_input(FireRateInput::Normalized);
        // 800 on a stat bar: 800 / 100 * 800 = 6400 rpm.
        assert_eq!(s.derived().effective_rate_used, 6400.0);
    }

    #[test]
    fn non_ttk_edit_keeps_derived() {
        let mut s = BaseWeaponStats::default()
            .with_stat(StatKind::Damage, 25.0)
            .with_stat(StatKind::FireRate, 800.0);
        let before = *s.derived();
        s.set_stat(StatKind::Accuracy, 90.0);
        assert_eq!(*s.derived(), before);
    }

    #[test]
    fn deserialize_recomputes_derived_and_folds_mobility() {
        let json = r#"{
            "name": "Kilo",
            "weapon_class": "assault-rifle",
            "damage": 34,
            "fire_rate": 85,
            "fire_rate_input": "normalized",
            "mobility": 60,
            "ttk": 99999
        }"#;
        let s: BaseWeaponStats = serde_json::from_str(json).unwrap();
        assert_eq!(s.handling, 60.0);
        assert_eq!(s.derived().ttk, 176);
        assert_eq!(s.derived().shots_to_kill, 3);
    }

    #[test]
    fn deserialize_handling_wins_over_mobility() {
        let s: BaseWeaponStats =
            serde_json::from_str(r#"{"handling": 70, "mobility": 40}"#).unwrap();
        assert_eq!(s.handling, 70.0);
        assert_eq!(s.name, UNKNOWN_WEAPON_NAME);
    }

    #[test]
    fn serialize_includes_derived_fields() {
        let s = BaseWeaponStats::default()
            .with_stat(StatKind::Damage, 25.0)
            .with_stat(StatKind::FireRate, 800.0);
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["ttk"], 225);
        assert_eq!(v["shots_to_kill"], 4);
        assert_eq!(v["fire_rate_input"], "rate");
    }

    #[test]
    fn normalized_stat_reads_input_tag() {
        let rate = BaseWeaponStats::default().with_stat(StatKind::FireRate, 600.0);
        assert!((rate.normalized_stat(StatKind::FireRate) - 50.0).abs() < 1e-9);
        let bar = rate.clone().with_fire_rate_input(FireRateInput::Normalized);
        assert_eq!(bar.normalized_stat(StatKind::FireRate), 600.0);
        let mv = BaseWeaponStats::default().with_stat(StatKind::MuzzleVelocity, 900.0);
        assert!((mv.normalized_stat(StatKind::MuzzleVelocity) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn calibration_identity() {
        assert!(CalibrationStats::default().is_identity());
        let c: CalibrationStats = serde_json::from_str(r#"{"ads": 5}"#).unwrap();
        assert!(!c.is_identity());
        assert_eq!(c.ads, 5.0);
    }
}

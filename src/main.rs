//! Armory Lens CLI.

use armory_lens::commentary::{Commentator, RuleBasedCommentator};
use armory_lens::config::{EngineConfig, MAX_TEXT_BYTES};
use armory_lens::model::{
    compute_ttk, extract_stats, BaseWeaponStats, CalibrationStats, ExtractOptions, Extraction,
    FireRateInput, WeaponClass,
};
use armory_lens::ocr::{extract_from_image, OcrResource, TesseractFactory};
use armory_lens::report::{
    build_analysis, build_comparison, render_anomalies, render_analysis, render_comparison,
    render_stats, write_json_report,
};
use armory_lens::scoring::{CombatRange, ScoreLabel, ScoringContext};
use armory_lens::util::{init_logging, read_bounded};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "armory-lens")]
#[command(about = "Weapon stat extraction, time-to-kill and loadout scoring")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine defaults (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ExtractSource {
    /// Already-recognized text.
    #[arg(long, value_name = "FILE")]
    text: Option<PathBuf>,
    /// Screenshot to run through the OCR engine.
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,
}

/// TTK inputs shared by `extract` and `ttk`; unset flags fall back to the config.
#[derive(Args)]
struct RateArgs {
    #[arg(long, value_name = "CLASS")]
    class: Option<WeaponClass>,
    /// `rate` (rounds per minute) or `normalized` (0-100 stat bar).
    #[arg(long, value_name = "TYPE")]
    fire_rate_input: Option<FireRateInput>,
    /// Fire-rate ceiling override for stat-bar values.
    #[arg(long, value_name = "RPM")]
    max_rate: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a base stat record from recognized text or a screenshot.
    Extract {
        #[command(flatten)]
        source: ExtractSource,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        rate: RateArgs,
        /// Write the extraction (record and diagnostics) as JSON.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Time-to-kill from damage and fire rate.
    Ttk {
        #[arg(long)]
        damage: f64,
        #[arg(long)]
        fire_rate: f64,
        #[command(flatten)]
        rate: RateArgs,
    },
    /// Calibrate, score and summarize one weapon.
    Analyze {
        #[arg(long, value_name = "FILE")]
        stats: PathBuf,
        #[arg(long, value_name = "FILE")]
        calibration: Option<PathBuf>,
        /// `range` or `role`.
        #[arg(long, default_value = "range")]
        context: ScoringContext,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Head-to-head comparison of two weapons per combat range.
    Compare {
        #[arg(long, value_name = "FILE")]
        a: PathBuf,
        #[arg(long, value_name = "FILE")]
        b: PathBuf,
        #[arg(long, value_name = "FILE")]
        cal_a: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        cal_b: Option<PathBuf>,
        /// Only this range.
        #[arg(long)]
        range: Option<CombatRange>,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let cfg = EngineConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Extract {
            source,
            name,
            rate,
            out,
        } => run_extract(&cfg, source, name, rate, out).await,
        Commands::Ttk {
            damage,
            fire_rate,
            rate,
        } => run_ttk(&cfg, damage, fire_rate, rate),
        Commands::Analyze {
            stats,
            calibration,
            context,
            out,
        } => run_analyze(&stats, calibration.as_deref(), context, out).await,
        Commands::Compare {
            a,
            b,
            cal_a,
            cal_b,
            range,
            out,
        } => run_compare(&a, &b, cal_a.as_deref(), cal_b.as_deref(), range, out),
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let s = read_bounded(path, MAX_TEXT_BYTES)?;
    serde_json::from_str(&s).map_err(|e| format!("{}: {}", path.display(), e))
}

fn load_calibration(path: Option<&Path>) -> Result<CalibrationStats, String> {
    match path {
        Some(p) => load_json(p),
        None => Ok(CalibrationStats::default()),
    }
}

/// Merge CLI flags over config defaults. A non-positive override is ignored.
fn resolve_rate_args(cfg: &EngineConfig, rate: RateArgs) -> (Option<WeaponClass>, FireRateInput, Option<f64>) {
    let max_rate = rate.max_rate.or(cfg.max_rate_override);
    if let Some(m) = max_rate {
        if m <= 0.0 {
            tracing::warn!("ignoring non-positive max rate {}", m);
        }
    }
    (
        rate.class.or(cfg.weapon_class),
        rate.fire_rate_input.unwrap_or(cfg.fire_rate_input),
        max_rate.filter(|m| *m > 0.0),
    )
}

async fn run_extract(
    cfg: &EngineConfig,
    source: ExtractSource,
    name: Option<String>,
    rate: RateArgs,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let (weapon_class, fire_rate_input, max_rate_override) = resolve_rate_args(cfg, rate);
    let opts = ExtractOptions {
        name,
        weapon_class,
        fire_rate_input,
        max_rate_override,
    };
    let extraction: Extraction = if let Some(path) = source.text {
        let text = read_bounded(&path, MAX_TEXT_BYTES)?;
        if text.trim().is_empty() {
            return Err(format!("{}: no text to extract from", path.display()));
        }
        extract_stats(&text, &opts)
    } else if let Some(path) = source.image {
        let image = tokio::fs::read(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let mut resource = OcrResource::new(TesseractFactory::new(&cfg.ocr));
        let result = extract_from_image(&resource, &image, &opts).await;
        if let Err(e) = resource.shutdown().await {
            tracing::warn!("OCR shutdown failed: {}", e);
        }
        result.map_err(|e| format!("{}: {} (enter stats manually)", path.display(), e))?
    } else {
        return Err("provide --text or --image".to_string());
    };

    tracing::info!(
        "extracted {} ({} undetected stat(s))",
        extraction.stats.name,
        extraction.undetected.len()
    );
    print!("{}", render_stats(&extraction.stats, &extraction.undetected));
    println!("Handling source: {:?}", extraction.handling_source);
    println!();
    print!("{}", render_anomalies(&extraction.anomalies));
    if let Some(path) = out {
        write_json_report(&extraction, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_ttk(cfg: &EngineConfig, damage: f64, fire_rate: f64, rate: RateArgs) -> Result<(), String> {
    let (class, input, max_rate) = resolve_rate_args(cfg, rate);
    let r = compute_ttk(damage, fire_rate, input, class, max_rate);
    println!("TTK: {} ms", r.ttk);
    println!("Shots to kill: {}", r.shots_to_kill);
    println!("Time between shots: {} s", r.time_between_shots);
    println!("Effective rate: {} rpm", r.effective_rate_used);
    Ok(())
}

async fn run_analyze(
    stats_path: &Path,
    calibration: Option<&Path>,
    context: ScoringContext,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let base: BaseWeaponStats = load_json(stats_path)?;
    let cal = load_calibration(calibration)?;
    if !cal.is_identity() {
        tracing::debug!("applying calibration {:?}", cal);
    }
    let report = build_analysis(&base, &cal, context);
    print!("{}", render_analysis(&report));

    let commentary = RuleBasedCommentator
        .commentate(&report.snapshot())
        .await
        .map_err(|e| e.to_string())?;
    println!("\nSummary:\n{}", commentary);

    if let Some(dir) = out {
        let path = dir.join("report.json");
        write_json_report(&report, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_compare(
    a: &Path,
    b: &Path,
    cal_a: Option<&Path>,
    cal_b: Option<&Path>,
    range: Option<CombatRange>,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let first: BaseWeaponStats = load_json(a)?;
    let second: BaseWeaponStats = load_json(b)?;
    let cal_first = load_calibration(cal_a)?;
    let cal_second = load_calibration(cal_b)?;
    let mut report = build_comparison(
        (&first, &cal_first),
        (&second, &cal_second),
        ScoringContext::CombatRange,
    );
    if let Some(r) = range {
        report.results.retain(|h| h.label == ScoreLabel::Range(r));
    }
    print!("{}", render_comparison(&report));

    if let Some(dir) = out {
        let path = dir.join("compare.json");
        write_json_report(&report, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

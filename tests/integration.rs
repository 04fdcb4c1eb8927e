//! CLI integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn fixture(rel: &str) -> String {
    fixtures_dir().join(rel).to_str().unwrap().to_string()
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_armory-lens"))
        .args(args)
        .output()
        .expect("run armory-lens")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn ttk_from_real_rate() {
    let stdout = stdout_of(&run(&["ttk", "--damage", "25", "--fire-rate", "800"]));
    assert!(stdout.contains("TTK: 225 ms"), "{}", stdout);
    assert!(stdout.contains("Shots to kill: 4"));
}

#[test]
fn ttk_from_stat_bar() {
    let stdout = stdout_of(&run(&[
        "ttk",
        "--damage",
        "34",
        "--fire-rate",
        "85",
        "--fire-rate-input",
        "normalized",
        "--class",
        "assault-rifle",
    ]));
    assert!(stdout.contains("TTK: 176 ms"), "{}", stdout);
    assert!(stdout.contains("Effective rate: 680 rpm"));
}

#[test]
fn ttk_defaults_come_from_config() {
    let config = fixture("config/stat_bar.toml");
    let stdout = stdout_of(&run(&[
        "--config",
        &config,
        "ttk",
        "--damage",
        "34",
        "--fire-rate",
        "85",
    ]));
    assert!(stdout.contains("TTK: 176 ms"), "{}", stdout);
}

#[test]
fn ttk_zero_damage_is_all_zero() {
    let stdout = stdout_of(&run(&["ttk", "--damage", "0", "--fire-rate", "800"]));
    assert!(stdout.contains("TTK: 0 ms"));
    assert!(stdout.contains("Shots to kill: 0"));
}

#[test]
fn extract_from_text_writes_json() {
    let out = tempfile::tempdir().expect("tempdir");
    let json_path = out.path().join("kilo.json");
    let text = fixture("ocr/assault_rifle.txt");
    let stdout = stdout_of(&run(&[
        "extract",
        "--text",
        &text,
        "--name",
        "Kilo",
        "--class",
        "assault-rifle",
        "--out",
        json_path.to_str().unwrap(),
    ]));
    assert!(stdout.contains("Weapon: Kilo (Assault Rifle)"), "{}", stdout);
    assert!(stdout.contains("TTK: 225 ms"));
    assert!(stdout.contains("HANDLING_FROM_MOBILITY"));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v["stats"]["accuracy"], 70.0);
    assert_eq!(v["stats"]["handling"], 55.0);
    assert_eq!(v["stats"]["shots_to_kill"], 4);
    assert_eq!(v["handling_source"], "mobility");
    assert_eq!(v["undetected"].as_array().unwrap().len(), 0);
}

#[test]
fn extract_without_stats_is_flagged() {
    let text = fixture("ocr/garbage.txt");
    let stdout = stdout_of(&run(&["extract", "--text", &text]));
    assert!(stdout.contains("Weapon: Unknown Weapon"));
    assert!(stdout.contains("[NO_STATS_DETECTED] CRIT"), "{}", stdout);
}

#[test]
fn extract_blank_text_fails() {
    let text = fixture("ocr/blank.txt");
    let output = run(&["extract", "--text", &text]);
    assert!(!output.status.success());
}

#[test]
fn extract_requires_exactly_one_source() {
    let text = fixture("ocr/assault_rifle.txt");
    assert!(!run(&["extract"]).status.success());
    assert!(!run(&["extract", "--text", &text, "--image", &text])
        .status
        .success());
}

#[test]
fn extract_image_without_ocr_engine_fails() {
    let config = fixture("config/missing_ocr.toml");
    let image = fixture("ocr/assault_rifle.txt");
    let output = run(&["--config", &config, "extract", "--image", &image]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("enter stats manually"), "{}", stderr);
}

#[test]
fn analyze_writes_report() {
    let out = tempfile::tempdir().expect("tempdir");
    let stats = fixture("stats/kilo.json");
    let cal = fixture("calibration/grip.json");
    let stdout = stdout_of(&run(&[
        "analyze",
        "--stats",
        &stats,
        "--calibration",
        &cal,
        "--out",
        out.path().to_str().unwrap(),
    ]));
    assert!(stdout.contains("Weapon: Kilo (Assault Rifle)"));
    assert!(stdout.contains("Scores:"));
    assert!(stdout.contains("Close Range"));
    assert!(stdout.contains("Summary:\nKilo: "));

    let report = out.path().join("report.json");
    assert!(report.exists(), "report.json should exist");
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    // control 60 * 1.15
    assert!((v["stats"]["control"].as_f64().unwrap() - 69.0).abs() < 1e-9);
    assert_eq!(v["stats"]["ttk"], 225);
    assert_eq!(v["classification"]["breakdowns"].as_array().unwrap().len(), 3);
    assert!(v["summary"].as_array().unwrap().len() <= 7);
}

#[test]
fn analyze_by_role() {
    let out = tempfile::tempdir().expect("tempdir");
    let stats = fixture("stats/shotgun.json");
    stdout_of(&run(&[
        "analyze",
        "--stats",
        &stats,
        "--context",
        "role",
        "--out",
        out.path().to_str().unwrap(),
    ]));
    let v: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(v["classification"]["breakdowns"].as_array().unwrap().len(), 7);
    // 70% of the shotgun ceiling (120) is 84 rpm; two 90-damage shots.
    assert_eq!(v["stats"]["effective_rate_used"], 84.0);
    assert_eq!(v["stats"]["shots_to_kill"], 2);
}

#[test]
fn compare_identical_weapons_ties() {
    let out = tempfile::tempdir().expect("tempdir");
    let a = fixture("stats/kilo.json");
    let b = fixture("stats/twin.json");
    let stdout = stdout_of(&run(&[
        "compare",
        "--a",
        &a,
        "--b",
        &b,
        "--out",
        out.path().to_str().unwrap(),
    ]));
    assert!(stdout.contains("Compare: Kilo vs Twin"));
    assert_eq!(stdout.matches("-> tie").count(), 3, "{}", stdout);

    let v: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.path().join("compare.json")).unwrap(),
    )
    .unwrap();
    let results = v["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["winner"].is_null()));
}

#[test]
fn compare_calibrated_side_wins() {
    let a = fixture("stats/kilo.json");
    let b = fixture("stats/twin.json");
    let cal = fixture("calibration/grip.json");
    let stdout = stdout_of(&run(&["compare", "--a", &a, "--b", &b, "--cal-a", &cal]));
    assert_eq!(stdout.matches("-> Kilo").count(), 3, "{}", stdout);
}

#[test]
fn compare_single_range() {
    let a = fixture("stats/kilo.json");
    let b = fixture("stats/shotgun.json");
    let stdout = stdout_of(&run(&["compare", "--a", &a, "--b", &b, "--range", "close"]));
    assert_eq!(stdout.lines().count(), 2, "{}", stdout);
    assert!(stdout.contains("Close Range"));
}

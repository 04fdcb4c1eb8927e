//! Armory Lens: weapon stat extraction, time-to-kill and loadout scoring.
//!
//! Exposes config, parser, model, anomaly, scoring, ocr, commentary, and
//! report for use by the CLI and tests.

pub mod anomaly;
pub mod commentary;
pub mod config;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod util;

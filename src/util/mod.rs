//! Shared utilities: logging, key normalization, bounded reads.

use std::path::Path;
use tracing::Level;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Normalize a user-facing label for lookup: lowercase, trimmed, with
/// spaces and underscores folded to dashes ("Assault Rifle" -> "assault-rifle").
pub fn normalize_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Read a text file, refusing anything larger than `max_bytes`.
pub fn read_bounded(path: &Path, max_bytes: usize) -> Result<String, String> {
    let meta = std::fs::metadata(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    if meta.len() > max_bytes as u64 {
        return Err(format!(
            "file too large: {} is {} bytes (max {})",
            path.display(),
            meta.len(),
            max_bytes
        ));
    }
    std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Round to a fixed number of decimals so repeated computations print identically.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

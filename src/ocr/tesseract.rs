//! OCR engine backed by a local `tesseract` executable.

use super::{OcrEngine, OcrEngineFactory, OcrError};
use crate::config::OcrConfig;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

/// Verifies the executable once, at initialization.
#[derive(Debug, Clone)]
pub struct TesseractFactory {
    program: PathBuf,
    language: String,
    page_segmentation: u8,
}

impl TesseractFactory {
    pub fn new(cfg: &OcrConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            language: cfg.language.clone(),
            page_segmentation: cfg.page_segmentation,
        }
    }
}

#[derive(Debug)]
pub struct TesseractEngine {
    program: PathBuf,
    language: String,
    page_segmentation: u8,
}

#[async_trait]
impl OcrEngineFactory for TesseractFactory {
    type Engine = TesseractEngine;

    async fn create(&self) -> Result<TesseractEngine, OcrError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .map_err(|e| OcrError::Unavailable(format!("{}: {}", self.program.display(), e)))?;
        if !output.status.success() {
            return Err(OcrError::Unavailable(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }
        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        info!("using {}", banner.lines().next().unwrap_or("tesseract").trim());
        Ok(TesseractEngine {
            program: self.program.clone(),
            language: self.language.clone(),
            page_segmentation: self.page_segmentation,
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        // Tesseract reads the format from the file header, so no suffix is needed.
        let input = tempfile::NamedTempFile::new()?;
        tokio::fs::write(input.path(), image).await?;
        let output = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation.to_string())
            .output()
            .await?;
        if !output.status.success() {
            return Err(OcrError::Recognition(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} bytes of text", text.len());
        Ok(text)
    }
}

//! OCR collaborator boundary.
//!
//! The recognizer itself is external; this module owns its lifecycle. The
//! engine is heavyweight, so [`OcrResource`] creates it lazily, at most once,
//! even when many extractions ask for it concurrently, and hands every
//! caller the same instance. It is released only by an explicit
//! [`OcrResource::shutdown`].

mod tesseract;

pub use tesseract::{TesseractEngine, TesseractFactory};

use crate::model::{extract_stats, ExtractOptions, Extraction};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extraction from an image failed. No stat record is produced; the caller
/// should fall back to manual entry.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("OCR returned no text")]
    EmptyText,
}

/// A ready recognizer: one image in, one block of text out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;

    /// Release engine resources. Called once by [`OcrResource::shutdown`].
    async fn terminate(&self) -> Result<(), OcrError> {
        Ok(())
    }
}

/// Creates the engine. Called at most once per successful initialization.
#[async_trait]
pub trait OcrEngineFactory: Send + Sync {
    type Engine: OcrEngine + 'static;

    async fn create(&self) -> Result<Self::Engine, OcrError>;
}

/// Lazily-initialized, shared OCR engine. Inject it into extraction calls
/// instead of reaching for a global.
pub struct OcrResource<F: OcrEngineFactory> {
    factory: F,
    engine: OnceCell<Arc<F::Engine>>,
}

impl<F: OcrEngineFactory> OcrResource<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            engine: OnceCell::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.initialized()
    }

    /// The shared engine, creating it on first use. Concurrent first calls
    /// wait on a single in-flight initialization. A failed initialization is
    /// not cached; the next call tries again.
    pub async fn engine(&self) -> Result<Arc<F::Engine>, OcrError> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                info!("initializing OCR engine");
                self.factory.create().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    /// Terminate the engine if it was ever created. The resource can be
    /// initialized again afterwards.
    pub async fn shutdown(&mut self) -> Result<(), OcrError> {
        if let Some(engine) = self.engine.take() {
            info!("shutting down OCR engine");
            engine.terminate().await?;
        }
        Ok(())
    }
}

/// Recognize one image and build its stat record. OCR failures propagate
/// unchanged; nothing is retried and no placeholder record is returned.
pub async fn extract_from_image<F: OcrEngineFactory>(
    resource: &OcrResource<F>,
    image: &[u8],
    opts: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let engine = resource.engine().await.map_err(|e| {
        warn!("OCR engine not available: {}", e);
        e
    })?;
    let text = engine.recognize(image).await.map_err(|e| {
        warn!("OCR recognition failed: {}", e);
        e
    })?;
    if text.trim().is_empty() {
        warn!("OCR returned only whitespace for a {}-byte image", image.len());
        return Err(ExtractError::EmptyText);
    }
    Ok(extract_stats(&text, opts))
}

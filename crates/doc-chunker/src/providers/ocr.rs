//! OCR on rendered pages (tesseract)

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{Error, Result};

use super::process::run_with_limit;
use super::raster::PageImage;

/// Trait for recognizing text in a grayscale page image
pub trait OcrEngine: Send + Sync {
    /// Extract text; any failure is recoverable for the page
    fn recognize(&self, image: &PageImage) -> Result<String>;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// Tesseract CLI engine
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    language: String,
    /// tesseract is killed after this long
    timeout: Option<Duration>,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.language.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Check if tesseract is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &PageImage) -> Result<String> {
        let page = image.page;
        let temp_dir = tempfile::Builder::new()
            .prefix("doc-chunker-ocr-")
            .tempdir()
            .map_err(|e| Error::ocr(page, format!("failed to create temp dir: {}", e)))?;
        let image_path = temp_dir.path().join("page.png");
        std::fs::write(&image_path, &image.png)
            .map_err(|e| Error::ocr(page, format!("failed to write page image: {}", e)))?;

        let out_base = temp_dir.path().join("page");

        let run = run_with_limit(
            Command::new(&self.binary)
                .arg(&image_path)
                .arg(&out_base)
                .args(["-l", &self.language])
                .args(["--dpi", &image.dpi.to_string()]),
            temp_dir.path(),
            self.timeout,
        )
        .map_err(|e| Error::ocr(page, format!("failed to run tesseract: {}", e)))?;

        let run = run.ok_or_else(|| Error::OcrTimeout {
            page,
            secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        })?;
        if !run.success {
            return Err(Error::ocr(page, format!("tesseract error: {}", run.stderr)));
        }

        // tesseract appends `.txt` to the output base
        let text = std::fs::read_to_string(out_base.with_extension("txt"))
            .map_err(|e| Error::ocr(page, format!("tesseract produced no text: {}", e)))?;
        tracing::debug!("OCR extracted {} characters from page {}", text.len(), page);
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

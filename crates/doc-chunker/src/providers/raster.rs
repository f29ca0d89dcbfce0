//! Page rasterization for the OCR fallback (pdftoppm from poppler-utils)

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{Error, Result};

use super::process::run_with_limit;

/// A rendered grayscale page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number
    pub page: u32,
    /// Render resolution
    pub dpi: u32,
    /// PNG-encoded 8-bit grayscale image
    pub png: Vec<u8>,
}

/// Trait for rendering one PDF page to a grayscale image
pub trait Rasterizer: Send + Sync {
    fn render_page(&self, pdf: &Path, page: u32) -> Result<PageImage>;

    /// Get rasterizer name for logging
    fn name(&self) -> &str;
}

/// pdftoppm-based rasterizer
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
    dpi: u32,
    /// pdftoppm is killed after this long
    timeout: Option<Duration>,
}

impl PdftoppmRasterizer {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.pdftoppm_path.clone(),
            dpi: config.dpi,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Check if pdftoppm is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .map(|_| true) // pdftoppm -v outputs to stderr, just check if command exists
            .unwrap_or(false)
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn render_page(&self, pdf: &Path, page: u32) -> Result<PageImage> {
        let temp_dir = tempfile::Builder::new()
            .prefix("doc-chunker-raster-")
            .tempdir()
            .map_err(|e| Error::render(page, format!("failed to create temp dir: {}", e)))?;
        let out_root = temp_dir.path().join("page");
        let page_arg = page.to_string();

        let run = run_with_limit(
            Command::new(&self.binary)
                .args(["-png", "-gray", "-singlefile"])
                .args(["-r", &self.dpi.to_string()])
                .args(["-f", &page_arg, "-l", &page_arg])
                .arg(pdf)
                .arg(&out_root),
            temp_dir.path(),
            self.timeout,
        )
        .map_err(|e| Error::render(page, format!("failed to run pdftoppm: {}", e)))?;

        let run = run.ok_or_else(|| Error::OcrTimeout {
            page,
            secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        })?;
        if !run.success {
            return Err(Error::render(page, format!("pdftoppm error: {}", run.stderr)));
        }

        let png = std::fs::read(out_root.with_extension("png"))
            .map_err(|e| Error::render(page, format!("pdftoppm produced no image: {}", e)))?;

        tracing::debug!("Rendered page {} at {} DPI ({} bytes)", page, self.dpi, png.len());
        Ok(PageImage {
            page,
            dpi: self.dpi,
            png,
        })
    }

    fn name(&self) -> &str {
        "pdftoppm"
    }
}

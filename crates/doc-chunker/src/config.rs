//! Configuration for the extraction and chunking pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main pipeline configuration
///
/// Built once at startup and passed by reference to every component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: PipelineConfig,
    /// OCR fallback configuration
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Conversion-to-PDF configuration
    #[serde(default)]
    pub conversion: ConversionConfig,
    /// Input staging configuration
    #[serde(default)]
    pub staging: StagingConfig,
    /// Processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl IngestConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail deep inside the pipeline
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.ocr.dpi == 0 {
            return Err(Error::config("ocr.dpi must be greater than zero"));
        }
        if self.processing.parallel_files == Some(0) {
            return Err(Error::config("processing.parallel_files must be greater than zero"));
        }
        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Window size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared by consecutive windows (must be smaller than `chunk_size`)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize { 500 }
fn default_chunk_overlap() -> usize { 100 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl PipelineConfig {
    /// Create a chunking configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Enforce `chunk_overlap < chunk_size`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Distance between consecutive window starts
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap)
    }
}

/// OCR fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Run the rasterize+OCR fallback for pages without embedded text
    #[serde(default = "default_ocr_enabled")]
    pub enabled: bool,
    /// Rasterization resolution
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Tesseract language pack
    #[serde(default = "default_language")]
    pub language: String,
    /// Tesseract binary
    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,
    /// pdftoppm binary (poppler-utils)
    #[serde(default = "default_pdftoppm_path")]
    pub pdftoppm_path: PathBuf,
    /// Per-page limit for rasterize+OCR, `None` waits indefinitely
    #[serde(default = "default_ocr_timeout")]
    pub timeout_secs: Option<u64>,
}

fn default_ocr_enabled() -> bool { true }
fn default_dpi() -> u32 { 200 }
fn default_language() -> String { "eng".to_string() }
fn default_tesseract_path() -> PathBuf { PathBuf::from("tesseract") }
fn default_pdftoppm_path() -> PathBuf { PathBuf::from("pdftoppm") }
fn default_ocr_timeout() -> Option<u64> { Some(120) }

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_ocr_enabled(),
            dpi: default_dpi(),
            language: default_language(),
            tesseract_path: default_tesseract_path(),
            pdftoppm_path: default_pdftoppm_path(),
            timeout_secs: default_ocr_timeout(),
        }
    }
}

/// Conversion of Office/text documents to PDF
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// LibreOffice binary used in headless mode
    #[serde(default = "default_libreoffice_path")]
    pub libreoffice_path: PathBuf,
    /// Where converted PDFs are kept (defaults to a scratch directory removed on exit)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_libreoffice_path() -> PathBuf { PathBuf::from("soffice") }

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            libreoffice_path: default_libreoffice_path(),
            output_dir: None,
        }
    }
}

/// Input staging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Copy inputs here before extraction; `None` reads them in place
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of files extracted concurrently (default: CPU count, max 8)
    #[serde(default)]
    pub parallel_files: Option<usize>,
}

impl ProcessingConfig {
    /// Resolved worker count
    pub fn workers(&self) -> usize {
        self.parallel_files
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.chunking.stride(), 400);
        assert_eq!(config.ocr.dpi, 200);
        assert_eq!(config.ocr.timeout_secs, Some(120));
        assert!(config.staging.dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller() {
        assert!(matches!(
            PipelineConfig::new(100, 100).validate(),
            Err(Error::Validation(_))
        ));
        assert!(PipelineConfig::new(0, 0).validate().is_err());
        assert!(PipelineConfig::new(100, 99).validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: IngestConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 800

            [ocr]
            dpi = 300
            timeout_secs = 30

            [staging]
            dir = "documents"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.chunk_overlap, 100);
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.timeout_secs, Some(30));
        assert_eq!(config.staging.dir, Some(PathBuf::from("documents")));
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest.toml");
        std::fs::write(&path, "[ocr]\ndpi = 0\n").unwrap();
        assert!(matches!(IngestConfig::from_file(&path), Err(Error::Config(_))));

        std::fs::write(&path, "[chunking]\nchunk_size = 50\nchunk_overlap = 60\n").unwrap();
        assert!(matches!(IngestConfig::from_file(&path), Err(Error::Validation(_))));
    }
}

//! Conversion of Office and text documents to PDF

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::types::FileKind;

use super::staging::create_unique;

/// Trait for turning an input into a PDF the page extractor can read
pub trait PdfConverter: Send + Sync {
    /// Return a PDF path for `path` (identity for PDFs)
    fn to_pdf(&self, path: &Path, kind: FileKind) -> Result<PathBuf>;

    /// Get converter name for logging
    fn name(&self) -> &str;
}

/// LibreOffice headless conversion
///
/// Each conversion runs in a private work directory; the result is then moved
/// into the output directory under a name no other file holds. Inputs' own
/// directories are never written to.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    binary: PathBuf,
    output_dir: PathBuf,
    // Keeps the default output directory alive as long as any clone
    _scratch: Option<Arc<TempDir>>,
}

impl LibreOfficeConverter {
    pub fn new(config: &ConversionConfig) -> Result<Self> {
        let (output_dir, scratch) = match &config.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                (dir.clone(), None)
            }
            None => {
                let scratch = tempfile::Builder::new()
                    .prefix("doc-chunker-pdf-")
                    .tempdir()?;
                (scratch.path().to_path_buf(), Some(Arc::new(scratch)))
            }
        };

        Ok(Self {
            binary: config.libreoffice_path.clone(),
            output_dir,
            _scratch: scratch,
        })
    }

    /// Directory converted PDFs end up in
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Check if the LibreOffice binary is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl PdfConverter for LibreOfficeConverter {
    fn to_pdf(&self, path: &Path, kind: FileKind) -> Result<PathBuf> {
        if kind == FileKind::Pdf {
            return Ok(path.to_path_buf());
        }
        if !kind.needs_conversion() {
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| "(none)".to_string());
            return Err(Error::UnsupportedFormat(ext));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Must share a filesystem with the output dir for the rename below
        let work_dir = tempfile::Builder::new()
            .prefix(".convert-")
            .tempdir_in(&self.output_dir)
            .map_err(|e| Error::conversion(&filename, format!("failed to create work dir: {}", e)))?;

        let output = Command::new(&self.binary)
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(work_dir.path())
            .arg(path)
            .output()
            .map_err(|e| Error::conversion(&filename, format!("failed to run LibreOffice: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::conversion(&filename, stderr.trim().to_string()));
        }

        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let pdf_name = format!("{}.pdf", stem);
        let produced = work_dir.path().join(&pdf_name);
        if !produced.exists() {
            return Err(Error::conversion(
                &filename,
                format!("expected output {} was not produced", pdf_name),
            ));
        }

        // Replaces only the placeholder reserved by create_unique
        let (pdf_path, _placeholder) = create_unique(&self.output_dir, Path::new(&pdf_name))?;
        std::fs::rename(&produced, &pdf_path)?;

        tracing::info!("Converted {} to {}", filename, pdf_path.display());
        Ok(pdf_path)
    }

    fn name(&self) -> &str {
        "libreoffice"
    }
}

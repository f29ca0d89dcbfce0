//! Page-level access to PDF documents

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// An opened PDF whose pages can be read one at a time
pub trait PdfPages {
    /// Path of the underlying file (handed to the rasterizer)
    fn path(&self) -> &Path;

    /// 1-based page numbers in document order
    fn page_numbers(&self) -> Vec<u32>;

    /// Embedded text of one page
    fn native_text(&self, page: u32) -> Result<String>;
}

/// Trait for opening PDFs
pub trait PdfOpener: Send + Sync {
    /// Open a PDF; failure here is fatal for the file
    fn open(&self, path: &Path) -> Result<Box<dyn PdfPages>>;
}

/// lopdf-backed opener
#[derive(Debug, Default, Clone)]
pub struct LopdfOpener;

impl PdfOpener for LopdfOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfPages>> {
        Ok(Box::new(LopdfDocument::load(path)?))
    }
}

/// A PDF loaded with lopdf
pub struct LopdfDocument {
    path: PathBuf,
    doc: lopdf::Document,
}

impl LopdfDocument {
    /// Load and sanity-check a PDF
    pub fn load(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let doc = lopdf::Document::load(path)
            .map_err(|e| Error::pdf_load(&filename, e.to_string()))?;

        if doc.is_encrypted() {
            return Err(Error::pdf_load(&filename, "document is encrypted"));
        }

        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }
}

impl PdfPages for LopdfDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    fn native_text(&self, page: u32) -> Result<String> {
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::pdf_load(self.path.display().to_string(), e.to_string()))
    }
}

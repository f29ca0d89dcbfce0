//! Error types for the extraction and chunking pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
///
/// Variants fall into three scopes: `Validation` aborts a chunking call outright,
/// file-level variants abort only the current file, and page-level variants are
/// carried inside [`crate::ingestion::PageOutcome::Degraded`] without aborting anything.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid chunking parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input path is a directory where a file was expected
    #[error("Expected a file, got folder: {}", .0.display())]
    NotAFile(PathBuf),

    /// Extension has no extractor or converter
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Conversion to PDF failed
    #[error("Failed to convert '{filename}' to PDF: {message}")]
    Conversion { filename: String, message: String },

    /// PDF container could not be opened
    #[error("Failed to load PDF '{filename}': {message}")]
    PdfLoad { filename: String, message: String },

    /// Tabular input could not be read
    #[error("Failed to read table '{filename}': {message}")]
    TabularParse { filename: String, message: String },

    /// Page rasterization failed
    #[error("Failed to render page {page}: {message}")]
    Render { page: u32, message: String },

    /// OCR failed on a page
    #[error("OCR failed on page {page}: {message}")]
    Ocr { page: u32, message: String },

    /// OCR did not finish within the configured limit
    #[error("OCR timed out on page {page} after {secs}s")]
    OcrTimeout { page: u32, secs: u64 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a conversion error
    pub fn conversion(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a PDF load error
    pub fn pdf_load(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PdfLoad {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a tabular parse error
    pub fn tabular(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TabularParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a render error
    pub fn render(page: u32, message: impl Into<String>) -> Self {
        Self::Render {
            page,
            message: message.into(),
        }
    }

    /// Create an OCR error
    pub fn ocr(page: u32, message: impl Into<String>) -> Self {
        Self::Ocr {
            page,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Errors that abort the current file but not the batch
    pub fn is_fatal_for_file(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_)
                | Error::NotAFile(_)
                | Error::UnsupportedFormat(_)
                | Error::Conversion { .. }
                | Error::PdfLoad { .. }
                | Error::TabularParse { .. }
                | Error::Io(_)
        )
    }

    /// Errors that degrade a single page to empty content
    pub fn is_page_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Render { .. } | Error::Ocr { .. } | Error::OcrTimeout { .. }
        )
    }
}

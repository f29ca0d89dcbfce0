//! Input file kinds and extension routing

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions the pipeline accepts when scanning a directory
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "ppt", "pptx", "csv"];

/// Supported input kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx) - converted to PDF
    Docx,
    /// Plain text file - converted to PDF
    Txt,
    /// Old Microsoft PowerPoint (.ppt) - converted to PDF
    Ppt,
    /// Microsoft PowerPoint presentation (.pptx) - converted to PDF
    Pptx,
    /// CSV file
    Csv,
    /// Unknown file type
    Unknown,
}

impl FileKind {
    /// Detect file kind from extension (case-insensitive, without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" => Self::Txt,
            "ppt" => Self::Ppt,
            "pptx" => Self::Pptx,
            "csv" => Self::Csv,
            _ => Self::Unknown,
        }
    }

    /// Detect file kind from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Check if this is a supported file kind
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Row-oriented input handled by the tabular extractor
    pub fn is_tabular(&self) -> bool {
        matches!(self, Self::Csv)
    }

    /// Needs the conversion collaborator before page extraction
    pub fn needs_conversion(&self) -> bool {
        matches!(self, Self::Docx | Self::Txt | Self::Ppt | Self::Pptx)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Ppt => "PowerPoint (.ppt)",
            Self::Pptx => "PowerPoint (.pptx)",
            Self::Csv => "CSV",
            Self::Unknown => "Unknown",
        }
    }

    /// Get required tools for this file kind
    pub fn required_tools(&self) -> Option<&'static str> {
        match self {
            Self::Docx | Self::Txt | Self::Ppt | Self::Pptx => {
                Some("LibreOffice (soffice --headless)")
            }
            Self::Pdf => Some("poppler-utils (pdftoppm) and tesseract for scanned pages"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(FileKind::from_path(Path::new("report.PDF")), FileKind::Pdf);
        assert_eq!(FileKind::from_path(Path::new("deck.pptx")), FileKind::Pptx);
        assert_eq!(FileKind::from_path(Path::new("rows.csv")), FileKind::Csv);
        assert_eq!(FileKind::from_path(Path::new("archive.tar.gz")), FileKind::Unknown);
        assert_eq!(FileKind::from_path(Path::new("README")), FileKind::Unknown);
    }

    #[test]
    fn test_routing() {
        assert!(FileKind::Csv.is_tabular());
        assert!(!FileKind::Pdf.needs_conversion());
        assert!(FileKind::Txt.needs_conversion());
        assert!(!FileKind::Unknown.is_supported());

        for ext in SUPPORTED_EXTENSIONS {
            assert!(FileKind::from_extension(ext).is_supported(), "{ext}");
        }
    }
}

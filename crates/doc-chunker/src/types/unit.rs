//! Text units: one normalized page or row

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use crate::ingestion::normalize;

/// Normalized text from one page or one row, with provenance metadata
///
/// The content is normalized on construction and the unit is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct TextUnit {
    #[serde(rename = "page_content")]
    content: String,
    metadata: Metadata,
}

/// Wire form accepted at the pipeline boundary
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    page_content: String,
    #[serde(default)]
    metadata: Metadata,
}

impl From<RawDocument> for TextUnit {
    fn from(raw: RawDocument) -> Self {
        TextUnit::new(&raw.page_content, raw.metadata)
    }
}

impl TextUnit {
    /// Create a unit, normalizing the raw text
    pub fn new(raw: &str, metadata: Metadata) -> Self {
        Self {
            content: normalize(raw),
            metadata,
        }
    }

    /// Normalized content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Provenance metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// True when normalization left nothing
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Source file name, if known
    pub fn file_name(&self) -> Option<&str> {
        self.metadata.file_name.as_deref()
    }
}

//! Sliding-window text chunking with character offset tracking

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{Chunk, ChunkMetadata, TextUnit};

/// Fixed-size overlapping window chunker
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Window size in characters
    chunk_size: usize,
    /// Overlap between consecutive windows
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a new chunker, rejecting `chunk_overlap >= chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::from_config(&PipelineConfig::new(chunk_size, chunk_overlap))
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Distance between window starts, always at least 1
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Half-open `(start, end)` windows over a text of `len` characters
    pub fn windows(&self, len: usize) -> impl Iterator<Item = (usize, usize)> {
        let size = self.chunk_size;
        (0..len)
            .step_by(self.stride())
            .map(move |start| (start, (start + size).min(len)))
    }

    /// Chunk a single unit; empty units produce nothing
    pub fn chunk_unit(&self, unit: &TextUnit) -> Vec<Chunk> {
        let content = unit.content();
        if content.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the string
        let boundaries: Vec<usize> = content
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(content.len()))
            .collect();
        let len = boundaries.len() - 1;
        let source_type = unit.metadata().source_type_or_unknown();

        self.windows(len)
            .enumerate()
            .map(|(chunk_index, (start, end))| Chunk {
                text: content[boundaries[start]..boundaries[end]].to_string(),
                metadata: ChunkMetadata {
                    source: unit.metadata().clone(),
                    chunk_index,
                    chunk_start: start,
                    chunk_end: end,
                    source_type: source_type.clone(),
                },
            })
            .collect()
    }

    /// Chunk every unit in order
    pub fn chunk_units(&self, units: &[TextUnit]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for (unit_index, unit) in units.iter().enumerate() {
            if unit.is_empty() {
                tracing::warn!(
                    "Document {} ({}) is empty, skipping",
                    unit_index,
                    unit.file_name().unwrap_or("unnamed")
                );
                continue;
            }
            chunks.extend(self.chunk_unit(unit));
        }

        tracing::info!("Created {} chunks from {} documents", chunks.len(), units.len());
        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// Validate the configuration, then chunk externally supplied documents
pub fn chunk_documents(units: &[TextUnit], config: &PipelineConfig) -> Result<Vec<Chunk>> {
    let chunker = TextChunker::from_config(config)?;
    Ok(chunker.chunk_units(units))
}

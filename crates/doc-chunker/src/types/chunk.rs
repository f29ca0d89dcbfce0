//! Chunk records emitted by the chunker

use serde::Serialize;
use serde_json::{Map, Value};

use super::metadata::Metadata;

/// One bounded, overlapping window of a text unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// Window text
    pub text: String,
    /// Unit metadata plus window position
    pub metadata: ChunkMetadata,
}

/// Owning unit's metadata merged with the window's positional fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Map<String, Value>")]
pub struct ChunkMetadata {
    /// Copy of the unit's metadata
    pub source: Metadata,
    /// 0-based, restarts for every unit
    pub chunk_index: usize,
    /// Character offset of the window start (inclusive)
    pub chunk_start: usize,
    /// Character offset of the window end (exclusive)
    pub chunk_end: usize,
    /// Copy of the unit's `type`, `"unknown"` when absent
    pub source_type: String,
}

impl ChunkMetadata {
    /// Source file name, if known
    pub fn file_name(&self) -> Option<&str> {
        self.source.file_name.as_deref()
    }

    /// Window length in characters
    pub fn len(&self) -> usize {
        self.chunk_end - self.chunk_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ChunkMetadata> for Map<String, Value> {
    fn from(meta: ChunkMetadata) -> Self {
        let mut map = Map::from(meta.source);
        map.insert("chunk_index".to_string(), Value::from(meta.chunk_index));
        map.insert("chunk_start".to_string(), Value::from(meta.chunk_start));
        map.insert("chunk_end".to_string(), Value::from(meta.chunk_end));
        map.insert("source_type".to_string(), Value::String(meta.source_type));
        map
    }
}

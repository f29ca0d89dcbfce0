//! Core types for the extraction and chunking pipeline

pub mod chunk;
pub mod file_kind;
pub mod metadata;
pub mod unit;

pub use chunk::{Chunk, ChunkMetadata};
pub use file_kind::{FileKind, SUPPORTED_EXTENSIONS};
pub use metadata::{Metadata, Position, SourceType};
pub use unit::TextUnit;

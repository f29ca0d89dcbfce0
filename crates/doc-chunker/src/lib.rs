//! doc-chunker: document extraction and chunking for retrieval pipelines
//!
//! Files (PDF, office documents, text, CSV) are staged, converted to PDF where
//! needed and extracted into normalized text units: one per PDF page, with an
//! OCR fallback for pages without embedded text, or one per CSV row. Units are
//! then split into fixed-size overlapping character windows carrying their
//! source metadata.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod types;

pub use config::{IngestConfig, PipelineConfig};
pub use error::{Error, Result};
pub use ingestion::{chunk_documents, normalize, IngestPipeline, PipelineOutput, TextChunker};
pub use processing::ParallelIngest;
pub use types::{Chunk, ChunkMetadata, Metadata, TextUnit};

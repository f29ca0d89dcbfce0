//! Document ingestion: extraction, normalization and chunking

mod chunker;
mod normalizer;
mod page_extractor;
mod processor;
mod tabular;

pub use chunker::{chunk_documents, TextChunker};
pub use normalizer::normalize;
pub use page_extractor::{PageExtractor, PageOutcome};
pub use processor::{ExtractedFile, FileSummary, IngestPipeline, PipelineOutput, SkippedFile};
pub use tabular::{Table, TabularExtractor};

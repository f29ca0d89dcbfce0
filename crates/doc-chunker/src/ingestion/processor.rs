//! Ingestion pipeline orchestration

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::providers::{
    CsvTableLoader, DirectoryStager, InPlaceStager, LibreOfficeConverter, LopdfOpener,
    PdfConverter, PdfOpener, Stager, TableLoader,
};
use crate::types::{Chunk, FileKind, TextUnit, SUPPORTED_EXTENSIONS};

use super::chunker::TextChunker;
use super::page_extractor::PageExtractor;
use super::tabular::TabularExtractor;

/// Units extracted from one file
#[derive(Debug)]
pub struct ExtractedFile {
    /// Path extraction actually read (after staging)
    pub path: PathBuf,
    /// Non-empty units in page/row order
    pub units: Vec<TextUnit>,
    /// Pages whose OCR fallback failed
    pub degraded_pages: usize,
    /// When extraction started
    pub loaded_at: DateTime<Local>,
}

impl ExtractedFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Per-file report line
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileSummary {
    pub file_name: String,
    pub path: PathBuf,
    /// Pages or rows that survived the empty filter
    pub unit_count: usize,
    pub degraded_pages: usize,
    pub loaded_at: DateTime<Local>,
}

/// A file that contributed nothing, and why
#[derive(Debug, Clone, serde::Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a pipeline run
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub chunks: Vec<Chunk>,
    pub summaries: Vec<FileSummary>,
    pub skipped: Vec<SkippedFile>,
    /// Units handed to the chunker
    pub total_units: usize,
}

/// Main ingestion pipeline
pub struct IngestPipeline {
    chunker: TextChunker,
    page_extractor: PageExtractor,
    stager: Box<dyn Stager>,
    converter: Box<dyn PdfConverter>,
    pdf_opener: Box<dyn PdfOpener>,
    table_loader: Box<dyn TableLoader>,
}

impl IngestPipeline {
    /// Create a pipeline with the default collaborators
    ///
    /// Fails before touching any input when the chunking configuration is invalid.
    pub fn new(config: &IngestConfig) -> Result<Self> {
        config.validate()?;

        let stager: Box<dyn Stager> = match &config.staging.dir {
            Some(dir) => Box::new(DirectoryStager::new(dir)?),
            None => Box::new(InPlaceStager),
        };

        let converter = LibreOfficeConverter::new(&config.conversion)?;
        tracing::debug!(
            "Pipeline: {} staging, {} conversion, chunks {}/{}",
            stager.name(),
            converter.name(),
            config.chunking.chunk_size,
            config.chunking.chunk_overlap
        );

        Ok(Self {
            chunker: TextChunker::from_config(&config.chunking)?,
            page_extractor: PageExtractor::from_config(&config.ocr),
            stager,
            converter: Box::new(converter),
            pdf_opener: Box::new(LopdfOpener),
            table_loader: Box::new(CsvTableLoader::default()),
        })
    }

    pub fn with_stager(mut self, stager: Box<dyn Stager>) -> Self {
        self.stager = stager;
        self
    }

    pub fn with_converter(mut self, converter: Box<dyn PdfConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_pdf_opener(mut self, opener: Box<dyn PdfOpener>) -> Self {
        self.pdf_opener = opener;
        self
    }

    pub fn with_table_loader(mut self, loader: Box<dyn TableLoader>) -> Self {
        self.table_loader = loader;
        self
    }

    pub fn with_page_extractor(mut self, extractor: PageExtractor) -> Self {
        self.page_extractor = extractor;
        self
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    /// Resolve a source path into the files to process
    ///
    /// A file yields itself; a directory yields its direct children with a
    /// supported extension, sorted by path.
    pub fn discover(source: &Path) -> Result<Vec<PathBuf>> {
        if source.is_file() {
            return Ok(vec![source.to_path_buf()]);
        }
        if !source.is_dir() {
            return Err(Error::FileNotFound(source.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(source)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        tracing::info!("Found {} files to process", files.len());
        Ok(files)
    }

    /// Stage, convert if needed, and extract one file
    ///
    /// Errors are fatal for this file only.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractedFile> {
        let kind = FileKind::from_path(path);
        if !kind.is_supported() {
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| "(none)".to_string());
            return Err(Error::UnsupportedFormat(ext));
        }

        let staged = self.stager.stage(path)?;
        tracing::debug!("Processing {} as {}", staged.display(), kind.display_name());
        let loaded_at = Local::now();
        let file_name = staged
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let (units, degraded_pages) = if kind.is_tabular() {
            let table = self.table_loader.load(&staged)?;
            (TabularExtractor::extract(&table, &file_name), 0)
        } else {
            let pdf_path = self.converter.to_pdf(&staged, kind)?;
            let pdf_name = pdf_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let pdf = self.pdf_opener.open(&pdf_path)?;

            let outcomes = self.page_extractor.extract_document(pdf.as_ref(), &pdf_name);
            let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
            let ocr_pages = outcomes.iter().filter(|o| o.used_ocr()).count();
            tracing::debug!(
                "{}: {} pages, {} via OCR fallback, {} degraded",
                pdf_name,
                outcomes.len(),
                ocr_pages,
                degraded
            );
            (outcomes.into_iter().map(|o| o.into_unit()).collect(), degraded)
        };

        let units: Vec<TextUnit> = units.into_iter().filter(|u| !u.is_empty()).collect();

        Ok(ExtractedFile {
            path: staged,
            units,
            degraded_pages,
            loaded_at,
        })
    }

    /// Sequential run over `files`, then one chunking pass
    pub fn run(&self, files: &[PathBuf]) -> PipelineOutput {
        let results = files
            .iter()
            .map(|path| (path.clone(), self.extract_file(path)))
            .collect();
        self.assemble(results)
    }

    /// Fold per-file results (in input order) into summaries and chunks
    pub fn assemble(&self, results: Vec<(PathBuf, Result<ExtractedFile>)>) -> PipelineOutput {
        let mut output = PipelineOutput::default();
        let mut all_units = Vec::new();

        for (path, result) in results {
            let extracted = match result {
                Ok(extracted) => extracted,
                Err(e) => {
                    tracing::warn!("{}", e);
                    output.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if extracted.units.is_empty() {
                tracing::warn!("Document {} is empty, skipping", extracted.file_name());
                output.skipped.push(SkippedFile {
                    path,
                    reason: "no text content after extraction".to_string(),
                });
                continue;
            }

            output.summaries.push(FileSummary {
                file_name: extracted.file_name(),
                path: extracted.path.clone(),
                unit_count: extracted.units.len(),
                degraded_pages: extracted.degraded_pages,
                loaded_at: extracted.loaded_at,
            });
            all_units.extend(extracted.units);
        }

        tracing::info!("Total pages/rows loaded: {}", all_units.len());
        output.total_units = all_units.len();
        output.chunks = self.chunk(&all_units);
        output
    }

    /// Chunk already-extracted units with the pipeline's configuration
    pub fn chunk(&self, units: &[TextUnit]) -> Vec<Chunk> {
        self.chunker.chunk_units(units)
    }
}

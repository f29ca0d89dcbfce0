//! Document chunker binary
//!
//! Run with: cargo run -p doc-chunker -- <file-or-directory>

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_chunker::{
    ingestion::FileSummary,
    providers::{LibreOfficeConverter, PdftoppmRasterizer, TesseractOcr},
    types::FileKind,
    IngestConfig, IngestPipeline, ParallelIngest, PipelineOutput,
};

/// Extract text from documents and split it into overlapping chunks.
#[derive(Parser)]
#[command(name = "doc-chunker", version, about)]
struct Cli {
    /// File or directory to process
    source: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared by consecutive windows
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Copy inputs into this directory before extraction
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Render resolution for OCR
    #[arg(long)]
    dpi: Option<u32>,

    /// Per-page OCR limit in seconds (0 disables the limit)
    #[arg(long)]
    ocr_timeout: Option<u64>,

    /// Never fall back to OCR
    #[arg(long)]
    no_ocr: bool,

    /// Files extracted concurrently
    #[arg(short, long)]
    parallel: Option<usize>,

    /// Write chunks as JSON lines to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> Result<IngestConfig> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => IngestConfig::default(),
        };

        if let Some(size) = self.chunk_size {
            config.chunking.chunk_size = size;
        }
        if let Some(overlap) = self.chunk_overlap {
            config.chunking.chunk_overlap = overlap;
        }
        if let Some(dir) = &self.staging_dir {
            config.staging.dir = Some(dir.clone());
        }
        if let Some(dpi) = self.dpi {
            config.ocr.dpi = dpi;
        }
        if let Some(secs) = self.ocr_timeout {
            config.ocr.timeout_secs = (secs > 0).then_some(secs);
        }
        if self.no_ocr {
            config.ocr.enabled = false;
        }
        if let Some(n) = self.parallel {
            config.processing.parallel_files = Some(n);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Warn about missing external tools before the batch starts
fn check_tools(config: &IngestConfig, files: &[PathBuf]) {
    let kinds: Vec<FileKind> = files.iter().map(|f| FileKind::from_path(f)).collect();

    if let Some(kind) = kinds.iter().find(|k| k.needs_conversion()) {
        let available = LibreOfficeConverter::new(&config.conversion)
            .map(|c| c.is_available())
            .unwrap_or(false);
        if !available {
            tracing::warn!(
                "{} not available at {}; {} files will be skipped",
                kind.required_tools().unwrap_or("LibreOffice"),
                config.conversion.libreoffice_path.display(),
                kind.display_name()
            );
        }
    }

    let has_pages = kinds.iter().any(|k| !k.is_tabular());
    if has_pages && config.ocr.enabled {
        let rasterizer = PdftoppmRasterizer::new(&config.ocr);
        let ocr = TesseractOcr::new(&config.ocr);
        if !rasterizer.is_available() || !ocr.is_available() {
            tracing::warn!(
                "OCR fallback unavailable ({}); pages without embedded text will be empty",
                FileKind::Pdf.required_tools().unwrap_or("pdftoppm and tesseract")
            );
        }
    }
}

fn print_summary(summary: &FileSummary) {
    let directory = summary
        .path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    println!("{}", "=".repeat(50));
    println!("DOCUMENT SUMMARY");
    println!("Processed on: {}", summary.loaded_at.format("%Y-%m-%d %H:%M:%S"));
    println!("File Name: {}", summary.file_name);
    println!("Directory: {}", directory);
    println!("Total Pages/Rows: {}", summary.unit_count);
    if summary.degraded_pages > 0 {
        println!("Degraded Pages: {}", summary.degraded_pages);
    }
}

fn print_report(output: &PipelineOutput) {
    for summary in &output.summaries {
        print_summary(summary);
    }
    println!("{}", "=".repeat(50));

    for skipped in &output.skipped {
        println!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    println!("Total pages/rows: {}", output.total_units);
    println!("Total chunks: {}", output.chunks.len());

    if let Some(chunk) = output.chunks.first() {
        println!("\nSample chunk:");
        println!("  text: {}", chunk.text);
        println!(
            "  metadata: {}",
            serde_json::to_string(&chunk.metadata).unwrap_or_default()
        );
    }
}

fn write_jsonl(path: &Path, output: &PipelineOutput) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for chunk in &output.chunks {
        serde_json::to_writer(&mut writer, chunk)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doc_chunker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Chunk overlap: {}", config.chunking.chunk_overlap);
    tracing::info!("  - OCR: {} ({} dpi)", config.ocr.enabled, config.ocr.dpi);

    let files = IngestPipeline::discover(&cli.source)?;
    if files.is_empty() {
        tracing::warn!("No supported files found in {}", cli.source.display());
    }

    check_tools(&config, &files);

    let pipeline = Arc::new(IngestPipeline::new(&config)?);
    let output = ParallelIngest::new(pipeline, config.processing.workers())
        .run(files)
        .await;

    print_report(&output);

    if let Some(path) = &cli.output {
        write_jsonl(path, &output)?;
        tracing::info!("Wrote {} chunks to {}", output.chunks.len(), path.display());
    }

    Ok(())
}

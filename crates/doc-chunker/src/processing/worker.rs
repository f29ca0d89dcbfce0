//! Bounded-concurrency extraction over a batch of files

use futures_util::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::ingestion::{ExtractedFile, IngestPipeline, PipelineOutput};

/// Runs per-file extraction on a blocking pool, then chunks once
///
/// Per-file results are reassembled in input order, so the output is the
/// same as `IngestPipeline::run` on the same files.
pub struct ParallelIngest {
    pipeline: Arc<IngestPipeline>,
    parallel_files: usize,
}

impl ParallelIngest {
    pub fn new(pipeline: Arc<IngestPipeline>, parallel_files: usize) -> Self {
        let parallel_files = parallel_files.max(1);
        tracing::info!("Worker configured: {} parallel files", parallel_files);
        Self {
            pipeline,
            parallel_files,
        }
    }

    pub fn parallel_files(&self) -> usize {
        self.parallel_files
    }

    /// Extract all files concurrently and chunk the combined units
    pub async fn run(&self, files: Vec<PathBuf>) -> PipelineOutput {
        let semaphore = Arc::new(Semaphore::new(self.parallel_files));

        let file_futures: Vec<_> = files
            .into_iter()
            .map(|path| {
                let pipeline = self.pipeline.clone();
                let sem = semaphore.clone();

                async move {
                    let result = Self::extract_one(pipeline, sem, path.clone()).await;
                    (path, result)
                }
            })
            .collect();

        let results = join_all(file_futures).await;
        self.pipeline.assemble(results)
    }

    async fn extract_one(
        pipeline: Arc<IngestPipeline>,
        sem: Arc<Semaphore>,
        path: PathBuf,
    ) -> Result<ExtractedFile> {
        let _permit = sem
            .acquire_owned()
            .await
            .map_err(|e| Error::internal(format!("worker semaphore closed: {}", e)))?;

        let file_label = path.display().to_string();
        tracing::info!("Starting processing: {}", file_label);
        let start_time = Instant::now();

        let result = tokio::task::spawn_blocking(move || pipeline.extract_file(&path))
            .await
            .map_err(|e| Error::internal(format!("extraction task failed for {}: {}", file_label, e)))?;

        let elapsed = start_time.elapsed();
        if elapsed.as_secs() > 60 {
            tracing::warn!("Slow processing for '{}': took {:.1}s", file_label, elapsed.as_secs_f64());
        } else {
            tracing::debug!("Finished {} in {:.1}s", file_label, elapsed.as_secs_f64());
        }

        result
    }
}

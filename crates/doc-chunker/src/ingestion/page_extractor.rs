//! Per-page PDF text extraction with rasterize+OCR fallback

use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{Error, Result};
use crate::providers::{OcrEngine, PdfPages, PdftoppmRasterizer, Rasterizer, TesseractOcr};
use crate::types::{Metadata, TextUnit};

/// What happened to one page
///
/// `Degraded` pages still carry a unit (with empty content) so callers can
/// count them, but the error never aborts the document.
#[derive(Debug)]
pub enum PageOutcome {
    /// Embedded text was found
    Native(TextUnit),
    /// No embedded text; OCR produced the content
    Ocr(TextUnit),
    /// Rasterize or OCR failed; content is empty
    Degraded { unit: TextUnit, error: Error },
}

impl PageOutcome {
    pub fn unit(&self) -> &TextUnit {
        match self {
            Self::Native(unit) | Self::Ocr(unit) | Self::Degraded { unit, .. } => unit,
        }
    }

    pub fn into_unit(self) -> TextUnit {
        match self {
            Self::Native(unit) | Self::Ocr(unit) | Self::Degraded { unit, .. } => unit,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn used_ocr(&self) -> bool {
        !matches!(self, Self::Native(_))
    }
}

/// Page extractor with an OCR fallback for pages without embedded text
#[derive(Clone)]
pub struct PageExtractor {
    rasterizer: Arc<dyn Rasterizer>,
    ocr: Arc<dyn OcrEngine>,
    ocr_enabled: bool,
    ocr_timeout: Option<Duration>,
}

impl PageExtractor {
    /// Create an extractor from explicit collaborators (no timeout)
    pub fn new(rasterizer: Arc<dyn Rasterizer>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            rasterizer,
            ocr,
            ocr_enabled: true,
            ocr_timeout: None,
        }
    }

    /// pdftoppm + tesseract, configured from `OcrConfig`
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            Arc::new(PdftoppmRasterizer::new(config)),
            Arc::new(TesseractOcr::new(config)),
        )
        .with_ocr_enabled(config.enabled)
        .with_timeout(config.timeout_secs.map(Duration::from_secs))
    }

    /// Limit each page's rasterize+OCR; exceeding it counts as an OCR failure
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    pub fn with_ocr_enabled(mut self, enabled: bool) -> Self {
        self.ocr_enabled = enabled;
        self
    }

    /// Extract every page in document order
    pub fn extract_document(&self, pdf: &dyn PdfPages, file_name: &str) -> Vec<PageOutcome> {
        pdf.page_numbers()
            .into_iter()
            .map(|page| self.extract_page(pdf, page, file_name))
            .collect()
    }

    /// Extract one page, falling back to OCR when it has no embedded text
    pub fn extract_page(&self, pdf: &dyn PdfPages, page: u32, file_name: &str) -> PageOutcome {
        let metadata = Metadata::page(file_name, page);

        let native = pdf.native_text(page).unwrap_or_else(|e| {
            tracing::debug!("Native extraction failed on page {} of {}: {}", page, file_name, e);
            String::new()
        });

        if !native.trim().is_empty() {
            return PageOutcome::Native(TextUnit::new(&native, metadata));
        }

        if !self.ocr_enabled {
            tracing::debug!("Page {} of {} has no text and OCR is disabled", page, file_name);
            return PageOutcome::Native(TextUnit::new("", metadata));
        }

        tracing::debug!(
            "Page {} of {} has no embedded text, running OCR ({} + {})",
            page,
            file_name,
            self.rasterizer.name(),
            self.ocr.name()
        );
        match self.run_ocr(pdf.path(), page) {
            Ok(text) => PageOutcome::Ocr(TextUnit::new(&text, metadata)),
            Err(error) => {
                tracing::warn!("Failed to OCR page {} of {}: {}", page, file_name, error);
                PageOutcome::Degraded {
                    unit: TextUnit::new("", metadata),
                    error,
                }
            }
        }
    }

    fn run_ocr(&self, pdf_path: &Path, page: u32) -> Result<String> {
        let Some(limit) = self.ocr_timeout else {
            return rasterize_and_recognize(self.rasterizer.as_ref(), self.ocr.as_ref(), pdf_path, page);
        };

        let (tx, rx) = mpsc::channel();
        let rasterizer = Arc::clone(&self.rasterizer);
        let ocr = Arc::clone(&self.ocr);
        let pdf_path = pdf_path.to_path_buf();

        thread::spawn(move || {
            let result = rasterize_and_recognize(rasterizer.as_ref(), ocr.as_ref(), &pdf_path, page);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            // The tools enforce the same limit on their own processes, so the
            // thread exits shortly after; its late result is dropped
            Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::OcrTimeout {
                page,
                secs: limit.as_secs(),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(Error::ocr(page, "OCR worker thread crashed"))
            }
        }
    }
}

fn rasterize_and_recognize(
    rasterizer: &dyn Rasterizer,
    ocr: &dyn OcrEngine,
    pdf_path: &Path,
    page: u32,
) -> Result<String> {
    let image = rasterizer.render_page(pdf_path, page)?;
    ocr.recognize(&image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::PageImage;
    use crate::types::Position;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePdf {
        path: PathBuf,
        pages: Vec<Result<String>>,
    }

    impl FakePdf {
        fn new(pages: Vec<Result<String>>) -> Self {
            Self {
                path: PathBuf::from("/staged/scan.pdf"),
                pages,
            }
        }
    }

    impl PdfPages for FakePdf {
        fn path(&self) -> &Path {
            &self.path
        }

        fn page_numbers(&self) -> Vec<u32> {
            (1..=self.pages.len() as u32).collect()
        }

        fn native_text(&self, page: u32) -> Result<String> {
            match &self.pages[page as usize - 1] {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::internal(e.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct CountingRasterizer {
        calls: AtomicUsize,
    }

    impl Rasterizer for CountingRasterizer {
        fn render_page(&self, _pdf: &Path, page: u32) -> Result<PageImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PageImage {
                page,
                dpi: 200,
                png: vec![0x89, b'P', b'N', b'G'],
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct ScriptedOcr {
        calls: AtomicUsize,
        reply: Option<&'static str>,
        delay: Duration,
    }

    impl ScriptedOcr {
        fn replying(text: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Some(text),
                delay: Duration::ZERO,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: None,
                delay: Duration::ZERO,
            }
        }
    }

    impl OcrEngine for ScriptedOcr {
        fn recognize(&self, image: &PageImage) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            match self.reply {
                Some(text) => Ok(text.to_string()),
                None => Err(Error::ocr(image.page, "engine crashed")),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_native_text_skips_ocr() {
        let rasterizer = Arc::new(CountingRasterizer::default());
        let ocr = Arc::new(ScriptedOcr::replying("unused"));
        let extractor = PageExtractor::new(rasterizer.clone(), ocr.clone());

        let pdf = FakePdf::new(vec![Ok("Hello\n\n  world".to_string())]);
        let outcome = extractor.extract_page(&pdf, 1, "scan.pdf");

        assert!(matches!(outcome, PageOutcome::Native(_)));
        assert_eq!(outcome.unit().content(), "Hello world");
        assert_eq!(outcome.unit().metadata(), &Metadata::page("scan.pdf", 1));
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blank_page_triggers_exactly_one_ocr_call() {
        let rasterizer = Arc::new(CountingRasterizer::default());
        let ocr = Arc::new(ScriptedOcr::replying("Scanned\ttext\n"));
        let extractor = PageExtractor::new(rasterizer.clone(), ocr.clone());

        let pdf = FakePdf::new(vec![Ok("  \n ".to_string())]);
        let outcome = extractor.extract_page(&pdf, 1, "scan.pdf");

        assert!(matches!(outcome, PageOutcome::Ocr(_)));
        assert_eq!(outcome.unit().content(), "Scanned text");
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ocr_failure_degrades_to_empty() {
        let rasterizer = Arc::new(CountingRasterizer::default());
        let ocr = Arc::new(ScriptedOcr::failing());
        let extractor = PageExtractor::new(rasterizer.clone(), ocr.clone());

        let pdf = FakePdf::new(vec![Ok(String::new())]);
        let outcome = extractor.extract_page(&pdf, 1, "scan.pdf");

        assert!(outcome.is_degraded());
        assert!(outcome.unit().is_empty());
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
        match outcome {
            PageOutcome::Degraded { error, .. } => assert!(error.is_page_recoverable()),
            other => panic!("expected degraded page, got {:?}", other),
        }
    }

    #[test]
    fn test_native_error_falls_back_to_ocr() {
        let extractor = PageExtractor::new(
            Arc::new(CountingRasterizer::default()),
            Arc::new(ScriptedOcr::replying("recovered")),
        );

        let pdf = FakePdf::new(vec![Err(Error::internal("unknown font encoding"))]);
        let outcome = extractor.extract_page(&pdf, 1, "scan.pdf");
        assert_eq!(outcome.unit().content(), "recovered");
    }

    #[test]
    fn test_ocr_timeout_is_degraded() {
        let ocr = Arc::new(ScriptedOcr {
            calls: AtomicUsize::new(0),
            reply: Some("too late"),
            delay: Duration::from_millis(500),
        });
        let extractor = PageExtractor::new(Arc::new(CountingRasterizer::default()), ocr)
            .with_timeout(Some(Duration::from_millis(20)));

        let pdf = FakePdf::new(vec![Ok(String::new())]);
        match extractor.extract_page(&pdf, 1, "scan.pdf") {
            PageOutcome::Degraded { unit, error } => {
                assert!(unit.is_empty());
                assert!(matches!(error, Error::OcrTimeout { page: 1, .. }));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_ocr_within_timeout_succeeds() {
        let extractor = PageExtractor::new(
            Arc::new(CountingRasterizer::default()),
            Arc::new(ScriptedOcr::replying("fast enough")),
        )
        .with_timeout(Some(Duration::from_secs(10)));

        let pdf = FakePdf::new(vec![Ok(String::new())]);
        assert_eq!(
            extractor.extract_page(&pdf, 1, "scan.pdf").unit().content(),
            "fast enough"
        );
    }

    #[test]
    fn test_disabled_ocr_leaves_page_empty() {
        let rasterizer = Arc::new(CountingRasterizer::default());
        let extractor = PageExtractor::new(rasterizer.clone(), Arc::new(ScriptedOcr::replying("x")))
            .with_ocr_enabled(false);

        let pdf = FakePdf::new(vec![Ok(String::new())]);
        let outcome = extractor.extract_page(&pdf, 1, "scan.pdf");
        assert!(outcome.unit().is_empty());
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_extract_document_numbers_pages_from_one() {
        let extractor = PageExtractor::new(
            Arc::new(CountingRasterizer::default()),
            Arc::new(ScriptedOcr::failing()),
        );
        let pdf = FakePdf::new(vec![
            Ok("first".to_string()),
            Ok(String::new()),
            Ok("third".to_string()),
        ]);

        let outcomes = extractor.extract_document(&pdf, "scan.pdf");
        let pages: Vec<_> = outcomes.iter().map(|o| o.unit().metadata().position).collect();
        assert_eq!(
            pages,
            vec![Some(Position::Page(1)), Some(Position::Page(2)), Some(Position::Page(3))]
        );
        assert!(outcomes[1].is_degraded());
        assert_eq!(outcomes[2].unit().content(), "third");
    }
}

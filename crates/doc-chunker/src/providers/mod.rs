//! Collaborator abstractions around the extraction core
//!
//! Each collaborator is a trait with one default implementation backed by a
//! local library or tool, so tests and embedders can swap any of them.

pub mod converter;
pub mod ocr;
pub mod pdf;
mod process;
pub mod raster;
pub mod staging;
pub mod table;

pub use converter::{LibreOfficeConverter, PdfConverter};
pub use ocr::{OcrEngine, TesseractOcr};
pub use pdf::{LopdfDocument, LopdfOpener, PdfOpener, PdfPages};
pub use raster::{PageImage, PdftoppmRasterizer, Rasterizer};
pub use staging::{DirectoryStager, InPlaceStager, Stager};
pub use table::{CsvTableLoader, TableLoader};

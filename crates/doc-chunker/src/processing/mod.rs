//! Concurrent per-file extraction

mod worker;

pub use worker::ParallelIngest;
